//! Advisory-service boundary.
//!
//! Free-text security insights and spending analytics come from an external
//! generative service. This module holds only the contract with that service:
//! the request payload, the reply types, reply decoding and the currency
//! clean-up applied to analytics. No network code lives here.
//!
//! Every failure degrades to an empty result. A caller never sees an error
//! from this module.
//!
//! # Feature
//!
//! Requires the `advisory` feature.
//!
//! # Example
//!
//! ```
//! use cardprobe::advisory::{parse_analytics, AdvisoryRequest, AdvisoryService, Unavailable};
//!
//! let request = AdvisoryRequest::for_card("4056 6312 3456 7890", Some("Commercial Bank"), None);
//! assert_eq!(request.iin, "405663");
//! assert!(Unavailable.card_analytics(&request).is_none());
//!
//! let reply = r#"{"estimatedBalanceLKR": "50,000", "spendingLimitLKR": "Rs. 250,000",
//!     "riskScore": 20, "cardTier": "Gold", "trustLevel": "High",
//!     "usageCategory": "Consumer", "creditScoreEquivalent": "A1", "insights": []}"#;
//! let analytics = parse_analytics(reply).unwrap();
//! assert_eq!(analytics.estimated_balance_lkr, "Rs. 50,000");
//! ```

use serde::{Deserialize, Serialize};

use crate::format::strip_formatting;

/// Digits of the card number sent to the service.
pub const IIN_DIGITS: usize = 6;

/// Marker expected on monetary strings.
pub const CURRENCY_MARKER: &str = "Rs.";

/// Payload for an advisory call. Only the IIN leaves the process, never the
/// full card number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisoryRequest {
    /// First six digits of the card number (fewer if the number is short).
    pub iin: String,
    /// Issuing bank, if known.
    pub bank: Option<String>,
    /// Issuing country, if known.
    pub country: Option<String>,
}

impl AdvisoryRequest {
    /// Builds a request from a raw card number and optional labels.
    pub fn for_card(number: &str, bank: Option<&str>, country: Option<&str>) -> Self {
        let mut iin = strip_formatting(number);
        iin.truncate(IIN_DIGITS);
        Self {
            iin,
            bank: bank.map(str::to_string),
            country: country.map(str::to_string),
        }
    }

    /// Prompt asking for three security or technical insights on the IIN.
    pub fn insights_prompt(&self) -> String {
        format!(
            "Provide 3 professional security or technical insights for a card validator. \
             The IIN is {}. Cover card security standards (EMV, 3DS 2.0), what the 6-digit \
             IIN says about the issuing bank, and data protection. \
             Reply with a JSON array of objects with \"title\", \"content\" and \"type\" \
             (\"security\", \"feature\" or \"info\").",
            self.iin
        )
    }

    /// Prompt asking for an LKR-denominated analytics estimate.
    pub fn analytics_prompt(&self) -> String {
        format!(
            "Estimate the market profile of a card with IIN {iin}. Bank: {bank}. Region: {country}. \
             All monetary values in Sri Lankan Rupees (Rs.). Reply with a JSON object with \
             \"estimatedBalanceLKR\", \"spendingLimitLKR\", \"riskScore\" (0-100), \"cardTier\", \
             \"trustLevel\" (\"High\", \"Medium\" or \"Low\"), \"usageCategory\", \
             \"creditScoreEquivalent\" and \"insights\" (array of strings).",
            iin = self.iin,
            bank = self.bank.as_deref().unwrap_or("Unknown Bank Sri Lanka"),
            country = self.country.as_deref().unwrap_or("Sri Lanka"),
        )
    }
}

/// Category of a [`SecurityInsight`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    /// Security guidance.
    Security,
    /// Card feature.
    Feature,
    /// General information.
    Info,
}

impl InsightKind {
    /// Maps a service label to a kind, ignoring ASCII case.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "security" => Some(Self::Security),
            "feature" => Some(Self::Feature),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

/// One free-text insight from the service.
///
/// Fields are taken as sent. Missing fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityInsight {
    /// Short heading.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Category label, normally `security`, `feature` or `info`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl SecurityInsight {
    /// The category, if the label is one of the known kinds.
    pub fn category(&self) -> Option<InsightKind> {
        InsightKind::from_label(&self.kind)
    }
}

/// Trust band in [`CardAnalytics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrustLevel {
    /// High trust.
    High,
    /// Medium trust.
    Medium,
    /// Low trust.
    Low,
}

impl TrustLevel {
    /// Maps a service label to a band, ignoring ASCII case.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Predicted spending profile for a card's IIN.
///
/// The service's reply is passed through unchecked: every field is optional
/// on the wire, and only [`normalize_currency`](Self::normalize_currency)
/// rewrites anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardAnalytics {
    /// Estimated balance range, e.g. `"Rs. 50,000 - Rs. 80,000"`.
    #[serde(rename = "estimatedBalanceLKR")]
    pub estimated_balance_lkr: String,
    /// Estimated spending limit.
    #[serde(rename = "spendingLimitLKR")]
    pub spending_limit_lkr: String,
    /// Risk score, nominally 0 (low) to 100 (high).
    pub risk_score: f64,
    /// Card tier.
    pub card_tier: String,
    /// Trust label, normally `High`, `Medium` or `Low`.
    pub trust_level: String,
    /// Usage category, e.g. "Consumer".
    pub usage_category: String,
    /// Credit rating estimate.
    pub credit_score_equivalent: String,
    /// Free-text remarks.
    pub insights: Vec<String>,
}

impl CardAnalytics {
    /// Prefixes `"Rs. "` to the monetary strings that lack the marker.
    ///
    /// Empty strings and all other fields are left alone.
    pub fn normalize_currency(&mut self) {
        for amount in [&mut self.estimated_balance_lkr, &mut self.spending_limit_lkr] {
            if !amount.is_empty() && !amount.contains(CURRENCY_MARKER) {
                *amount = format!("{} {}", CURRENCY_MARKER, amount);
            }
        }
    }

    /// The trust band, if the label is one of the known bands.
    pub fn trust(&self) -> Option<TrustLevel> {
        TrustLevel::from_label(&self.trust_level)
    }
}

/// An external advisory service.
///
/// Implementations must absorb their own failures (network, quota, bad
/// replies) and return an empty list or `None` instead.
pub trait AdvisoryService: Send + Sync {
    /// Returns insights for the request's IIN.
    fn security_insights(&self, request: &AdvisoryRequest) -> Vec<SecurityInsight>;

    /// Returns an analytics estimate for the request's IIN.
    fn card_analytics(&self, request: &AdvisoryRequest) -> Option<CardAnalytics>;
}

/// Service used when none is configured. Always returns nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl AdvisoryService for Unavailable {
    fn security_insights(&self, _request: &AdvisoryRequest) -> Vec<SecurityInsight> {
        Vec::new()
    }

    fn card_analytics(&self, _request: &AdvisoryRequest) -> Option<CardAnalytics> {
        None
    }
}

/// Decodes an analytics reply and normalizes its currency strings.
///
/// Returns `None` only if the reply is not a JSON object of the expected
/// shape. Missing fields are defaulted.
pub fn parse_analytics(text: &str) -> Option<CardAnalytics> {
    match serde_json::from_str::<CardAnalytics>(text) {
        Ok(mut analytics) => {
            analytics.normalize_currency();
            Some(analytics)
        }
        Err(e) => {
            tracing::warn!(error = %e, "discarding malformed analytics reply");
            None
        }
    }
}

/// Decodes an insights reply. Returns an empty list on malformed input.
pub fn parse_insights(text: &str) -> Vec<SecurityInsight> {
    serde_json::from_str(text).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "discarding malformed insights reply");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANALYTICS: &str = r#"{
        "estimatedBalanceLKR": "120,000 - 180,000",
        "spendingLimitLKR": "Rs. 500,000",
        "riskScore": 35,
        "cardTier": "Visa Gold",
        "trustLevel": "Medium",
        "usageCategory": "Consumer",
        "creditScoreEquivalent": "B2",
        "insights": ["Common in urban retail", "Supports 3DS 2.0"]
    }"#;

    #[test]
    fn test_request_uses_iin_only() {
        let request = AdvisoryRequest::for_card("4056-6312-3456-7890", None, Some("Sri Lanka"));
        assert_eq!(request.iin, "405663");
        assert_eq!(request.bank, None);
        assert_eq!(request.country.as_deref(), Some("Sri Lanka"));

        assert_eq!(AdvisoryRequest::for_card("41 1", None, None).iin, "411");
    }

    #[test]
    fn test_prompts_mention_iin() {
        let request = AdvisoryRequest::for_card("405663", None, None);
        assert!(request.insights_prompt().contains("405663"));
        let prompt = request.analytics_prompt();
        assert!(prompt.contains("405663"));
        assert!(prompt.contains("Unknown Bank Sri Lanka"));
        assert!(!prompt.contains("4056631"));
    }

    #[test]
    fn test_parse_analytics_normalizes_currency() {
        let analytics = parse_analytics(ANALYTICS).unwrap();
        assert_eq!(analytics.estimated_balance_lkr, "Rs. 120,000 - 180,000");
        assert_eq!(analytics.spending_limit_lkr, "Rs. 500,000");
        assert_eq!(analytics.risk_score, 35.0);
        assert_eq!(analytics.trust_level, "Medium");
        assert_eq!(analytics.trust(), Some(TrustLevel::Medium));
        assert_eq!(analytics.insights.len(), 2);
    }

    #[test]
    fn test_normalize_leaves_empty_amounts() {
        let mut analytics = parse_analytics(ANALYTICS).unwrap();
        analytics.estimated_balance_lkr.clear();
        analytics.normalize_currency();
        assert_eq!(analytics.estimated_balance_lkr, "");
        assert_eq!(analytics.spending_limit_lkr, "Rs. 500,000");
    }

    #[test]
    fn test_analytics_json_uses_camel_case() {
        let analytics = parse_analytics(ANALYTICS).unwrap();
        let json = serde_json::to_value(&analytics).unwrap();
        assert!(json.get("estimatedBalanceLKR").is_some());
        assert!(json.get("creditScoreEquivalent").is_some());
        assert_eq!(json["trustLevel"], "Medium");
    }

    #[test]
    fn test_malformed_replies_degrade() {
        assert!(parse_analytics("not json").is_none());
        assert!(parse_analytics("[1, 2]").is_none());
        assert!(parse_analytics(r#"{"riskScore": "high"}"#).is_none());
        assert!(parse_insights("").is_empty());
        assert!(parse_insights(r#"{"title": "x"}"#).is_empty());
    }

    #[test]
    fn test_analytics_passes_through_unusual_values() {
        let analytics = parse_analytics(
            r#"{"estimatedBalanceLKR": "50,000", "riskScore": 42.5, "trustLevel": "high",
                "cardTier": "Gold", "usageCategory": "Consumer", "insights": []}"#,
        )
        .unwrap();

        assert_eq!(analytics.risk_score, 42.5);
        assert_eq!(analytics.trust_level, "high");
        assert_eq!(analytics.trust(), Some(TrustLevel::High));
        // Missing fields default instead of rejecting the reply
        assert_eq!(analytics.credit_score_equivalent, "");
        assert_eq!(analytics.spending_limit_lkr, "");
        assert_eq!(analytics.estimated_balance_lkr, "Rs. 50,000");
    }

    #[test]
    fn test_unknown_trust_label_is_kept() {
        let analytics = parse_analytics(r#"{"trustLevel": "Very High", "riskScore": 101}"#).unwrap();
        assert_eq!(analytics.trust_level, "Very High");
        assert_eq!(analytics.trust(), None);
        assert_eq!(analytics.risk_score, 101.0);
    }

    #[test]
    fn test_parse_insights() {
        let insights = parse_insights(
            r#"[{"title": "EMV", "content": "Chip cards resist cloning.", "type": "security"},
                {"title": "IIN", "content": "Identifies the bank.", "type": "info"}]"#,
        );
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].category(), Some(InsightKind::Security));
        assert_eq!(insights[1].category(), Some(InsightKind::Info));
    }

    #[test]
    fn test_partial_insights_are_kept() {
        let insights = parse_insights(r#"[{"title": "3DS", "type": "Security"}, {"content": "x", "type": "tip"}]"#);
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].content, "");
        assert_eq!(insights[0].category(), Some(InsightKind::Security));
        assert_eq!(insights[1].kind, "tip");
        assert_eq!(insights[1].category(), None);
    }

    #[test]
    fn test_unavailable_service() {
        let request = AdvisoryRequest::for_card("4111111111111111", None, None);
        let service: &dyn AdvisoryService = &Unavailable;
        assert!(service.security_insights(&request).is_empty());
        assert!(service.card_analytics(&request).is_none());
    }
}
