//! Issuer classification by ordered prefix rules.
//!
//! [`ISSUER_RULES`] is evaluated top to bottom and the first matching rule
//! wins. Several networks share prefix space (65 is claimed by both Discover
//! and RuPay, 622 by Discover and UnionPay), so the order of the table is
//! part of the public contract.
//!
//! # Example
//!
//! ```
//! use cardprobe::detect::classify;
//! use cardprobe::Issuer;
//!
//! assert_eq!(classify(&[4, 5, 3, 9]), Issuer::Visa);
//! assert_eq!(classify(&[6, 5, 0, 0]), Issuer::Discover);
//! assert_eq!(classify(&[6, 0, 7, 0]), Issuer::RuPay);
//! assert_eq!(classify(&[9, 9]), Issuer::Unknown);
//! ```

use crate::format::to_digits;
use crate::Issuer;

/// A single prefix rule: the issuer and the pattern its numbers start with.
#[derive(Debug, Clone, Copy)]
pub struct IssuerRule {
    /// Network this rule identifies.
    pub issuer: Issuer,
    /// Human-readable form of the prefix pattern.
    pub pattern: &'static str,
    matches: fn(&[u8]) -> bool,
}

impl IssuerRule {
    /// Returns true if `digits` starts with this rule's prefix.
    #[inline]
    pub fn matches(&self, digits: &[u8]) -> bool {
        (self.matches)(digits)
    }
}

/// The issuer rules in priority order.
pub static ISSUER_RULES: [IssuerRule; 10] = [
    IssuerRule {
        issuer: Issuer::Visa,
        pattern: "4",
        matches: |d| matches!(d, [4, ..]),
    },
    IssuerRule {
        issuer: Issuer::Mastercard,
        pattern: "51-55 | 2221-2229 | 223-229 | 23-26 | 270-271 | 2720",
        matches: |d| {
            matches!(
                d,
                [5, 1..=5, ..]
                    | [2, 2, 2, 1..=9, ..]
                    | [2, 2, 3..=9, ..]
                    | [2, 3..=6, ..]
                    | [2, 7, 0..=1, ..]
                    | [2, 7, 2, 0, ..]
            )
        },
    },
    IssuerRule {
        issuer: Issuer::Amex,
        pattern: "34 | 37",
        matches: |d| matches!(d, [3, 4 | 7, ..]),
    },
    IssuerRule {
        issuer: Issuer::Discover,
        pattern: "6011 | 65 | 644-649 | 622",
        matches: |d| matches!(d, [6, 0, 1, 1, ..] | [6, 5, ..] | [6, 4, 4..=9, ..] | [6, 2, 2, ..]),
    },
    IssuerRule {
        issuer: Issuer::Jcb,
        pattern: "2131 | 1800 | 35",
        matches: |d| matches!(d, [2, 1, 3, 1, ..] | [1, 8, 0, 0, ..] | [3, 5, ..]),
    },
    IssuerRule {
        issuer: Issuer::Diners,
        pattern: "300-305 | 36 | 38",
        matches: |d| matches!(d, [3, 0, 0..=5, ..] | [3, 6 | 8, ..]),
    },
    IssuerRule {
        issuer: Issuer::Maestro,
        pattern: "5018 | 5020 | 5038 | 6304 | 6759 | 6761 | 6763",
        matches: |d| {
            matches!(
                d,
                [5, 0, 1, 8, ..]
                    | [5, 0, 2, 0, ..]
                    | [5, 0, 3, 8, ..]
                    | [6, 3, 0, 4, ..]
                    | [6, 7, 5, 9, ..]
                    | [6, 7, 6, 1 | 3, ..]
            )
        },
    },
    IssuerRule {
        issuer: Issuer::UnionPay,
        pattern: "62",
        matches: |d| matches!(d, [6, 2, ..]),
    },
    IssuerRule {
        issuer: Issuer::Mir,
        pattern: "2200-2204",
        matches: |d| matches!(d, [2, 2, 0, 0..=4, ..]),
    },
    IssuerRule {
        issuer: Issuer::RuPay,
        pattern: "60 | 65 | 81 | 82 | 508",
        matches: |d| matches!(d, [6, 0 | 5, ..] | [8, 1 | 2, ..] | [5, 0, 8, ..]),
    },
];

/// Classifies a digit sequence by the first matching rule.
///
/// Returns [`Issuer::Unknown`] when no rule matches, including for empty
/// input.
#[inline]
pub fn classify(digits: &[u8]) -> Issuer {
    ISSUER_RULES
        .iter()
        .find(|rule| rule.matches(digits))
        .map_or(Issuer::Unknown, |rule| rule.issuer)
}

/// Classifies a raw card number string, ignoring non-digits.
pub fn classify_str(input: &str) -> Issuer {
    classify(&to_digits(input))
}

/// Returns the rule that classifies `digits`, if any.
pub fn matching_rule(digits: &[u8]) -> Option<&'static IssuerRule> {
    ISSUER_RULES.iter().find(|rule| rule.matches(digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(s: &str) -> Issuer {
        classify_str(s)
    }

    #[test]
    fn test_visa() {
        assert_eq!(issuer("4539148803436467"), Issuer::Visa);
        assert_eq!(issuer("4"), Issuer::Visa);
    }

    #[test]
    fn test_mastercard_ranges() {
        for prefix in ["51", "55", "2221", "2229", "2230", "2299", "2300", "2699", "2700", "2719", "2720"] {
            assert_eq!(issuer(prefix), Issuer::Mastercard, "{prefix}");
        }
        assert_ne!(issuer("2220"), Issuer::Mastercard);
        assert_ne!(issuer("2721"), Issuer::Mastercard);
        assert_ne!(issuer("56"), Issuer::Mastercard);
    }

    #[test]
    fn test_amex() {
        assert_eq!(issuer("34"), Issuer::Amex);
        assert_eq!(issuer("378282246310005"), Issuer::Amex);
    }

    #[test]
    fn test_discover() {
        assert_eq!(issuer("6011111111111117"), Issuer::Discover);
        assert_eq!(issuer("644"), Issuer::Discover);
        assert_eq!(issuer("649"), Issuer::Discover);
        assert_eq!(issuer("643"), Issuer::Unknown);
    }

    #[test]
    fn test_jcb() {
        assert_eq!(issuer("3530111333300000"), Issuer::Jcb);
        assert_eq!(issuer("2131"), Issuer::Jcb);
        assert_eq!(issuer("1800"), Issuer::Jcb);
    }

    #[test]
    fn test_diners() {
        assert_eq!(issuer("30569309025904"), Issuer::Diners);
        assert_eq!(issuer("36"), Issuer::Diners);
        assert_eq!(issuer("38"), Issuer::Diners);
        assert_eq!(issuer("306"), Issuer::Unknown);
    }

    #[test]
    fn test_maestro() {
        for prefix in ["5018", "5020", "5038", "6304", "6759", "6761", "6763"] {
            assert_eq!(issuer(prefix), Issuer::Maestro, "{prefix}");
        }
        assert_eq!(issuer("6762"), Issuer::Unknown);
    }

    #[test]
    fn test_unionpay_and_mir() {
        assert_eq!(issuer("6212"), Issuer::UnionPay);
        assert_eq!(issuer("2200"), Issuer::Mir);
        assert_eq!(issuer("2204"), Issuer::Mir);
        assert_eq!(issuer("2205"), Issuer::Unknown);
    }

    #[test]
    fn test_rupay() {
        assert_eq!(issuer("6070"), Issuer::RuPay);
        assert_eq!(issuer("81"), Issuer::RuPay);
        assert_eq!(issuer("82"), Issuer::RuPay);
        assert_eq!(issuer("508"), Issuer::RuPay);
    }

    #[test]
    fn test_priority_order_resolves_overlaps() {
        // 65 is listed by both Discover and RuPay; Discover comes first
        assert_eq!(issuer("6521"), Issuer::Discover);
        // 622 is Discover before UnionPay's 62
        assert_eq!(issuer("6221"), Issuer::Discover);
        // 6011 is Discover, other 60 falls through to RuPay
        assert_eq!(issuer("6011"), Issuer::Discover);
        assert_eq!(issuer("6012"), Issuer::RuPay);
    }

    #[test]
    fn test_rule_order_is_stable() {
        let order: Vec<Issuer> = ISSUER_RULES.iter().map(|r| r.issuer).collect();
        assert_eq!(
            order,
            vec![
                Issuer::Visa,
                Issuer::Mastercard,
                Issuer::Amex,
                Issuer::Discover,
                Issuer::Jcb,
                Issuer::Diners,
                Issuer::Maestro,
                Issuer::UnionPay,
                Issuer::Mir,
                Issuer::RuPay,
            ]
        );
    }

    #[test]
    fn test_unknown() {
        assert_eq!(issuer(""), Issuer::Unknown);
        assert_eq!(issuer("0000"), Issuer::Unknown);
        assert_eq!(issuer("9999"), Issuer::Unknown);
        assert_eq!(issuer("1"), Issuer::Unknown);
    }

    #[test]
    fn test_matching_rule() {
        let rule = matching_rule(&[3, 7]).unwrap();
        assert_eq!(rule.issuer, Issuer::Amex);
        assert!(matching_rule(&[9]).is_none());
    }
}
