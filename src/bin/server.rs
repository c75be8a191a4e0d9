//! REST API server for card validation and test-card generation.
//!
//! # Usage
//!
//! ```bash
//! # Start server
//! cardprobe-server
//!
//! # With custom port and BIN table
//! cardprobe-server --port 8080 --bins bins.json
//! CARDPROBE_PORT=8080 cardprobe-server
//! ```
//!
//! # Swagger UI
//!
//! Visit http://localhost:3000/swagger-ui/ for interactive API documentation.

use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use cardprobe::bindb::{BinDbError, BinRegistry, CsvBinLoader, JsonBinLoader};
use cardprobe::bulk::{BulkParser, BulkRow, BulkSummary};
use cardprobe::generate::{self, GenerateOptions, GeneratedCard};
use cardprobe::{detect, format, CardValidator, Issuer, ValidationVerdict};

// ============================================================================
// OpenAPI Documentation
// ============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "cardprobe API",
        version = "0.1.0",
        description = "Payment card identification, validation and synthetic test-card generation. The BIN table is illustrative only. No auth or rate limiting.",
        license(name = "MIT"),
        contact(name = "API Support")
    ),
    tags(
        (name = "Validation", description = "Card validation endpoints"),
        (name = "Detection", description = "Issuer and BIN detection from partial numbers"),
        (name = "Formatting", description = "Card number formatting utilities"),
        (name = "Generation", description = "Synthetic test card generation"),
        (name = "Registry", description = "BIN table contents"),
        (name = "System", description = "Health and status endpoints")
    ),
    paths(
        validate_handler,
        validate_bulk,
        detect_handler,
        format_card,
        generate_cards,
        generate_from_bin,
        list_countries,
        health,
    ),
    components(schemas(
        ValidateRequest,
        VerdictResponse,
        BulkRequest,
        BulkResponse,
        BulkRowResponse,
        SummaryResponse,
        DetectQuery,
        DetectResponse,
        FormatRequest,
        FormatResponse,
        GenerateRequest,
        GenerateBinRequest,
        GenerateResponse,
        CardResponse,
        CountryResponse,
        BinResponse,
        HealthResponse,
    ))
)]
struct ApiDoc;

// ============================================================================
// State
// ============================================================================

struct AppState {
    registry: BinRegistry,
}

type SharedState = Arc<AppState>;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize, ToSchema)]
#[schema(example = json!({"card_number": "4111 1111 1111 1111", "expiry": "12/30", "cvv": "123"}))]
struct ValidateRequest {
    /// Card number. Every non-digit character is ignored.
    card_number: String,
    /// Expiry as MM/YY. Omitted or empty means not provided.
    #[serde(default)]
    expiry: String,
    /// CVV, 3-4 digits. Omitted or empty means not provided.
    #[serde(default)]
    cvv: String,
}

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "is_valid": false,
    "issuer": "visa",
    "luhn_valid": true,
    "country": "Unknown",
    "errors": {"expiry": "Card is expired"}
}))]
struct VerdictResponse {
    /// True when no field has an error
    is_valid: bool,
    /// Issuer network id: visa, mastercard, amex, discover, jcb, diners, maestro, unionpay, mir, rupay or unknown
    issuer: String,
    /// Luhn checksum result (numbers under 13 digits never pass)
    luhn_valid: bool,
    /// Issuing country from the BIN table, or "Unknown"
    country: String,
    /// Issuing bank from the BIN table
    #[serde(skip_serializing_if = "Option::is_none")]
    bank: Option<String>,
    /// Card tier from the BIN table
    #[serde(skip_serializing_if = "Option::is_none")]
    tier: Option<String>,
    /// Reason per failing field (number, expiry, cvv)
    errors: BTreeMap<String, String>,
}

impl From<ValidationVerdict> for VerdictResponse {
    fn from(verdict: ValidationVerdict) -> Self {
        Self {
            is_valid: verdict.is_valid,
            issuer: verdict.issuer.id().to_string(),
            luhn_valid: verdict.luhn_valid,
            country: verdict.country,
            bank: verdict.bank,
            tier: verdict.tier,
            errors: verdict
                .errors
                .iter()
                .map(|(field, error)| (field.to_string(), error.to_string()))
                .collect(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[schema(example = json!({"text": "visa,JANE DOE,\"4111 1111 1111 1111\",123,12/30\nbroken,row"}))]
struct BulkRequest {
    /// Records, one per line: issuer,holder,"number",cvv,expiry
    text: String,
}

#[derive(Serialize, ToSchema)]
struct BulkRowResponse {
    /// The input line
    raw: String,
    /// Holder from the record, "Invalid Row" for short lines
    holder: String,
    /// Number from the record, "N/A" for short lines
    number: String,
    /// Validation result
    #[serde(flatten)]
    verdict: VerdictResponse,
}

impl From<BulkRow> for BulkRowResponse {
    fn from(row: BulkRow) -> Self {
        Self {
            raw: row.raw,
            holder: row.holder,
            number: row.number,
            verdict: row.verdict.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
struct SummaryResponse {
    /// Rows processed
    total: usize,
    /// Valid rows
    valid: usize,
    /// Invalid rows
    invalid: usize,
}

impl From<BulkSummary> for SummaryResponse {
    fn from(summary: BulkSummary) -> Self {
        Self {
            total: summary.total,
            valid: summary.valid,
            invalid: summary.invalid,
        }
    }
}

#[derive(Serialize, ToSchema)]
struct BulkResponse {
    /// One entry per non-blank input line, in order
    rows: Vec<BulkRowResponse>,
    /// Summary statistics
    summary: SummaryResponse,
}

#[derive(Deserialize, ToSchema, IntoParams)]
struct DetectQuery {
    /// Card number or prefix to detect
    card: String,
}

#[derive(Serialize, ToSchema)]
struct DetectResponse {
    /// Issuer network id
    issuer: String,
    /// Prefix rule that matched
    #[serde(skip_serializing_if = "Option::is_none")]
    rule: Option<String>,
    /// Issuing country, or "Unknown"
    country: String,
    /// Issuing bank
    #[serde(skip_serializing_if = "Option::is_none")]
    bank: Option<String>,
    /// Card tier
    #[serde(skip_serializing_if = "Option::is_none")]
    tier: Option<String>,
}

#[derive(Deserialize, ToSchema)]
struct FormatRequest {
    /// Card number to format
    card_number: String,
    /// Separator between groups of four (default: space)
    #[serde(default = "default_separator")]
    separator: String,
}

fn default_separator() -> String {
    " ".to_string()
}

#[derive(Serialize, ToSchema)]
struct FormatResponse {
    /// Formatted card number
    formatted: String,
    /// Card number with formatting stripped
    stripped: String,
}

#[derive(Deserialize, ToSchema)]
#[schema(example = json!({"issuer": "visa", "count": 3}))]
struct GenerateRequest {
    /// Issuer network id to draw prefixes from
    #[serde(default)]
    issuer: Option<String>,
    /// Country code whose BIN entries to draw from (takes precedence over issuer)
    #[serde(default, alias = "countryCode")]
    country_code: Option<String>,
    /// Number of test cards to generate (1-1000, default: 1)
    #[serde(default = "default_count")]
    count: usize,
}

#[derive(Deserialize, ToSchema)]
#[schema(example = json!({"bin": "405663", "count": 5, "expiry": "12/30"}))]
struct GenerateBinRequest {
    /// Leading digits of every generated number
    bin: String,
    /// Number of test cards to generate (1-1000, default: 1)
    #[serde(default = "default_count")]
    count: usize,
    /// Expiry for every card (random future month when absent)
    #[serde(default)]
    expiry: Option<String>,
}

fn default_count() -> usize {
    1
}

#[derive(Serialize, ToSchema)]
struct CardResponse {
    /// Number grouped in blocks of four
    number: String,
    /// Expiry as MM/YY
    expiry: String,
    /// Card verification value
    cvv: String,
    /// Placeholder holder name
    holder: String,
    /// Issuer network id
    issuer: String,
    /// Country from the BIN table, or "Unknown"
    country: String,
    /// Bank from the BIN table
    #[serde(skip_serializing_if = "Option::is_none")]
    bank: Option<String>,
    /// Tier from the BIN table
    #[serde(skip_serializing_if = "Option::is_none")]
    tier: Option<String>,
}

impl From<&GeneratedCard> for CardResponse {
    fn from(card: &GeneratedCard) -> Self {
        Self {
            number: card.number().to_string(),
            expiry: card.expiry().to_string(),
            cvv: card.cvv().to_string(),
            holder: card.holder().to_string(),
            issuer: card.issuer().id().to_string(),
            country: card.country().to_string(),
            bank: card.bank().map(str::to_string),
            tier: card.tier().map(str::to_string),
        }
    }
}

#[derive(Serialize, ToSchema)]
struct GenerateResponse {
    /// Generated cards
    cards: Vec<CardResponse>,
}

#[derive(Serialize, ToSchema)]
struct BinResponse {
    /// Leading digits
    prefix: String,
    /// Issuing bank
    #[serde(skip_serializing_if = "Option::is_none")]
    bank: Option<String>,
    /// Card tier
    #[serde(skip_serializing_if = "Option::is_none")]
    tier: Option<String>,
}

#[derive(Serialize, ToSchema)]
struct CountryResponse {
    /// Country name
    country: String,
    /// Country code
    code: String,
    /// BIN entries in authoring order
    bins: Vec<BinResponse>,
}

#[derive(Serialize, ToSchema)]
struct HealthResponse {
    /// Service status
    status: String,
    /// API version
    version: String,
    /// Entries in the loaded BIN table
    bin_entries: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// Validate a card number with optional expiry and CVV
#[utoipa::path(
    post,
    path = "/validate",
    request_body = ValidateRequest,
    responses(
        (status = 200, description = "Validation verdict", body = VerdictResponse)
    ),
    tag = "Validation"
)]
async fn validate_handler(
    State(state): State<SharedState>,
    Json(req): Json<ValidateRequest>,
) -> Json<VerdictResponse> {
    let verdict = CardValidator::new(&state.registry).validate(&req.card_number, &req.expiry, &req.cvv);
    Json(verdict.into())
}

/// Validate bulk card records
#[utoipa::path(
    post,
    path = "/validate/bulk",
    request_body = BulkRequest,
    responses(
        (status = 200, description = "Per-row verdicts and summary", body = BulkResponse)
    ),
    tag = "Validation"
)]
async fn validate_bulk(
    State(state): State<SharedState>,
    Json(req): Json<BulkRequest>,
) -> Json<BulkResponse> {
    let rows = BulkParser::new(&state.registry).parse(&req.text);
    let summary = BulkSummary::from_rows(&rows);

    Json(BulkResponse {
        rows: rows.into_iter().map(BulkRowResponse::from).collect(),
        summary: summary.into(),
    })
}

/// Detect issuer and BIN labels from a number
#[utoipa::path(
    get,
    path = "/detect",
    params(DetectQuery),
    responses(
        (status = 200, description = "Detection result", body = DetectResponse)
    ),
    tag = "Detection"
)]
async fn detect_handler(
    State(state): State<SharedState>,
    Query(query): Query<DetectQuery>,
) -> Json<DetectResponse> {
    let digits = format::to_digits(&query.card);
    let found = state.registry.resolve(&digits);

    Json(DetectResponse {
        issuer: detect::classify(&digits).id().to_string(),
        rule: detect::matching_rule(&digits).map(|rule| rule.pattern.to_string()),
        country: found.country,
        bank: found.bank,
        tier: found.tier,
    })
}

/// Format a card number
#[utoipa::path(
    post,
    path = "/format",
    request_body = FormatRequest,
    responses(
        (status = 200, description = "Formatted card", body = FormatResponse)
    ),
    tag = "Formatting"
)]
async fn format_card(Json(req): Json<FormatRequest>) -> Json<FormatResponse> {
    Json(FormatResponse {
        formatted: format::format_with_separator(&req.card_number, &req.separator),
        stripped: format::strip_formatting(&req.card_number),
    })
}

/// Generate random test cards
#[utoipa::path(
    post,
    path = "/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated cards", body = GenerateResponse),
        (status = 400, description = "Unknown issuer")
    ),
    tag = "Generation"
)]
async fn generate_cards(
    State(state): State<SharedState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, String)> {
    let issuer = req
        .issuer
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<Issuer>)
        .transpose()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let options = GenerateOptions {
        issuer,
        country_code: req.country_code,
    };
    let cards = generate::generate_batch(&state.registry, &options, req.count);

    Ok(Json(GenerateResponse {
        cards: cards.iter().map(CardResponse::from).collect(),
    }))
}

/// Generate test cards from a fixed BIN
#[utoipa::path(
    post,
    path = "/generate/bin",
    request_body = GenerateBinRequest,
    responses(
        (status = 200, description = "Generated cards", body = GenerateResponse),
        (status = 400, description = "BIN has no digits")
    ),
    tag = "Generation"
)]
async fn generate_from_bin(
    State(state): State<SharedState>,
    Json(req): Json<GenerateBinRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, String)> {
    if format::strip_formatting(&req.bin).is_empty() {
        return Err((StatusCode::BAD_REQUEST, "BIN must contain digits".to_string()));
    }

    let cards = generate::generate_from_bin(&state.registry, &req.bin, req.count, req.expiry.as_deref());

    Ok(Json(GenerateResponse {
        cards: cards.iter().map(CardResponse::from).collect(),
    }))
}

/// List the BIN table by country
#[utoipa::path(
    get,
    path = "/countries",
    responses(
        (status = 200, description = "Country tables", body = [CountryResponse])
    ),
    tag = "Registry"
)]
async fn list_countries(State(state): State<SharedState>) -> Json<Vec<CountryResponse>> {
    let countries = state
        .registry
        .countries()
        .iter()
        .map(|table| CountryResponse {
            country: table.country.clone(),
            code: table.code.clone(),
            bins: table
                .bins
                .iter()
                .map(|entry| BinResponse {
                    prefix: entry.prefix.clone(),
                    bank: entry.bank.clone(),
                    tier: entry.tier.clone(),
                })
                .collect(),
        })
        .collect();

    Json(countries)
}

/// Health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "System"
)]
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        bin_entries: state.registry.len(),
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn arg_value(name: &str) -> Option<String> {
    std::env::args().skip_while(|a| a != name).nth(1)
}

fn load_registry(path: &Path) -> Result<BinRegistry, BinDbError> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        CsvBinLoader::from_file(path)
    } else {
        JsonBinLoader::from_file(path)
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse args, falling back to the environment
    let port: u16 = arg_value("--port")
        .or_else(|| std::env::var("CARDPROBE_PORT").ok())
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let registry = match arg_value("--bins") {
        Some(path) => {
            let registry = load_registry(Path::new(&path))?;
            tracing::info!(path = %path, entries = registry.len(), "loaded BIN table");
            registry
        }
        None => BinRegistry::builtin().clone(),
    };
    let state: SharedState = Arc::new(AppState { registry });

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any);

    // Build router with Swagger UI
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/validate", post(validate_handler))
        .route("/validate/bulk", post(validate_bulk))
        .route("/detect", get(detect_handler))
        .route("/format", post(format_card))
        .route("/generate", post(generate_cards))
        .route("/generate/bin", post(generate_from_bin))
        .route("/countries", get(list_countries))
        .route("/health", get(health))
        .with_state(state)
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}:{}/swagger-ui/", "localhost", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
