//! CLI tool for card identification, validation and test-card generation.
//!
//! # Usage
//!
//! ```bash
//! # Validate a card number, optionally with expiry and CVV
//! cardprobe validate 4111111111111111 --expiry 12/30 --cvv 123
//!
//! # Generate test cards
//! cardprobe generate --issuer amex --count 5
//! cardprobe generate --country LK --count 10 --csv
//!
//! # Generate from a fixed BIN
//! cardprobe from-bin 405663 --count 3 --expiry 12/30
//!
//! # Validate a file of records (stdin when no file is given)
//! cardprobe bulk cards.csv --output json
//!
//! # Use a custom BIN table
//! cardprobe --bins bins.json validate 4111111111111111
//! ```
//!
//! Exit status is 0 when the input is valid, 1 when it is not and 2 on usage
//! or I/O errors.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cardprobe::bindb::{BinDbError, BinRegistry, CsvBinLoader, JsonBinLoader};
use cardprobe::bulk::{BulkParser, BulkRow, BulkSummary};
use cardprobe::generate::{self, GenerateOptions, GeneratedCard};
use cardprobe::{detect, format, luhn, CardValidator, Issuer, ValidationVerdict};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cardprobe")]
#[command(
    author,
    version,
    about = "Payment card identification, validation and test-card generation"
)]
struct Cli {
    /// BIN table to use instead of the built-in one (.json or .csv)
    #[arg(long, global = true, env = "CARDPROBE_BINS")]
    bins: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a card number with optional expiry and CVV
    Validate {
        /// Card number to validate (separators allowed)
        card_number: String,

        /// Expiry date as MM/YY
        #[arg(short, long, default_value = "")]
        expiry: String,

        /// Card verification value
        #[arg(short, long, default_value = "")]
        cvv: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Generate random test cards (for testing only)
    Generate {
        /// Issuer network to draw prefixes from
        #[arg(short, long)]
        issuer: Option<IssuerArg>,

        /// Country code whose BIN entries to draw from
        #[arg(long)]
        country: Option<String>,

        /// Number of cards to generate (1-1000)
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Print numbers grouped in blocks of four
        #[arg(short, long)]
        formatted: bool,

        /// Print bulk records instead of a table
        #[arg(long)]
        csv: bool,
    },

    /// Generate test cards from a fixed BIN
    FromBin {
        /// Leading digits of every generated number
        bin: String,

        /// Number of cards to generate (1-1000)
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Expiry to use for every card (random when absent)
        #[arg(short, long)]
        expiry: Option<String>,

        /// Print bulk records instead of a table
        #[arg(long)]
        csv: bool,
    },

    /// Validate bulk records: issuer,holder,"number",cvv,expiry
    Bulk {
        /// Input file (stdin when absent)
        file: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Check if a card passes the Luhn algorithm
    Luhn {
        /// Card number to check
        card_number: String,
    },

    /// Detect the issuer network and BIN labels of a number
    Detect {
        /// Card number (or partial number)
        card_number: String,
    },

    /// Format a card number in groups of four
    Format {
        /// Card number to format
        card_number: String,

        /// Separator to use
        #[arg(short, long, default_value = " ")]
        separator: String,
    },

    /// List the countries in the BIN table
    Countries {
        /// Show the entries of one country
        code: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum IssuerArg {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Jcb,
    Diners,
    Maestro,
    Unionpay,
    Mir,
    Rupay,
}

impl From<IssuerArg> for Issuer {
    fn from(arg: IssuerArg) -> Self {
        match arg {
            IssuerArg::Visa => Issuer::Visa,
            IssuerArg::Mastercard => Issuer::Mastercard,
            IssuerArg::Amex => Issuer::Amex,
            IssuerArg::Discover => Issuer::Discover,
            IssuerArg::Jcb => Issuer::Jcb,
            IssuerArg::Diners => Issuer::Diners,
            IssuerArg::Maestro => Issuer::Maestro,
            IssuerArg::Unionpay => Issuer::UnionPay,
            IssuerArg::Mir => Issuer::Mir,
            IssuerArg::Rupay => Issuer::RuPay,
        }
    }
}

const EXIT_INVALID: u8 = 1;
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let loaded;
    let registry = match cli.bins.as_deref() {
        Some(path) => match load_registry(path) {
            Ok(registry) => {
                loaded = registry;
                &loaded
            }
            Err(e) => {
                eprintln!("Error: failed to load {}: {}", path.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        },
        None => BinRegistry::builtin(),
    };

    match cli.command {
        Commands::Validate {
            card_number,
            expiry,
            cvv,
            output,
        } => cmd_validate(registry, &card_number, &expiry, &cvv, output),
        Commands::Generate {
            issuer,
            country,
            count,
            formatted,
            csv,
        } => {
            let options = GenerateOptions {
                issuer: issuer.map(Issuer::from),
                country_code: country,
            };
            let cards = generate::generate_batch(registry, &options, count);
            print_cards(&cards, formatted, csv);
            ExitCode::SUCCESS
        }
        Commands::FromBin {
            bin,
            count,
            expiry,
            csv,
        } => {
            if format::strip_formatting(&bin).is_empty() {
                eprintln!("Error: BIN must contain digits");
                return ExitCode::from(EXIT_ERROR);
            }
            let cards = generate::generate_from_bin(registry, &bin, count, expiry.as_deref());
            print_cards(&cards, true, csv);
            ExitCode::SUCCESS
        }
        Commands::Bulk { file, output } => cmd_bulk(registry, file.as_deref(), output),
        Commands::Luhn { card_number } => cmd_luhn(&card_number),
        Commands::Detect { card_number } => cmd_detect(registry, &card_number),
        Commands::Format {
            card_number,
            separator,
        } => {
            println!("{}", format::format_with_separator(&card_number, &separator));
            ExitCode::SUCCESS
        }
        Commands::Countries { code } => cmd_countries(registry, code.as_deref()),
    }
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

fn cmd_validate(
    registry: &BinRegistry,
    card_number: &str,
    expiry: &str,
    cvv: &str,
    output: OutputFormat,
) -> ExitCode {
    let verdict = CardValidator::new(registry).validate(card_number, expiry, cvv);

    match output {
        OutputFormat::Text => print_verdict(&verdict),
        OutputFormat::Json => {
            if let Err(code) = print_json(&verdict) {
                return code;
            }
        }
    }

    if verdict.is_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_INVALID)
    }
}

fn print_verdict(verdict: &ValidationVerdict) {
    println!("Valid: {}", if verdict.is_valid { "yes" } else { "no" });
    println!("Issuer: {}", verdict.issuer.name());
    println!("Luhn: {}", if verdict.luhn_valid { "pass" } else { "fail" });
    println!("Country: {}", verdict.country);
    if let Some(bank) = &verdict.bank {
        println!("Bank: {}", bank);
    }
    if let Some(tier) = &verdict.tier {
        println!("Tier: {}", tier);
    }
    for (field, error) in &verdict.errors {
        println!("Error ({}): {}", field, error);
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), ExitCode> {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(ExitCode::from(EXIT_ERROR))
        }
    }
}

fn print_cards(cards: &[GeneratedCard], formatted: bool, csv: bool) {
    for card in cards {
        if csv {
            println!("{}", card.to_bulk_line(card.issuer()));
            continue;
        }

        let number = if formatted {
            card.number().to_string()
        } else {
            format::strip_formatting(card.number())
        };
        let labels: Vec<&str> = [Some(card.country()), card.bank(), card.tier()]
            .into_iter()
            .flatten()
            .collect();

        println!(
            "{:<23} {}  {:<4} {:<20} {}",
            number,
            card.expiry(),
            card.cvv(),
            card.holder(),
            labels.join(" / ")
        );
    }
}

fn cmd_bulk(registry: &BinRegistry, file: Option<&Path>, output: OutputFormat) -> ExitCode {
    let text = match read_input(file) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let rows = BulkParser::new(registry).parse(&text);
    let summary = BulkSummary::from_rows(&rows);

    match output {
        OutputFormat::Text => print_rows(&rows, &summary),
        OutputFormat::Json => {
            let report = serde_json::json!({ "summary": summary, "rows": rows });
            if let Err(code) = print_json(&report) {
                return code;
            }
        }
    }

    if summary.invalid == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_INVALID)
    }
}

fn read_input(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn print_rows(rows: &[BulkRow], summary: &BulkSummary) {
    for (i, row) in rows.iter().enumerate() {
        let status = if row.verdict.is_valid { "VALID" } else { "INVALID" };
        let reasons: Vec<String> = row.verdict.errors.values().map(ToString::to_string).collect();
        println!(
            "{:>4}  {:<7} {:<11} {:<20} {:<23} {}",
            i + 1,
            status,
            row.verdict.issuer.id(),
            row.holder,
            row.number,
            reasons.join("; ")
        );
    }
    println!(
        "Total: {}  Valid: {}  Invalid: {}  ({:.1}% valid)",
        summary.total,
        summary.valid,
        summary.invalid,
        summary.valid_percent()
    );
}

fn cmd_luhn(card_number: &str) -> ExitCode {
    if luhn::passes_luhn(card_number) {
        println!("Luhn check: PASS");
        ExitCode::SUCCESS
    } else {
        println!("Luhn check: FAIL");
        ExitCode::from(EXIT_INVALID)
    }
}

fn cmd_detect(registry: &BinRegistry, card_number: &str) -> ExitCode {
    let digits = format::to_digits(card_number);
    if digits.is_empty() {
        eprintln!("Error: No digits provided");
        return ExitCode::from(EXIT_ERROR);
    }

    let issuer = detect::classify(&digits);
    let found = registry.resolve(&digits);

    println!("Detected Issuer: {}", issuer.name());
    if let Some(rule) = detect::matching_rule(&digits) {
        println!("Rule: {}", rule.pattern);
    }
    println!("Country: {}", found.country);
    if let Some(bank) = &found.bank {
        println!("Bank: {}", bank);
    }
    if let Some(tier) = &found.tier {
        println!("Tier: {}", tier);
    }
    ExitCode::SUCCESS
}

fn cmd_countries(registry: &BinRegistry, code: Option<&str>) -> ExitCode {
    match code {
        Some(code) => match registry.country(code) {
            Some(table) => {
                println!("{} ({})", table.country, table.code);
                for entry in &table.bins {
                    println!(
                        "  {:<8} {:<20} {}",
                        entry.prefix,
                        entry.bank.as_deref().unwrap_or("-"),
                        entry.tier.as_deref().unwrap_or("-")
                    );
                }
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("Error: unknown country code {}", code);
                ExitCode::from(EXIT_INVALID)
            }
        },
        None => {
            for table in registry.countries() {
                println!("{}  {:<20} {} BINs", table.code, table.country, table.bins.len());
            }
            ExitCode::SUCCESS
        }
    }
}
