mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::bond::{
    ConvexityAdjustArgs, CouponArgs, CurveArgs, DurationArgs, PriceArgs, ShockArgs, ValueArgs,
};
use commands::credit::RequiredRateArgs;
use commands::market::{DealingsArgs, QuoteArgs};

/// Fixed-income bond pricing simulator
#[derive(Parser)]
#[command(
    name = "bondsim",
    version,
    about = "Fixed-income bond pricing simulator",
    long_about = "Simulate the price of a level-coupon bond with decimal precision. \
                  Adjust face value, coupon rate, required yield, maturity and credit \
                  rating to see price, Macaulay duration, convexity and the \
                  price-vs-yield curve."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Emit debug diagnostics on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Coupon paid each period (face value x coupon rate)
    Coupon(CouponArgs),
    /// Closed-form bond price at the required rate
    Price(PriceArgs),
    /// Macaulay duration, modified duration and convexity
    Duration(DurationArgs),
    /// Price-vs-yield curve across a range of yields
    Curve(CurveArgs),
    /// Second-order price estimate from given duration and convexity
    ConvexityAdjust(ConvexityAdjustArgs),
    /// Estimate the price after a yield shock and compare with a full reprice
    Shock(ShockArgs),
    /// Full valuation: price, duration, convexity and curve
    Value(ValueArgs),
    /// Required rate from a reference rate and a rating-bounded credit spread
    RequiredRate(RequiredRateArgs),
    /// Latest end-of-day quote for a benchmark sovereign bond
    Quote(QuoteArgs),
    /// Summarise a directors dealings disclosure file
    Dealings(DealingsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Coupon(args) => commands::bond::run_coupon(args),
        Commands::Price(args) => commands::bond::run_price(args),
        Commands::Duration(args) => commands::bond::run_duration(args),
        Commands::Curve(args) => commands::bond::run_curve(args),
        Commands::ConvexityAdjust(args) => commands::bond::run_convexity_adjust(args),
        Commands::Shock(args) => commands::bond::run_shock(args),
        Commands::Value(args) => commands::bond::run_value(args),
        Commands::RequiredRate(args) => commands::credit::run_required_rate(args),
        Commands::Quote(args) => commands::market::run_quote(args),
        Commands::Dealings(args) => commands::market::run_dealings(args),
        Commands::Version => {
            println!("bondsim {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
