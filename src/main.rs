//! Checkout
//!
//! Prices a basket from a fixture set and prints the receipt.
//!
//! Use `-f` to load a fixture set by name
//! Use `-n` to limit the number of basket items
//! Use `-s` to scan a comma separated list of product codes instead of the basket

use std::{
    io::{self, Write},
    path::PathBuf,
    time::Instant,
};

use anyhow::Result;
use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use checkout::fixtures::Fixture;

/// Checkout arguments
#[derive(Debug, Parser)]
#[command(name = "checkout", about = "Price a basket against its offers", long_about = None)]
struct Args {
    /// Fixture set to use for the offers, products & basket
    #[arg(short, long, default_value = "shop")]
    fixture: String,

    /// Directory holding the fixture sets
    #[arg(long, env = "CHECKOUT_FIXTURES", default_value = "./fixtures")]
    fixtures: PathBuf,

    /// Number of basket items to scan
    #[arg(short)]
    n: Option<usize>,

    /// Product codes to scan instead of the basket fixture
    #[arg(short, long, value_delimiter = ',', conflicts_with = "n")]
    scan: Option<Vec<String>>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CHECKOUT_LOG", default_value = "warn")]
    log_level: String,
}

/// Checkout entry point
fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let mut fixture = Fixture::with_base_path(&args.fixtures);

    fixture
        .load_offers(&args.fixture)?
        .load_products(&args.fixture)?;

    let start = Instant::now();

    let checkout = if let Some(codes) = &args.scan {
        fixture.checkout_for(codes)?
    } else {
        fixture.load_basket(&args.fixture)?;
        fixture.checkout(args.n)?
    };

    let receipt = checkout.receipt()?;

    let elapsed = start.elapsed();

    info!(fixture = %args.fixture, items = checkout.len(), "priced basket");

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    receipt.write_to(&mut handle)?;

    writeln!(
        handle,
        " {} ({}s)",
        elapsed.human(Truncate::Nano),
        elapsed.as_secs_f32()
    )?;

    Ok(())
}
