use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    time::Duration,
};

use structopt::StructOpt;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use suds_report::{self as report, Format};
use suds_wsdl as wsdl;

mod loader;

#[derive(Debug, Error)]
enum Error {
    #[error("Error loading WSDL")]
    FetchError(#[from] loader::FetchError),

    #[error("Error parsing WSDL")]
    ParseError(#[from] wsdl::error::Error),

    #[error("Error writing report")]
    IoError(#[from] io::Error),
}

/// Summarises a WSDL service description as a text or HTML report.
#[derive(Debug, StructOpt)]
struct Args {
    /// Report format: text or html
    #[structopt(short, long, default_value = "text")]
    format: Format,

    /// Write the report here instead of standard output
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Attempts made for a network fetch before giving up
    #[structopt(long, default_value = "3")]
    retries: u32,

    /// Network timeout in seconds
    #[structopt(long, default_value = "30")]
    timeout: u64,

    /// Path or http(s) URL of the WSDL document
    input: String,
}

#[paw::main]
fn main(args: Args) -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let source =
        loader::Loader::new(args.retries, Duration::from_secs(args.timeout)).load(&args.input)?;
    let definitions = wsdl::parse(source)?;
    let report = report::render(&definitions, args.format);

    match &args.output {
        Some(path) => {
            fs::write(path, report)?;
            tracing::info!("Wrote {} report to {}", args.format, path.display());
        }

        None => io::stdout().write_all(report.as_bytes())?,
    }

    Ok(())
}
