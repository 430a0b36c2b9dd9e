//! siteship — publish a compiled static site to an S3 bucket.
//!
//! # Usage
//!
//! ```text
//! siteship [--content-dir <dir>] [--bucket <name>] [--region <region>]
//!          [--website-endpoint <host>] [--endpoint-url <url>] [--json]
//! ```
//!
//! Every flag defaults to the published site's settings, so a bare
//! `siteship` deploys `compiled/` to `curiousskeptic.com`. Credentials come
//! from `AMAZON_ACCESS_KEY_ID` and `AMAZON_SECRET_ACCESS_KEY`.

mod commands;

use anyhow::Result;
use clap::Parser;

use commands::deploy::DeployArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "siteship",
    version,
    about = "Mirror a local static-site tree into an S3 bucket",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    deploy: DeployArgs,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    cli.deploy.run()
}

/// Diagnostics go to stderr; stdout carries the per-file action lines.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
