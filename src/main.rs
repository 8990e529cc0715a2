//! Standalone binary entry point for the `futurelint` checker.

use anyhow::Result;

fn main() -> Result<()> {
    let code = futurelint::cli::run_with_args(std::env::args().skip(1).collect())?;
    std::process::exit(code);
}
