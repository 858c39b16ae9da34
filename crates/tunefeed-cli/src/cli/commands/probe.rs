//! `tunefeed probe <locator>` – show the detected media format.

use anyhow::Result;
use tunefeed_core::locator::Locator;

pub fn run_probe(locator: &str) -> Result<()> {
    let locator = Locator::new(locator);
    let format = locator.format();
    tracing::debug!(locator = %locator, %format, "probe");
    println!("{}\t{}", format, locator);
    Ok(())
}
