use anyhow::Result;
use radius::{Options, PumaDev};

pub fn execute(cert: bool, force: bool, setup: bool, verbose: bool) -> Result<()> {
    let mut pipeline = PumaDev::new(Options {
        cert,
        force,
        setup,
        verbose,
    })?;
    pipeline.run()
}
