use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use parallax_core::session::SessionStage;

use super::session::{with_spinner, SessionArgs};

#[derive(Args)]
pub struct FilterArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Disparity to filter (defaults to <prefix>-D.disp)
    #[arg(long)]
    pub input: Option<PathBuf>,
}

pub fn run(args: &FilterArgs) -> Result<()> {
    let session = args.session.open()?;
    crate::summary::print_session_summary(&session, SessionStage::Filtering);

    let output = with_spinner(SessionStage::Filtering, || {
        session.filter_files(args.input.as_deref())
    })?
    .context("Filtering failed")?;

    println!("Filtered disparity saved to {}", output.display());
    Ok(())
}
