use anyhow::{Context, Result};
use clap::Args;
use parallax_core::session::SessionStage;

use super::session::{with_spinner, SessionArgs};

#[derive(Args)]
pub struct PreprocessArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

pub fn run(args: &PreprocessArgs) -> Result<()> {
    let session = args.session.open()?;
    crate::summary::print_session_summary(&session, SessionStage::Preprocessing);

    let out = with_spinner(SessionStage::Preprocessing, || session.preprocess())?
        .context("Preprocessing failed")?;

    crate::summary::print_preprocess_result(&session, &out);
    Ok(())
}
