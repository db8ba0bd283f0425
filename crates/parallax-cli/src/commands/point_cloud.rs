use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use parallax_core::session::SessionStage;

use super::session::{with_spinner, SessionArgs};

#[derive(Args)]
pub struct PointCloudArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Disparity to restore (defaults to <prefix>-F.disp)
    #[arg(long)]
    pub input: Option<PathBuf>,
}

pub fn run(args: &PointCloudArgs) -> Result<()> {
    let session = args.session.open()?;
    crate::summary::print_session_summary(&session, SessionStage::PointCloud);

    let output = with_spinner(SessionStage::PointCloud, || {
        session.point_cloud_files(args.input.as_deref())
    })?
    .context("Point cloud preparation failed")?;

    println!("Disparity in image coordinates saved to {}", output.display());
    Ok(())
}
