use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use parallax_core::session::{select_camera_model, CameraModel};

#[derive(Args)]
pub struct CameraArgs {
    /// Image file
    pub image: PathBuf,

    /// Camera descriptor; a .adjust or .isis_adjust extension selects the
    /// adjusted model
    pub descriptor: PathBuf,

    /// Time at which to evaluate an adjusted camera's equations
    #[arg(long, default_value = "0.0")]
    pub time: f64,
}

pub fn run(args: &CameraArgs) -> Result<()> {
    let model = select_camera_model(&args.image, &args.descriptor).with_context(|| {
        format!(
            "Failed to build camera for {} from {}",
            args.image.display(),
            args.descriptor.display()
        )
    })?;

    let image = model.image();
    println!("Image:        {}", image.path.display());
    println!("Dimensions:   {}x{}", image.width, image.height);
    println!("Model:        {:?}", model.kind());

    if let CameraModel::Adjusted {
        position,
        orientation,
        ..
    } = &model
    {
        println!("Position:     {:?} at t={}", position.evaluate(args.time), args.time);
        println!("Orientation:  {:?} at t={}", orientation.evaluate(args.time), args.time);
    }

    Ok(())
}
