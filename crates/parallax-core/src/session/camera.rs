//! Camera model selection from an image and its descriptor file.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ParallaxError, Result};

/// Descriptor file kind, decided by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptorKind {
    Standard,
    /// `.adjust` or `.isis_adjust` files carrying position and orientation
    /// over time.
    Adjusted,
}

impl DescriptorKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext)
                if ext.eq_ignore_ascii_case("adjust") || ext.eq_ignore_ascii_case("isis_adjust") =>
            {
                Self::Adjusted
            }
            _ => Self::Standard,
        }
    }
}

/// A 3-vector function of time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Equation {
    Constant {
        value: [f64; 3],
    },
    /// Per-axis polynomial in `t - t0`, coefficients in ascending order.
    Polynomial {
        t0: f64,
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
    },
}

impl Equation {
    pub fn evaluate(&self, t: f64) -> [f64; 3] {
        match self {
            Self::Constant { value } => *value,
            Self::Polynomial { t0, x, y, z } => {
                let dt = t - t0;
                let horner = |c: &[f64]| c.iter().rev().fold(0.0, |acc, &k| acc * dt + k);
                [horner(x), horner(y), horner(z)]
            }
        }
    }
}

/// Image the camera model is built for.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ParallaxError::InputMissing(path.to_path_buf()));
        }
        let (width, height) = image::image_dimensions(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            width,
            height,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CameraModel {
    Standard {
        image: ImageInfo,
    },
    Adjusted {
        image: ImageInfo,
        position: Equation,
        orientation: Equation,
    },
}

impl CameraModel {
    pub fn kind(&self) -> DescriptorKind {
        match self {
            Self::Standard { .. } => DescriptorKind::Standard,
            Self::Adjusted { .. } => DescriptorKind::Adjusted,
        }
    }

    pub fn image(&self) -> &ImageInfo {
        match self {
            Self::Standard { image } | Self::Adjusted { image, .. } => image,
        }
    }
}

/// Build the camera model for `image`, choosing the variant from the
/// descriptor's kind. Adjusted descriptors must hold two JSON equations
/// back to back: position, then orientation.
pub fn select_camera_model(image: &Path, descriptor: &Path) -> Result<CameraModel> {
    let info = ImageInfo::open(image)?;
    let kind = DescriptorKind::from_path(descriptor);
    debug!(?kind, descriptor = %descriptor.display(), "Selecting camera model");

    match kind {
        DescriptorKind::Standard => Ok(CameraModel::Standard { image: info }),
        DescriptorKind::Adjusted => {
            if !descriptor.exists() {
                return Err(ParallaxError::InputMissing(descriptor.to_path_buf()));
            }
            let reader = BufReader::new(File::open(descriptor)?);
            let mut stream = serde_json::Deserializer::from_reader(reader).into_iter::<Equation>();
            let mut next = |what: &str| -> Result<Equation> {
                match stream.next() {
                    Some(eq) => Ok(eq?),
                    None => Err(ParallaxError::InvalidDescriptor(format!(
                        "{} is missing the {what} equation",
                        descriptor.display()
                    ))),
                }
            };
            let position = next("position")?;
            let orientation = next("orientation")?;
            Ok(CameraModel::Adjusted {
                image: info,
                position,
                orientation,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_kind_is_case_insensitive() {
        assert_eq!(DescriptorKind::from_path(Path::new("a.ADJUST")), DescriptorKind::Adjusted);
        assert_eq!(DescriptorKind::from_path(Path::new("a.adjust")), DescriptorKind::Adjusted);
        assert_eq!(
            DescriptorKind::from_path(Path::new("M123.Isis_Adjust")),
            DescriptorKind::Adjusted
        );
        assert_eq!(DescriptorKind::from_path(Path::new("a.tsai")), DescriptorKind::Standard);
        assert_eq!(DescriptorKind::from_path(Path::new("adjust")), DescriptorKind::Standard);
    }

    #[test]
    fn polynomial_evaluates_relative_to_t0() {
        let eq = Equation::Polynomial {
            t0: 10.0,
            x: vec![1.0, 2.0],
            y: vec![0.0, 0.0, 1.0],
            z: vec![],
        };
        assert_eq!(eq.evaluate(12.0), [5.0, 4.0, 0.0]);
    }
}
