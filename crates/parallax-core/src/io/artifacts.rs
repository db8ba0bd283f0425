//! Binary codecs for cached interest points (`.vwip`) and correspondences
//! (`.match`).

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{ParallaxError, Result};
use crate::features::{CorrespondenceSet, InterestPoint};
use crate::frame::Point2;

pub const POINTS_MAGIC: &[u8; 4] = b"PXIP";
pub const MATCHES_MAGIC: &[u8; 4] = b"PXMT";

/// Upper bound on a single descriptor, guards against corrupt length fields.
const MAX_DESCRIPTOR_LEN: usize = 4096;

pub fn encode_points(points: &[InterestPoint], w: &mut impl Write) -> Result<()> {
    w.write_all(POINTS_MAGIC)?;
    w.write_u64::<LittleEndian>(points.len() as u64)?;
    for ip in points {
        w.write_f32::<LittleEndian>(ip.x)?;
        w.write_f32::<LittleEndian>(ip.y)?;
        w.write_f32::<LittleEndian>(ip.strength)?;
        w.write_u32::<LittleEndian>(ip.descriptor.len() as u32)?;
        for &v in &ip.descriptor {
            w.write_f32::<LittleEndian>(v)?;
        }
    }
    Ok(())
}

pub fn decode_points(r: &mut impl Read) -> Result<Vec<InterestPoint>> {
    expect_magic(r, POINTS_MAGIC, "interest point")?;
    let count = r.read_u64::<LittleEndian>()? as usize;
    let mut points = Vec::new();
    for _ in 0..count {
        let x = r.read_f32::<LittleEndian>()?;
        let y = r.read_f32::<LittleEndian>()?;
        let strength = r.read_f32::<LittleEndian>()?;
        let len = r.read_u32::<LittleEndian>()? as usize;
        if len > MAX_DESCRIPTOR_LEN {
            return Err(ParallaxError::InvalidArtifact(format!(
                "descriptor length {len} exceeds {MAX_DESCRIPTOR_LEN}"
            )));
        }
        let mut descriptor = vec![0.0f32; len];
        r.read_f32_into::<LittleEndian>(&mut descriptor)?;
        points.push(InterestPoint {
            x,
            y,
            strength,
            descriptor,
        });
    }
    Ok(points)
}

pub fn encode_matches(set: &CorrespondenceSet, w: &mut impl Write) -> Result<()> {
    w.write_all(MATCHES_MAGIC)?;
    w.write_u64::<LittleEndian>(set.len() as u64)?;
    for side in [set.left(), set.right()] {
        for p in side {
            w.write_f64::<LittleEndian>(p.x)?;
            w.write_f64::<LittleEndian>(p.y)?;
        }
    }
    Ok(())
}

pub fn decode_matches(r: &mut impl Read) -> Result<CorrespondenceSet> {
    expect_magic(r, MATCHES_MAGIC, "match")?;
    let count = r.read_u64::<LittleEndian>()? as usize;
    let left = decode_coords(r, count)?;
    let right = decode_coords(r, count)?;
    CorrespondenceSet::new(left, right)
}

fn decode_coords(r: &mut impl Read, count: usize) -> Result<Vec<Point2>> {
    let mut coords = Vec::new();
    for _ in 0..count {
        let x = r.read_f64::<LittleEndian>()?;
        let y = r.read_f64::<LittleEndian>()?;
        coords.push(Point2::new(x, y));
    }
    Ok(coords)
}

fn expect_magic(r: &mut impl Read, magic: &[u8; 4], what: &str) -> Result<()> {
    let mut found = [0u8; 4];
    r.read_exact(&mut found)?;
    if &found != magic {
        return Err(ParallaxError::InvalidArtifact(format!(
            "not a {what} file (bad magic)"
        )));
    }
    Ok(())
}
