//! Binary disparity field files.
//!
//! Layout (little-endian): 8-byte magic, width u32, height u32, then per cell
//! in row-major order `valid u8, dx f32, dy f32`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::disparity::{DisparityCell, DisparityField};
use crate::error::{ParallaxError, Result};

pub const DISPARITY_MAGIC: &[u8; 8] = b"PXDISP01";

pub fn write_disparity(field: &DisparityField, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    encode_disparity(field, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_disparity(path: &Path) -> Result<DisparityField> {
    if !path.is_file() {
        return Err(ParallaxError::InputMissing(path.to_path_buf()));
    }
    let mut reader = BufReader::new(File::open(path)?);
    decode_disparity(&mut reader)
}

pub fn encode_disparity(field: &DisparityField, w: &mut impl Write) -> Result<()> {
    w.write_all(DISPARITY_MAGIC)?;
    w.write_u32::<LittleEndian>(field.width() as u32)?;
    w.write_u32::<LittleEndian>(field.height() as u32)?;
    for cell in field.cells.iter() {
        w.write_u8(cell.valid as u8)?;
        w.write_f32::<LittleEndian>(cell.dx)?;
        w.write_f32::<LittleEndian>(cell.dy)?;
    }
    Ok(())
}

pub fn decode_disparity(r: &mut impl Read) -> Result<DisparityField> {
    let mut magic = [0u8; 8];
    r.read_exact(&mut magic)?;
    if &magic != DISPARITY_MAGIC {
        return Err(ParallaxError::InvalidArtifact(
            "not a disparity file (bad magic)".into(),
        ));
    }
    let width = r.read_u32::<LittleEndian>()? as usize;
    let height = r.read_u32::<LittleEndian>()? as usize;

    let mut field = DisparityField::new(width, height);
    for row in 0..height {
        for col in 0..width {
            let valid = r.read_u8()? != 0;
            let dx = r.read_f32::<LittleEndian>()?;
            let dy = r.read_f32::<LittleEndian>()?;
            field.set(col, row, DisparityCell { dx, dy, valid });
        }
    }
    Ok(field)
}
