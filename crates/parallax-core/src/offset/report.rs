//! Row offset log: a `#` header describing both inputs and the strip, one
//! `row, mean_dx, mean_dy` line per strip row, then a `#` registration
//! summary with the global mean and deviation per axis.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::disparity::CostFunction;
use crate::error::{ParallaxError, Result};
use crate::frame::Extent;

use super::{OffsetEstimate, OffsetParams, StripCrop};

/// Run metadata written at the top of the log.
pub struct ReportHeader<'a> {
    pub left: &'a Path,
    pub right: &'a Path,
    pub params: &'a OffsetParams,
    pub common: Extent,
    pub crop: StripCrop,
}

/// Write the log to `path`. `None` writes the `NULL` summary, used only when
/// there is nothing to summarize.
pub fn write_row_log(
    path: &Path,
    header: &ReportHeader<'_>,
    estimate: Option<&OffsetEstimate>,
) -> Result<()> {
    let unwritable = |source: std::io::Error| ParallaxError::LogFileUnwritable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(unwritable)?;
    let mut out = BufWriter::new(file);
    write_report(&mut out, header, estimate)
        .and_then(|()| out.flush())
        .map_err(unwritable)
}

pub fn write_report(
    out: &mut impl Write,
    header: &ReportHeader<'_>,
    estimate: Option<&OffsetEstimate>,
) -> std::io::Result<()> {
    let corr = &header.params.correlation;
    let crop = header.crop;
    writeln!(out, "#       Row Offset Registration Results")?;
    writeln!(out, "#    Coordinates are (Sample, Line) unless indicated")?;
    writeln!(out, "#")?;
    writeln!(out, "#    ****  Image Input Information ****")?;
    for (label, path) in [("FROM: ", header.left), ("MATCH:", header.right)] {
        writeln!(out, "#  {label} {}", path.display())?;
        writeln!(out, "#    Lines:       {}", header.common.height)?;
        writeln!(out, "#    Samples:     {}", header.common.width)?;
        writeln!(out, "#    SampOffset:  {}", crop.x)?;
        writeln!(out, "#    LineOffset:  {}", crop.y)?;
        writeln!(out, "#    TopLeft:     {:>7} {:>7}", crop.x, crop.y)?;
        writeln!(
            out,
            "#    LowerRight:  {:>7} {:>7}",
            crop.x + crop.width,
            crop.y + crop.height
        )?;
        writeln!(out, "#")?;
    }
    writeln!(out, "#    Row, Sample Offset, Line Offset")?;

    if let Some(estimate) = estimate {
        for row in &estimate.rows {
            writeln!(out, "{}, {:.6}, {:.6}", row.row, row.mean_dx, row.mean_dy)?;
        }
    }

    writeln!(out, "#")?;
    writeln!(out, "#  **** Registration Data ****")?;
    writeln!(out, "#   OverlapSize:      {:>7} {:>7}", crop.width, crop.height)?;
    writeln!(out, "#   Columns, Rows:    {} {}", corr.kernel.0, corr.kernel.1)?;
    writeln!(out, "#   Corr. Algorithm:  {}", algorithm_name(corr.cost))?;
    writeln!(
        out,
        "#   Search Range:     h [{}, {}] v [{}, {}]",
        corr.search.h_min, corr.search.h_max, corr.search.v_min, corr.search.v_max
    )?;
    writeln!(out, "#   LR Threshold:     {}", corr.lr_threshold)?;
    writeln!(out, "#   LoG Sigma:        {}", header.params.log_sigma)?;
    writeln!(out, "#   Pyramid:          {}", corr.pyramid)?;

    match estimate {
        Some(estimate) => {
            writeln!(
                out,
                "#   Total Registers:  {} in {} rows",
                estimate.samples,
                estimate.valid_rows()
            )?;
            writeln!(
                out,
                "#   Average Sample Offset: {:.4}  StdDev: {:.4}",
                estimate.offset_x, estimate.stddev_x
            )?;
            writeln!(
                out,
                "#   Average Line Offset:   {:.4}  StdDev: {:.4}",
                estimate.offset_y, estimate.stddev_y
            )?;
        }
        None => {
            writeln!(out, "#   Average Sample Offset: NULL")?;
            writeln!(out, "#   Average Line Offset:   NULL")?;
        }
    }
    Ok(())
}

fn algorithm_name(cost: CostFunction) -> &'static str {
    match cost {
        CostFunction::AbsoluteDifference => "ABSOLUTE_DIFFERENCE",
        CostFunction::SquaredDifference => "SQUARED_DIFFERENCE",
        CostFunction::NormalizedCrossCorrelation => "CROSS_CORRELATION",
    }
}
