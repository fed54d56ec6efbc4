//! Sensor frames as CSV: header `ia,ib,ic`, one row per monitoring unit in
//! feeder order.

use anyhow::{bail, Context, Result};
use overwatch_core::{PhaseCurrents, SensorFrame};
use std::path::Path;

pub fn load_sensor_frame(path: impl AsRef<Path>) -> Result<SensorFrame> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening sensor frame: {}", path.display()))?;

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<PhaseCurrents>().enumerate() {
        let row = record
            .with_context(|| format!("{}: malformed row on line {}", path.display(), index + 2))?;
        if [row.ia, row.ib, row.ic].iter().any(|v| !v.is_finite() || *v < 0.0) {
            bail!(
                "{}: line {} holds a negative or non-finite current magnitude",
                path.display(),
                index + 2
            );
        }
        rows.push(row);
    }
    if rows.is_empty() {
        bail!("{}: sensor frame has no rows", path.display());
    }
    Ok(SensorFrame::new(rows))
}

pub fn write_sensor_frame(frame: &SensorFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating sensor frame: {}", path.display()))?;
    for row in frame.rows() {
        writer
            .serialize(row)
            .with_context(|| format!("writing sensor frame row to {}", path.display()))?;
    }
    writer.flush()?;
    Ok(())
}
