//! Writers for replicate time series.

use crate::ensemble::ReplicateOutcome;
use episim_simulation::TimeSeries;
use episim_types::Compartment;
use std::io::{self, Write};

/// Header line of the CSV table: replicate, time, then one column per
/// compartment in ordinal order.
pub fn csv_header() -> String {
    let mut header = String::from("replicate,time");
    for compartment in Compartment::ALL {
        header.push(',');
        header.push_str(compartment.name());
    }
    header
}

/// Write one replicate's rows, without a header.
pub fn write_series<W: Write>(
    writer: &mut W,
    replicate: usize,
    series: &TimeSeries,
) -> io::Result<()> {
    for row in series.rows() {
        write!(writer, "{replicate},{}", row.time)?;
        for count in row.counts.as_array() {
            write!(writer, ",{count}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Write every outcome as one long CSV table.
pub fn write_csv<W: Write>(writer: &mut W, outcomes: &[ReplicateOutcome]) -> io::Result<()> {
    writeln!(writer, "{}", csv_header())?;
    for outcome in outcomes {
        write_series(writer, outcome.replicate, &outcome.outcome.time_series)?;
    }
    writer.flush()
}

/// Write every outcome, with its statistics, as a JSON array.
pub fn write_json<W: Write>(writer: &mut W, outcomes: &[ReplicateOutcome]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, outcomes)?;
    writeln!(writer)?;
    writer.flush()
}
