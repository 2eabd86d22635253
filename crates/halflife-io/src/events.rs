//! Line-oriented event stream codec.
//!
//! One event per line, whitespace separated:
//!
//! ```text
//! # particle from_isotope to_isotope time_sec energy_MeV
//! 0 0 1 0.6931471805599453 5
//! ```
//!
//! Floats are written in Rust's shortest round-trip form, so decoding an
//! encoded stream reproduces every field bit for bit. Blank lines and lines
//! starting with `#` are skipped on read.

use std::io::{BufRead, Write};

use halflife_core::event::DecayEvent;

use crate::error::CodecError;

/// Field names, in column order.
pub const EVENT_HEADER: &str = "particle from_isotope to_isotope time_sec energy_MeV";

/// Encode one event as a line without the trailing newline.
pub fn encode_event(event: &DecayEvent) -> String {
    format!(
        "{} {} {} {} {}",
        event.particle, event.from_isotope, event.to_isotope, event.time, event.energy
    )
}

/// Decode a line produced by [`encode_event`]. `line_no` is only used in errors.
pub fn decode_event(line: &str, line_no: usize) -> Result<DecayEvent, CodecError> {
    let malformed = |reason: String| CodecError::MalformedLine {
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split_whitespace().collect();
    let &[particle, from, to, time, energy] = fields.as_slice() else {
        return Err(malformed(format!("expected 5 fields, found {}", fields.len())));
    };

    let particle = particle
        .parse()
        .map_err(|e| malformed(format!("particle {particle:?}: {e}")))?;
    let from_isotope = from
        .parse()
        .map_err(|e| malformed(format!("from_isotope {from:?}: {e}")))?;
    let to_isotope = to
        .parse()
        .map_err(|e| malformed(format!("to_isotope {to:?}: {e}")))?;
    let time: f64 = time
        .parse()
        .map_err(|e| malformed(format!("time {time:?}: {e}")))?;
    let energy: f64 = energy
        .parse()
        .map_err(|e| malformed(format!("energy {energy:?}: {e}")))?;
    if !time.is_finite() || !energy.is_finite() {
        return Err(malformed("non-finite time or energy".to_string()));
    }

    Ok(DecayEvent {
        particle,
        from_isotope,
        to_isotope,
        time,
        energy,
    })
}

/// Write the header comment and one line per event.
pub fn write_events<W: Write>(mut writer: W, events: &[DecayEvent]) -> Result<(), CodecError> {
    writeln!(writer, "# {EVENT_HEADER}")?;
    for event in events {
        writeln!(writer, "{}", encode_event(event))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read every event, skipping blank and `#` lines.
pub fn read_events<R: BufRead>(reader: R) -> Result<Vec<DecayEvent>, CodecError> {
    let mut events = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        events.push(decode_event(trimmed, i + 1)?);
    }
    Ok(events)
}
