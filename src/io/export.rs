//! CSV and JSON export for profiles, schedules and cycle configs.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::engine::{DaySummary, Profile, StepRecord};
use crate::model::CycleConfig;

/// Column header of the profile CSV.
const PROFILE_HEADER: [&str; 2] = ["Time", "Current"];

/// Column header of the per-day schedule CSV.
const SCHEDULE_HEADER: [&str; 7] = [
    "Day",
    "Date",
    "DriveCycle_ID",
    "Source",
    "Active (s)",
    "Idle (s)",
    "Status",
];

/// Column header of the per-step simulation table.
const STEP_TABLE_HEADER: [&str; 16] = [
    "Global Step Index",
    "Day",
    "Date",
    "DriveCycle_ID",
    "Subcycle_ID",
    "Subcycle Step Index",
    "Value",
    "Unit",
    "Step Type",
    "Duration (s)",
    "Repetitions",
    "Timestep (s)",
    "Ambient Temp (°C)",
    "Location",
    "Trigger(s)",
    "Label",
];

/// Exports a profile to a CSV file at the given path.
///
/// Writes the `Time,Current` header followed by one row per point of the
/// (already capped) arrays. Identical profiles give identical files.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(profile: &Profile, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_csv(profile, io::BufWriter::new(file))
}

/// Writes a profile as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(profile: &Profile, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(PROFILE_HEADER)?;
    for (t, i) in profile.points() {
        wtr.write_record(&[t.to_string(), i.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports the per-day assignment table to a CSV file.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_schedule_csv(days: &[DaySummary], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_schedule_csv(days, io::BufWriter::new(file))
}

/// Writes the per-day assignment table as CSV to any writer.
///
/// Days are numbered from 1; unassigned days leave `DriveCycle_ID` empty.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_schedule_csv(days: &[DaySummary], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(SCHEDULE_HEADER)?;
    for d in days {
        wtr.write_record(&[
            (d.day_index + 1).to_string(),
            d.date.to_string(),
            d.drive_cycle_id.clone().unwrap_or_default(),
            d.source.to_string(),
            format!("{:.1}", d.active_seconds),
            format!("{:.1}", d.idle_seconds),
            d.status.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports the per-step simulation table to a CSV file.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_step_table_csv(rows: &[StepRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_step_table_csv(rows, io::BufWriter::new(file))
}

/// Writes the per-step simulation table as CSV to any writer.
///
/// Days are numbered from 1 as in the schedule CSV. Unset optional fields
/// are left empty.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_step_table_csv(rows: &[StepRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(STEP_TABLE_HEADER)?;
    for r in rows {
        wtr.write_record(&[
            r.global_index.to_string(),
            (r.day_index + 1).to_string(),
            r.date.to_string(),
            r.drive_cycle_id.clone().unwrap_or_default(),
            r.sub_cycle_id.clone(),
            r.sub_cycle_step_index.to_string(),
            r.value.to_string(),
            r.unit.symbol().to_string(),
            r.kind.to_string(),
            r.duration.to_string(),
            r.repetitions.to_string(),
            r.timestep.map(|t| t.to_string()).unwrap_or_default(),
            r.ambient_temp.map(|t| t.to_string()).unwrap_or_default(),
            r.location.clone().unwrap_or_default(),
            r.triggers_text(),
            r.label.clone().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the cycle config as pretty-printed JSON to a file.
///
/// # Errors
///
/// Returns an `io::Error` if the file cannot be written or the config
/// cannot be serialised.
pub fn export_json(config: &CycleConfig, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_json(config, io::BufWriter::new(file))
}

/// Writes the cycle config as pretty-printed JSON to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing or serialisation fails.
pub fn write_json(config: &CycleConfig, mut writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, config)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
