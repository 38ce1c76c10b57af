use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tonal_lab::key::{Key, Mode};
use tonal_lab::{AnalysisConfig, NoteEvent, PitchClass, PitchClassSet, Tick};

/// One note as written in an events file
#[derive(Debug, Deserialize)]
struct EventRecord {
    pitch: u8,
    onset: Tick,
    duration: Tick,
    velocity: u8,
    #[serde(default)]
    cents: i8,
}

fn parse_events(json: &str) -> Result<Vec<NoteEvent>> {
    let records: Vec<EventRecord> =
        serde_json::from_str(json).context("Failed to parse note events")?;
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            NoteEvent::new(record.pitch, record.onset, record.duration, record.velocity)
                .map(|event| event.with_cents(record.cents))
                .with_context(|| format!("Invalid note event at index {index}"))
        })
        .collect()
}

pub fn read_events(path: &Path) -> Result<Vec<NoteEvent>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read events file: {}", path.display()))?;
    let events = parse_events(&json).with_context(|| format!("In {}", path.display()))?;
    log::info!("read {} note events from {}", events.len(), path.display());
    Ok(events)
}

/// Defaults overridden by whatever the file sets
pub fn read_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse config: {}", path.display()))
}

pub fn pitch_class(value: u8) -> Result<PitchClass> {
    PitchClass::try_new(value).with_context(|| format!("Invalid pitch class {value}"))
}

pub fn key(tonic: u8, minor: bool) -> Result<Key> {
    let mode = if minor { Mode::Minor } else { Mode::Major };
    Ok(Key::new(pitch_class(tonic)?, mode))
}

pub fn pitch_class_set(values: &[i32]) -> PitchClassSet {
    PitchClassSet::from_integers(values.iter().copied())
}

pub fn print_json(value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{json}");
    Ok(())
}
