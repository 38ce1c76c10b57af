use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tonal_lab::Tick;
use tonal_lab::analysis::{detect_modulations, harmonic_rhythm, style_fingerprint};
use tonal_lab::chord::{Chord, identify_chord, roman_numeral};
use tonal_lab::chroma::Chroma;
use tonal_lab::config::KeyMethod;
use tonal_lab::forte::{forte_name, set_class, z_partner};
use tonal_lab::key::{detect_key, detect_key_windowed};
use tonal_lab::scale::identify_scale;
use tonal_lab::tension::tension_curve;
use tonal_lab::tiv::TonalIntervalVector;
use tonal_lab::tps::{basic_space, tps_distance};

mod input;

#[derive(Parser)]
#[command(name = "tonal-cli")]
#[command(about = "Tonal analysis of note event files and pitch-class sets")]
struct Cli {
    /// JSON file with analysis settings, unset fields keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the key of a passage, or one key per window with modulations
    Key {
        events: PathBuf,
        /// Window size in ticks
        #[arg(long)]
        window: Option<Tick>,
        /// Compare tonal interval vectors instead of correlating profiles
        #[arg(long)]
        tiv: bool,
    },
    /// Sample the tension curve of a passage
    Tension {
        events: PathBuf,
        /// Sample interval in ticks
        #[arg(long)]
        interval: Option<Tick>,
    },
    /// Identify the scale of a melody
    Scale { events: PathBuf },
    /// Chord per window, with Roman numerals in the detected key
    Harmony { events: PathBuf },
    /// Style fingerprint of a passage, optionally compared with another one
    Style {
        events: PathBuf,
        #[arg(long)]
        compare: Option<PathBuf>,
    },
    /// Normal form, prime form and Forte name of a pitch-class set
    SetClass {
        #[arg(required = true, allow_negative_numbers = true)]
        pitch_classes: Vec<i32>,
    },
    /// Name the chord formed by some pitch classes
    Chord {
        #[arg(required = true, allow_negative_numbers = true)]
        pitch_classes: Vec<i32>,
        /// Tonic of the key for a Roman numeral
        #[arg(long)]
        tonic: Option<u8>,
        #[arg(long)]
        minor: bool,
    },
    /// Tonal pitch space distance between two chords in a key
    Tps {
        #[arg(long, value_delimiter = ',', required = true)]
        from: Vec<i32>,
        #[arg(long)]
        from_root: u8,
        #[arg(long, value_delimiter = ',', required = true)]
        to: Vec<i32>,
        #[arg(long)]
        to_root: u8,
        #[arg(long)]
        tonic: u8,
        #[arg(long)]
        minor: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let mut config = input::read_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Key {
            events,
            window,
            tiv,
        } => {
            let events = input::read_events(&events)?;
            if tiv {
                config.key.method = KeyMethod::Tiv;
            }
            match window {
                Some(window) => {
                    config.key.window = window;
                    let windows = detect_key_windowed(&events, &config.key)?;
                    let modulations =
                        detect_modulations(&windows, config.key.modulation_min_windows);
                    input::print_json(&json!({ "windows": windows, "modulations": modulations }))
                }
                None => input::print_json(&detect_key(&events, &config.key)),
            }
        }
        Commands::Tension { events, interval } => {
            let events = input::read_events(&events)?;
            if let Some(interval) = interval {
                config.tension.interval = interval;
            }
            let curve = tension_curve(&events, &config.tension)?;
            let ticks = |points: Vec<&tonal_lab::tension::TensionPoint>| {
                points.iter().map(|point| point.tick).collect::<Vec<_>>()
            };
            input::print_json(&json!({
                "points": curve.points,
                "peaks": ticks(curve.peaks(config.tension.flatness)),
                "valleys": ticks(curve.valleys(config.tension.flatness)),
            }))
        }
        Commands::Scale { events } => {
            let events = input::read_events(&events)?;
            input::print_json(&identify_scale(&events, &config.scale))
        }
        Commands::Harmony { events } => {
            let events = input::read_events(&events)?;
            let key = detect_key(&events, &config.key).map(|estimate| estimate.key);
            let rhythm = harmonic_rhythm(&events, &config.chord)?;
            let numerals = rhythm
                .spans
                .iter()
                .map(|span| {
                    span.chord
                        .as_ref()
                        .zip(key)
                        .map(|(chord, key)| roman_numeral(chord, key).numeral)
                })
                .collect::<Vec<_>>();
            input::print_json(&json!({ "key": key, "rhythm": rhythm, "numerals": numerals }))
        }
        Commands::Style { events, compare } => {
            let fingerprint = style_fingerprint(&input::read_events(&events)?, &config)
                .with_context(|| format!("Failed to fingerprint {}", events.display()))?;
            let similarity = match compare {
                Some(other) => {
                    let other_fingerprint = style_fingerprint(&input::read_events(&other)?, &config)
                        .with_context(|| format!("Failed to fingerprint {}", other.display()))?;
                    Some(fingerprint.similarity(&other_fingerprint))
                }
                None => None,
            };
            input::print_json(&json!({ "fingerprint": fingerprint, "similarity": similarity }))
        }
        Commands::SetClass { pitch_classes } => {
            let set = input::pitch_class_set(&pitch_classes);
            let tiv = TonalIntervalVector::from_chroma(&Chroma::from_set(&set));
            input::print_json(&json!({
                "set": set,
                "normal_form": set.normal_form(),
                "prime_form": set.prime_form(),
                "interval_class_vector": set.interval_class_vector(),
                "forte_name": forte_name(&set),
                "set_class": set_class(&set),
                "z_partner": z_partner(&set),
                "tiv": tiv.pairs(),
            }))
        }
        Commands::Chord {
            pitch_classes,
            tonic,
            minor,
        } => {
            let set = input::pitch_class_set(&pitch_classes);
            let chord = identify_chord(&set, &config.chord);
            let numeral = match (tonic, &chord) {
                (Some(tonic), Some(chord)) => Some(roman_numeral(chord, input::key(tonic, minor)?)),
                _ => None,
            };
            input::print_json(&json!({
                "chord": chord,
                "symbol": chord.as_ref().map(Chord::symbol),
                "roman_numeral": numeral,
            }))
        }
        Commands::Tps {
            from,
            from_root,
            to,
            to_root,
            tonic,
            minor,
        } => {
            let key = input::key(tonic, minor)?;
            let from = Chord::from_pitch_classes(
                input::pitch_class(from_root)?,
                input::pitch_class_set(&from),
            )
            .context("Invalid origin chord")?;
            let to = Chord::from_pitch_classes(
                input::pitch_class(to_root)?,
                input::pitch_class_set(&to),
            )
            .context("Invalid destination chord")?;
            input::print_json(&json!({
                "distance": tps_distance(&from, key, &to, key),
                "reverse_distance": tps_distance(&to, key, &from, key),
                "from_space": basic_space(&from, key),
                "to_space": basic_space(&to, key),
            }))
        }
    }
}
