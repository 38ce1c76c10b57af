#![warn(clippy::all, rust_2018_idioms)]
//! Tonal analysis of symbolic music.
//!
//! Everything works on twelve pitch classes: sets and chroma vectors built from note events
//! feed the tonal interval vector, key finding, roughness, the spiral array and tonal pitch
//! space, which in turn feed harmonic rhythm, modulation and style analyses.

pub mod analysis;
pub mod chord;
pub mod chroma;
pub mod config;
pub mod error;
pub mod event;
pub mod forte;
pub mod interval;
pub mod key;
pub mod pcs;
pub mod pitch;
pub mod rhythm;
pub mod roughness;
pub mod scale;
pub mod spiral;
pub mod tension;
pub mod tiv;
pub mod tps;

pub use config::AnalysisConfig;
pub use error::{Error, Result};
pub use event::{NoteEvent, Tick};
pub use pcs::PitchClassSet;
pub use pitch::PitchClass;
