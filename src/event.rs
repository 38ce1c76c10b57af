use wmidi::Note;

use crate::error::{Error, Result};
use crate::pitch::PitchClass;

/// Score time in ticks, relative to a caller supplied ticks-per-quarter resolution
pub type Tick = u64;

const A4_FREQ: f64 = 440.0;
const A4_MIDI_NOTE: u8 = 69;
const CENTS_PER_OCTAVE: f64 = 1200.0;
const MAX_VELOCITY: u8 = 127;

/// A sounding note in a score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub note: Note,
    /// Deviation from equal temperament, usually within +-50
    pub cents: i8,
    pub onset: Tick,
    pub duration: Tick,
    pub velocity: u8,
}

impl NoteEvent {
    pub fn new(midi: u8, onset: Tick, duration: Tick, velocity: u8) -> Result<Self> {
        let note = Note::try_from(midi).map_err(|_| Error::MidiOutOfRange(midi))?;
        if velocity > MAX_VELOCITY {
            return Err(Error::MidiOutOfRange(velocity));
        }
        Ok(Self {
            note,
            cents: 0,
            onset,
            duration,
            velocity,
        })
    }

    pub fn with_cents(self, cents: i8) -> Self {
        Self { cents, ..self }
    }

    pub fn midi(&self) -> u8 {
        u8::from(self.note)
    }

    pub fn pitch_class(&self) -> PitchClass {
        PitchClass::from_note(self.note)
    }

    /// Scientific octave number, middle C (MIDI 60) is in octave 4
    pub fn octave(&self) -> i8 {
        (self.midi() / 12) as i8 - 1
    }

    /// Equal-tempered frequency in Hz with the cents deviation applied
    pub fn frequency(&self) -> f64 {
        let semitones = f64::from(self.midi()) - f64::from(A4_MIDI_NOTE);
        let cents = 100.0 * semitones + f64::from(self.cents);
        A4_FREQ * 2.0_f64.powf(cents / CENTS_PER_OCTAVE)
    }

    pub fn end(&self) -> Tick {
        self.onset.saturating_add(self.duration)
    }

    pub fn sounds_at(&self, tick: Tick) -> bool {
        self.onset <= tick && tick < self.end()
    }

    /// Ticks of this note inside `start..end`
    pub fn overlap(&self, start: Tick, end: Tick) -> Tick {
        self.end().min(end).saturating_sub(self.onset.max(start))
    }

    /// Whether the note belongs to `start..end`, a zero-length note by its onset alone
    pub fn occupies(&self, start: Tick, end: Tick) -> bool {
        if self.duration == 0 {
            (start..end).contains(&self.onset)
        } else {
            self.overlap(start, end) > 0
        }
    }
}

/// Events sounding at `tick`
pub fn sounding_at(events: &[NoteEvent], tick: Tick) -> impl Iterator<Item = &NoteEvent> {
    events.iter().filter(move |event| event.sounds_at(tick))
}

/// First onset and last release, `None` without events
pub fn span(events: &[NoteEvent]) -> Option<(Tick, Tick)> {
    let start = events.iter().map(|event| event.onset).min()?;
    let end = events.iter().map(NoteEvent::end).max()?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx_eq(actual: f64, expected: f64, epsilon: f64) {
        assert!(
            (actual - expected).abs() < epsilon,
            "Expected {expected}, got {actual} (difference: {difference})",
            difference = (actual - expected).abs()
        );
    }

    #[test]
    fn test_new_validates_midi_range() {
        assert!(NoteEvent::new(127, 0, 10, 100).is_ok());
        assert_eq!(NoteEvent::new(128, 0, 10, 100), Err(Error::MidiOutOfRange(128)));
        assert_eq!(NoteEvent::new(60, 0, 10, 200), Err(Error::MidiOutOfRange(200)));
    }

    #[test]
    fn test_pitch_accessors() {
        let middle_c = NoteEvent::new(60, 0, 480, 90).unwrap();
        assert_eq!(middle_c.pitch_class(), PitchClass::C);
        assert_eq!(middle_c.octave(), 4);
        assert_eq!(NoteEvent::new(0, 0, 1, 1).unwrap().octave(), -1);
        assert_approx_eq(NoteEvent::new(69, 0, 1, 1).unwrap().frequency(), 440.0, 1e-9);
        assert_approx_eq(middle_c.frequency(), 261.6256, 1e-3);
        let sharp_a = NoteEvent::new(69, 0, 1, 1).unwrap().with_cents(50);
        assert_approx_eq(sharp_a.frequency(), 440.0 * 2.0_f64.powf(50.0 / 1200.0), 1e-9);
    }

    #[test]
    fn test_timing() {
        let note = NoteEvent::new(64, 100, 50, 80).unwrap();
        assert_eq!(note.end(), 150);
        assert!(note.sounds_at(100));
        assert!(note.sounds_at(149));
        assert!(!note.sounds_at(150));
        assert!(!note.sounds_at(99));
        assert_eq!(note.overlap(0, 120), 20);
        assert_eq!(note.overlap(120, 400), 30);
        assert_eq!(note.overlap(200, 400), 0);
    }

    #[test]
    fn test_occupies() {
        let note = NoteEvent::new(64, 100, 50, 80).unwrap();
        assert!(note.occupies(0, 101));
        assert!(note.occupies(149, 400));
        assert!(!note.occupies(0, 100));
        assert!(!note.occupies(150, 400));
        let grace = NoteEvent::new(62, 100, 0, 80).unwrap();
        assert!(grace.occupies(100, 101));
        assert!(grace.occupies(0, 480));
        assert!(!grace.occupies(0, 100));
        assert!(!grace.occupies(101, 480));
    }

    #[test]
    fn test_span_and_sounding() {
        let events = [
            NoteEvent::new(60, 0, 480, 90).unwrap(),
            NoteEvent::new(64, 240, 480, 90).unwrap(),
        ];
        assert_eq!(span(&events), Some((0, 720)));
        assert_eq!(span(&[]), None);
        assert_eq!(sounding_at(&events, 300).count(), 2);
        assert_eq!(sounding_at(&events, 600).count(), 1);
    }
}
