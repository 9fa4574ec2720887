//! The fixed 10×10 mood vocabulary.
//!
//! Rows run from highest energy (row 0) to lowest energy (row 9); columns run
//! from lowest pleasantness (column 0) to highest pleasantness (column 9).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{MoodError, Result};

/// Number of rows and columns of the grid.
pub const GRID_SIZE: usize = 10;

/// Mood labels organized by energy (rows) and pleasantness (columns).
pub const MOOD_GRID: [[&str; GRID_SIZE]; GRID_SIZE] = [
    [
        "Enraged", "Panicked", "Stressed", "Jittery", "Shocked", "Surprised", "Upbeat", "Festive",
        "Exhilarated", "Ecstatic",
    ],
    [
        "Livid", "Furious", "Frustrated", "Tense", "Stunned", "Hyper", "Cheerful", "Motivated",
        "Inspired", "Elated",
    ],
    [
        "Fuming", "Frightened", "Angry", "Nervous", "Restless", "Energized", "Lively", "Excited",
        "Optimistic", "Enthusiastic",
    ],
    [
        "Anxious", "Apprehensive", "Worried", "Irritated", "Annoyed", "Pleased", "Focused",
        "Happy", "Proud", "Thrilled",
    ],
    [
        "Repulsed", "Troubled", "Concerned", "Uneasy", "Peeved", "Pleasant", "Joyful", "Hopeful",
        "Playful", "Blissful",
    ],
    [
        "Disgusted", "Glum", "Disappointed", "Down", "Apathetic", "At Ease", "Easygoing",
        "Content", "Loving", "Fulfilled",
    ],
    [
        "Pessimistic", "Morose", "Discouraged", "Sad", "Bored", "Calm", "Secure", "Satisfied",
        "Grateful", "Touched",
    ],
    [
        "Alienated", "Miserable", "Lonely", "Disheartened", "Tired", "Relaxed", "Chill",
        "Restful", "Blessed", "Balanced",
    ],
    [
        "Despondent", "Depressed", "Sullen", "Exhausted", "Fatigued", "Mellow", "Thoughtful",
        "Peaceful", "Comfortable", "Carefree",
    ],
    [
        "Despairing", "Hopeless", "Desolate", "Spent", "Drained", "Sleepy", "Complacent",
        "Tranquil", "Cozy", "Serene",
    ],
];

static MOOD_INDEX: Lazy<HashMap<&'static str, Mood>> = Lazy::new(|| {
    Mood::all().map(|mood| (mood.label(), mood)).collect()
});

/// Which corner of the grid a mood sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    /// Top-left: high energy, low pleasantness
    HighEnergyUnpleasant,
    /// Top-right: high energy, high pleasantness
    HighEnergyPleasant,
    /// Bottom-left: low energy, low pleasantness
    LowEnergyUnpleasant,
    /// Bottom-right: low energy, high pleasantness
    LowEnergyPleasant,
}

impl Quadrant {
    /// Quadrant of the cell at `(row, col)`.
    pub fn of(row: usize, col: usize) -> Self {
        let high_energy = row < GRID_SIZE / 2;
        let high_pleasantness = col >= GRID_SIZE / 2;

        match (high_energy, high_pleasantness) {
            (true, false) => Self::HighEnergyUnpleasant,
            (true, true) => Self::HighEnergyPleasant,
            (false, false) => Self::LowEnergyUnpleasant,
            (false, true) => Self::LowEnergyPleasant,
        }
    }

    pub fn is_high_energy(&self) -> bool {
        matches!(self, Self::HighEnergyUnpleasant | Self::HighEnergyPleasant)
    }

    pub fn is_pleasant(&self) -> bool {
        matches!(self, Self::HighEnergyPleasant | Self::LowEnergyPleasant)
    }
}

/// One label of the mood grid.
///
/// Stored as its grid coordinates; serialized as its label so records on the
/// wire carry the human-readable mood name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Mood {
    row: u8,
    col: u8,
}

impl Mood {
    /// Returns the mood at the given grid position, if it is on the grid.
    pub fn at(row: usize, col: usize) -> Option<Self> {
        if row < GRID_SIZE && col < GRID_SIZE {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Parses a grid label.
    ///
    /// Exact labels are matched first; otherwise the lookup falls back to an
    /// ASCII case-insensitive comparison so "at ease" resolves to "At Ease".
    pub fn parse(label: &str) -> Result<Self> {
        let label = label.trim();
        if let Some(mood) = MOOD_INDEX.get(label) {
            return Ok(*mood);
        }

        Self::all()
            .find(|mood| mood.label().eq_ignore_ascii_case(label))
            .ok_or_else(|| MoodError::InvalidMood(label.to_string()))
    }

    /// All moods in row-major order.
    pub fn all() -> impl Iterator<Item = Mood> {
        (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).map(move |col| Mood {
            row: row as u8,
            col: col as u8,
        }))
    }

    pub fn label(&self) -> &'static str {
        MOOD_GRID[self.row as usize][self.col as usize]
    }

    pub fn row(&self) -> usize {
        self.row as usize
    }

    pub fn col(&self) -> usize {
        self.col as usize
    }

    pub fn quadrant(&self) -> Quadrant {
        Quadrant::of(self.row(), self.col())
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mood {
    type Err = MoodError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Mood {
    type Error = MoodError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Mood> for String {
    fn from(mood: Mood) -> Self {
        mood.label().to_string()
    }
}
