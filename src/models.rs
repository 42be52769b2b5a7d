use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_TITLE_LEN: usize = 3;
pub const MAX_TITLE_LEN: usize = 50;

/// A point in terrain-local space. `y` is the ground height and never takes
/// part in collision checks.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Ground-level position (y = 0).
    pub fn ground(x: f32, z: f32) -> Self {
        Self { x, y: 0.0, z }
    }

    pub fn distance_sq_xz(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }

    pub fn distance_xz(&self, other: &Position) -> f32 {
        self.distance_sq_xz(other).sqrt()
    }

    pub fn offset(&self, by: &Position) -> Self {
        Self { x: self.x + by.x, y: self.y + by.y, z: self.z + by.z }
    }
}

/// Emotion tag carried by every journal entry. Each one has its own biome.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Emotion {
    Angry,
    Happy,
    Sad,
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 4] = [Emotion::Angry, Emotion::Happy, Emotion::Sad, Emotion::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Angry => "Angry",
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Neutral => "Neutral",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        Emotion::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == value)
            .ok_or_else(|| {
                let valid: Vec<&str> = Emotion::ALL.iter().map(|e| e.as_str()).collect();
                format!("Invalid emotion: {}. Valid options are {}.", value, valid.join(", "))
            })
    }
}

/// A user's journal record. Only `id` and `emotion` matter to placement; the
/// rest is payload handed through to the UI.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct JournalEntry {
    pub id: String,
    pub journal_id: String,
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    pub emotion: Emotion,
}

impl JournalEntry {
    /// Validates the raw form fields and assigns a fresh v4 id.
    pub fn new(
        date: &str,
        title: &str,
        description: &str,
        journal_id: &str,
        emotion: &str,
    ) -> Result<Self, String> {
        Self::with_id(&Uuid::new_v4().to_string(), date, title, description, journal_id, emotion)
    }

    /// Same validation as [`JournalEntry::new`] for records that already have
    /// an id (loaded back from storage).
    pub fn with_id(
        id: &str,
        date: &str,
        title: &str,
        description: &str,
        journal_id: &str,
        emotion: &str,
    ) -> Result<Self, String> {
        let date = parse_entry_date(date)?;
        let emotion = Emotion::parse(emotion)?;

        let trimmed_title = title.trim();
        if trimmed_title.is_empty() {
            return Err("Title is required".to_string());
        }
        if journal_id.trim().is_empty() {
            return Err("Journal ID is required".to_string());
        }
        let title_len = trimmed_title.chars().count();
        if title_len < MIN_TITLE_LEN {
            return Err(format!("Title must be at least {} characters long", MIN_TITLE_LEN));
        }
        if title_len > MAX_TITLE_LEN {
            return Err(format!("Title cannot be longer than {} characters", MAX_TITLE_LEN));
        }

        Ok(Self {
            id: id.to_string(),
            journal_id: journal_id.to_string(),
            date,
            title: trimmed_title.to_string(),
            description: description.to_string(),
            emotion,
        })
    }
}

// Strict YYYY-MM-DD: chrono alone accepts unpadded fields like "2024-1-5".
fn parse_entry_date(date: &str) -> Result<NaiveDate, String> {
    let bytes = date.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(format!("Invalid date format: {}. Expected format is YYYY-MM-DD.", date));
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date {}: {}", date, e))
}

/// Axis-aligned region of the world owned by one biome. Vertical extent is
/// unbounded.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EmotionZone {
    pub name: String,
    pub width: f32,
    pub length: f32,
    pub center: Position,
}

impl EmotionZone {
    pub fn new(name: &str, width: f32, length: f32, center: Position) -> Self {
        Self { name: name.to_string(), width, length, center }
    }

    pub fn contains(&self, pos: &Position) -> bool {
        let half_width = self.width / 2.0;
        let half_length = self.length / 2.0;
        pos.x >= self.center.x - half_width
            && pos.x <= self.center.x + half_width
            && pos.z >= self.center.z - half_length
            && pos.z <= self.center.z + half_length
    }
}
