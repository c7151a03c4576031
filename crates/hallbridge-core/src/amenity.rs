//! # Amenity Vocabulary
//!
//! The closed set of amenities a room can advertise. Requests naming an
//! amenity outside this vocabulary are rejected rather than stored.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A room amenity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Amenity {
    Wifi,
    StudyTable,
    Wardrobe,
    CeilingFan,
    AirConditioning,
    AttachedBathroom,
    Balcony,
    Geyser,
}

impl Amenity {
    /// Every amenity in the vocabulary.
    pub const ALL: [Amenity; 8] = [
        Self::Wifi,
        Self::StudyTable,
        Self::Wardrobe,
        Self::CeilingFan,
        Self::AirConditioning,
        Self::AttachedBathroom,
        Self::Balcony,
        Self::Geyser,
    ];

    /// Return the string representation of this amenity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wifi => "wifi",
            Self::StudyTable => "study_table",
            Self::Wardrobe => "wardrobe",
            Self::CeilingFan => "ceiling_fan",
            Self::AirConditioning => "air_conditioning",
            Self::AttachedBathroom => "attached_bathroom",
            Self::Balcony => "balcony",
            Self::Geyser => "geyser",
        }
    }

    /// Parse a list of amenity names into a set, rejecting the first unknown name.
    pub fn parse_set<S: AsRef<str>>(names: &[S]) -> Result<BTreeSet<Amenity>, ValidationError> {
        names.iter().map(|n| n.as_ref().parse()).collect()
    }
}

impl FromStr for Amenity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ValidationError::UnknownAmenity(s.to_string()))
    }
}

impl std::fmt::Display for Amenity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Amenities given to a room when the caller does not choose any.
pub fn default_amenities() -> BTreeSet<Amenity> {
    [
        Amenity::Wifi,
        Amenity::StudyTable,
        Amenity::Wardrobe,
        Amenity::CeilingFan,
    ]
    .into_iter()
    .collect()
}
