use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized, checksum-verified vehicle plate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plate {
    /// 1–3 uppercase series letters.
    pub prefix: String,
    /// 1–4 digit numeric body.
    pub numerals: String,
    /// The verified trailing check letter.
    pub checksum: char,
}

impl fmt::Display for Plate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, self.numerals, self.checksum)
    }
}

/// Why a raw input was rejected by the plate validator.
///
/// Classification only; the user-facing wording lives with the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InvalidReason {
    /// Normalized length outside (1, 8].
    Length,
    /// Not of the shape PREFIX + NUMERALS + optional check letter.
    Format,
    /// Shape is fine but no check letter was supplied.
    MissingChecksum { expected: char },
    /// A check letter was supplied but does not match the computed one.
    WrongChecksum { expected: char },
}

/// Result of validating one raw plate string. Exactly one variant holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Valid(Plate),
    Invalid(InvalidReason),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }
}
