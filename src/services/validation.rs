//! Plate validator.
//!
//! Normalizes a raw user string, checks its shape against
//! PREFIX (1–3 letters) + NUMERALS (1–4 digits) + optional check letter,
//! and verifies the check letter against the checksum engine.

use crate::models::plate::{InvalidReason, Plate, ValidationOutcome};
use crate::services::checksum::compute_checksum;

/// Minimum exclusive / maximum inclusive normalized input length.
const MIN_LEN_EXCLUSIVE: usize = 1;
const MAX_LEN: usize = 8;

/// Validate one raw plate string.
///
/// Recomputes everything from scratch on every call. No caching; identical
/// input yields identical output, safe under concurrent calls.
pub fn validate(raw: &str) -> ValidationOutcome {
    let normalized = raw.trim().to_ascii_uppercase();

    let len = normalized.chars().count();
    if len <= MIN_LEN_EXCLUSIVE || len > MAX_LEN {
        return ValidationOutcome::Invalid(InvalidReason::Length);
    }

    let (prefix, numerals, given) = match split_plate(&normalized) {
        Some(parts) => parts,
        None => return ValidationOutcome::Invalid(InvalidReason::Format),
    };

    let expected = compute_checksum(prefix, numerals);

    match given {
        None => ValidationOutcome::Invalid(InvalidReason::MissingChecksum { expected }),
        Some(c) if c != expected => {
            ValidationOutcome::Invalid(InvalidReason::WrongChecksum { expected })
        }
        Some(c) => ValidationOutcome::Valid(Plate {
            prefix: prefix.to_string(),
            numerals: numerals.to_string(),
            checksum: c,
        }),
    }
}

/// Split a normalized string into (prefix, numerals, optional check letter).
///
/// The whole input must be consumed: 1–3 uppercase ASCII letters, then 1–4
/// ASCII digits, then at most one trailing uppercase ASCII letter.
fn split_plate(s: &str) -> Option<(&str, &str, Option<char>)> {
    let letters = s.chars().take_while(|c| c.is_ascii_uppercase()).count();
    if !(1..=3).contains(&letters) {
        return None;
    }

    let rest = &s[letters..];
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if !(1..=4).contains(&digits) {
        return None;
    }

    let tail = &rest[digits..];
    let mut tail_chars = tail.chars();
    match (tail_chars.next(), tail_chars.next()) {
        (None, _) => Some((&s[..letters], &rest[..digits], None)),
        (Some(c), None) if c.is_ascii_uppercase() => {
            Some((&s[..letters], &rest[..digits], Some(c)))
        }
        _ => None,
    }
}
