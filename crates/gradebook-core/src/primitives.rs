//! # Primitives
//!
//! Fixed limits and constants for the gradebook core.
//!
//! These are compiled into the binary and are immutable at runtime.
//! Field widths follow the columns of the classroom database the
//! gradebook replaces.

/// Maximum length of a student name, in bytes, after trimming.
pub const MAX_NAME_LENGTH: usize = 120;

/// Maximum length of a roll number, in bytes, after trimming.
pub const MAX_ROLL_NUMBER_LENGTH: usize = 50;

/// Maximum length of a subject label, in bytes, after trimming.
pub const MAX_SUBJECT_LENGTH: usize = 80;

// =============================================================================
// SCORE REPRESENTATION
// =============================================================================

/// Number of fractional digits a score may carry.
///
/// Scores are fixed-point: `85.25` is stored as `8525` hundredths.
pub const SCORE_FRACTION_DIGITS: usize = 2;

/// Hundredths per whole point.
pub const SCORE_SCALE: u32 = 100;

/// Highest score, in hundredths (100.00).
pub const MAX_SCORE_HUNDREDTHS: u32 = 100 * SCORE_SCALE;

/// Fractional digits shown when rendering an average.
///
/// The exact ratio is kept in `Average`; this only bounds the display.
pub const AVERAGE_DISPLAY_DIGITS: u32 = 6;

// =============================================================================
// QUERY LIMITS
// =============================================================================

/// Maximum length of a student search query.
///
/// Longer queries are rejected at the boundary.
pub const MAX_QUERY_LENGTH: usize = 256;
