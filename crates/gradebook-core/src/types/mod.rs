//! # Core Type Definitions
//!
//! This module contains all core types for the gradebook:
//! - Validated input newtypes (`RollNumber`, `StudentName`, `Subject`, `Score`)
//! - Stored records (`Student`, `Grade`, `GradeId`)
//! - The exact mean of a set of scores (`Average`)
//! - The duplicate-subject policy (`SubjectPolicy`)
//! - Error types (`GradebookError`)
//!
//! ## Boundary Validation
//!
//! Raw strings from forms, JSON bodies and CLI arguments are turned into the
//! newtypes here before any store is touched. Once constructed, a value is
//! known to be trimmed, non-empty and within its length limit.
//!
//! ## Fixed-Point Scores
//!
//! Scores are integers counted in hundredths of a point. All arithmetic on
//! them (sums, means, rounding) is integer arithmetic.

use crate::primitives::{
    AVERAGE_DISPLAY_DIGITS, MAX_NAME_LENGTH, MAX_ROLL_NUMBER_LENGTH, MAX_SCORE_HUNDREDTHS,
    MAX_SUBJECT_LENGTH, SCORE_FRACTION_DIGITS, SCORE_SCALE,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Trim `raw` and check it is non-empty and at most `max` bytes long.
fn validated_text(raw: &str, field: &str, max: usize) -> Result<String, GradebookError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GradebookError::InvalidInput(format!(
            "{} must not be empty",
            field
        )));
    }
    if trimmed.len() > max {
        return Err(GradebookError::InvalidInput(format!(
            "{} length {} exceeds maximum {} bytes",
            field,
            trimmed.len(),
            max
        )));
    }
    Ok(trimmed.to_string())
}

// =============================================================================
// STUDENT IDENTIFIERS
// =============================================================================

/// Unique, immutable identifier of a student.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RollNumber(String);

impl RollNumber {
    /// Validate a raw roll number.
    pub fn parse(raw: &str) -> Result<Self, GradebookError> {
        validated_text(raw, "Roll number", MAX_ROLL_NUMBER_LENGTH).map(Self)
    }

    /// Get the roll number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RollNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Display name of a student.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentName(String);

impl StudentName {
    /// Validate a raw student name.
    pub fn parse(raw: &str) -> Result<Self, GradebookError> {
        validated_text(raw, "Name", MAX_NAME_LENGTH).map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Free-text subject label, e.g. "Math".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Subject(String);

impl Subject {
    /// Validate a raw subject label.
    pub fn parse(raw: &str) -> Result<Self, GradebookError> {
        validated_text(raw, "Subject", MAX_SUBJECT_LENGTH).map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

// =============================================================================
// SCORE
// =============================================================================

/// A score in the closed range [0, 100], counted in hundredths of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Score(u32);

impl Score {
    /// The lowest possible score.
    pub const MIN: Self = Self(0);

    /// The highest possible score.
    pub const MAX: Self = Self(MAX_SCORE_HUNDREDTHS);

    /// Create a score from hundredths of a point.
    pub fn from_hundredths(hundredths: u32) -> Result<Self, GradebookError> {
        if hundredths > MAX_SCORE_HUNDREDTHS {
            return Err(GradebookError::OutOfRange(render_hundredths(u64::from(
                hundredths,
            ))));
        }
        Ok(Self(hundredths))
    }

    /// Create a score from whole points.
    pub fn from_points(points: u32) -> Result<Self, GradebookError> {
        let hundredths = points
            .checked_mul(SCORE_SCALE)
            .ok_or_else(|| GradebookError::OutOfRange(points.to_string()))?;
        Self::from_hundredths(hundredths)
    }

    /// Parse a score typed by a user: `"85"`, `"85.5"`, `"+85.25"`, `" 100.00 "`.
    ///
    /// Text that is not a plain decimal number, or that carries more than
    /// two significant fractional digits, is `InvalidScore`. A well-formed
    /// number outside [0, 100], negatives included, is `OutOfRange`.
    pub fn parse(raw: &str) -> Result<Self, GradebookError> {
        let trimmed = raw.trim();
        let not_a_number =
            || GradebookError::InvalidScore(format!("'{}' is not a number", trimmed));

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        if whole.is_empty() && fraction.is_empty() {
            return Err(not_a_number());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(not_a_number());
        }

        let (kept, excess) = fraction.split_at(fraction.len().min(SCORE_FRACTION_DIGITS));
        if excess.bytes().any(|b| b != b'0') {
            return Err(GradebookError::InvalidScore(format!(
                "'{}' has more than {} decimal places",
                trimmed, SCORE_FRACTION_DIGITS
            )));
        }

        // More than three significant integer digits is always above 100.
        let whole = whole.trim_start_matches('0');
        if whole.len() > 3 {
            return Err(GradebookError::OutOfRange(trimmed.to_string()));
        }
        let points: u32 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| not_a_number())?
        };
        let padded = format!("{:0<width$}", kept, width = SCORE_FRACTION_DIGITS);
        let fraction: u32 = padded.parse().map_err(|_| not_a_number())?;

        let hundredths = points * SCORE_SCALE + fraction;
        if negative && hundredths > 0 {
            return Err(GradebookError::OutOfRange(trimmed.to_string()));
        }
        Self::from_hundredths(hundredths)
            .map_err(|_| GradebookError::OutOfRange(trimmed.to_string()))
    }

    /// Get the raw value in hundredths of a point.
    #[must_use]
    pub const fn hundredths(self) -> u32 {
        self.0
    }
}

impl FromStr for Score {
    type Err = GradebookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_hundredths(u64::from(self.0)))
    }
}

/// Render a hundredths count as a short decimal: `8500` -> `85`,
/// `8550` -> `85.5`, `8525` -> `85.25`.
fn render_hundredths(hundredths: u64) -> String {
    let scale = u64::from(SCORE_SCALE);
    let whole = hundredths / scale;
    let fraction = hundredths % scale;
    if fraction == 0 {
        whole.to_string()
    } else if fraction % 10 == 0 {
        format!("{}.{}", whole, fraction / 10)
    } else {
        format!("{}.{:02}", whole, fraction)
    }
}

// =============================================================================
// AVERAGE
// =============================================================================

/// The arithmetic mean of a non-empty set of scores.
///
/// Holds the exact ratio `total / count` (total in hundredths), so two
/// averages compare exactly: {80, 90, 70} equals {80}.
#[derive(Debug, Clone, Copy)]
pub struct Average {
    total: u64,
    count: u64,
}

impl Average {
    /// Average the given scores. Returns `None` for an empty set.
    pub fn of<I: IntoIterator<Item = Score>>(scores: I) -> Option<Self> {
        let (total, count) = scores.into_iter().fold((0u64, 0u64), |(total, count), s| {
            (
                total.saturating_add(u64::from(s.hundredths())),
                count.saturating_add(1),
            )
        });
        (count > 0).then_some(Self { total, count })
    }

    /// Sum of the averaged scores, in hundredths.
    #[must_use]
    pub const fn total_hundredths(&self) -> u64 {
        self.total
    }

    /// Number of averaged scores.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// The mean in hundredths, rounded half-up.
    #[must_use]
    pub fn hundredths(&self) -> u64 {
        let total = u128::from(self.total);
        let count = u128::from(self.count);
        ((total * 2 + count) / (count * 2)) as u64
    }

    /// The mean rounded half-up to a two-decimal `Score`.
    #[must_use]
    pub fn rounded(&self) -> Score {
        // A mean never exceeds the largest of its inputs.
        Score(self.hundredths().min(u64::from(MAX_SCORE_HUNDREDTHS)) as u32)
    }
}

impl PartialEq for Average {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Average {}

impl PartialOrd for Average {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Average {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = u128::from(self.total) * u128::from(other.count);
        let rhs = u128::from(other.total) * u128::from(self.count);
        lhs.cmp(&rhs)
    }
}

impl fmt::Display for Average {
    /// Decimal form with up to `AVERAGE_DISPLAY_DIGITS` fractional digits,
    /// rounded half-up in the last digit, trailing zeros trimmed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = 10u128.pow(AVERAGE_DISPLAY_DIGITS);
        let denominator = u128::from(self.count) * u128::from(SCORE_SCALE);
        let scaled = (u128::from(self.total) * unit * 2 + denominator) / (denominator * 2);

        let whole = scaled / unit;
        let fraction = scaled % unit;
        if fraction == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!(
            "{:0width$}",
            fraction,
            width = AVERAGE_DISPLAY_DIGITS as usize
        );
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// Store-assigned identifier of a grade. Strictly increasing, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GradeId(pub u64);

impl fmt::Display for GradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub roll_number: RollNumber,
    pub name: StudentName,
}

impl Student {
    #[must_use]
    pub fn new(name: StudentName, roll_number: RollNumber) -> Self {
        Self { roll_number, name }
    }
}

/// A single subject/score pair attributed to one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub id: GradeId,
    /// Roll number of the owning student.
    pub owner: RollNumber,
    pub subject: Subject,
    pub score: Score,
}

// =============================================================================
// SUBJECT POLICY
// =============================================================================

/// What happens when a grade is added for a subject the student already has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectPolicy {
    /// Keep every grade; the subject may appear several times.
    #[default]
    Append,
    /// Drop the student's earlier grades for that subject first.
    Replace,
}

impl FromStr for SubjectPolicy {
    type Err = GradebookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "replace" => Ok(Self::Replace),
            other => Err(GradebookError::InvalidInput(format!(
                "Unknown subject policy '{}' (expected 'append' or 'replace')",
                other
            ))),
        }
    }
}

impl fmt::Display for SubjectPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => f.write_str("append"),
            Self::Replace => f.write_str("replace"),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the gradebook.
///
/// Every failure is local to one operation: nothing is written when an
/// operation returns an error, and no error is fatal to the process.
#[derive(Debug, Error)]
pub enum GradebookError {
    /// A student with this roll number already exists.
    #[error("Roll number already exists: {0}")]
    DuplicateRollNumber(RollNumber),

    /// No student has this roll number.
    #[error("Student not found: {0}")]
    NotFound(RollNumber),

    /// A well-formed score outside [0, 100].
    #[error("Score {0} is outside the range 0-100")]
    OutOfRange(String),

    /// The student exists but has no grades to average.
    #[error("Student {0} has no grades")]
    NoGrades(RollNumber),

    /// No grade has this id.
    #[error("Grade not found: {0}")]
    GradeNotFound(GradeId),

    /// A name, roll number, subject or option failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The score text is not a usable decimal number.
    #[error("Invalid score: {0}")]
    InvalidScore(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl GradebookError {
    /// Stable snake_case name of the error kind, for API clients.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateRollNumber(_) => "duplicate_roll_number",
            Self::NotFound(_) => "not_found",
            Self::OutOfRange(_) => "out_of_range",
            Self::NoGrades(_) => "no_grades",
            Self::GradeNotFound(_) => "grade_not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidScore(_) => "invalid_score",
            Self::SerializationError(_) => "serialization_error",
            Self::IoError(_) => "io_error",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(points: &[u32]) -> Vec<Score> {
        points
            .iter()
            .map(|&p| Score::from_points(p).expect("score"))
            .collect()
    }

    #[test]
    fn text_fields_are_trimmed() {
        let roll = RollNumber::parse("  R-17 ").expect("roll");
        assert_eq!(roll.as_str(), "R-17");
        let name = StudentName::parse("\tAda Lovelace\n").expect("name");
        assert_eq!(name.as_str(), "Ada Lovelace");
    }

    #[test]
    fn empty_text_fields_rejected() {
        assert!(matches!(
            StudentName::parse("   "),
            Err(GradebookError::InvalidInput(_))
        ));
        assert!(matches!(
            RollNumber::parse(""),
            Err(GradebookError::InvalidInput(_))
        ));
        assert!(matches!(
            Subject::parse(" "),
            Err(GradebookError::InvalidInput(_))
        ));
    }

    #[test]
    fn oversized_roll_number_rejected() {
        let raw = "9".repeat(MAX_ROLL_NUMBER_LENGTH + 1);
        assert!(matches!(
            RollNumber::parse(&raw),
            Err(GradebookError::InvalidInput(_))
        ));
    }

    #[test]
    fn score_parses_integers_and_decimals() {
        assert_eq!(Score::parse("85").expect("int").hundredths(), 8500);
        assert_eq!(Score::parse("85.5").expect("one digit").hundredths(), 8550);
        assert_eq!(Score::parse("85.25").expect("two").hundredths(), 8525);
        assert_eq!(Score::parse(" +7 ").expect("signed").hundredths(), 700);
        assert_eq!(Score::parse(".5").expect("bare fraction").hundredths(), 50);
        assert_eq!(Score::parse("100.000").expect("zeros").hundredths(), 10000);
        assert_eq!(Score::parse("-0").expect("negative zero"), Score::MIN);
    }

    #[test]
    fn score_bounds_are_inclusive() {
        assert_eq!(Score::parse("0").expect("zero"), Score::MIN);
        assert_eq!(Score::parse("100").expect("hundred"), Score::MAX);
    }

    #[test]
    fn score_out_of_range() {
        for raw in ["100.01", "101", "-1", "-0.5", "250", "99999999999999999999"] {
            assert!(
                matches!(Score::parse(raw), Err(GradebookError::OutOfRange(_))),
                "{} should be out of range",
                raw
            );
        }
    }

    #[test]
    fn score_not_a_number() {
        for raw in ["", "abc", "8 5", "1e2", ".", "1.2.3", "--5", "NaN"] {
            assert!(
                matches!(Score::parse(raw), Err(GradebookError::InvalidScore(_))),
                "{} should be invalid",
                raw
            );
        }
    }

    #[test]
    fn score_rejects_excess_precision() {
        assert!(matches!(
            Score::parse("85.125"),
            Err(GradebookError::InvalidScore(_))
        ));
    }

    #[test]
    fn score_display_is_short() {
        assert_eq!(Score::parse("85").expect("s").to_string(), "85");
        assert_eq!(Score::parse("85.50").expect("s").to_string(), "85.5");
        assert_eq!(Score::parse("85.05").expect("s").to_string(), "85.05");
    }

    #[test]
    fn average_of_empty_is_none() {
        assert!(Average::of(Vec::new()).is_none());
    }

    #[test]
    fn average_of_eighty_ninety_seventy_is_eighty() {
        let avg = Average::of(scores(&[80, 90, 70])).expect("avg");
        assert_eq!(avg.to_string(), "80");
        assert_eq!(avg.hundredths(), 8000);
        assert_eq!(avg, Average::of(scores(&[80])).expect("single"));
    }

    #[test]
    fn average_keeps_full_precision() {
        let avg = Average::of(scores(&[80, 85, 91])).expect("avg");
        assert_eq!(avg.total_hundredths(), 25600);
        assert_eq!(avg.count(), 3);
        assert_eq!(avg.to_string(), "85.333333");
        assert_eq!(avg.hundredths(), 8533);

        let two_thirds = Average::of(scores(&[0, 1, 1])).expect("avg");
        assert_eq!(two_thirds.to_string(), "0.666667");
        assert_eq!(two_thirds.rounded().to_string(), "0.67");
    }

    #[test]
    fn averages_order_exactly() {
        let low = Average::of(scores(&[70, 71])).expect("low");
        let high = Average::of(scores(&[71])).expect("high");
        assert!(low < high);
    }

    #[test]
    fn subject_policy_from_str() {
        assert_eq!("Append".parse::<SubjectPolicy>().ok(), Some(SubjectPolicy::Append));
        assert_eq!(
            " replace ".parse::<SubjectPolicy>().ok(),
            Some(SubjectPolicy::Replace)
        );
        assert!("merge".parse::<SubjectPolicy>().is_err());
    }

    #[test]
    fn error_kinds_are_stable() {
        let roll = RollNumber::parse("1").expect("roll");
        assert_eq!(
            GradebookError::DuplicateRollNumber(roll.clone()).kind(),
            "duplicate_roll_number"
        );
        assert_eq!(GradebookError::NoGrades(roll).kind(), "no_grades");
    }
}
