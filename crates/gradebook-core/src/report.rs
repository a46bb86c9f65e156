//! # Reports
//!
//! Read-only views over the whole class: per-student averages for charts
//! and a flat CSV export of every grade.

use crate::directory::by_name;
use crate::store::GradebookStore;
use crate::{GradebookError, RollNumber, StudentDirectory, StudentFilter, StudentName};
use serde::Serialize;
use std::borrow::Cow;

/// Header row of the CSV export.
pub const CSV_HEADER: &str = "Name,Roll,Subject,Score";

/// One student's average for the class chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassStat {
    pub name: StudentName,
    pub roll_number: RollNumber,
    /// Average in hundredths, rounded half-up; `0` for a student without grades.
    pub average_hundredths: u64,
}

/// Averages of every student, ordered by name.
pub fn class_stats<S: GradebookStore + ?Sized>(
    store: &S,
) -> Result<Vec<ClassStat>, GradebookError> {
    Ok(
        StudentDirectory::list_students(store, &StudentFilter::default())?
            .into_iter()
            .map(|summary| ClassStat {
                average_hundredths: summary.average.map(|a| a.hundredths()).unwrap_or(0),
                name: summary.student.name,
                roll_number: summary.student.roll_number,
            })
            .collect(),
    )
}

/// Every grade of every student as CSV.
///
/// Students are ordered by name; grades by insertion. A student without
/// grades still gets one row with empty subject and score.
pub fn export_csv<S: GradebookStore + ?Sized>(store: &S) -> Result<String, GradebookError> {
    let mut students = store.students()?;
    students.sort_by(by_name);

    let mut out = String::with_capacity(64 * (students.len() + 1));
    out.push_str(CSV_HEADER);
    out.push_str("\r\n");

    for student in &students {
        let name = csv_field(student.name.as_str());
        let roll = csv_field(student.roll_number.as_str());
        let grades = store.grades_for(&student.roll_number)?;

        if grades.is_empty() {
            out.push_str(&format!("{},{},,\r\n", name, roll));
            continue;
        }
        for grade in grades {
            out.push_str(&format!(
                "{},{},{},{}\r\n",
                name,
                roll,
                csv_field(grade.subject.as_str()),
                grade.score
            ));
        }
    }

    Ok(out)
}

/// Quote a field if it contains a delimiter, quote or line break.
fn csv_field(raw: &str) -> Cow<'_, str> {
    if raw.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", raw.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::{GradeLedger, Score, Subject, SubjectPolicy};

    fn populated() -> MemoryStore {
        let mut store = MemoryStore::new();
        for (name, roll) in [("Zed", "Z1"), ("Ada, Countess", "A1"), ("Bob", "B1")] {
            StudentDirectory::add_student(
                &mut store,
                StudentName::parse(name).expect("name"),
                RollNumber::parse(roll).expect("roll"),
            )
            .expect("add");
        }
        let ada = RollNumber::parse("A1").expect("roll");
        for (subject, score) in [("Math", "80"), ("Art \"studio\"", "92.5")] {
            GradeLedger::add_grade(
                &mut store,
                &ada,
                Subject::parse(subject).expect("subject"),
                Score::parse(score).expect("score"),
                SubjectPolicy::Append,
            )
            .expect("grade");
        }
        store
    }

    #[test]
    fn csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn export_rows() {
        let csv = export_csv(&populated()).expect("export");
        let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(
            lines,
            vec![
                CSV_HEADER,
                "\"Ada, Countess\",A1,Math,80",
                "\"Ada, Countess\",A1,\"Art \"\"studio\"\"\",92.5",
                "Bob,B1,,",
                "Zed,Z1,,",
            ]
        );
    }

    #[test]
    fn export_empty_store_is_header_only() {
        let csv = export_csv(&MemoryStore::new()).expect("export");
        assert_eq!(csv, format!("{}\r\n", CSV_HEADER));
    }

    #[test]
    fn class_stats_zero_for_ungraded() {
        let stats = class_stats(&populated()).expect("stats");
        let values: Vec<(&str, u64)> = stats
            .iter()
            .map(|s| (s.roll_number.as_str(), s.average_hundredths))
            .collect();
        // (80 + 92.5) / 2 = 86.25
        assert_eq!(values, vec![("A1", 8625), ("B1", 0), ("Z1", 0)]);
    }
}
