//! # CLI Command Implementations

use crate::api;
use crate::config::{Backend, GradebookConfig};
use gradebook_core::{
    Gradebook, GradeId, GradebookError, RollNumber, Score, SortOrder, StudentFilter,
    StudentName, Subject,
};
use std::path::{Path, PathBuf};

/// Print a JSON value the way every command does in `--json-mode`.
fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Validate output path: the parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, GradebookError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        GradebookError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(GradebookError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| GradebookError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: &GradebookConfig, quiet: bool) -> Result<(), GradebookError> {
    let gradebook = config.open_gradebook()?;

    if !quiet {
        println!("Gradebook Server v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("  Host:           {}", config.host);
        println!("  Port:           {}", config.port);
        println!("  Backend:        {}", config.backend);
        println!("  Database:       {}", config.database.display());
        println!("  Subject policy: {}", config.subject_policy);
        println!();
        println!("Press Ctrl+C to stop");
        println!();
    }

    let addr = format!("{}:{}", config.host, config.port);
    api::run_server(&addr, gradebook, config).await
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create an empty database file.
pub fn cmd_init(config: &GradebookConfig, force: bool) -> Result<(), GradebookError> {
    if config.backend == Backend::Memory {
        return Err(GradebookError::InvalidInput(
            "The memory backend has nothing to initialize".to_string(),
        ));
    }

    let path = &config.database;
    if path.exists() {
        if !force {
            return Err(GradebookError::IoError(format!(
                "Database '{}' already exists. Use --force to overwrite.",
                path.display()
            )));
        }
        std::fs::remove_file(path).map_err(|e| {
            GradebookError::IoError(format!("Cannot remove '{}': {}", path.display(), e))
        })?;
        tracing::info!(path = %path.display(), "Existing database removed");
    }

    let _book = Gradebook::with_redb(path)?;
    println!("Initialized new gradebook database at {}", path.display());
    Ok(())
}

// =============================================================================
// STUDENT COMMANDS
// =============================================================================

pub fn cmd_add_student(
    config: &GradebookConfig,
    json_mode: bool,
    name: &str,
    roll: &str,
) -> Result<(), GradebookError> {
    let name = StudentName::parse(name)?;
    let roll_number = RollNumber::parse(roll)?;

    let mut book = config.open_gradebook()?;
    let student = book.add_student(name, roll_number)?;
    tracing::info!(roll_number = %student.roll_number, "Student added");

    if json_mode {
        print_json(&serde_json::json!({
            "name": student.name.as_str(),
            "roll_number": student.roll_number.as_str(),
        }));
    } else {
        println!("Added {} ({})", student.name, student.roll_number);
    }
    Ok(())
}

/// Show one student with grades and average.
pub fn cmd_show(config: &GradebookConfig, json_mode: bool, roll: &str) -> Result<(), GradebookError> {
    let roll_number = RollNumber::parse(roll)?;
    let book = config.open_gradebook()?;
    let record = book.student_record(&roll_number)?;

    if json_mode {
        let response = api::StudentRecordResponse::from(&record);
        print_json(&serde_json::to_value(response).unwrap_or_default());
        return Ok(());
    }

    println!("{} ({})", record.student.name, record.student.roll_number);
    println!("{}", "=".repeat(40));
    if record.grades.is_empty() {
        println!("No grades recorded.");
    }
    for grade in &record.grades {
        println!(
            "  #{:<6} {:<24} {:>6}",
            grade.id.to_string(),
            grade.subject,
            grade.score.to_string()
        );
    }
    if let Some(average) = &record.average {
        println!();
        println!("Average: {}", average);
    }
    Ok(())
}

pub fn cmd_list(
    config: &GradebookConfig,
    json_mode: bool,
    query: Option<String>,
    sort: SortOrder,
) -> Result<(), GradebookError> {
    let book = config.open_gradebook()?;
    let summaries = book.list_students(&StudentFilter::new(query, sort))?;

    if json_mode {
        let rows: Vec<api::StudentSummaryJson> =
            summaries.iter().map(api::StudentSummaryJson::from).collect();
        print_json(&serde_json::to_value(rows).unwrap_or_default());
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No students found.");
        return Ok(());
    }
    println!("{:<12} {:<30} {:>6} {:>10}", "Roll", "Name", "Grades", "Average");
    for summary in &summaries {
        let average = summary
            .average
            .as_ref()
            .map_or_else(|| "-".to_string(), |a| a.to_string());
        println!(
            "{:<12} {:<30} {:>6} {:>10}",
            summary.student.roll_number, summary.student.name, summary.grade_count, average
        );
    }
    Ok(())
}

// =============================================================================
// GRADE COMMANDS
// =============================================================================

pub fn cmd_add_grade(
    config: &GradebookConfig,
    json_mode: bool,
    roll: &str,
    subject: &str,
    score: &str,
) -> Result<(), GradebookError> {
    let roll_number = RollNumber::parse(roll)?;
    let subject = Subject::parse(subject)?;
    let score = Score::parse(score)?;

    let mut book = config.open_gradebook()?;
    let grade = book.add_grade(&roll_number, subject, score)?;
    tracing::info!(
        grade_id = grade.id.0,
        roll_number = %grade.owner,
        subject = %grade.subject,
        "Grade added"
    );

    if json_mode {
        print_json(&serde_json::to_value(api::GradeJson::from(&grade)).unwrap_or_default());
    } else {
        println!(
            "Recorded grade #{}: {} {} for {}",
            grade.id, grade.subject, grade.score, grade.owner
        );
    }
    Ok(())
}

pub fn cmd_grades(
    config: &GradebookConfig,
    json_mode: bool,
    roll: &str,
) -> Result<(), GradebookError> {
    let roll_number = RollNumber::parse(roll)?;
    let book = config.open_gradebook()?;
    let grades = book.get_grades(&roll_number)?;

    if json_mode {
        let rows: Vec<api::GradeJson> = grades.iter().map(api::GradeJson::from).collect();
        print_json(&serde_json::to_value(rows).unwrap_or_default());
        return Ok(());
    }

    if grades.is_empty() {
        println!("No grades recorded for {}.", roll_number);
    }
    for grade in &grades {
        println!(
            "#{:<6} {:<24} {:>6}",
            grade.id.to_string(),
            grade.subject,
            grade.score.to_string()
        );
    }
    Ok(())
}

pub fn cmd_average(
    config: &GradebookConfig,
    json_mode: bool,
    roll: &str,
) -> Result<(), GradebookError> {
    let roll_number = RollNumber::parse(roll)?;
    let book = config.open_gradebook()?;
    let average = book.average(&roll_number)?;

    if json_mode {
        print_json(&serde_json::json!({
            "roll_number": roll_number.as_str(),
            "average": average.to_string(),
            "hundredths": average.hundredths(),
            "grade_count": average.count(),
        }));
    } else {
        println!(
            "Average for {}: {} over {} grade(s)",
            roll_number,
            average,
            average.count()
        );
    }
    Ok(())
}

pub fn cmd_remove_grade(
    config: &GradebookConfig,
    json_mode: bool,
    id: u64,
) -> Result<(), GradebookError> {
    let mut book = config.open_gradebook()?;
    let grade = book.remove_grade(GradeId(id))?;
    tracing::info!(grade_id = id, roll_number = %grade.owner, "Grade removed");

    if json_mode {
        print_json(&serde_json::to_value(api::GradeJson::from(&grade)).unwrap_or_default());
    } else {
        println!(
            "Removed grade #{} ({} {} for {})",
            grade.id, grade.subject, grade.score, grade.owner
        );
    }
    Ok(())
}

// =============================================================================
// REPORT COMMANDS
// =============================================================================

/// Averages of every student, rounded to two decimals.
pub fn cmd_stats(config: &GradebookConfig, json_mode: bool) -> Result<(), GradebookError> {
    let book = config.open_gradebook()?;
    let stats = book.class_stats()?;

    if json_mode {
        print_json(&serde_json::to_value(&stats).unwrap_or_default());
        return Ok(());
    }

    for stat in &stats {
        println!(
            "{:<12} {:<30} {:>3}.{:02}",
            stat.roll_number,
            stat.name,
            stat.average_hundredths / 100,
            stat.average_hundredths % 100
        );
    }
    Ok(())
}

/// Write the CSV export to `output`.
pub fn cmd_export(config: &GradebookConfig, output: &Path) -> Result<(), GradebookError> {
    let output_path = validate_output_path(output)?;
    let book = config.open_gradebook()?;
    let csv = book.export_csv()?;

    std::fs::write(&output_path, csv.as_bytes())
        .map_err(|e| GradebookError::IoError(format!("Cannot write export: {}", e)))?;

    tracing::info!(path = %output_path.display(), bytes = csv.len(), "CSV exported");
    println!("Exported grades to {}", output_path.display());
    Ok(())
}

/// Show student and grade counts.
pub fn cmd_status(config: &GradebookConfig, json_mode: bool) -> Result<(), GradebookError> {
    let book = config.open_gradebook()?;
    let students = book.student_count()?;
    let grades = book.grade_count()?;

    if json_mode {
        print_json(&serde_json::json!({
            "database": config.database.to_string_lossy(),
            "backend": config.backend.to_string(),
            "subject_policy": config.subject_policy.to_string(),
            "student_count": students,
            "grade_count": grades,
        }));
        return Ok(());
    }

    println!("Gradebook Status");
    println!("================");
    println!("Database: {}", config.database.display());
    println!("Backend:  {}", config.backend);
    println!("Policy:   {}", config.subject_policy);
    println!();
    println!("Students: {}", students);
    println!("Grades:   {}", grades);
    Ok(())
}
