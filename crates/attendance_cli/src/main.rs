//! Attendance report entry point.
//!
//! # Responsibility
//! - Open storage and stores from CLI/env configuration.
//! - Print the semester report for the chosen (or active) semester.

mod config;

use anyhow::{anyhow, Context};
use attendance_core::db::open_db;
use attendance_core::service::metrics::{
    low_attendance_students, semester_overview, subject_wise_attendance,
};
use attendance_core::{
    init_logging, AttendanceRecord, AttendanceStore, CoreConfig, IdentityStore, KvRepository,
    MemoryKvRepository, Role, Semester, SqliteKvRepository,
};
use clap::Parser;
use config::Config;
use log::info;
use std::io::{self, Write};

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    let core = config.core();

    if let Some(log_dir) = &core.log_dir {
        init_logging(&core.log_level, log_dir).map_err(|err| anyhow!("{err}"))?;
    }
    info!(
        "event=cli_start module=cli status=ok version={}",
        attendance_core::core_version()
    );

    match &core.db_path {
        Some(path) => {
            let conn = open_db(path)
                .with_context(|| format!("failed to open database `{}`", path.display()))?;
            let repo = SqliteKvRepository::try_new(&conn)?;
            run(&repo, &config, &core, &mut io::stdout().lock())
        }
        None => run(
            &MemoryKvRepository::new(),
            &config,
            &core,
            &mut io::stdout().lock(),
        ),
    }
}

/// Prints the report for the configured semester to `out`.
///
/// Faculty sessions only see their own subjects.
fn run(
    repo: &dyn KvRepository,
    config: &Config,
    core: &CoreConfig,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut identity = IdentityStore::open(repo);
    if let (Some(email), Some(password)) = (&config.email, &config.password) {
        identity.authenticate(email, password)?;
    }
    let store = AttendanceStore::open(repo)?;

    let semester = match &config.semester {
        Some(id) => Some(
            store
                .semester(id)
                .with_context(|| format!("semester `{id}` not found"))?,
        ),
        None => store.active_semester(),
    };
    let Some(semester) = semester else {
        writeln!(out, "no semesters configured")?;
        return Ok(());
    };

    match identity.current_user() {
        Some(user) => writeln!(out, "user: {} ({})", user.name, user.role.as_str())?,
        None => writeln!(out, "user: (not signed in)")?,
    }
    writeln!(
        out,
        "semester: {} [{}] {} .. {}",
        semester.name, semester.id, semester.start_date, semester.end_date
    )?;

    let overview = semester_overview(store.students(), Some(semester), store.attendance());
    writeln!(
        out,
        "students={} subjects={} average={:.1}%",
        overview.total_students, overview.total_subjects, overview.average_attendance
    )?;

    let faculty_id = identity
        .current_user()
        .filter(|user| user.role == Role::Faculty)
        .map(|user| user.id.clone());
    print_subjects(out, semester, store.attendance(), faculty_id.as_deref())?;

    let flagged = low_attendance_students(
        store.students(),
        store.attendance(),
        &semester.id,
        core.threshold(),
    );
    writeln!(out)?;
    writeln!(out, "below {:.0}%: {}", core.threshold(), flagged.len())?;
    for entry in flagged {
        writeln!(
            out,
            "  {:<12} {:<24} {:>5.1}%",
            entry.student.roll_number, entry.student.name, entry.percentage
        )?;
    }
    Ok(())
}

fn print_subjects(
    out: &mut dyn Write,
    semester: &Semester,
    records: &[AttendanceRecord],
    faculty_id: Option<&str>,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{:<8} {:<28} {:>8} {:>8} {:>5}",
        "id", "subject", "periods", "records", "%"
    )?;
    for row in subject_wise_attendance(semester, records) {
        let Some(subject) = semester.subject(&row.subject_id) else {
            continue;
        };
        if faculty_id.is_some_and(|id| subject.faculty_id != id) {
            continue;
        }
        let periods = if subject.periods_configured() {
            subject.total_periods.to_string()
        } else {
            "-".to_string()
        };
        writeln!(
            out,
            "{:<8} {:<28} {:>8} {:>8} {:>5}",
            row.subject_id,
            row.subject_name,
            periods,
            row.record_count,
            row.rounded_percentage()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::config::Config;
    use attendance_core::{AttendanceStore, MemoryKvRepository};
    use clap::Parser;

    fn report(kv: &MemoryKvRepository, args: &[&str]) -> String {
        let config = Config::parse_from(std::iter::once("attendance").chain(args.iter().copied()));
        let mut out = Vec::new();
        run(kv, &config, &config.core(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn subject_rows(report: &str) -> Vec<&str> {
        report.lines().filter(|line| line.starts_with("sub")).collect()
    }

    #[test]
    fn faculty_report_lists_only_their_subjects() {
        let kv = MemoryKvRepository::new();
        {
            let mut store = AttendanceStore::open(&kv).unwrap();
            store.update_subject_periods("sem1", "sub2", 0).unwrap();
        }

        let output = report(
            &kv,
            &[
                "--email",
                "faculty2@college.edu",
                "--password",
                "faculty123",
                "--semester",
                "sem1",
            ],
        );

        assert!(output.contains("user: Prof. Michael Chen (faculty)"));
        let rows = subject_rows(&output);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("sub2"));
        assert!(rows[0].split_whitespace().any(|cell| cell == "-"));
        assert!(rows[1].starts_with("sub5"));
    }

    #[test]
    fn anonymous_report_lists_every_subject() {
        let kv = MemoryKvRepository::new();
        let output = report(&kv, &["--semester", "sem2"]);

        assert!(output.contains("user: (not signed in)"));
        assert!(output.contains("semester: Spring 2025 [sem2]"));
        assert_eq!(subject_rows(&output).len(), 5);
        assert!(output.contains("below 75%: 0"));
    }

    #[test]
    fn unknown_semester_is_an_error() {
        let kv = MemoryKvRepository::new();
        let config = Config::parse_from(["attendance", "--semester", "sem9"]);
        let mut out = Vec::new();

        let err = run(&kv, &config, &config.core(), &mut out).unwrap_err();
        assert!(err.to_string().contains("sem9"));
    }
}
