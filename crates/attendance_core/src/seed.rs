//! Built-in roster and default semester data.
//!
//! # Responsibility
//! - Provide the fixed student, faculty and credential rosters.
//! - Provide the default semesters used when storage holds none.
//! - Provide the subject catalog used to prefill the semester form.

use crate::model::semester::{Semester, Subject, SubjectAssignment};
use crate::model::student::{Faculty, Student};
use crate::model::user::{Credential, Role};
use chrono::NaiveDate;

/// Mock login roster: three faculty members and one admin.
pub const CREDENTIALS: &[Credential] = &[
    Credential {
        id: "f1",
        email: "faculty1@college.edu",
        password: "faculty123",
        name: "Dr. Sarah Johnson",
        role: Role::Faculty,
    },
    Credential {
        id: "f2",
        email: "faculty2@college.edu",
        password: "faculty123",
        name: "Prof. Michael Chen",
        role: Role::Faculty,
    },
    Credential {
        id: "f3",
        email: "faculty3@college.edu",
        password: "faculty123",
        name: "Dr. Emily Rodriguez",
        role: Role::Faculty,
    },
    Credential {
        id: "a1",
        email: "admin@college.edu",
        password: "admin123",
        name: "Admin User",
        role: Role::Admin,
    },
];

const STUDENT_NAMES: [&str; 30] = [
    "Aarav Sharma",
    "Diya Patel",
    "Arjun Singh",
    "Ananya Reddy",
    "Rohan Kumar",
    "Ishita Gupta",
    "Vihaan Verma",
    "Saanvi Joshi",
    "Aditya Mehta",
    "Kavya Iyer",
    "Reyansh Desai",
    "Myra Agarwal",
    "Ayaan Khan",
    "Kiara Nair",
    "Shaurya Mishra",
    "Aadhya Rao",
    "Vivaan Bhat",
    "Navya Pillai",
    "Kabir Kapoor",
    "Riya Menon",
    "Dhruv Pandey",
    "Anvi Kulkarni",
    "Arnav Bhatt",
    "Siya Srinivasan",
    "Atharv Shah",
    "Prisha Yadav",
    "Sai Chatterjee",
    "Ira Saxena",
    "Yash Malhotra",
    "Tara Banerjee",
];

/// Subject catalog `(id, name, code)` used for form defaults.
pub const SUBJECT_CATALOG: &[(&str, &str, &str)] = &[
    ("sub1", "Data Structures", "CS301"),
    ("sub2", "Database Management", "CS302"),
    ("sub3", "Operating Systems", "CS303"),
    ("sub4", "Computer Networks", "CS304"),
    ("sub5", "Software Engineering", "CS305"),
];

/// Returns the fixed student roster (`s1`..`s30`).
pub fn students() -> Vec<Student> {
    STUDENT_NAMES
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let number = index + 1;
            Student {
                id: format!("s{number}"),
                name: (*name).to_string(),
                email: format!("{}@student.edu", name.to_lowercase().replace(' ', ".")),
                roll_number: format!("CS2024{number:03}"),
            }
        })
        .collect()
}

/// Returns the faculty roster derived from faculty credentials.
pub fn faculties() -> Vec<Faculty> {
    CREDENTIALS
        .iter()
        .filter(|credential| credential.role == Role::Faculty)
        .map(|credential| Faculty {
            id: credential.id.to_string(),
            name: credential.name.to_string(),
            email: credential.email.to_string(),
        })
        .collect()
}

/// Returns the semesters loaded when storage has none.
pub fn default_semesters() -> Vec<Semester> {
    vec![
        Semester {
            id: "sem1".to_string(),
            name: "Fall 2024".to_string(),
            start_date: ymd(2024, 8, 15),
            end_date: ymd(2024, 12, 15),
            subjects: vec![
                subject("sub1", "Data Structures", "f1", 40),
                subject("sub2", "Database Management", "f2", 35),
                subject("sub3", "Operating Systems", "f3", 38),
                subject("sub4", "Computer Networks", "f1", 36),
                subject("sub5", "Software Engineering", "f2", 42),
            ],
        },
        Semester {
            id: "sem2".to_string(),
            name: "Spring 2025".to_string(),
            start_date: ymd(2025, 1, 10),
            end_date: ymd(2025, 5, 15),
            subjects: vec![
                subject("sub6", "Machine Learning", "f1", 40),
                subject("sub7", "Web Development", "f2", 38),
                subject("sub8", "Artificial Intelligence", "f3", 36),
                subject("sub9", "Cloud Computing", "f1", 34),
                subject("sub10", "Cybersecurity", "f3", 40),
            ],
        },
    ]
}

/// Prefilled rows for a semester form with `count` subjects.
///
/// Names come from the catalog, then `Subject N`; faculty rotate through the
/// faculty roster.
pub fn default_subject_assignments(count: usize) -> Vec<SubjectAssignment> {
    let faculties = faculties();
    (0..count)
        .map(|index| SubjectAssignment {
            name: SUBJECT_CATALOG
                .get(index)
                .map_or_else(|| format!("Subject {}", index + 1), |(_, name, _)| {
                    (*name).to_string()
                }),
            faculty_id: faculties
                .get(index % faculties.len().max(1))
                .map(|faculty| faculty.id.clone())
                .unwrap_or_default(),
        })
        .collect()
}

fn subject(id: &str, name: &str, faculty_id: &str, total_periods: u32) -> Subject {
    let faculty_name = CREDENTIALS
        .iter()
        .find(|credential| credential.id == faculty_id)
        .map_or("Unknown", |credential| credential.name);
    Subject {
        id: id.to_string(),
        name: name.to_string(),
        faculty_id: faculty_id.to_string(),
        faculty_name: faculty_name.to_string(),
        total_periods,
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{default_semesters, default_subject_assignments, faculties, students, CREDENTIALS};
    use crate::model::user::Role;

    #[test]
    fn roster_has_three_faculty_and_one_admin() {
        let admins = CREDENTIALS.iter().filter(|c| c.role == Role::Admin).count();
        assert_eq!(CREDENTIALS.len(), 4);
        assert_eq!(admins, 1);
        assert_eq!(faculties().len(), 3);
    }

    #[test]
    fn students_get_stable_ids_and_roll_numbers() {
        let roster = students();
        assert_eq!(roster.len(), 30);
        assert_eq!(roster[0].id, "s1");
        assert_eq!(roster[0].email, "aarav.sharma@student.edu");
        assert_eq!(roster[29].roll_number, "CS2024030");
    }

    #[test]
    fn default_semesters_reference_known_faculty() {
        let faculty_ids: Vec<String> = faculties().into_iter().map(|f| f.id).collect();
        for semester in default_semesters() {
            for subject in semester.subjects {
                assert!(faculty_ids.contains(&subject.faculty_id));
                assert_ne!(subject.faculty_name, "Unknown");
            }
        }
    }

    #[test]
    fn form_defaults_cycle_catalog_then_generic_names() {
        let rows = default_subject_assignments(7);
        assert_eq!(rows[0].name, "Data Structures");
        assert_eq!(rows[5].name, "Subject 6");
        assert_eq!(rows[3].faculty_id, "f1");
        assert_eq!(rows[4].faculty_id, "f2");
    }
}
