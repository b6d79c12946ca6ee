use crate::domain::model::{Student, StudentDraft, StudentId};
use crate::utils::error::{BusMapError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub const FIELD_FIRST_NAME: &str = "firstName";
pub const FIELD_LAST_NAME: &str = "lastName";
pub const FIELD_STOP_NUMBER: &str = "stopNumber";
pub const FIELD_ROUTES: &str = "routes";
/// Form-level key, used for duplicate names.
pub const FIELD_STUDENT: &str = "student";

const STOP_MIN: i64 = 1;
const STOP_MAX: i64 = 999;

static NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s\-']+$").expect("name charset pattern"));
static CONSECUTIVE_SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\-']{2,}").expect("consecutive separator pattern"));
static EDGE_SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\-'\s]|[\-'\s]$").expect("edge separator pattern"));

/// Field-keyed messages from a whole-form check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn record(&mut self, outcome: Result<()>) {
        match outcome {
            Ok(()) => {}
            Err(BusMapError::ValidationError { field, message }) => {
                self.errors.entry(field).or_insert(message);
            }
            Err(BusMapError::DuplicateError { message }) => {
                self.errors.entry(FIELD_STUDENT.to_string()).or_insert(message);
            }
            Err(other) => {
                self.errors
                    .entry(FIELD_STUDENT.to_string())
                    .or_insert_with(|| other.to_string());
            }
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.values().map(String::as_str).collect();
        f.write_str(&messages.join("; "))
    }
}

fn field_error(field: &str, message: String) -> BusMapError {
    BusMapError::ValidationError {
        field: field.to_string(),
        message,
    }
}

/// Checks a first or last name. `field_label` is the human label used in the
/// message ("First name"); `field` is the key the error is reported under.
/// Rules are applied in order and the first failure is returned.
pub fn validate_name(field: &str, value: &str, field_label: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(field_error(field, format!("{} is required", field_label)));
    }

    let letter_count = value.chars().filter(|c| c.is_ascii_alphabetic()).count();
    if letter_count < 2 {
        return Err(field_error(
            field,
            format!("{} must contain at least 2 letters", field_label),
        ));
    }

    if !NAME_CHARS.is_match(value) {
        return Err(field_error(
            field,
            format!(
                "{} can only contain letters, spaces, hyphens and apostrophes",
                field_label
            ),
        ));
    }

    if CONSECUTIVE_SPECIAL.is_match(value) {
        return Err(field_error(
            field,
            format!("{} cannot contain consecutive hyphens or apostrophes", field_label),
        ));
    }

    if EDGE_SPECIAL.is_match(value) {
        return Err(field_error(
            field,
            format!(
                "{} cannot start or end with hyphens, apostrophes, or spaces",
                field_label
            ),
        ));
    }

    Ok(())
}

pub fn validate_stop_number(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(field_error(FIELD_STOP_NUMBER, "Stop number is required".to_string()));
    }

    // Negative input gets its own message, even when it would also be out of range.
    if value.contains('-') {
        return Err(field_error(
            FIELD_STOP_NUMBER,
            "Stop number cannot be negative".to_string(),
        ));
    }

    match value.trim().parse::<i64>() {
        Ok(stop) if (STOP_MIN..=STOP_MAX).contains(&stop) => Ok(()),
        _ => Err(field_error(
            FIELD_STOP_NUMBER,
            format!("Stop number must be between {} and {}", STOP_MIN, STOP_MAX),
        )),
    }
}

pub fn validate_routes(am_route: bool, pm_route: bool) -> Result<()> {
    if !am_route && !pm_route {
        return Err(field_error(
            FIELD_ROUTES,
            "Student must be assigned to at least one route".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_duplicate_student(
    candidate: &StudentDraft,
    existing: &[Student],
    exclude_id: Option<StudentId>,
) -> Result<()> {
    let first = candidate.first_name.to_lowercase();
    let last = candidate.last_name.to_lowercase();

    let is_duplicate = existing.iter().any(|student| {
        Some(student.id) != exclude_id
            && student.first_name.to_lowercase() == first
            && student.last_name.to_lowercase() == last
    });

    if is_duplicate {
        return Err(BusMapError::DuplicateError {
            message: "A student with this name already exists".to_string(),
        });
    }
    Ok(())
}

fn collect_field_errors(draft: &StudentDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    errors.record(validate_name(FIELD_FIRST_NAME, &draft.first_name, "First name"));
    errors.record(validate_name(FIELD_LAST_NAME, &draft.last_name, "Last name"));
    errors.record(validate_stop_number(&draft.stop_number));
    errors.record(validate_routes(draft.am_route, draft.pm_route));
    errors
}

/// Whole-form check: every field rule plus the duplicate-name rule against
/// `existing`. `exclude_id` is the student being edited, if any.
pub fn validate_student(
    draft: &StudentDraft,
    existing: &[Student],
    exclude_id: Option<StudentId>,
) -> Result<()> {
    let mut errors = collect_field_errors(draft);
    errors.record(validate_duplicate_student(draft, existing, exclude_id));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(BusMapError::InvalidStudent(errors))
    }
}

/// Roster-independent checks only; use [`validate_student`] before submitting.
impl Validate for StudentDraft {
    fn validate(&self) -> Result<()> {
        let errors = collect_field_errors(self);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(BusMapError::InvalidStudent(errors))
        }
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(BusMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(BusMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BusMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
