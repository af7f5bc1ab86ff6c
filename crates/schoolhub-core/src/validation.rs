//! Form validation rules, checked before a write is sent.
//!
//! Every rule failure is collected so a form can show all problems at once.
//! Validation never touches the network; a failed check surfaces as
//! `ApiError::Validation`.

use std::fmt;

use crate::models::{
    AnnouncementInput, AttendanceInput, CalendarEventInput, GradeLevelInput, MessageInput, ParentInput,
    PersonInput, ScoreInput, SectionInput, StudentInput, SubjectInput, TeacherInput,
};

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_TITLE_LENGTH: usize = 120;
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Upper bounds for each score component (lower bound is always 0).
pub const TEST1_MAX: f64 = 10.0;
pub const TEST2_MAX: f64 = 10.0;
pub const MID_MAX: f64 = 20.0;
pub const FINAL_MAX: f64 = 40.0;
pub const ASSIGNMENT_MAX: f64 = 10.0;
pub const QUIZ_MAX: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "Validation failed: {}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages for one field, in the order they were raised
    pub fn for_field(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn required(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "is required");
        }
    }

    pub fn max_len(&mut self, field: &'static str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(field, format!("must be at most {} characters", max));
        }
    }

    pub fn email(&mut self, field: &'static str, value: &str) {
        let value = value.trim();
        let valid = match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
            }
            None => false,
        };
        if !valid {
            self.add(field, "must be a valid email address");
        }
    }

    pub fn range(&mut self, field: &'static str, value: Option<f64>, min: f64, max: f64) {
        if let Some(v) = value {
            if !v.is_finite() || v < min || v > max {
                self.add(field, format!("must be between {} and {}", min, max));
            }
        }
    }

    pub fn positive_id(&mut self, field: &'static str, id: i64) {
        if id <= 0 {
            self.add(field, "must be selected");
        }
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

impl PersonInput {
    /// Password rules apply on create, or on update when a new one is typed.
    fn check(&self, errors: &mut ValidationErrors, creating: bool) {
        errors.required("firstName", &self.first_name);
        errors.max_len("firstName", &self.first_name, MAX_NAME_LENGTH);
        errors.required("lastName", &self.last_name);
        errors.max_len("lastName", &self.last_name, MAX_NAME_LENGTH);
        errors.email("email", &self.email);

        if creating || !self.password.is_empty() {
            if self.password.chars().count() < MIN_PASSWORD_LENGTH {
                errors.add(
                    "password",
                    format!("must be at least {} characters", MIN_PASSWORD_LENGTH),
                );
            }
            if self.password != self.confirm_password {
                errors.add("confirmPassword", "passwords do not match");
            }
        }
    }

    pub fn validate_create(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.check(&mut errors, true);
        errors.into_result()
    }

    pub fn validate_update(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.check(&mut errors, false);
        errors.into_result()
    }
}

impl StudentInput {
    pub fn validate_for(&self, creating: bool) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.person.check(&mut errors, creating);
        if let Some(id) = self.section_id {
            errors.positive_id("sectionId", id);
        }
        errors.into_result()
    }
}

impl ParentInput {
    pub fn validate_for(&self, creating: bool) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.person.check(&mut errors, creating);
        errors.into_result()
    }
}

impl TeacherInput {
    pub fn validate_for(&self, creating: bool) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.person.check(&mut errors, creating);
        errors.into_result()
    }
}

impl Validate for ScoreInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.positive_id("studentId", self.student_id);
        errors.positive_id("subjectId", self.subject_id);
        errors.range("test1", self.test1, 0.0, TEST1_MAX);
        errors.range("test2", self.test2, 0.0, TEST2_MAX);
        errors.range("mid", self.mid, 0.0, MID_MAX);
        errors.range("final", self.final_exam, 0.0, FINAL_MAX);
        errors.range("assignment", self.assignment, 0.0, ASSIGNMENT_MAX);
        errors.range("quiz", self.quiz, 0.0, QUIZ_MAX);
        errors.into_result()
    }
}

impl Validate for AnnouncementInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required("title", &self.title);
        errors.max_len("title", &self.title, MAX_TITLE_LENGTH);
        errors.required("content", &self.content);
        errors.into_result()
    }
}

impl Validate for CalendarEventInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required("title", &self.title);
        errors.max_len("title", &self.title, MAX_TITLE_LENGTH);
        if let Some(end) = self.end_date {
            if end < self.start_date {
                errors.add("endDate", "must not be before the start date");
            }
        }
        errors.into_result()
    }
}

impl Validate for MessageInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.positive_id("receiverId", self.receiver_id);
        if self.attachment.is_none() {
            errors.required("content", &self.content);
        }
        errors.max_len("content", &self.content, MAX_MESSAGE_LENGTH);
        errors.into_result()
    }
}

impl Validate for GradeLevelInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !(1..=12).contains(&self.level) {
            errors.add("level", "must be between 1 and 12");
        }
        errors.into_result()
    }
}

impl Validate for SubjectInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required("name", &self.name);
        errors.max_len("name", &self.name, MAX_NAME_LENGTH);
        errors.positive_id("gradeLevelId", self.grade_level_id);
        errors.into_result()
    }
}

impl Validate for SectionInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required("name", &self.name);
        errors.max_len("name", &self.name, MAX_NAME_LENGTH);
        errors.positive_id("gradeLevelId", self.grade_level_id);
        errors.into_result()
    }
}

impl Validate for AttendanceInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.positive_id("sectionId", self.section_id);
        if self.records.is_empty() {
            errors.add("records", "must mark at least one student");
        }
        errors.into_result()
    }
}
