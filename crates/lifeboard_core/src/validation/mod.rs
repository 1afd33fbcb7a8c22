//! Input validation schemas for task, goal, journal, profile and
//! dependency forms.
//!
//! # Responsibility
//! - Declare shape and constraints of user input before it reaches storage.
//! - Report every violated field at once, not just the first.
//! - Normalize accepted input (trimmed text, lowercase deduplicated tags).
//!
//! # Invariants
//! - `validate()` is side-effect free.
//! - Conversions into domain records assume `validate()` succeeded.

mod rules;
pub mod schemas;

pub use schemas::{
    DependencyInput, GoalInput, JournalInput, MilestoneInput, ProfileInput, TaskInput,
};

use std::error::Error;
use std::fmt::{Display, Formatter};

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// Validation failure listing every violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-issue error.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut error = Self::new();
        error.push(field, message);
        error
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(FieldIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns `true` when `field` has at least one issue.
    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }

    /// `Ok(())` when no issue was recorded.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed:")?;
        for (idx, issue) in self.issues.iter().enumerate() {
            let separator = if idx == 0 { " " } else { "; " };
            write!(f, "{separator}{}: {}", issue.field, issue.message)?;
        }
        Ok(())
    }
}

impl Error for ValidationError {}
