//! Request bodies and field-level validation. Limits here are presentation rules;
//! the use case still enforces its own (non-empty title, known priority).

use crate::domain::{Priority, TodoChanges, TodoDraft};
use serde::{Deserialize, Serialize};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

impl ValidationErrorDetail {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub completed: Option<bool>,
}

fn check_max(
    errors: &mut Vec<ValidationErrorDetail>,
    field: &str,
    value: Option<&str>,
    max: usize,
) {
    if value.is_some_and(|v| v.chars().count() > max) {
        errors.push(ValidationErrorDetail::new(
            field,
            format!("{} must be at most {} characters", field, max),
        ));
    }
}

fn check_priority(errors: &mut Vec<ValidationErrorDetail>, value: Option<&str>) {
    if Priority::parse_optional(value).is_err() {
        errors.push(ValidationErrorDetail::new(
            "priority",
            "priority must be one of low, medium, high",
        ));
    }
}

impl CreateTodoRequest {
    pub fn validate(&self) -> Vec<ValidationErrorDetail> {
        let mut errors = Vec::new();
        if self.title.is_empty() {
            errors.push(ValidationErrorDetail::new("title", "title is required"));
        }
        check_max(&mut errors, "title", Some(self.title.as_str()), TITLE_MAX_CHARS);
        check_max(
            &mut errors,
            "description",
            Some(self.description.as_str()),
            DESCRIPTION_MAX_CHARS,
        );
        check_priority(&mut errors, self.priority.as_deref());
        errors
    }

    pub fn into_draft(self) -> TodoDraft {
        TodoDraft {
            title: self.title,
            description: self.description,
            priority: self.priority,
            completed: None,
        }
    }
}

impl UpdateTodoRequest {
    pub fn validate(&self) -> Vec<ValidationErrorDetail> {
        let mut errors = Vec::new();
        check_max(&mut errors, "title", self.title.as_deref(), TITLE_MAX_CHARS);
        check_max(
            &mut errors,
            "description",
            self.description.as_deref(),
            DESCRIPTION_MAX_CHARS,
        );
        check_priority(&mut errors, self.priority.as_deref());
        errors
    }

    pub fn into_changes(self) -> TodoChanges {
        TodoChanges {
            title: self.title,
            description: self.description,
            priority: self.priority,
            completed: self.completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_title_and_limits_lengths() {
        let req = CreateTodoRequest {
            title: String::new(),
            description: "d".repeat(DESCRIPTION_MAX_CHARS + 1),
            priority: Some("urgent".into()),
        };
        let fields: Vec<String> = req.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["title", "description", "priority"]);
    }

    #[test]
    fn test_create_accepts_boundary_lengths() {
        let req = CreateTodoRequest {
            title: "t".repeat(TITLE_MAX_CHARS),
            description: "d".repeat(DESCRIPTION_MAX_CHARS),
            priority: Some(String::new()),
        };
        assert!(req.validate().is_empty());
    }

    #[test]
    fn test_title_length_counts_characters_not_bytes() {
        let req = CreateTodoRequest {
            title: "é".repeat(TITLE_MAX_CHARS),
            description: String::new(),
            priority: None,
        };
        assert!(req.validate().is_empty());
    }

    #[test]
    fn test_update_allows_all_fields_absent() {
        let req = UpdateTodoRequest {
            title: None,
            description: None,
            priority: None,
            completed: None,
        };
        assert!(req.validate().is_empty());
    }

    #[test]
    fn test_update_rejects_long_title() {
        let req = UpdateTodoRequest {
            title: Some("t".repeat(TITLE_MAX_CHARS + 1)),
            description: None,
            priority: None,
            completed: Some(true),
        };
        let errors = req.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "title");
    }
}
