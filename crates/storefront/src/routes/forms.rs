//! Field-level form errors for re-rendered forms.

use std::collections::BTreeMap;

/// Error messages keyed by form field name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error. The first error for a field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Record the error of `result`, if any, and pass its value through.
    pub fn check<T, E: ToString>(&mut self, field: &'static str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.add(field, e.to_string());
                None
            }
        }
    }

    /// Require a non-blank value no longer than `max` characters.
    pub fn required<'v>(&mut self, field: &'static str, value: &'v str, max: usize) -> Option<&'v str> {
        let value = value.trim();
        if value.is_empty() {
            self.add(field, "This field is required.");
            None
        } else if value.chars().count() > max {
            self.add(
                field,
                format!("Ensure this value has at most {max} characters."),
            );
            None
        } else {
            Some(value)
        }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_error_wins() {
        let mut errors = FormErrors::new();
        errors.add("city", "first");
        errors.add("city", "second");
        assert_eq!(errors.get("city"), Some("first"));
        assert_eq!(errors.get("state"), None);
    }

    #[test]
    fn test_required() {
        let mut errors = FormErrors::new();
        assert_eq!(errors.required("a", "  x ", 5), Some("x"));
        assert_eq!(errors.required("b", "   ", 5), None);
        assert_eq!(errors.required("c", "toolong", 5), None);
        assert_eq!(errors.get("b"), Some("This field is required."));
        assert_eq!(
            errors.get("c"),
            Some("Ensure this value has at most 5 characters.")
        );
    }

    #[test]
    fn test_check_records_display_text() {
        let mut errors = FormErrors::new();
        let parsed: Option<u8> = errors.check("qty", "x".parse::<u8>());
        assert!(parsed.is_none());
        assert!(!errors.is_empty());
    }
}
