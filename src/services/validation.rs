use crate::models::{FieldRule, FormConfig};
use indexmap::IndexMap;
use regex::Regex;
use thiserror::Error;

/// Why a single field failed validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("value is required")]
    EmptyRequired,

    #[error("value has {actual} characters, at least {min} required")]
    TooShort { min: usize, actual: usize },

    #[error("value does not match the expected format")]
    PatternMismatch,
}

/// Errors raised while compiling field rules from configuration
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Form defines no fields")]
    NoFields,

    #[error("Invalid pattern for field {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
}

/// Outcome of validating one field. Ephemeral: computed per call, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub error: Option<ValidationError>,
    /// Text to display next to the field
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            error: None,
            message: None,
        }
    }

    /// A failed result. An empty `message` falls back to the error's own description so
    /// a failed field never displays an empty error.
    pub fn invalid(error: ValidationError, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            error.to_string()
        } else {
            message
        };

        Self {
            valid: false,
            error: Some(error),
            message: Some(message),
        }
    }
}

/// Compiled, static definition of one field
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub required: bool,
    pub min_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub message: String,
}

impl FieldDefinition {
    fn from_rule(name: &str, rule: &FieldRule) -> Result<Self, RuleError> {
        let pattern = rule
            .pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|source| RuleError::InvalidPattern {
                field: name.to_string(),
                source,
            })?;

        Ok(Self {
            name: name.to_string(),
            required: rule.required,
            min_length: rule.min_length,
            pattern,
            message: rule.message.clone(),
        })
    }

    /// Check a raw value against this field's rules.
    ///
    /// The value is trimmed first. Rules run in a fixed order and the first failure wins:
    /// 1. required and empty → [`ValidationError::EmptyRequired`]
    /// 2. empty and optional → valid, remaining rules skipped
    /// 3. shorter than `min_length` (in characters) → [`ValidationError::TooShort`]
    /// 4. pattern does not match → [`ValidationError::PatternMismatch`]
    ///
    /// Length is counted in Unicode scalar values, not UTF-16 code units, so an emoji
    /// outside the BMP counts as one character where a browser would count two.
    /// Trimming uses `str::trim` (Unicode `White_Space`), which keeps U+FEFF; a value
    /// made of a byte order mark alone is therefore not empty.
    pub fn check(&self, raw: &str, required_message: &str) -> ValidationResult {
        let value = raw.trim();

        if value.is_empty() {
            return if self.required {
                ValidationResult::invalid(ValidationError::EmptyRequired, required_message)
            } else {
                ValidationResult::valid()
            };
        }

        if let Some(min) = self.min_length {
            let actual = value.chars().count();
            if actual < min {
                return ValidationResult::invalid(
                    ValidationError::TooShort { min, actual },
                    &self.message,
                );
            }
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(value) {
                return ValidationResult::invalid(ValidationError::PatternMismatch, &self.message);
            }
        }

        ValidationResult::valid()
    }
}

/// Validation rules for a whole form.
///
/// Patterns are compiled once at construction. Fields keep the configuration's
/// insertion order, which is also the order [`FormValidator::fields`] yields them.
#[derive(Debug, Clone)]
pub struct FormValidator {
    fields: IndexMap<String, FieldDefinition>,
    required_message: String,
}

impl FormValidator {
    /// Compile the field rules of a form configuration
    pub fn from_config(config: &FormConfig) -> Result<Self, RuleError> {
        if config.fields.is_empty() {
            return Err(RuleError::NoFields);
        }

        let fields = config
            .fields
            .iter()
            .map(|(name, rule)| Ok((name.clone(), FieldDefinition::from_rule(name, rule)?)))
            .collect::<Result<IndexMap<_, _>, RuleError>>()?;

        tracing::debug!("Compiled validation rules for {} fields", fields.len());

        Ok(Self {
            fields,
            required_message: config.messages.required.clone(),
        })
    }

    /// Validate a raw value for the named field. Returns `None` for unknown fields.
    pub fn validate(&self, field: &str, raw: &str) -> Option<ValidationResult> {
        self.fields
            .get(field)
            .map(|definition| definition.check(raw, &self.required_message))
    }

    pub fn definition(&self, field: &str) -> Option<&FieldDefinition> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Field names in form order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn first_field(&self) -> Option<&str> {
        self.fields().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn validator() -> FormValidator {
        FormValidator::from_config(&FormConfig::default()).unwrap()
    }

    fn error_of(field: &str, value: &str) -> Option<ValidationError> {
        validator().validate(field, value).unwrap().error
    }

    #[test]
    fn test_required_empty_fails() {
        let result = validator().validate("name", "").unwrap();
        assert!(!result.valid);
        assert_eq!(result.error, Some(ValidationError::EmptyRequired));
        assert_eq!(result.message.as_deref(), Some("This field is required."));
    }

    #[test]
    fn test_whitespace_only_counts_as_empty() {
        assert_eq!(
            error_of("surname", "   \t "),
            Some(ValidationError::EmptyRequired)
        );
    }

    #[test]
    fn test_min_length_boundary() {
        assert_eq!(
            error_of("name", "A"),
            Some(ValidationError::TooShort { min: 2, actual: 1 })
        );
        assert_eq!(error_of("name", "Al"), None);

        assert_eq!(
            error_of("message", "123456789"),
            Some(ValidationError::TooShort { min: 10, actual: 9 })
        );
        assert_eq!(error_of("message", "1234567890"), None);
    }

    #[test]
    fn test_length_is_measured_after_trim() {
        assert_eq!(
            error_of("name", "  A  "),
            Some(ValidationError::TooShort { min: 2, actual: 1 })
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // Two Hangul syllables are six bytes but two characters
        assert_eq!(error_of("name", "민수"), None);
        assert_eq!(
            error_of("name", "민"),
            Some(ValidationError::TooShort { min: 2, actual: 1 })
        );
    }

    #[test]
    fn test_astral_characters_count_once() {
        // One scalar value, two UTF-16 code units
        assert_eq!(
            error_of("name", "😀"),
            Some(ValidationError::TooShort { min: 2, actual: 1 })
        );
        assert_eq!(error_of("name", "😀😀"), None);
    }

    #[test]
    fn test_byte_order_mark_is_not_trimmed() {
        assert_eq!(
            error_of("name", " \u{FEFF} "),
            Some(ValidationError::TooShort { min: 2, actual: 1 })
        );
    }

    #[test]
    fn test_email_pattern() {
        assert_eq!(error_of("email", "user@example.com"), None);
        assert_eq!(
            error_of("email", "user@@example"),
            Some(ValidationError::PatternMismatch)
        );
        assert_eq!(
            error_of("email", "userexample.com"),
            Some(ValidationError::PatternMismatch)
        );
        assert_eq!(error_of("email", ""), Some(ValidationError::EmptyRequired));
    }

    #[test]
    fn test_failure_uses_field_message() {
        let result = validator().validate("email", "nope").unwrap();
        assert_eq!(
            result.message.as_deref(),
            Some("Please enter a valid email address.")
        );
    }

    #[test]
    fn test_optional_empty_short_circuits() {
        let mut config = FormConfig::default();
        config.fields.insert(
            "website".to_string(),
            FieldRule {
                required: false,
                min_length: Some(5),
                pattern: Some(r"^https?://".to_string()),
                message: "Enter a URL.".to_string(),
            },
        );
        let validator = FormValidator::from_config(&config).unwrap();

        assert!(validator.validate("website", "  ").unwrap().valid);
        assert_eq!(
            validator.validate("website", "ftp").unwrap().error,
            Some(ValidationError::TooShort { min: 5, actual: 3 })
        );
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let mut config = FormConfig::default();
        config.fields["email"].min_length = Some(6);
        let validator = FormValidator::from_config(&config).unwrap();

        // Too short and no '@': the length check runs first
        assert_eq!(
            validator.validate("email", "abc").unwrap().error,
            Some(ValidationError::TooShort { min: 6, actual: 3 })
        );
    }

    #[test]
    fn test_empty_message_falls_back_to_error_text() {
        let mut config = FormConfig::default();
        config.fields["surname"].message = String::new();
        let validator = FormValidator::from_config(&config).unwrap();

        let result = validator.validate("surname", "S").unwrap();
        assert_eq!(
            result.message.as_deref(),
            Some("value has 1 characters, at least 2 required")
        );
    }

    #[test]
    fn test_unknown_field() {
        assert!(validator().validate("phone", "123").is_none());
        assert!(!validator().contains("phone"));
    }

    #[test]
    fn test_field_order_follows_config() {
        let validator = validator();
        let names: Vec<&str> = validator.fields().collect();
        assert_eq!(names, vec!["name", "surname", "email", "message"]);
        assert_eq!(validator.first_field(), Some("name"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut config = FormConfig::default();
        config.fields["email"].pattern = Some("([unclosed".to_string());

        let err = FormValidator::from_config(&config).unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { ref field, .. } if field == "email"));
    }

    #[test]
    fn test_empty_form_rejected() {
        let mut config = FormConfig::default();
        config.fields.clear();
        assert!(matches!(
            FormValidator::from_config(&config),
            Err(RuleError::NoFields)
        ));
    }

    proptest! {
        #[test]
        fn prop_whitespace_only_is_empty_required(value in "[ \t\n]{0,12}") {
            prop_assert_eq!(error_of("message", &value), Some(ValidationError::EmptyRequired));
        }

        #[test]
        fn prop_names_at_least_two_chars_are_valid(value in "[A-Za-z]{2,40}") {
            prop_assert!(validator().validate("name", &value).unwrap().valid);
        }

        #[test]
        fn prop_short_messages_are_too_short(value in "[a-z]{1,9}") {
            let is_too_short = matches!(
                error_of("message", &value),
                Some(ValidationError::TooShort { min: 10, .. })
            );
            prop_assert!(is_too_short);
        }
    }
}
