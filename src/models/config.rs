use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Email pattern used by the default form definition.
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Form configuration from `Contact Form.yaml`
///
/// Contains the field rules (in display order), user-facing texts and runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(rename = "Fields")]
    pub fields: IndexMap<String, FieldRule>,

    #[serde(rename = "Messages", default)]
    pub messages: Messages,

    #[serde(rename = "Settings", default)]
    pub settings: FormSettings,
}

/// Validation rule for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub min_length: Option<usize>,

    #[serde(default)]
    pub pattern: Option<String>,

    /// Shown when the length or pattern check fails
    #[serde(default)]
    pub message: String,
}

/// User-facing texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Messages {
    #[serde(rename = "Required", default = "default_required")]
    pub required: String,

    #[serde(rename = "Submit Success", default = "default_submit_success")]
    pub submit_success: String,

    #[serde(rename = "Submit Failure", default = "default_submit_failure")]
    pub submit_failure: String,

    #[serde(rename = "Cancel Confirm", default = "default_cancel_confirm")]
    pub cancel_confirm: String,

    #[serde(rename = "Submit Label", default = "default_submit_label")]
    pub submit_label: String,

    #[serde(rename = "Submitting Label", default = "default_submitting_label")]
    pub submitting_label: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            required: default_required(),
            submit_success: default_submit_success(),
            submit_failure: default_submit_failure(),
            cancel_confirm: default_cancel_confirm(),
            submit_label: default_submit_label(),
            submitting_label: default_submitting_label(),
        }
    }
}

fn default_required() -> String {
    "This field is required.".to_string()
}

fn default_submit_success() -> String {
    "Your message was sent successfully!".to_string()
}

fn default_submit_failure() -> String {
    "Something went wrong while sending. Please try again.".to_string()
}

fn default_cancel_confirm() -> String {
    "Everything you have entered will be discarded. Continue?".to_string()
}

fn default_submit_label() -> String {
    "Submit".to_string()
}

fn default_submitting_label() -> String {
    "Sending...".to_string()
}

/// Runtime settings. These are the only values that can be overridden from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSettings {
    #[serde(default)]
    pub debug_mode: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default)]
    pub endpoint: EndpointSettings,

    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            debug_mode: false,
            log_dir: default_log_dir(),
            endpoint: EndpointSettings::default(),
            notifications: NotificationSettings::default(),
        }
    }
}

fn default_log_dir() -> String {
    "logs".to_string()
}

/// Settings for the simulated submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSettings {
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Reject every submission (for exercising the failure path)
    #[serde(default)]
    pub fail_submissions: bool,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            fail_submissions: false,
        }
    }
}

fn default_latency_ms() -> u64 {
    2000
}

/// Banner auto-dismiss durations, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_success_secs")]
    pub success_secs: u64,

    #[serde(default = "default_failure_secs")]
    pub failure_secs: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            success_secs: default_success_secs(),
            failure_secs: default_failure_secs(),
        }
    }
}

fn default_success_secs() -> u64 {
    3
}

fn default_failure_secs() -> u64 {
    5
}

impl Default for FormConfig {
    fn default() -> Self {
        let mut fields = IndexMap::new();
        fields.insert(
            "name".to_string(),
            FieldRule {
                required: true,
                min_length: Some(2),
                pattern: None,
                message: "Name must be at least 2 characters.".to_string(),
            },
        );
        fields.insert(
            "surname".to_string(),
            FieldRule {
                required: true,
                min_length: Some(2),
                pattern: None,
                message: "Surname must be at least 2 characters.".to_string(),
            },
        );
        fields.insert(
            "email".to_string(),
            FieldRule {
                required: true,
                min_length: None,
                pattern: Some(EMAIL_PATTERN.to_string()),
                message: "Please enter a valid email address.".to_string(),
            },
        );
        fields.insert(
            "message".to_string(),
            FieldRule {
                required: true,
                min_length: Some(10),
                pattern: None,
                message: "Message must be at least 10 characters.".to_string(),
            },
        );

        Self {
            fields,
            messages: Messages::default(),
            settings: FormSettings::default(),
        }
    }
}

impl FormConfig {
    /// Get the rule for a field by name
    pub fn get_rule(&self, field: &str) -> Option<&FieldRule> {
        self.fields.get(field)
    }

    /// Name of the field that receives focus after a reset
    pub fn first_field(&self) -> Option<&str> {
        self.fields.keys().next().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fields_in_form_order() {
        let config = FormConfig::default();
        let names: Vec<&str> = config.fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["name", "surname", "email", "message"]);
        assert_eq!(config.first_field(), Some("name"));
    }

    #[test]
    fn test_default_rules() {
        let config = FormConfig::default();
        assert_eq!(config.get_rule("name").unwrap().min_length, Some(2));
        assert_eq!(config.get_rule("message").unwrap().min_length, Some(10));
        assert_eq!(
            config.get_rule("email").unwrap().pattern.as_deref(),
            Some(EMAIL_PATTERN)
        );
        assert!(config.fields.values().all(|rule| rule.required));
    }

    #[test]
    fn test_settings_defaults() {
        let settings = FormSettings::default();
        assert_eq!(settings.endpoint.latency_ms, 2000);
        assert!(!settings.endpoint.fail_submissions);
        assert_eq!(settings.notifications.success_secs, 3);
        assert_eq!(settings.notifications.failure_secs, 5);
        assert_eq!(settings.log_dir, "logs");
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
Fields:
  nickname:
    required: false
    min_length: 3
"#;
        let config: FormConfig = serde_yaml_ng::from_str(yaml).unwrap();
        let rule = config.get_rule("nickname").unwrap();
        assert!(!rule.required);
        assert_eq!(rule.min_length, Some(3));
        assert!(rule.pattern.is_none());
        assert_eq!(config.messages, Messages::default());
        assert_eq!(config.settings, FormSettings::default());
    }
}
