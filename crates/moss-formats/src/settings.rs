//! The settings surface of a format plugin.

use std::collections::HashMap;

use crate::error::{FormatError, FormatResult};

/// Description of one CLI parameter a plugin understands.
#[derive(Debug, Clone, Copy)]
pub struct ParameterDescription {
    /// The parameter key as given with `-p key=value`.
    pub key: &'static str,
    /// Help text for the CLI.
    pub help: &'static str,
    /// Whether the parameter must be present.
    pub required: bool,
}

/// Format-specific settings, configurable from the CLI parameter map.
pub trait Settings {
    /// The parameters this plugin understands.
    fn describe_parameters(&self) -> Vec<ParameterDescription> {
        Vec::new()
    }

    /// Consumes recognized keys from the parameter map and validates
    /// them. Returns an error if a required key is missing or a value is
    /// invalid. Unrecognized keys are left in the map for the caller to
    /// report.
    fn check_settings_cli(&mut self, params: &mut HashMap<String, String>) -> FormatResult<()> {
        let _ = params;
        Ok(())
    }
}

/// Settings for plugins without any parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSettings;

impl Settings for NoSettings {}

/// Splits a comma-separated setting value into trimmed, non-empty parts.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a boolean setting value, accepting `1/0`, `true/false`,
/// `on/off` and `yes/no`.
pub fn parse_bool(key: &str, value: &str) -> FormatResult<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => Err(FormatError::settings(format!(
            "{key}: expected a boolean, found '{other}'"
        ))),
    }
}
