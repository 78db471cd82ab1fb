//! CLI library for testing purposes

pub mod copy_tags;
pub mod edit;
pub mod stats;
pub mod view;

use capyxliff::{Error, LoadOptions, Xliff};

/// Loads `input`, relaxing parser limits for huge files.
pub fn load_document(input: &str) -> Result<Xliff, String> {
    Xliff::load_with(input, &LoadOptions::default()).map_err(|e| describe_load_error(input, &e))
}

fn describe_load_error(input: &str, error: &Error) -> String {
    if error.is_load_failure() {
        format!("Failed to read `{}`: {}", input, error)
    } else {
        error.to_string()
    }
}

/// Saves to `output`, or back to `input` when no output was given.
pub fn write_back(document: &Xliff, input: &str, output: &Option<String>) -> Result<(), String> {
    let destination = output.as_deref().unwrap_or(input);
    document
        .save(destination)
        .map_err(|e| format!("Error writing output: {}", e))
}

/// Cuts `value` to `max` characters, adding an ellipsis.
pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        let cut: String = value.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        value.to_string()
    }
}
