use super::models::{EventData, SessionFile};
use crate::{ReplayError, Result};
use rules::{AttemptNo, parse_weight_input};
use std::collections::HashSet;
use tracing::warn;
use validator::Validate;

/// Cross-reference checks the field validators cannot express: entry keys,
/// attempt numbers and draw numbers.
pub struct SessionFileValidator;

impl SessionFileValidator {
    pub fn validate(file: &SessionFile) -> Result<ValidationReport> {
        file.validate()?;

        let mut report = ValidationReport::default();

        let mut keys = HashSet::new();
        let mut start_numbers = HashSet::new();
        for entry in &file.entries {
            if !keys.insert(entry.key.as_str()) {
                report
                    .errors
                    .push(format!("Duplicate entry key: '{}'", entry.key));
            }
            if entry.start_number > 0 && !start_numbers.insert(entry.start_number) {
                report.errors.push(format!(
                    "Entry '{}' reuses start number {}",
                    entry.key, entry.start_number
                ));
            }
            if entry.start_number == 0 && entry.lot_number == 0 {
                report.warnings.push(format!(
                    "Entry '{}' has neither start number nor lot number",
                    entry.key
                ));
            }
            if entry.body_weight.is_none() {
                report
                    .warnings
                    .push(format!("Entry '{}' is missing body weight", entry.key));
            }
            if let Some(category) = &entry.category
                && category.gender != entry.gender
            {
                report.errors.push(format!(
                    "Entry '{}' is {} but category '{}' is {}",
                    entry.key, entry.gender, category.code, category.gender
                ));
            }
        }

        if file.events.is_empty() {
            report
                .warnings
                .push("Session file has no events".to_string());
        }

        for (idx, event) in file.events.iter().enumerate() {
            let label = format!("Event {} ({})", idx + 1, event.kind());

            for key in event.entry_keys() {
                if !keys.contains(key) {
                    report
                        .errors
                        .push(format!("{} refers to unknown entry '{}'", label, key));
                }
            }

            if let Some(attempt) = event.attempt()
                && AttemptNo::new(attempt).is_none()
            {
                report.errors.push(format!(
                    "{}: invalid attempt {}. Must be 1-6",
                    label, attempt
                ));
            }

            match event {
                EventData::Propose { value, .. } | EventData::Override { value, .. } => {
                    let trimmed = value.trim();
                    if !trimmed.is_empty() && trimmed.parse::<i32>().is_err() {
                        report.warnings.push(format!(
                            "{}: value '{}' is not a number and will be read as {:?}",
                            label,
                            value,
                            parse_weight_input(value)
                        ));
                    }
                }
                EventData::StartClock { weight, .. } if *weight <= 0 => {
                    report
                        .errors
                        .push(format!("{}: clock started at {} kg", label, weight));
                }
                _ => {}
            }
        }

        if !report.errors.is_empty() {
            Err(ReplayError::ValidationError(format!(
                "Validation failed with {} error(s): {}",
                report.errors.len(),
                report.errors.join("; ")
            )))
        } else {
            Ok(report)
        }
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}
