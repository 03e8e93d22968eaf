//! Ticket label extraction from release descriptions.

use indexmap::IndexSet;
use regex::Regex;

use crate::error::{RelReportError, Result};

pub const DEFAULT_RENOVATE_MARKER: &str = "renovate/all";
pub const DEFAULT_RENOVATE_LABEL: &str = "Renovate";
pub const DEFAULT_TICKET_PREFIXES: [&str; 2] = ["FN", "HF"];

/// Derives the "Content" label of a release from its description.
///
/// Dependency-bot releases (description mentions the renovate marker) get a
/// fixed label. Everything else is labelled with the ticket codes it
/// references: a prefix, an optional `-`, `_` or digit, then one or more ASCII
/// word characters.
#[derive(Debug, Clone)]
pub struct TicketExtractor {
    renovate_marker: String,
    renovate_label: String,
    pattern: Regex,
}

impl TicketExtractor {
    /// # Errors
    ///
    /// Returns an error if `prefixes` is empty or a prefix contains anything
    /// other than ASCII letters and digits.
    pub fn new(
        renovate_marker: impl Into<String>,
        renovate_label: impl Into<String>,
        prefixes: &[impl AsRef<str>],
    ) -> Result<Self> {
        if prefixes.is_empty() {
            return Err(RelReportError::Config(
                "at least one ticket prefix is required".to_string(),
            ));
        }

        let mut alternatives = Vec::with_capacity(prefixes.len());
        for prefix in prefixes {
            let prefix = prefix.as_ref();
            if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(RelReportError::Config(format!(
                    "ticket prefix '{prefix}' must be non-empty and alphanumeric"
                )));
            }
            alternatives.push(prefix.to_string());
        }

        let pattern = Regex::new(&format!(
            "(?:{})[-_0-9]?[A-Za-z0-9_]+",
            alternatives.join("|")
        ))?;

        Ok(Self {
            renovate_marker: renovate_marker.into(),
            renovate_label: renovate_label.into(),
            pattern,
        })
    }

    /// Label for one release description.
    ///
    /// Ticket codes are deduplicated keeping first-occurrence order and joined
    /// with `", "`. Returns an empty string when nothing matches.
    pub fn extract(&self, description: &str) -> String {
        if description.contains(&self.renovate_marker) {
            return self.renovate_label.clone();
        }

        let tickets: IndexSet<&str> = self
            .pattern
            .find_iter(description)
            .map(|m| m.as_str())
            .collect();

        tickets.into_iter().collect::<Vec<_>>().join(", ")
    }
}
