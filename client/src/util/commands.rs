//! Slash-command catalog: help listing and autocomplete suggestions.
//!
//! The catalog is a JSON object of sections keyed by name, kept in file
//! order. A default catalog is compiled in; a file may replace it.

#[cfg(test)]
#[path = "commands_test.rs"]
mod commands_test;

use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

const EMBEDDED_CATALOG: &str = include_str!("../../config/commands.json");

#[derive(Debug, thiserror::Error)]
pub enum CommandCatalogError {
    #[error("failed to read command catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid command catalog: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Literal command prefix, e.g. `/calendar add`.
    pub syntax: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSection {
    pub emoji: String,
    pub title: String,
    pub commands: Vec<Command>,
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandCatalog {
    sections: Vec<(String, CommandSection)>,
}

impl CommandCatalog {
    /// The compiled-in catalog.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_json(EMBEDDED_CATALOG).unwrap_or_else(|e| {
            tracing::error!(error = %e, "embedded command catalog is invalid");
            Self::default()
        })
    }

    /// Load from `path`, or the embedded catalog when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid catalog.
    pub fn load(path: Option<&Path>) -> Result<Self, CommandCatalogError> {
        let Some(path) = path else {
            return Ok(Self::embedded());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| CommandCatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json(&raw)?;
        tracing::info!(path = %path.display(), sections = catalog.sections.len(), "loaded command catalog");
        Ok(catalog)
    }

    /// Parse a catalog, keeping section order as written.
    ///
    /// # Errors
    ///
    /// Returns [`CommandCatalogError::Json`] for malformed input.
    pub fn from_json(raw: &str) -> Result<Self, CommandCatalogError> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)?;
        let sections = object
            .into_iter()
            .map(|(name, value)| Ok((name, serde_json::from_value::<CommandSection>(value)?)))
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        Ok(Self { sections })
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &CommandSection)> {
        self.sections.iter().map(|(name, section)| (name.as_str(), section))
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&CommandSection> {
        self.sections.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Every command in catalog order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.sections.iter().flat_map(|(_, s)| s.commands.iter())
    }

    /// Commands whose syntax starts with `input`, ignoring case.
    ///
    /// Input that does not start with `/` matches nothing. Shorter syntaxes
    /// come first; equal lengths keep catalog order.
    #[must_use]
    pub fn suggestions(&self, input: &str) -> Vec<&Command> {
        let needle = input.trim().to_lowercase();
        if !needle.starts_with('/') {
            return Vec::new();
        }
        let mut hits: Vec<&Command> = self
            .commands()
            .filter(|c| c.syntax.to_lowercase().starts_with(&needle))
            .collect();
        hits.sort_by_key(|c| c.syntax.chars().count());
        hits
    }

    /// Formatted listing of every section, command and example.
    #[must_use]
    pub fn help_text(&self) -> String {
        let mut out = String::from("Available commands:\n");
        for (_, section) in &self.sections {
            let width = section
                .commands
                .iter()
                .map(|c| c.syntax.chars().count())
                .max()
                .unwrap_or(0);
            let _ = writeln!(out, "\n{} {}", section.emoji, section.title);
            for command in &section.commands {
                let _ = writeln!(out, "  {:<width$}  {}", command.syntax, command.description);
            }
            if !section.examples.is_empty() {
                out.push_str("  Examples:\n");
                for example in &section.examples {
                    let _ = writeln!(out, "    {example}");
                }
            }
        }
        out
    }
}
