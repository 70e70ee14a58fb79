//! Keyboard state machine for slash-command autocomplete in the chat input.
//!
//! Front ends feed it key presses; the CLI REPL drives it with a synthetic
//! Tab for `/prefix?` lines.

#[cfg(test)]
#[path = "command_input_test.rs"]
mod command_input_test;

use super::commands::{Command, CommandCatalog};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Tab,
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
    /// Any other key; it closes the suggestion list.
    Other,
}

/// Whether the input consumed a key or the caller should handle it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    PassThrough,
}

#[derive(Clone, Debug, Default)]
pub struct CommandInput {
    text: String,
    suggestions: Vec<Command>,
    selected: Option<usize>,
}

impl CommandInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Return the current text and reset the input.
    pub fn take_text(&mut self) -> String {
        self.close();
        std::mem::take(&mut self.text)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    #[must_use]
    pub fn suggestions(&self) -> &[Command] {
        &self.suggestions
    }

    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Command> {
        self.selected.and_then(|i| self.suggestions.get(i))
    }

    pub fn close(&mut self) {
        self.suggestions.clear();
        self.selected = None;
    }

    /// Apply one key press.
    ///
    /// Tab opens the list on the first match or cycles forward. Arrows move
    /// with wrap-around while open. Enter copies the selection into the text.
    /// Escape closes. Any other key closes the list and passes through.
    pub fn handle_key(&mut self, key: Key, catalog: &CommandCatalog) -> KeyOutcome {
        match (key, self.selected) {
            (Key::Tab, None) => {
                let suggestions: Vec<Command> = catalog.suggestions(&self.text).into_iter().cloned().collect();
                if !suggestions.is_empty() {
                    self.suggestions = suggestions;
                    self.selected = Some(0);
                }
                KeyOutcome::Handled
            }
            (Key::Tab | Key::ArrowDown, Some(i)) => {
                self.selected = Some((i + 1) % self.suggestions.len().max(1));
                KeyOutcome::Handled
            }
            (Key::ArrowUp, Some(i)) => {
                let len = self.suggestions.len().max(1);
                self.selected = Some((i + len - 1) % len);
                KeyOutcome::Handled
            }
            (Key::Enter, Some(_)) => {
                if let Some(syntax) = self.selected().map(|c| c.syntax.clone()) {
                    self.text = syntax;
                }
                self.close();
                KeyOutcome::Handled
            }
            (Key::Escape, Some(_)) => {
                self.close();
                KeyOutcome::Handled
            }
            (Key::Other, Some(_)) => {
                self.close();
                KeyOutcome::PassThrough
            }
            (_, None) => KeyOutcome::PassThrough,
        }
    }
}
