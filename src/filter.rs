//! Regex-backed name and graph filters
//!
//! A [`PatternFilter`] keeps the user-editable text and the compiled
//! pattern side by side. When new text fails to compile the previously
//! compiled pattern stays active and the compile error is kept as the
//! pending error until a valid pattern is entered.
//!
//! Patterns are searched for anywhere in the name: `temp` also accepts
//! `attempt`. Anchor with `^...$` to require a whole-name match.

use crate::error::{PlotterError, Result};
use regex::Regex;

/// Pattern that accepts every name
pub const MATCH_ALL_PATTERN: &str = "^.*$";

/// A compiled name filter with keep-previous-on-error semantics
#[derive(Debug, Clone)]
pub struct PatternFilter {
    text: String,
    compiled: Regex,
    error: Option<String>,
}

impl Default for PatternFilter {
    fn default() -> Self {
        Self::match_all()
    }
}

impl PatternFilter {
    /// Compile a filter, failing if the pattern is invalid
    pub fn new(pattern: &str) -> Result<Self> {
        let compiled = compile(pattern)?;
        Ok(Self {
            text: pattern.to_string(),
            compiled,
            error: None,
        })
    }

    /// A filter that accepts every name
    pub fn match_all() -> Self {
        Self {
            text: MATCH_ALL_PATTERN.to_string(),
            compiled: Regex::new(MATCH_ALL_PATTERN).expect("match-all pattern is valid"),
            error: None,
        }
    }

    /// Replace the filter text
    ///
    /// On a compile error the old pattern remains active, the new text is
    /// still recorded (so the editor shows what the user typed) and the
    /// error is returned as well as kept in [`Self::pending_error`].
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        self.text = text.to_string();
        match compile(text) {
            Ok(compiled) => {
                self.compiled = compiled;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Keeping previous filter {:?}: {}", self.compiled.as_str(), e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Whether the active pattern matches somewhere in `name`
    pub fn matches(&self, name: &str) -> bool {
        self.compiled.is_match(name)
    }

    /// Text as last entered by the user
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Pattern currently in effect
    pub fn active_pattern(&self) -> &str {
        self.compiled.as_str()
    }

    pub fn pending_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| PlotterError::Filter {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}
