//! Action scripts
//!
//! An action script maps URL patterns to ordered lists of page interactions:
//!
//! ```text
//! [example\.com/search]
//! INPUT #q rust crawler
//! CLICK button[type=submit]
//! SLEEP 1.5
//! SCROLL 800
//! CLICK_IF_EXISTS .cookie-banner .close
//! ```
//!
//! Only the first plan whose pattern matches a URL runs for it.

mod interpreter;
mod parser;

use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading an action script
///
/// All of these are fatal: a run never starts with a broken script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        line: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("line {line}: unknown action `{keyword}`")]
    UnknownAction { line: usize, keyword: String },

    #[error("line {line}: {keyword} expects {expected}, got {found} argument(s)")]
    ArgumentCount {
        line: usize,
        keyword: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("line {line}: {keyword} argument `{value}` is not a valid number")]
    InvalidNumber {
        line: usize,
        keyword: &'static str,
        value: String,
    },

    #[error("line {line}: action before any [pattern] header")]
    MissingHeader { line: usize },

    #[error("failed to read action script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScriptError {
    /// The 1-based script line the error refers to, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            ScriptError::InvalidPattern { line, .. }
            | ScriptError::UnknownAction { line, .. }
            | ScriptError::ArgumentCount { line, .. }
            | ScriptError::InvalidNumber { line, .. }
            | ScriptError::MissingHeader { line } => Some(*line),
            ScriptError::Io { .. } => None,
        }
    }
}

/// A single page interaction
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Suspend for the given time
    Sleep(Duration),
    /// Scroll vertically by the given number of pixels
    Scroll(i64),
    /// Type text into the element matching the selector
    Input { selector: String, text: String },
    /// Click the element matching the selector
    Click(String),
    /// Click the element if present; a missing element is not an error
    ClickIfExists(String),
}

impl Action {
    /// The script keyword for this action
    pub fn keyword(&self) -> &'static str {
        match self {
            Action::Sleep(_) => "SLEEP",
            Action::Scroll(_) => "SCROLL",
            Action::Input { .. } => "INPUT",
            Action::Click(_) => "CLICK",
            Action::ClickIfExists(_) => "CLICK_IF_EXISTS",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Sleep(pause) => write!(f, "SLEEP {}", pause.as_secs_f64()),
            Action::Scroll(pixels) => write!(f, "SCROLL {}", pixels),
            Action::Input { selector, text } => write!(f, "INPUT {} {}", selector, text),
            Action::Click(selector) => write!(f, "CLICK {}", selector),
            Action::ClickIfExists(selector) => write!(f, "CLICK_IF_EXISTS {}", selector),
        }
    }
}

/// The actions to run on URLs matching one pattern
#[derive(Debug, Clone)]
pub struct ActionPlan {
    pub pattern: Regex,
    pub actions: Vec<Action>,
}

impl ActionPlan {
    /// Whether the pattern occurs anywhere in the URL
    pub fn matches(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }
}

/// An ordered list of action plans
#[derive(Debug, Clone, Default)]
pub struct ActionScript {
    plans: Vec<ActionPlan>,
}

impl ActionScript {
    pub fn new(plans: Vec<ActionPlan>) -> Self {
        Self { plans }
    }

    /// Parses a script from text
    pub fn parse(source: &str) -> Result<Self, ScriptError> {
        parser::parse_script(source).map(Self::new)
    }

    /// Reads and parses a script file
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ScriptError> {
        let path = path.into();
        let source = std::fs::read_to_string(&path).map_err(|source| ScriptError::Io {
            path: path.clone(),
            source,
        })?;
        let script = Self::parse(&source)?;
        tracing::debug!(
            "Loaded {} action plan(s) from {}",
            script.plans.len(),
            path.display()
        );
        Ok(script)
    }

    pub fn plans(&self) -> &[ActionPlan] {
        &self.plans
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Returns the first plan matching the URL
    pub fn plan_for(&self, url: &str) -> Option<&ActionPlan> {
        self.plans.iter().find(|plan| plan.matches(url))
    }
}
