//! Error reporting for sluice.
//!
//! Scanning, parsing, and evaluation all report failures as positioned
//! [`Error`] values rendered as `filename:line:column: message`. The scanner
//! and parser accumulate into an [`ErrorList`] so a single pass can surface
//! every problem in a file; evaluation stops at the first error.

use std::fmt;

use sluice_ast::Position;

/// An error encountered during scanning, parsing, or evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", render(.position, .message))]
pub struct Error {
    /// Starting position of the error. May be invalid when no position is
    /// known, in which case rendering omits it.
    pub position: Position,
    pub message: String,
}

fn render(position: &Position, message: &str) -> String {
    if position.is_valid() {
        format!("{position}: {message}")
    } else {
        message.to_string()
    }
}

impl Error {
    pub fn new(position: Position, message: impl Into<String>) -> Error {
        Error {
            position,
            message: message.into(),
        }
    }

    /// An error with no position information.
    pub fn message(message: impl Into<String>) -> Error {
        Error {
            position: Position::default(),
            message: message.into(),
        }
    }
}

/// A list of errors, ordered as they were encountered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorList(Vec<Error>);

impl ErrorList {
    pub fn new() -> ErrorList {
        ErrorList::default()
    }

    /// Add a new error to the list.
    pub fn add(&mut self, err: Error) {
        self.0.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Error> {
        self.0.iter()
    }
}

impl Extend<Error> for ErrorList {
    fn extend<T: IntoIterator<Item = Error>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ErrorList {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => f.write_str("no errors"),
            [first] => write!(f, "{first}"),
            [first, rest @ ..] => write!(f, "{} (and {} more errors)", first, rest.len()),
        }
    }
}

impl std::error::Error for ErrorList {}
