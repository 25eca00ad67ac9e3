//! Error sink shared by every mutating protocol operation.
//!
//! Non-strict semantics pass `throwable = false`: the operation returns
//! `false` on a violation and leaves the sink untouched. Strict semantics
//! pass `throwable = true`: the sink is populated *and* `false` is still
//! returned, so callers must check both. The one exception is the array
//! length conversion, which reports a Range error regardless of the flag.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Type,
    Range,
}

#[derive(Debug, Default)]
pub struct Error {
    error: Option<(ErrorKind, String)>,
}

impl Error {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.error = Some((kind, message.into()));
    }

    pub fn occurred(&self) -> bool {
        self.error.is_some()
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|(kind, _)| *kind)
    }

    pub fn message(&self) -> Option<&str> {
        self.error.as_ref().map(|(_, msg)| msg.as_str())
    }

    pub fn clear(&mut self) {
        self.error = None;
    }
}

/// Shared reject path: report only when `throwable` is set, fail either way.
pub(crate) fn reject(throwable: bool, e: &mut Error, message: &str) -> bool {
    if throwable {
        e.report(ErrorKind::Type, message);
    }
    false
}
