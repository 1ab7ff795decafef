use std::fmt;

/// Errors raised while opening or validating the binary dictionary artifact.
#[derive(thiserror::Error, Debug)]
pub enum DictionaryError {
    #[error("dictionary artifact not found at {path}")]
    NotFound { path: String },

    #[error("dictionary artifact is corrupt: {reason}")]
    Corrupt { reason: String },

    #[error("dictionary version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}

impl DictionaryError {
    pub(crate) fn corrupt<C: fmt::Display>(reason: C) -> Self {
        DictionaryError::Corrupt {
            reason: reason.to_string(),
        }
    }
}

/// Errors raised by the public API for malformed call arguments.
#[derive(thiserror::Error, Debug)]
pub enum InputError {
    #[error("analyze() requires limit >= 1")]
    Empty,
}

/// Combined error surface for `analyze`: either the dictionary failed to
/// open, or the call itself was malformed.
#[derive(thiserror::Error, Debug)]
pub enum AnalyzeError {
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
    #[error(transparent)]
    Input(#[from] InputError),
}
