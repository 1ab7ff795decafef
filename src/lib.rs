//! A lightweight Japanese morphological analyzer core: binary dictionary
//! lookup plus Viterbi-style segmentation. Public surface mirrors
//! `lindera-dictionary/src/lib.rs`'s `get_version()` plus the pervasive
//! `once_cell`-backed process-wide singleton pattern used throughout that
//! crate (see e.g. `UNK: Lazy<Vec<&str>>` in
//! `lindera-dictionary/src/dictionary.rs`).

mod classifier;
mod dictionary;
mod error;
mod scorer;
mod segmenter;
mod token;
mod word_entry;

use std::env;
use std::path::Path;

use once_cell::sync::OnceCell;

pub use dictionary::Dictionary;
pub use error::{AnalyzeError, DictionaryError, InputError};
pub use token::Token;

const DICT_PATH_ENV: &str = "KOTOBA_DICT_PATH";

static DICTIONARY: OnceCell<Dictionary> = OnceCell::new();

fn current_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns the crate's version string.
pub fn get_version() -> &'static str {
    current_version()
}

/// Explicitly initializes the process-wide dictionary singleton from
/// `path`, bypassing `KOTOBA_DICT_PATH`. Idempotent: if the singleton is
/// already initialized, `path` is ignored and `Ok(())` is returned, the
/// same double-checked-init contract used for other lazily-built statics
/// in this crate.
pub fn init(path: impl AsRef<Path>) -> Result<(), DictionaryError> {
    if DICTIONARY.get().is_some() {
        return Ok(());
    }
    let dict = Dictionary::open(path)?;
    let _ = DICTIONARY.set(dict);
    Ok(())
}

/// Ensures the dictionary singleton is initialized, resolving
/// `KOTOBA_DICT_PATH` if `init` hasn't already been called.
pub fn warm_up() -> Result<(), DictionaryError> {
    if DICTIONARY.get().is_some() {
        return Ok(());
    }
    let path = env::var(DICT_PATH_ENV).map_err(|_| DictionaryError::NotFound {
        path: format!("${DICT_PATH_ENV} is not set"),
    })?;
    log::debug!("warm_up resolving dictionary from {DICT_PATH_ENV}");
    init(path)
}

fn dictionary() -> Result<&'static Dictionary, DictionaryError> {
    if let Some(dict) = DICTIONARY.get() {
        return Ok(dict);
    }
    warm_up()?;
    Ok(DICTIONARY.get().expect("warm_up initializes DICTIONARY or returns Err"))
}

/// Segments `text` into its single best token sequence. Empty input yields
/// an empty sequence.
pub fn tokenize(text: &str) -> Result<Vec<Token>, DictionaryError> {
    Ok(dictionary()?.tokenize(text))
}

/// Segments `text` into up to `limit` ranked `(tokens, total_score)` pairs,
/// best first. `limit` must be at least 1.
pub fn analyze(text: &str, limit: usize) -> Result<Vec<(Vec<Token>, i64)>, AnalyzeError> {
    Ok(dictionary()?.analyze(text, limit)?)
}
