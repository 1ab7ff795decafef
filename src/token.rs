//! The public token record, grounded on `lindera-tokenizer/src/token.rs`'s
//! `Token` but carrying Unicode character offsets rather than byte offsets.

/// A single segmented unit of the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub surface: String,
    /// Hiragana reading. The compact lexical record carries no reading
    /// index, so this always falls back to `surface`.
    pub reading: String,
    pub pos: String,
    pub base_form: String,
    pub base_form_id: i32,
    /// Character (Unicode scalar value) offset of the first character.
    pub start: usize,
    /// Character offset one past the last character.
    pub end: usize,
}
