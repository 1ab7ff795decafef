//! Edge scoring. A pure function of the matched surface and its dictionary
//! record, mirroring the "additive adjustment to a base score" shape of
//! `lindera-dictionary/src/mode.rs`'s `Penalty`, but with no connection-cost
//! term since this format carries no bigram matrix.

use crate::classifier::{entirely_kana, is_particle_char};
use crate::word_entry::WordEntry;

const LENGTH_BONUS_FACTOR: i64 = 50;
const COST_PENALTY_CAP: i64 = 100;
const PARTICLE_SUFFIX_PENALTY: i64 = 60;
const UNKNOWN_BASE_PENALTY: i64 = 200;

/// Scores a dictionary-backed edge covering `surface`.
pub fn score(surface: &str, entry: &WordEntry) -> i64 {
    let len = surface.chars().count() as i64;
    let length_bonus = len * LENGTH_BONUS_FACTOR;
    let cost_penalty = (entry.cost as i64).min(COST_PENALTY_CAP);
    let mut total = length_bonus - cost_penalty;
    if has_particle_suffix(surface) {
        total -= PARTICLE_SUFFIX_PENALTY;
    }
    total
}

/// Scores a synthesized unknown-word edge covering `surface`.
pub fn score_unknown(surface: &str) -> i64 {
    let len = surface.chars().count() as i64;
    len * LENGTH_BONUS_FACTOR - UNKNOWN_BASE_PENALTY
}

/// True when `surface` is at least two characters long, ends in a particle
/// character, and is not itself entirely kana: penalizes
/// words like "今日は" that should be split before the particle, without
/// penalizing genuine kana words like "とても" that happen to end in a
/// particle-shaped character, and without penalizing a bare particle
/// character standing alone.
fn has_particle_suffix(surface: &str) -> bool {
    if surface.chars().count() < 2 {
        return false;
    }
    let mut chars = surface.chars();
    let last = chars.next_back().expect("checked length >= 2 above");
    if !is_particle_char(last) {
        return false;
    }
    !entirely_kana(chars.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(cost: i16) -> WordEntry {
        WordEntry {
            seq: 1,
            cost,
            pos_id: 1,
            conj_type: 0,
            base_seq: 1,
        }
    }

    #[test]
    fn rewards_longer_surfaces_and_clamps_cost_penalty() {
        let short = score("犬", &entry(10));
        let long = score("今日", &entry(10));
        assert!(long > short);
        assert_eq!(score("猫", &entry(10_000)), 1 * 50 - COST_PENALTY_CAP);
    }

    #[test]
    fn penalizes_kanji_word_ending_in_particle() {
        let penalized = score("今日は", &entry(0));
        let unpenalized = score("今日", &entry(0));
        assert_eq!(unpenalized - penalized, PARTICLE_SUFFIX_PENALTY + 50);
    }

    #[test]
    fn does_not_penalize_all_kana_word_ending_in_particle_char() {
        assert!(!has_particle_suffix("とても"));
    }

    #[test]
    fn unknown_score_uses_flat_floor() {
        assert_eq!(score_unknown("a"), 50 - UNKNOWN_BASE_PENALTY);
        assert_eq!(score_unknown("ab"), 100 - UNKNOWN_BASE_PENALTY);
    }
}
