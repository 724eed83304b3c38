//! Foundation Assembler
//!
//! Turns stat levels into one descriptive phrase per axis. Qualifier pools
//! come from the data cache; the assembler filters them for gender coding,
//! dead words and dialect, picks one at random, then removes phrases made
//! redundant by other axes.
//!
//! The random source is injected so tests can seed it. Rule outcomes
//! (filtering, redundancy elimination) never depend on the random draw.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

use super::lexicon::{contains_dead_word, is_gender_incompatible, REDUNDANCY_RULES};
use super::types::{DataCache, FoundationKeywords, Gender, Model, StatAxis, StatLevels};

/// Pick one qualifier from a pool.
///
/// Filters, in order:
/// 1. Gender-incompatible terms are dropped unless that would empty the pool.
/// 2. Dead words are always dropped, even if nothing remains.
/// 3. Tag-oriented dialects keep only single-word qualifiers when at least
///    two of them remain.
///
/// Returns an empty string when nothing survives.
pub fn select_qualifier<R: Rng + ?Sized>(
    pool: &[String],
    gender: Gender,
    model: Model,
    rng: &mut R,
) -> String {
    let mut candidates: Vec<&str> = pool
        .iter()
        .map(|q| q.trim())
        .filter(|q| !q.is_empty())
        .collect();

    let gender_safe: Vec<&str> = candidates
        .iter()
        .copied()
        .filter(|q| !is_gender_incompatible(q, gender))
        .collect();
    if !gender_safe.is_empty() {
        candidates = gender_safe;
    }

    candidates.retain(|q| !contains_dead_word(q));

    if model.is_tag_oriented() {
        let single_words: Vec<&str> = candidates
            .iter()
            .copied()
            .filter(|q| !q.contains(char::is_whitespace))
            .collect();
        if single_words.len() >= 2 {
            candidates = single_words;
        }
    }

    candidates
        .choose(rng)
        .map(|q| q.to_string())
        .unwrap_or_default()
}

/// Resolve a phrase for every stat axis and apply redundancy rules.
///
/// Missing data cache entries degrade to an empty phrase.
pub fn assemble_foundation<R: Rng + ?Sized>(
    levels: &StatLevels,
    data: &DataCache,
    gender: Gender,
    model: Model,
    rng: &mut R,
) -> FoundationKeywords {
    let mut keywords = FoundationKeywords::default();

    for axis in StatAxis::ALL {
        let level = levels.get(axis);
        let pool = data
            .level_record(axis.key(), level)
            .map(|record| record.pool())
            .unwrap_or_default();
        let phrase = select_qualifier(&pool, gender, model, rng);
        if !phrase.is_empty() {
            keywords.set(axis, phrase);
        }
    }

    apply_redundancy_rules(&mut keywords, levels);
    keywords
}

/// Remove phrases implied by other axes. Conditions are evaluated on the
/// stat levels, never on phrase text, so the outcome is deterministic.
pub fn apply_redundancy_rules(keywords: &mut FoundationKeywords, levels: &StatLevels) {
    for rule in REDUNDANCY_RULES {
        let applies = rule
            .conditions
            .iter()
            .all(|(axis, min, max)| (*min..=*max).contains(&levels.get(*axis)));
        if applies {
            trace!(axis = %rule.drop, "Dropping redundant foundation phrase");
            keywords.clear(rule.drop);
        }
    }
}
