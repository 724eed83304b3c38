//! Token Budget Enforcer
//!
//! Estimates token cost per segment and trims the lowest-priority segments
//! until the rendered prompt fits the dialect's ceiling. Tiers 0-2
//! (style, identity, foundation) are never touched.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::lexicon::is_adjective_like;
use super::types::{Model, PromptSegment};

/// Words per token for the base estimate (one token is about 0.75 words).
pub const WORDS_PER_TOKEN: f64 = 0.75;

/// Extra tokens charged for every `(text:weight)` group.
pub const WEIGHTED_GROUP_PENALTY: usize = 3;

/// Matches weighted syntax like `(strong jaw:1.2)`.
pub static WEIGHTED_GROUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(([^():]+):\s*-?\d+(?:\.\d+)?\s*\)").expect("static weight regex")
});

/// Replace weighted groups with their bare content.
pub fn strip_weight_syntax(text: &str) -> String {
    WEIGHTED_GROUP_RE.replace_all(text, "$1").into_owned()
}

/// Estimate the token cost of a piece of prompt text.
pub fn estimate_tokens(text: &str) -> usize {
    let groups = WEIGHTED_GROUP_RE.find_iter(text).count();
    let stripped = strip_weight_syntax(text);
    let words = stripped
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count();
    if words == 0 && groups == 0 {
        return 0;
    }
    let base = (words as f64 / WORDS_PER_TOKEN).ceil() as usize;
    base + groups * WEIGHTED_GROUP_PENALTY
}

/// Summed estimate over a segment list.
pub fn total_tokens(segments: &[PromptSegment]) -> usize {
    segments.iter().map(|s| s.token_count).sum()
}

/// Shrink a segment's text by removing adjective-like words. The last word
/// of every comma-separated phrase is treated as the head noun and kept.
pub fn summarize(text: &str) -> String {
    text.split(',')
        .filter_map(|phrase| {
            let words: Vec<&str> = phrase.split_whitespace().collect();
            let (head, modifiers) = words.split_last()?;
            let mut kept: Vec<&str> = modifiers
                .iter()
                .copied()
                .filter(|w| !is_adjective_like(w))
                .collect();
            kept.push(head);
            Some(kept.join(" "))
        })
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Trim segments until their summed estimate fits the dialect's limit.
///
/// Segments are visited lowest priority first (descending tier, later-built
/// first within a tier) in a single pass. A summarizable segment is shrunk
/// when that lowers its estimate; if the total still exceeds the limit the
/// segment is emptied. Protected tiers are skipped, so their content alone
/// may leave the result over the limit.
///
/// Output is sorted by ascending tier with empty segments removed; the
/// relative order of segments within a tier is preserved.
pub fn enforce_token_budget(segments: Vec<PromptSegment>, model: Model) -> Vec<PromptSegment> {
    let limit = model.token_limit();
    let mut working = segments;
    let mut total = total_tokens(&working);

    if total > limit {
        debug!(total, limit, model = ?model, "Prompt over budget, trimming");

        let mut order: Vec<usize> = (0..working.len()).collect();
        order.sort_by(|a, b| working[*b].tier.cmp(&working[*a].tier).then(b.cmp(a)));

        for index in order {
            if total <= limit {
                break;
            }
            let segment = &mut working[index];
            if segment.is_protected() {
                continue;
            }

            if segment.summarizable {
                let shrunk = summarize(&segment.text);
                let shrunk_tokens = estimate_tokens(&shrunk);
                if shrunk_tokens < segment.token_count {
                    total = total - segment.token_count + shrunk_tokens;
                    debug!(
                        category = segment.category.label(),
                        from = segment.token_count,
                        to = shrunk_tokens,
                        "Summarized segment"
                    );
                    segment.text = shrunk;
                    segment.token_count = shrunk_tokens;
                    if total <= limit {
                        break;
                    }
                }
            }

            debug!(category = segment.category.label(), tier = segment.tier, "Dropped segment");
            total -= segment.token_count;
            segment.text.clear();
            segment.token_count = 0;
        }
    }

    let mut result: Vec<PromptSegment> = working.into_iter().filter(|s| !s.is_empty()).collect();
    result.sort_by_key(|s| s.tier);
    result
}
