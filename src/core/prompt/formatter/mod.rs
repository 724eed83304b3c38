//! Model Formatter
//!
//! Renders a budgeted segment list into one of six dialect strings:
//!
//! | Dialect | Models | Priority encoding |
//! |---------|--------|-------------------|
//! | Narrative | Flux | sentence position |
//! | Tag order | Pony | tag position only, never `(tag:w)` |
//! | Weighted keyword | SDXL, SD 1.5 | `(text:weight)` on identity/foundation/charisma |
//! | Plain tag | Illustrious | order only |
//! | Bracket emphasis | NovelAI | `{tag}` emphasis plus weights |
//!
//! Every dialect finishes with [`postprocess::finalize`].

pub mod postprocess;

use super::budget::strip_weight_syntax;
use super::lexicon::{contains_word, is_filler, words};
use super::types::{Gender, Model, PromptSegment, SegmentCategory};

pub use postprocess::{finalize, normalize_punctuation, remove_duplicates};

/// Character-level facts the renderers need beyond the segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatContext {
    pub charisma: u8,
    pub gender: Gender,
    /// The caller framed this as a portrait (close-up, headshot...).
    pub portrait: bool,
}

impl Default for FormatContext {
    fn default() -> Self {
        Self {
            charisma: 3,
            gender: Gender::Other,
            portrait: false,
        }
    }
}

/// Render segments for `model`.
pub fn format_prompt(segments: &[PromptSegment], model: Model, ctx: &FormatContext) -> String {
    let raw = match model {
        Model::Flux => render_narrative(segments, ctx),
        Model::Pony => render_tag_order(segments, ctx),
        Model::Sdxl | Model::Sd15 => render_weighted(segments, model, ctx),
        Model::Illustrious => render_plain(segments, ctx),
        Model::NovelAi => render_bracket(segments, ctx),
    };
    finalize(&raw)
}

// ============================================================================
// Shared Pieces
// ============================================================================

fn style_segments(segments: &[PromptSegment]) -> impl Iterator<Item = &PromptSegment> {
    segments.iter().filter(|s| s.category.is_style() && !s.is_empty())
}

fn character_segments(segments: &[PromptSegment]) -> impl Iterator<Item = &PromptSegment> {
    segments.iter().filter(|s| !s.category.is_style() && !s.is_empty())
}

/// Charisma clause; `None` for average charisma.
fn charisma_clause(level: u8, gender: Gender, narrative: bool) -> Option<&'static str> {
    match (level, narrative) {
        (1, true) => Some("with an unsettling, repellent presence"),
        (1, false) => Some("repulsive"),
        (2, true) => Some("with rough, homely features"),
        (2, false) => Some("homely"),
        (4, true) => Some("with striking, attractive features"),
        (4, false) => Some("attractive"),
        (5, true) => Some(match gender {
            Gender::Female => "with breathtaking, captivating beauty",
            Gender::Male => "with breathtaking, strikingly handsome looks",
            Gender::Other => "with breathtaking, captivating looks",
        }),
        (5, false) => Some(match gender {
            Gender::Female => "stunningly beautiful",
            Gender::Male => "strikingly handsome",
            Gender::Other => "stunning",
        }),
        _ => None,
    }
}

/// A phrase is implied when any of its significant words already occurs.
fn is_implied(phrase: &str, existing: &str) -> bool {
    words(phrase)
        .filter(|w| w.len() > 3 && !is_filler(w))
        .any(|w| contains_word(existing, &w))
}

fn push_unless_implied(parts: &mut Vec<String>, phrase: Option<&str>) {
    if let Some(phrase) = phrase {
        if !is_implied(phrase, &parts.join(", ")) {
            parts.push(phrase.to_string());
        }
    }
}

fn weighted(text: &str, weight: f32) -> String {
    let bare = strip_weight_syntax(text);
    let bare = bare.trim();
    if bare.is_empty() {
        String::new()
    } else {
        format!("({bare}:{weight:.1})")
    }
}

fn article_for(word: &str) -> &'static str {
    match word.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "An",
        _ => "A",
    }
}

// ============================================================================
// Narrative (Flux)
// ============================================================================

fn narrative_piece(segment: &PromptSegment) -> String {
    let text = segment.text.trim();
    match segment.category {
        SegmentCategory::Equipment if !text.starts_with("wearing") => format!("wearing {text}"),
        SegmentCategory::Facial | SegmentCategory::Special if !text.starts_with("with") => {
            format!("with {text}")
        }
        SegmentCategory::Expression if !text.contains("expression") => {
            format!("{text} expression")
        }
        _ => text.to_string(),
    }
}

fn render_narrative(segments: &[PromptSegment], ctx: &FormatContext) -> String {
    let mut sentences: Vec<String> = Vec::new();

    let style: Vec<&str> = style_segments(segments).map(|s| s.text.trim()).collect();
    if !style.is_empty() {
        sentences.push(capitalize(&style.join(", ")));
    }

    let mut subject: Option<String> = None;
    let mut clauses: Vec<String> = Vec::new();
    for segment in character_segments(segments) {
        if segment.category == SegmentCategory::Identity && subject.is_none() {
            subject = Some(segment.text.trim().to_string());
        } else {
            clauses.push(narrative_piece(segment));
        }
    }
    let subject = subject.unwrap_or_else(|| "character".to_string());
    let mut character = vec![format!("{} {subject}", article_for(&subject))];
    character.extend(clauses);
    push_unless_implied(&mut character, charisma_clause(ctx.charisma, ctx.gender, true));
    sentences.push(character.join(", "));

    let existing = sentences.join(" ");
    let mut finish: Vec<String> = Vec::new();
    if ctx.portrait && !contains_word(&existing, "portrait") {
        finish.push("detailed character portrait".to_string());
    }
    if !contains_word(&existing, "detailed") && !finish.iter().any(|f| f.contains("detailed")) {
        finish.push("highly detailed".to_string());
    }
    finish.push("sharp focus".to_string());
    sentences.push(capitalize(&finish.join(", ")));

    let mut out = sentences.join(". ");
    out.push('.');
    out
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Tag Order (Pony)
// ============================================================================

const PONY_SCORE_CHAIN: &str = "score_9, score_8_up, score_7_up";

fn character_meta(gender: Gender) -> &'static str {
    match gender {
        Gender::Female => "1girl, solo",
        Gender::Male => "1boy, solo",
        Gender::Other => "1other, solo",
    }
}

/// Position is the only weight this dialect understands.
fn strip_parentheses(text: &str) -> String {
    strip_weight_syntax(text)
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '\\'))
        .collect()
}

fn render_tag_order(segments: &[PromptSegment], ctx: &FormatContext) -> String {
    let mut parts: Vec<String> = vec![PONY_SCORE_CHAIN.to_string()];
    parts.extend(style_segments(segments).map(|s| s.text.clone()));
    parts.push(character_meta(ctx.gender).to_string());
    parts.extend(character_segments(segments).map(|s| s.text.clone()));
    push_unless_implied(&mut parts, charisma_clause(ctx.charisma, ctx.gender, false));
    strip_parentheses(&parts.join(", "))
}

// ============================================================================
// Weighted Keyword (SDXL, SD 1.5) and Plain Tag (Illustrious)
// ============================================================================

fn quality_booster(model: Model) -> &'static str {
    match model {
        Model::Sd15 => "masterpiece, best quality, ultra-detailed",
        Model::Illustrious => "masterpiece, best quality, amazing quality",
        _ => "masterpiece, best quality, highly detailed",
    }
}

fn character_weight(segment: &PromptSegment) -> Option<f32> {
    match segment.category {
        SegmentCategory::Identity => Some(1.3),
        SegmentCategory::Charisma => Some(1.2),
        SegmentCategory::Foundation if segment.is_protected() => Some(1.2),
        SegmentCategory::Foundation => Some(1.1),
        _ => None,
    }
}

fn render_weighted(segments: &[PromptSegment], model: Model, ctx: &FormatContext) -> String {
    let mut parts: Vec<String> = vec![quality_booster(model).to_string()];
    for segment in style_segments(segments) {
        parts.push(match segment.category {
            SegmentCategory::Style => weighted(&segment.text, 1.2),
            _ => segment.text.clone(),
        });
    }
    for segment in character_segments(segments) {
        parts.push(match character_weight(segment) {
            Some(weight) => weighted(&segment.text, weight),
            None => segment.text.clone(),
        });
    }
    push_unless_implied(&mut parts, charisma_clause(ctx.charisma, ctx.gender, false));
    parts.join(", ")
}

fn render_plain(segments: &[PromptSegment], ctx: &FormatContext) -> String {
    let mut parts: Vec<String> = vec![quality_booster(Model::Illustrious).to_string()];
    parts.extend(style_segments(segments).map(|s| strip_weight_syntax(&s.text)));
    parts.extend(character_segments(segments).map(|s| strip_weight_syntax(&s.text)));
    push_unless_implied(&mut parts, charisma_clause(ctx.charisma, ctx.gender, false));
    parts.join(", ")
}

// ============================================================================
// Bracket Emphasis (NovelAI)
// ============================================================================

const NOVELAI_QUALITY_PREFIX: &str = "masterpiece, best quality";
const NOVELAI_TRAILING_TAGS: &str = "very aesthetic, absurdres";

fn emphasized(text: &str) -> String {
    let bare = text.trim();
    if bare.is_empty() {
        String::new()
    } else {
        format!("{{{bare}}}")
    }
}

fn render_bracket(segments: &[PromptSegment], ctx: &FormatContext) -> String {
    let mut parts: Vec<String> = vec![NOVELAI_QUALITY_PREFIX.to_string()];
    for segment in style_segments(segments) {
        parts.push(match segment.category {
            SegmentCategory::Style => emphasized(&segment.text),
            _ => segment.text.clone(),
        });
    }
    for segment in character_segments(segments) {
        parts.push(match segment.category {
            category if category.is_weighted() => weighted(&segment.text, 1.1),
            SegmentCategory::Facial => emphasized(&segment.text),
            _ => segment.text.clone(),
        });
    }
    push_unless_implied(&mut parts, charisma_clause(ctx.charisma, ctx.gender, false));
    parts.push(NOVELAI_TRAILING_TAGS.to_string());
    parts.join(", ")
}
