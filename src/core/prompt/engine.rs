//! Prompt Engine
//!
//! Orchestrates the pipeline for one generation call:
//!
//! 1. Foundation assembly (stat levels to phrases)
//! 2. Detail validation (advisory warnings)
//! 3. Composition suggestions (fill unset camera/lighting/framing/style)
//! 4. Segment building
//! 5. Token budget enforcement
//! 6. Dialect formatting
//! 7. Negative prompt
//! 8. Optional enhancement (async, best-effort)

use rand::Rng;
use tracing::info;

use super::budget::{enforce_token_budget, total_tokens};
use super::composition::suggest_composition;
use super::enhancer::Enhancer;
use super::formatter::{format_prompt, FormatContext};
use super::foundation::assemble_foundation;
use super::lexicon::contains_any_word;
use super::negative::generate_negative;
use super::segments::{build_segments, NameIndex, SegmentInputs};
use super::types::{
    controls, DataCache, GenerationRequest, PromptResult, PromptSegment,
    SegmentCategory, SelectionValue, Selections, SelectionsExt,
};
use super::validator::validate_details;

const PORTRAIT_FRAMINGS: &[&str] = &["portrait", "close-up", "closeup", "headshot", "bust"];

/// Stateless apart from the read-only data cache and its name index.
#[derive(Debug, Clone)]
pub struct PromptEngine {
    data: DataCache,
    index: NameIndex,
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new(DataCache::builtin())
    }
}

impl PromptEngine {
    pub fn new(data: DataCache) -> Self {
        let index = NameIndex::build(&data);
        Self { data, index }
    }

    pub fn data(&self) -> &DataCache {
        &self.data
    }

    pub fn index(&self) -> &NameIndex {
        &self.index
    }

    /// Run the deterministic pipeline. Never fails; malformed input
    /// degrades to empty phrases.
    pub fn generate<R: Rng + ?Sized>(&self, request: &GenerationRequest, rng: &mut R) -> PromptResult {
        self.compile(request, rng)
    }

    /// Run the pipeline, then try one rewrite through `enhancer`. The
    /// deterministic prompt is always kept in `prompt`.
    pub async fn generate_enhanced<R: Rng + ?Sized>(
        &self,
        request: &GenerationRequest,
        rng: &mut R,
        enhancer: &Enhancer,
    ) -> PromptResult {
        let mut result = self.compile(request, rng);
        let keywords = surviving_keywords(&result.segments);
        let enhanced = enhancer
            .enhance(&result.prompt, request.model, &keywords)
            .await;
        result.used_ai = enhanced.is_some();
        result.ai_enhanced = enhanced;
        info!(used_ai = result.used_ai, "Enhancement finished");
        result
    }

    fn compile<R: Rng + ?Sized>(
        &self,
        request: &GenerationRequest,
        rng: &mut R,
    ) -> PromptResult {
        let levels = &request.stats;
        let model = request.model;
        let gender = request.selections.gender();

        let foundation = assemble_foundation(levels, &self.data, gender, model, rng);
        let validation = validate_details(&request.selections, levels, &self.data);
        let suggestion = suggest_composition(levels);

        let inputs = SegmentInputs {
            foundation: &foundation,
            selections: &validation.validated_selections,
            levels,
            model,
            suggestion: &suggestion,
            index: &self.index,
        };
        let segments = build_segments(&inputs, rng);
        let portrait = wants_portrait(&validation.validated_selections, &segments);
        let segments = enforce_token_budget(segments, model);

        let ctx = FormatContext {
            charisma: levels.charisma,
            gender,
            portrait,
        };
        let prompt = format_prompt(&segments, model, &ctx);
        let negative_prompt =
            generate_negative(&validation.validated_selections, levels, model, request.intensity);

        let token_count = total_tokens(&segments);
        info!(
            model = model.display_name(),
            segments = segments.len(),
            tokens = token_count,
            limit = model.token_limit(),
            warnings = validation.warnings.len(),
            "Generated prompt"
        );

        PromptResult {
            prompt,
            negative_prompt,
            token_count,
            token_limit: model.token_limit(),
            warnings: validation.warnings,
            segments,
            ai_enhanced: None,
            used_ai: false,
        }
    }
}

/// Stat phrases still present after budget enforcement.
fn surviving_keywords(segments: &[PromptSegment]) -> Vec<String> {
    segments
        .iter()
        .filter(|s| matches!(s.category, SegmentCategory::Foundation | SegmentCategory::Charisma))
        .map(|s| s.text.clone())
        .collect()
}

/// Portrait intent: an explicit `portrait` flag, or a framing that reads as
/// a close shot.
fn wants_portrait(selections: &Selections, segments: &[PromptSegment]) -> bool {
    let flagged = match selections.get(controls::PORTRAIT) {
        Some(SelectionValue::Text(value)) => {
            matches!(value.trim().to_lowercase().as_str(), "true" | "yes" | "1" | "on")
        }
        Some(SelectionValue::Leveled { level, .. }) => *level > 0,
        _ => false,
    };
    flagged
        || segments
            .iter()
            .filter(|s| s.category == SegmentCategory::Framing)
            .any(|s| contains_any_word(&s.text, PORTRAIT_FRAMINGS))
}
