//! Property-based tests for the prompt pipeline
//!
//! Tests invariants:
//! - Foundation phrases never contain a dead word
//! - Budget enforcement respects the dialect limit above the protected floor
//! - Tier 0-2 segments are never removed or altered
//! - Negative prompts never contradict the character
//! - Pony prompts never use parenthesis weight syntax
//! - Category order is stable for a fixed seed

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::core::prompt::lexicon::{contains_dead_word, contains_word};
use crate::core::prompt::{
    assemble_foundation, enforce_token_budget, generate_negative, DataCache, Gender,
    GenerationRequest, Model, PromptEngine, PromptSegment, SegmentCategory, SelectionValue,
    Selections, StatAxis, StatLevels,
};

// ============================================================================
// Strategies
// ============================================================================

const SELECTION_KEYS: &[&str] = &[
    "race",
    "gender",
    "genre",
    "chest",
    "head",
    "weapon",
    "pose",
    "facial_features",
    "special_traits",
    "expression",
    "scene",
    "lighting",
    "mood",
    "custom_text",
];

const SELECTION_VALUES: &[&str] = &[
    "elf",
    "dwarf",
    "human",
    "female",
    "male",
    "cyberpunk",
    "high fantasy",
    "full plate armor",
    "leather jerkin",
    "chainmail hauberk",
    "ornate horned helm",
    "greatsword",
    "backflip",
    "leaping",
    "standing tall",
    "freckles",
    "crow's feet",
    "curved horns",
    "tusks",
    "battle scars",
    "fierce grin",
    "ruined cathedral at dusk",
    "candlelight",
    "(glowing runes:1.4)",
    "{ethereal glow}",
    "[misty]",
];

fn arb_model() -> impl Strategy<Value = Model> {
    prop::sample::select(Model::ALL.to_vec())
}

fn arb_gender() -> impl Strategy<Value = Gender> {
    prop::sample::select(vec![Gender::Female, Gender::Male, Gender::Other])
}

fn arb_levels() -> impl Strategy<Value = StatLevels> {
    prop::collection::vec(1i64..=5, StatAxis::ALL.len()).prop_map(|raw| {
        let mut levels = StatLevels::default();
        for (axis, level) in StatAxis::ALL.into_iter().zip(raw) {
            levels.set(axis, level);
        }
        levels
    })
}

fn arb_value() -> impl Strategy<Value = SelectionValue> {
    prop_oneof![
        prop::sample::select(SELECTION_VALUES.to_vec()).prop_map(SelectionValue::from),
        prop::collection::vec(prop::sample::select(SELECTION_VALUES.to_vec()), 1..4)
            .prop_map(SelectionValue::from),
        (1i64..=5, prop::sample::select(SELECTION_VALUES.to_vec())).prop_map(|(level, q)| {
            SelectionValue::Leveled {
                level,
                qualifier: q.to_string(),
            }
        }),
        "[a-z]{3,9}( [a-z]{3,9}){0,30}".prop_map(SelectionValue::Text),
    ]
}

fn arb_selections() -> impl Strategy<Value = Selections> {
    prop::collection::vec((prop::sample::select(SELECTION_KEYS.to_vec()), arb_value()), 0..10)
        .prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect()
        })
}

fn arb_request() -> impl Strategy<Value = GenerationRequest> {
    (arb_levels(), arb_selections(), arb_model()).prop_map(|(stats, selections, model)| {
        GenerationRequest {
            stats,
            selections,
            model,
            ..GenerationRequest::default()
        }
    })
}

fn protected(segments: &[PromptSegment]) -> Vec<&PromptSegment> {
    segments.iter().filter(|s| s.is_protected()).collect()
}

proptest! {
    /// Property: foundation phrases never surface a dead word
    #[test]
    fn prop_foundation_has_no_dead_words(
        seed in any::<u64>(),
        levels in arb_levels(),
        gender in arb_gender(),
        model in arb_model()
    ) {
        let data = DataCache::builtin();
        let mut rng = StdRng::seed_from_u64(seed);
        let keywords = assemble_foundation(&levels, &data, gender, model, &mut rng);
        for phrase in keywords.keywords() {
            prop_assert!(!contains_dead_word(&phrase), "dead word in '{}'", phrase);
        }
    }

    /// Property: the budgeted total fits unless protected content alone overflows
    #[test]
    fn prop_budget_respects_limit(seed in any::<u64>(), request in arb_request()) {
        let engine = PromptEngine::default();
        let result = engine.generate(&request, &mut StdRng::seed_from_u64(seed));
        let floor: usize = protected(&result.segments).iter().map(|s| s.token_count).sum();
        prop_assert!(
            floor > result.token_limit || result.token_count <= result.token_limit,
            "{} tokens over limit {} (floor {})",
            result.token_count,
            result.token_limit,
            floor
        );
    }

    /// Property: tier 0-2 segments come out of enforcement unchanged
    #[test]
    fn prop_protected_tiers_survive(
        model in arb_model(),
        texts in prop::collection::vec(("[a-z]{3,8}( [a-z]{3,8}){0,40}", 0u8..=9), 1..12)
    ) {
        let segments: Vec<PromptSegment> = texts
            .into_iter()
            .map(|(text, tier)| PromptSegment::new(tier, SegmentCategory::Custom, text))
            .collect();
        let mut before: Vec<PromptSegment> = segments.iter().filter(|s| s.is_protected()).cloned().collect();
        before.sort_by_key(|s| s.tier);

        let after = enforce_token_budget(segments, model);
        let kept: Vec<PromptSegment> = after.iter().filter(|s| s.is_protected()).cloned().collect();
        prop_assert_eq!(before, kept);
    }

    /// Property: exclusions never fight the character
    #[test]
    fn prop_negative_has_no_contradictions(
        levels in arb_levels(),
        selections in arb_selections(),
        model in arb_model()
    ) {
        let negative = generate_negative(&selections, &levels, model, 3);
        if levels.charisma <= 2 {
            prop_assert!(!contains_word(&negative, "ugly"));
        }
        if levels.age >= 4 {
            prop_assert!(!contains_word(&negative, "wrinkles"));
        }
        if crate::core::prompt::negative::has_monstrous_traits(&selections) {
            prop_assert!(!contains_word(&negative, "deformed"));
        }
    }

    /// Property: Pony output never carries parenthesis weights
    #[test]
    fn prop_pony_has_no_weight_syntax(seed in any::<u64>(), mut request in arb_request()) {
        request.model = Model::Pony;
        let engine = PromptEngine::default();
        let result = engine.generate(&request, &mut StdRng::seed_from_u64(seed));
        prop_assert!(!result.prompt.contains('('), "weights in '{}'", result.prompt);
        prop_assert!(!result.prompt.contains(')'), "weights in '{}'", result.prompt);
    }

    /// Property: category order depends only on inputs and seed
    #[test]
    fn prop_category_order_is_stable(seed in any::<u64>(), request in arb_request()) {
        let engine = PromptEngine::default();
        let first = engine.generate(&request, &mut StdRng::seed_from_u64(seed));
        let second = engine.generate(&request, &mut StdRng::seed_from_u64(seed));
        let order = |segments: &[PromptSegment]| {
            segments.iter().map(|s| (s.tier, s.category)).collect::<Vec<_>>()
        };
        prop_assert_eq!(order(&first.segments), order(&second.segments));
        prop_assert_eq!(first.warnings, second.warnings);
    }
}
