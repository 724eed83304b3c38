//! Segment Builder
//!
//! Merges foundation phrases, detail selections and composition suggestions
//! into a tier-ordered list of [`PromptSegment`]s:
//!
//! | Tier | Content |
//! |------|---------|
//! | 0 | style / genre / rendering, fantasy context |
//! | 1 | identity (gender + race) |
//! | 2 | extreme stats, then primary stats |
//! | 3 | remaining secondary stats |
//! | 4 | equipment |
//! | 5 | facial features, expression, special traits |
//! | 6 | pose, scene |
//! | 7 | camera, lighting, framing, depth of field |
//! | 8 | mood, weather |
//! | 9 | free-form text |

use std::collections::HashMap;

use rand::Rng;

use super::composition::CompositionSuggestion;
use super::lexicon::{
    contains_word, is_fantasy, FANTASY_CONTEXT_PHRASE, FANTASY_EQUIPMENT_PREFIX,
};
use super::types::{
    controls, DataCache, FoundationKeywords, Model, OptionRecord, PromptSegment, SegmentCategory,
    Selections, SelectionsExt, StatAxis, StatLevels,
};
use super::validator::inject_gear_quality;

/// Style text used when neither the caller nor the advisor picked one.
pub const FALLBACK_STYLE: &str = "detailed character illustration";

/// Race assumed when none is selected.
pub const DEFAULT_RACE: &str = "human";

// ============================================================================
// Name Index
// ============================================================================

/// Lowercase option name to the records carrying it, built once per engine.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    by_name: HashMap<String, Vec<(String, OptionRecord)>>,
}

impl NameIndex {
    pub fn build(data: &DataCache) -> Self {
        let mut categories: Vec<_> = data.categories().map(|(name, _)| name.as_str()).collect();
        categories.sort_unstable();

        let mut by_name: HashMap<String, Vec<(String, OptionRecord)>> = HashMap::new();
        for category in categories {
            for record in data.options(category) {
                by_name
                    .entry(record.name.trim().to_lowercase())
                    .or_default()
                    .push((category.to_string(), record.clone()));
            }
        }
        Self { by_name }
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Find a record by name, preferring one from `category`.
    pub fn lookup(&self, category: &str, name: &str) -> Option<&OptionRecord> {
        let records = self.by_name.get(&name.trim().to_lowercase())?;
        records
            .iter()
            .find(|(c, _)| c == category)
            .or_else(|| records.first())
            .map(|(_, record)| record)
    }

    /// Prompt text for a selected value; unknown values render verbatim.
    pub fn resolve(&self, category: &str, value: &str) -> String {
        self.lookup(category, value)
            .map(|record| record.prompt_text().to_string())
            .unwrap_or_else(|| value.trim().to_string())
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Inputs shared by every tier.
pub struct SegmentInputs<'a> {
    pub foundation: &'a FoundationKeywords,
    pub selections: &'a Selections,
    pub levels: &'a StatLevels,
    pub model: Model,
    pub suggestion: &'a CompositionSuggestion,
    pub index: &'a NameIndex,
}

impl SegmentInputs<'_> {
    fn resolved(&self, key: &str) -> Vec<String> {
        self.selections
            .texts_of(key)
            .into_iter()
            .map(|value| self.index.resolve(key, value))
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Explicit selection, else the advisor's suggestion.
    fn explicit_or(&self, key: &str, suggested: Option<&String>) -> Vec<String> {
        let explicit = self.resolved(key);
        if explicit.is_empty() {
            suggested.cloned().into_iter().collect()
        } else {
            explicit
        }
    }

    /// Judged on the same race, genre and aesthetic values the style tier renders.
    fn is_fantasy_context(&self) -> bool {
        self.resolved(controls::RACE)
            .into_iter()
            .chain(self.explicit_or(controls::GENRE, self.suggestion.genre_style.as_ref()))
            .chain(self.explicit_or(controls::AESTHETIC, self.suggestion.aesthetic.as_ref()))
            .any(|text| is_fantasy(&text))
    }
}

/// Build the tier-ordered segment list. Segment order only depends on the
/// inputs; the random source only affects gear-quality adjectives.
pub fn build_segments<R: Rng + ?Sized>(inputs: &SegmentInputs<'_>, rng: &mut R) -> Vec<PromptSegment> {
    let mut segments = Vec::new();
    let fantasy = inputs.is_fantasy_context();

    push_style(&mut segments, inputs, fantasy);
    push_identity(&mut segments, inputs);
    push_foundation(&mut segments, inputs);
    push_equipment(&mut segments, inputs, fantasy, rng);

    let detail_tiers: [(u8, &str, SegmentCategory); 5] = [
        (5, controls::FACIAL_FEATURES, SegmentCategory::Facial),
        (5, controls::EXPRESSION, SegmentCategory::Expression),
        (5, controls::SPECIAL_TRAITS, SegmentCategory::Special),
        (6, controls::POSE, SegmentCategory::Pose),
        (6, controls::SCENE, SegmentCategory::Scene),
    ];
    for (tier, key, category) in detail_tiers {
        push_joined(&mut segments, tier, category, inputs.resolved(key));
    }

    let suggestion = inputs.suggestion;
    let composition = [
        (controls::CAMERA_ANGLE, SegmentCategory::Camera, suggestion.camera_angle.as_ref()),
        (controls::LIGHTING, SegmentCategory::Lighting, suggestion.lighting.as_ref()),
        (controls::FRAMING, SegmentCategory::Framing, suggestion.framing.as_ref()),
        (controls::DEPTH_OF_FIELD, SegmentCategory::Depth, None),
    ];
    for (key, category, suggested) in composition {
        push_joined(&mut segments, 7, category, inputs.explicit_or(key, suggested));
    }

    push_joined(&mut segments, 8, SegmentCategory::Mood, inputs.resolved(controls::MOOD));
    push_joined(&mut segments, 8, SegmentCategory::Weather, inputs.resolved(controls::WEATHER));

    let custom: Vec<String> = inputs
        .selections
        .texts_of(controls::CUSTOM_TEXT)
        .into_iter()
        .map(str::to_string)
        .collect();
    push_joined(&mut segments, 9, SegmentCategory::Custom, custom);

    segments
}

fn push_joined(
    segments: &mut Vec<PromptSegment>,
    tier: u8,
    category: SegmentCategory,
    parts: Vec<String>,
) {
    if !parts.is_empty() {
        segments.push(PromptSegment::new(tier, category, parts.join(", ")));
    }
}

fn push_style(segments: &mut Vec<PromptSegment>, inputs: &SegmentInputs<'_>, fantasy: bool) {
    let suggestion = inputs.suggestion;
    let mut style = inputs.resolved(controls::STYLE);
    style.extend(inputs.explicit_or(controls::RENDERING_STYLE, suggestion.rendering_style.as_ref()));
    style.extend(inputs.explicit_or(controls::GENRE, suggestion.genre_style.as_ref()));
    style.extend(inputs.explicit_or(controls::AESTHETIC, suggestion.aesthetic.as_ref()));
    if style.is_empty() {
        style.push(FALLBACK_STYLE.to_string());
    }
    push_joined(segments, 0, SegmentCategory::Style, style);

    if fantasy {
        segments.push(PromptSegment::new(0, SegmentCategory::Context, FANTASY_CONTEXT_PHRASE));
    }
}

fn push_identity(segments: &mut Vec<PromptSegment>, inputs: &SegmentInputs<'_>) {
    let race = inputs
        .resolved(controls::RACE)
        .into_iter()
        .next()
        .unwrap_or_else(|| DEFAULT_RACE.to_string());
    let identity = match inputs.selections.gender().identity_word() {
        Some(word) if !contains_word(&race, word) => format!("{word} {race}"),
        _ => race,
    };
    segments.push(PromptSegment::new(1, SegmentCategory::Identity, identity));
}

fn stat_category(axis: StatAxis) -> SegmentCategory {
    if axis == StatAxis::Charisma {
        SegmentCategory::Charisma
    } else {
        SegmentCategory::Foundation
    }
}

/// Extreme stats go first at tier 2, then mid-range primary stats at tier 2,
/// then mid-range secondary stats at tier 3.
fn push_foundation(segments: &mut Vec<PromptSegment>, inputs: &SegmentInputs<'_>) {
    let phrases: Vec<(StatAxis, &str)> = inputs.foundation.iter().collect();
    let levels = inputs.levels;

    let extremes = phrases.iter().filter(|(axis, _)| levels.is_extreme(*axis));
    let primaries = phrases
        .iter()
        .filter(|(axis, _)| !levels.is_extreme(*axis) && axis.is_primary());
    for (axis, phrase) in extremes.chain(primaries) {
        segments.push(PromptSegment::new(2, stat_category(*axis), *phrase));
    }

    for (axis, phrase) in phrases
        .iter()
        .filter(|(axis, _)| !levels.is_extreme(*axis) && !axis.is_primary())
    {
        segments.push(PromptSegment::new(3, stat_category(*axis), *phrase).summarizable());
    }
}

fn push_equipment<R: Rng + ?Sized>(
    segments: &mut Vec<PromptSegment>,
    inputs: &SegmentInputs<'_>,
    fantasy: bool,
    rng: &mut R,
) {
    let default_quality = inputs
        .selections
        .get(controls::GEAR_QUALITY)
        .and_then(|value| value.level());

    for slot in controls::EQUIPMENT_SLOTS {
        let Some(value) = inputs.selections.get(slot) else {
            continue;
        };
        let quality = value.level().or(default_quality);
        for item in value.texts() {
            let mut text = inputs.index.resolve(slot, item);
            if text.is_empty() {
                continue;
            }
            if fantasy && !contains_word(&text, FANTASY_EQUIPMENT_PREFIX) {
                text = format!("{FANTASY_EQUIPMENT_PREFIX} {text}");
            }
            if let Some(level) = quality {
                text = inject_gear_quality(&text, level, inputs.model, rng);
            }
            segments.push(PromptSegment::new(4, SegmentCategory::Equipment, text).summarizable());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::prompt::composition::suggest_composition;
    use crate::core::prompt::types::{CategoryData, SelectionValue};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn foundation(pairs: &[(StatAxis, &str)]) -> FoundationKeywords {
        let mut keywords = FoundationKeywords::default();
        for (axis, phrase) in pairs {
            keywords.set(*axis, phrase.to_string());
        }
        keywords
    }

    fn build(
        keywords: &FoundationKeywords,
        selections: &Selections,
        levels: &StatLevels,
        model: Model,
        index: &NameIndex,
    ) -> Vec<PromptSegment> {
        let suggestion = suggest_composition(levels);
        let inputs = SegmentInputs {
            foundation: keywords,
            selections,
            levels,
            model,
            suggestion: &suggestion,
            index,
        };
        build_segments(&inputs, &mut StdRng::seed_from_u64(11))
    }

    fn select(pairs: &[(&str, SelectionValue)]) -> Selections {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_tiers_are_non_decreasing() {
        let keywords = foundation(&[
            (StatAxis::Strength, "towering"),
            (StatAxis::Demeanor, "calm"),
        ]);
        let selections = select(&[
            ("race", "elf".into()),
            ("chest", "leather jerkin".into()),
            ("pose", "standing".into()),
            ("custom_text", "glowing runes".into()),
            ("mood", "somber".into()),
        ]);
        let segments = build(&keywords, &selections, &StatLevels::default(), Model::Sdxl, &NameIndex::default());
        let tiers: Vec<u8> = segments.iter().map(|s| s.tier).collect();
        let mut sorted = tiers.clone();
        sorted.sort();
        assert_eq!(tiers, sorted);
        assert_eq!(segments.last().map(|s| s.category), Some(SegmentCategory::Custom));
    }

    #[test]
    fn test_fallback_style_and_default_race() {
        let segments = build(
            &FoundationKeywords::default(),
            &Selections::new(),
            &StatLevels::default(),
            Model::Sdxl,
            &NameIndex::default(),
        );
        assert_eq!(segments[0].text, FALLBACK_STYLE);
        assert_eq!(segments[1].category, SegmentCategory::Identity);
        assert_eq!(segments[1].text, "human");
    }

    #[test]
    fn test_explicit_choice_beats_suggestion() {
        let levels = StatLevels::default().with(StatAxis::Strength, 5);
        let selections = select(&[("camera_angle", "bird's eye view".into())]);
        let segments = build(&FoundationKeywords::default(), &selections, &levels, Model::Sdxl, &NameIndex::default());
        let camera: Vec<_> = segments
            .iter()
            .filter(|s| s.category == SegmentCategory::Camera)
            .collect();
        assert_eq!(camera.len(), 1);
        assert_eq!(camera[0].text, "bird's eye view");

        let suggested = build(&FoundationKeywords::default(), &Selections::new(), &levels, Model::Sdxl, &NameIndex::default());
        assert!(suggested.iter().any(|s| s.text == "low angle shot"));
    }

    #[test]
    fn test_fantasy_context_and_equipment_prefix() {
        let selections = select(&[("race", "dwarf".into()), ("chest", "plate armor".into())]);
        let segments = build(&FoundationKeywords::default(), &selections, &StatLevels::default(), Model::Sdxl, &NameIndex::default());
        assert!(segments
            .iter()
            .any(|s| s.category == SegmentCategory::Context && s.text == FANTASY_CONTEXT_PHRASE));
        let equipment = segments
            .iter()
            .find(|s| s.category == SegmentCategory::Equipment)
            .unwrap();
        assert_eq!(equipment.text, "fantasy plate armor");
        assert!(equipment.summarizable);
    }

    #[test]
    fn test_no_fantasy_context_for_modern_character() {
        let selections = select(&[("race", "human".into()), ("genre", "cyberpunk".into())]);
        let segments = build(&FoundationKeywords::default(), &selections, &StatLevels::default(), Model::Sdxl, &NameIndex::default());
        assert!(!segments.iter().any(|s| s.category == SegmentCategory::Context));
    }

    #[test]
    fn test_explicit_modern_genre_overrides_suggested_fantasy() {
        let levels = StatLevels::default().with(StatAxis::Intelligence, 4);
        assert!(suggest_composition(&levels)
            .genre_style
            .as_deref()
            .is_some_and(is_fantasy));

        let selections = select(&[
            ("race", "human".into()),
            ("genre", "cyberpunk".into()),
            ("chest", "leather jacket".into()),
        ]);
        let segments = build(&FoundationKeywords::default(), &selections, &levels, Model::Sdxl, &NameIndex::default());
        assert!(!segments.iter().any(|s| s.category == SegmentCategory::Context));
        let equipment = segments
            .iter()
            .find(|s| s.category == SegmentCategory::Equipment)
            .unwrap();
        assert_eq!(equipment.text, "leather jacket");
    }

    #[test]
    fn test_mid_range_primary_and_secondary_tiers() {
        let levels = StatLevels::default()
            .with(StatAxis::Dexterity, 4)
            .with(StatAxis::Intelligence, 4)
            .with(StatAxis::Height, 4);
        let keywords = foundation(&[
            (StatAxis::Dexterity, "agile"),
            (StatAxis::Intelligence, "perceptive"),
            (StatAxis::Height, "long-limbed"),
        ]);
        let segments = build(&keywords, &Selections::new(), &levels, Model::Sdxl, &NameIndex::default());
        let tier_of = |text: &str| segments.iter().find(|s| s.text == text).map(|s| s.tier);
        assert_eq!(tier_of("agile"), Some(2));
        assert_eq!(tier_of("perceptive"), Some(2));
        assert_eq!(tier_of("long-limbed"), Some(3));
    }

    #[test]
    fn test_extreme_stats_precede_mid_range() {
        let levels = StatLevels::default()
            .with(StatAxis::Skin, 1)
            .with(StatAxis::Strength, 3);
        let keywords = foundation(&[(StatAxis::Strength, "fit"), (StatAxis::Skin, "scarred skin")]);
        let segments = build(&keywords, &Selections::new(), &levels, Model::Sdxl, &NameIndex::default());
        let foundation: Vec<_> = segments
            .iter()
            .filter(|s| s.category == SegmentCategory::Foundation)
            .collect();
        assert_eq!(foundation[0].text, "scarred skin");
        assert_eq!(foundation[0].tier, 2);
        assert_eq!(foundation[1].text, "fit");
    }

    #[test]
    fn test_mid_range_secondary_stats_are_tier_three() {
        let keywords = foundation(&[(StatAxis::Grooming, "neatly kept")]);
        let segments = build(&keywords, &Selections::new(), &StatLevels::default(), Model::Sdxl, &NameIndex::default());
        let grooming = segments
            .iter()
            .find(|s| s.text == "neatly kept")
            .unwrap();
        assert_eq!(grooming.tier, 3);
        assert!(grooming.summarizable);
    }

    #[test]
    fn test_charisma_phrase_has_charisma_category() {
        let keywords = foundation(&[(StatAxis::Charisma, "radiant")]);
        let segments = build(&keywords, &Selections::new(), &StatLevels::default(), Model::Sdxl, &NameIndex::default());
        assert!(segments
            .iter()
            .any(|s| s.category == SegmentCategory::Charisma && s.text == "radiant"));
    }

    #[test]
    fn test_identity_includes_gender() {
        let selections = select(&[("gender", "female".into()), ("race", "orc".into())]);
        let segments = build(&FoundationKeywords::default(), &selections, &StatLevels::default(), Model::Sdxl, &NameIndex::default());
        assert_eq!(segments.iter().find(|s| s.tier == 1).unwrap().text, "female orc");
    }

    #[test]
    fn test_leveled_equipment_gets_quality_adjective() {
        let selections = select(&[(
            "weapon",
            SelectionValue::Leveled {
                level: 1,
                qualifier: "longsword".to_string(),
            },
        )]);
        let segments = build(&FoundationKeywords::default(), &selections, &StatLevels::default(), Model::Sdxl, &NameIndex::default());
        let weapon = segments
            .iter()
            .find(|s| s.category == SegmentCategory::Equipment)
            .unwrap();
        let (adjective, rest) = weapon.text.split_once(", ").unwrap();
        assert!(["rusty", "tattered", "broken"].contains(&adjective));
        assert_eq!(rest, "longsword");
    }

    #[test]
    fn test_name_index_resolves_descriptions() {
        let data = DataCache::new().with_category(
            "pose",
            CategoryData::Options(vec![
                OptionRecord::new("Hero").with_description("standing tall, fists on hips"),
            ]),
        );
        let index = NameIndex::build(&data);
        assert_eq!(index.resolve("pose", "hero"), "standing tall, fists on hips");
        assert_eq!(index.resolve("pose", "kneeling"), "kneeling");

        let selections = select(&[("pose", "Hero".into())]);
        let segments = build(&FoundationKeywords::default(), &selections, &StatLevels::default(), Model::Sdxl, &index);
        assert!(segments
            .iter()
            .any(|s| s.category == SegmentCategory::Pose && s.text == "standing tall, fists on hips"));
    }
}
