//! End-to-end tests for the prompt compiler public API.

use rand::rngs::StdRng;
use rand::SeedableRng;

use charprompt::core::prompt::lexicon::DEAD_WORDS;
use charprompt::core::prompt::{
    assemble_foundation, suggest_composition, CategoryData, DataCache, Gender, GenerationRequest,
    Model, OptionRecord, PromptEngine, PromptResult, SegmentCategory, SelectionValue, Severity,
    StatAxis, StatLevels,
};

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn hero_request(model: Model) -> GenerationRequest {
    GenerationRequest::new(
        StatLevels::default()
            .with(StatAxis::Strength, 5)
            .with(StatAxis::Charisma, 4)
            .with(StatAxis::Age, 2),
        model,
    )
    .select("gender", "male")
    .select("race", "dwarf")
    .select("chest", "full plate armor")
    .select("weapon", vec!["warhammer"])
    .select("gear_quality", SelectionValue::Leveled { level: 5, qualifier: "masterwork".into() })
    .select("pose", "standing tall")
    .select("custom_text", "glowing runes on the armor")
}

#[test]
fn test_average_character_has_no_dead_words() {
    let data = DataCache::builtin();
    for model in Model::ALL {
        for seed in 0..20 {
            let keywords = assemble_foundation(&StatLevels::default(), &data, Gender::Other, model, &mut rng(seed));
            let text = keywords.joined().to_lowercase();
            for word in ["unremarkable", "common", "ordinary"] {
                assert!(!text.contains(word), "{word} in {text}");
            }
            assert!(DEAD_WORDS.iter().all(|dead| !text.contains(dead)));
        }
    }
}

#[test]
fn test_every_dialect_produces_prompt_within_budget() {
    let engine = PromptEngine::default();
    for model in Model::ALL {
        let result = engine.generate(&hero_request(model), &mut rng(1));
        assert!(!result.prompt.is_empty(), "{model:?}");
        assert!(!result.negative_prompt.is_empty(), "{model:?}");
        assert_eq!(result.token_limit, model.token_limit());
        assert!(result.token_count <= result.token_limit, "{model:?}");
        assert!(result.prompt.to_lowercase().contains("dwarf"), "{model:?}");
    }
}

#[test]
fn test_segments_sorted_and_custom_text_last() {
    let engine = PromptEngine::default();
    let result = engine.generate(&hero_request(Model::Flux), &mut rng(2));
    let tiers: Vec<u8> = result.segments.iter().map(|s| s.tier).collect();
    assert!(tiers.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(result.segments.last().map(|s| s.category), Some(SegmentCategory::Custom));
    assert_eq!(result.segments[0].category, SegmentCategory::Style);
}

#[test]
fn test_dialect_markers() {
    let engine = PromptEngine::default();

    let pony = engine.generate(&hero_request(Model::Pony), &mut rng(3));
    assert!(pony.prompt.starts_with("score_9, score_8_up, score_7_up"));
    assert!(pony.prompt.contains("1boy, solo"));
    assert!(!pony.prompt.contains('('));

    let sdxl = engine.generate(&hero_request(Model::Sdxl), &mut rng(3));
    assert!(sdxl.prompt.contains("(male dwarf:1.3)"));

    let novel = engine.generate(&hero_request(Model::NovelAi), &mut rng(3));
    assert!(novel.prompt.ends_with("very aesthetic, absurdres"));

    let flux = engine.generate(&hero_request(Model::Flux), &mut rng(3));
    assert!(flux.prompt.contains("A male dwarf"));
    assert!(flux.prompt.ends_with('.'));
}

#[test]
fn test_weak_character_in_heavy_armor_warns_once() {
    let engine = PromptEngine::default();
    let request = GenerationRequest::new(StatLevels::default().with(StatAxis::Strength, 1), Model::Sdxl)
        .select("chest", "full plate armor");
    let result = engine.generate(&request, &mut rng(4));
    let warns: Vec<_> = result
        .warnings
        .iter()
        .filter(|w| w.severity == Severity::Warn)
        .collect();
    assert_eq!(warns.len(), 1);
    assert!(warns[0].message.contains("weight mismatch"));
}

#[test]
fn test_elderly_acrobat_warns_and_avoids_youth_lighting() {
    let levels = StatLevels::default()
        .with(StatAxis::Age, 5)
        .with(StatAxis::Dexterity, 1);
    let engine = PromptEngine::default();
    let request = GenerationRequest::new(levels, Model::Flux).select("pose", "backflip");
    let result = engine.generate(&request, &mut rng(5));
    assert!(result.warnings.iter().any(|w| w.severity == Severity::Warn));
    assert_ne!(
        suggest_composition(&levels).lighting.as_deref(),
        Some("golden hour lighting")
    );
    assert!(!result.prompt.contains("golden hour"));
}

#[test]
fn test_negative_prompt_respects_character() {
    let engine = PromptEngine::default();
    let request = GenerationRequest::new(
        StatLevels::default()
            .with(StatAxis::Charisma, 1)
            .with(StatAxis::Age, 5),
        Model::Sdxl,
    )
    .select("special_traits", "tusks");
    let result = engine.generate(&request, &mut rng(6));
    let negative = result.negative_prompt.to_lowercase();
    assert!(!negative.contains("ugly"));
    assert!(!negative.contains("deformed"));
    assert!(!negative.contains("wrinkles"));
}

#[test]
fn test_custom_data_cache_descriptions_render() {
    let data = DataCache::builtin().with_category(
        "chest",
        CategoryData::Options(vec![
            OptionRecord::new("Knight Kit").with_description("fluted steel breastplate"),
        ]),
    );
    let engine = PromptEngine::new(data);
    let request = GenerationRequest::new(StatLevels::default(), Model::Illustrious)
        .select("chest", "knight kit");
    let result = engine.generate(&request, &mut rng(7));
    assert!(result.prompt.contains("fluted steel breastplate"));
}

#[test]
fn test_request_and_result_json_contract() {
    let json = r#"{
        "stats": { "strength": 9, "charisma": 0 },
        "selections": {
            "race": "elf",
            "head": ["circlet"],
            "weapon": { "level": 2, "qualifier": "longbow" }
        },
        "model": "novel_ai"
    }"#;
    let request: GenerationRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.stats.strength, 5);
    assert_eq!(request.stats.charisma, 1);
    assert_eq!(request.stats.age, 3);
    assert_eq!(request.model, Model::NovelAi);

    let result = PromptEngine::default().generate(&request, &mut rng(8));
    let value = serde_json::to_value(&result).unwrap();
    assert!(value.get("negativePrompt").is_some());
    assert!(value.get("tokenLimit").is_some());
    assert_eq!(value["usedAI"], serde_json::json!(false));

    let back: PromptResult = serde_json::from_value(value).unwrap();
    assert_eq!(back, result);
}
