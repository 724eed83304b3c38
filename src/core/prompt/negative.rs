//! Negative-Prompt Generator
//!
//! Builds the exclusion prompt from the same stat levels as the positive
//! prompt and removes exclusions that would fight the character itself.

use std::collections::HashSet;

use super::lexicon::{contains_word, is_monstrous};
use super::types::{controls, Model, Selections, SelectionsExt, StatLevels};

fn base_exclusions(model: Model) -> &'static str {
    match model {
        Model::Flux => "blurry, low quality, watermark, text, signature, ugly, deformed",
        Model::Pony => {
            "score_4, score_5, score_6, blurry, low quality, watermark, text, signature, ugly, deformed"
        }
        Model::Sdxl => {
            "worst quality, low quality, blurry, jpeg artifacts, watermark, text, signature, ugly, deformed"
        }
        Model::Sd15 => {
            "worst quality, low quality, lowres, blurry, jpeg artifacts, watermark, signature, ugly, deformed"
        }
        Model::Illustrious => "worst quality, low quality, lowres, bad quality, watermark, signature, ugly",
        Model::NovelAi => "lowres, worst quality, bad quality, jpeg artifacts, watermark, signature, ugly",
    }
}

fn anatomy_exclusions(model: Model) -> &'static str {
    match model {
        Model::Flux => "distorted anatomy, extra limbs",
        Model::Pony => "bad anatomy, bad proportions, extra limbs",
        Model::Sdxl | Model::Illustrious => {
            "bad anatomy, disfigured, mutated, extra limbs, missing limbs, deformed"
        }
        Model::Sd15 => "bad anatomy, bad proportions, disfigured, mutated, extra limbs, deformed",
        Model::NovelAi => "bad anatomy, extra limbs, missing limbs",
    }
}

fn hand_exclusions(model: Model) -> &'static str {
    match model {
        Model::Flux => "malformed hands",
        Model::Sd15 => "bad hands, mutated hands, poorly drawn hands, extra digits",
        Model::NovelAi => "bad hands, missing fingers, extra digit, fewer digits",
        _ => "bad hands, extra fingers, missing fingers, fused fingers",
    }
}

const SYMMETRY_EXCLUSIONS: &str = "asymmetrical face, uneven eyes";

/// Whether any selected trait needs anatomical freedom.
pub fn has_monstrous_traits(selections: &Selections) -> bool {
    [controls::SPECIAL_TRAITS, controls::FACIAL_FEATURES]
        .into_iter()
        .flat_map(|key| selections.texts_of(key))
        .any(is_monstrous)
}

/// Build the negative prompt.
///
/// `_intensity` is accepted for API stability and has no effect.
pub fn generate_negative(
    selections: &Selections,
    levels: &StatLevels,
    model: Model,
    _intensity: u8,
) -> String {
    let monstrous = has_monstrous_traits(selections);

    let mut groups: Vec<&str> = vec![base_exclusions(model)];
    if !monstrous {
        groups.push(anatomy_exclusions(model));
        groups.push(hand_exclusions(model));
    }
    if levels.charisma >= 4 {
        groups.push(SYMMETRY_EXCLUSIONS);
    }

    let mut contradictions: Vec<&str> = Vec::new();
    if levels.charisma <= 2 {
        contradictions.push("ugly");
    }
    if monstrous {
        contradictions.push("deformed");
    }
    if levels.age >= 4 {
        contradictions.push("wrinkles");
    }

    let mut seen = HashSet::new();
    groups
        .iter()
        .flat_map(|group| group.split(','))
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .filter(|term| !contradictions.iter().any(|word| contains_word(term, word)))
        .filter(|term| seen.insert(term.to_lowercase()))
        .collect::<Vec<_>>()
        .join(", ")
}
