//! Detail Validator
//!
//! Advisory cross-checks between detail selections and stat levels. The
//! validator never blocks generation and never modifies selections; it only
//! reports findings that accompany the result.
//!
//! Also owns gear-quality adjective handling for equipment text.

use rand::seq::SliceRandom;
use rand::Rng;

use super::lexicon::{
    contains_any_word, equipment_weight_class, pose_acrobatics, quality_bucket, Acrobatics,
    WeightClass, ELDERLY_FEATURES, QUALITY_ADJECTIVE_RE, YOUTHFUL_FEATURES,
};
use super::types::{
    controls, DataCache, Model, Selections, SelectionsExt, Severity, StatLevels,
    ValidationWarning,
};

/// Output of [`validate_details`]: selections pass through untouched.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub validated_selections: Selections,
    pub warnings: Vec<ValidationWarning>,
}

/// Resolve a selected value to the text worth matching against: its name
/// plus the record description when the data cache knows it.
fn detail_text(data: &DataCache, category: &str, value: &str) -> String {
    data.options(category)
        .iter()
        .find(|record| record.name.eq_ignore_ascii_case(value))
        .and_then(|record| record.description.as_deref())
        .map(|description| format!("{value} {description}"))
        .unwrap_or_else(|| value.to_string())
}

/// Cross-check equipment, pose and facial features against stat levels.
///
/// Warnings come out in a fixed order: equipment slots, then pose, then
/// facial features.
pub fn validate_details(
    selections: &Selections,
    levels: &StatLevels,
    data: &DataCache,
) -> ValidationOutcome {
    let mut warnings = Vec::new();

    for slot in controls::EQUIPMENT_SLOTS {
        for item in selections.texts_of(slot) {
            let text = detail_text(data, slot, item);
            match equipment_weight_class(&text) {
                Some(WeightClass::Heavy) if levels.strength < 3 => warnings.push(
                    ValidationWarning::new(
                        Severity::Warn,
                        format!(
                            "Heavy equipment '{item}' is a weight mismatch for strength level {}",
                            levels.strength
                        ),
                        vec![item.to_string(), "strength".to_string()],
                    )
                    .with_suggestion("Choose lighter gear or raise strength to 3 or more"),
                ),
                Some(WeightClass::Medium) if levels.strength < 2 => warnings.push(
                    ValidationWarning::new(
                        Severity::Info,
                        format!(
                            "Medium equipment '{item}' may look heavy for strength level {}",
                            levels.strength
                        ),
                        vec![item.to_string(), "strength".to_string()],
                    ),
                ),
                _ => {}
            }
        }
    }

    for pose in selections.texts_of(controls::POSE) {
        let text = detail_text(data, controls::POSE, pose);
        match pose_acrobatics(&text) {
            Some(Acrobatics::High) if levels.dexterity < 4 => warnings.push(
                ValidationWarning::new(
                    Severity::Warn,
                    format!(
                        "Pose '{pose}' is highly acrobatic for dexterity level {}",
                        levels.dexterity
                    ),
                    vec![pose.to_string(), "dexterity".to_string()],
                )
                .with_suggestion("Pick a grounded pose or raise dexterity to 4 or more"),
            ),
            Some(Acrobatics::Moderate) if levels.dexterity < 3 => warnings.push(
                ValidationWarning::new(
                    Severity::Info,
                    format!(
                        "Pose '{pose}' is somewhat acrobatic for dexterity level {}",
                        levels.dexterity
                    ),
                    vec![pose.to_string(), "dexterity".to_string()],
                ),
            ),
            _ => {}
        }
    }

    for feature in selections.texts_of(controls::FACIAL_FEATURES) {
        let text = detail_text(data, controls::FACIAL_FEATURES, feature);
        if levels.age >= 4 && contains_any_word(&text, YOUTHFUL_FEATURES) {
            warnings.push(ValidationWarning::new(
                Severity::Info,
                format!("Youthful feature '{feature}' on an elderly character (age level {})", levels.age),
                vec![feature.to_string(), "age".to_string()],
            ));
        } else if levels.age <= 2 && contains_any_word(&text, ELDERLY_FEATURES) {
            warnings.push(ValidationWarning::new(
                Severity::Info,
                format!("Aged feature '{feature}' on a young character (age level {})", levels.age),
                vec![feature.to_string(), "age".to_string()],
            ));
        }
    }

    ValidationOutcome {
        validated_selections: selections.clone(),
        warnings,
    }
}

/// Remove every gear-quality adjective (whole words only).
pub fn strip_quality_adjectives(text: &str) -> String {
    let stripped = QUALITY_ADJECTIVE_RE.replace_all(text, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace any quality adjective with one drawn from the bucket for
/// `quality_level`. Narrative dialects get a natural modifier ("gleaming
/// plate armor"); tag dialects get a leading tag ("gleaming, plate armor").
pub fn inject_gear_quality<R: Rng + ?Sized>(
    text: &str,
    quality_level: u8,
    model: Model,
    rng: &mut R,
) -> String {
    let base = strip_quality_adjectives(text);
    if base.is_empty() {
        return base;
    }
    let Some(adjective) = quality_bucket(quality_level).choose(rng) else {
        return base;
    };
    if model.is_narrative() {
        format!("{adjective} {base}")
    } else {
        format!("{adjective}, {base}")
    }
}
