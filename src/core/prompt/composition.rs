//! Composition Advisor
//!
//! A pure decision table that suggests camera, lighting, framing and style
//! from stat levels. Suggestions only fill gaps: an explicit user choice
//! always wins.

use serde::{Deserialize, Serialize};

use super::types::StatLevels;

/// Suggested composition for a character. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionSuggestion {
    pub camera_angle: Option<String>,
    pub lighting: Option<String>,
    pub framing: Option<String>,
    pub aesthetic: Option<String>,
    pub genre_style: Option<String>,
    pub rendering_style: Option<String>,
    /// Human-readable explanation of the rules that fired.
    pub rationale: String,
}

impl CompositionSuggestion {
    pub fn is_empty(&self) -> bool {
        self.camera_angle.is_none()
            && self.lighting.is_none()
            && self.framing.is_none()
            && self.aesthetic.is_none()
            && self.genre_style.is_none()
            && self.rendering_style.is_none()
    }
}

/// Suggest composition choices from stat levels. Deterministic.
pub fn suggest_composition(levels: &StatLevels) -> CompositionSuggestion {
    let muscle = levels.strength;
    let attractiveness = levels.charisma;
    let age = levels.age;
    let intelligence = levels.intelligence;
    let dexterity = levels.dexterity;

    let mut reasons: Vec<&str> = Vec::new();
    let mut pick = |reason: &'static str, value: &'static str| {
        reasons.push(reason);
        Some(value.to_string())
    };

    let camera_angle = if muscle >= 4 {
        pick("low angle to emphasize physical power", "low angle shot")
    } else if dexterity >= 4 {
        pick("dynamic angle to convey agility", "dynamic dutch angle")
    } else if attractiveness <= 2 {
        pick("eye level for an honest, unflattering view", "eye level shot")
    } else {
        None
    };

    let lighting = if attractiveness >= 4 && age <= 2 {
        pick("golden hour flatters youthful beauty", "golden hour lighting")
    } else if age >= 4 {
        pick("chiaroscuro brings out age and character", "dramatic chiaroscuro lighting")
    } else if intelligence >= 4 {
        pick("soft light suits a thoughtful subject", "soft diffused lighting")
    } else if muscle >= 4 {
        pick("rim light outlines musculature", "rim lighting")
    } else if attractiveness <= 2 {
        pick("harsh side light for rough features", "harsh side lighting")
    } else {
        None
    };

    let framing = if dexterity >= 4 {
        pick("full body to show movement", "full body shot")
    } else if attractiveness >= 4 {
        pick("close framing for a striking face", "portrait")
    } else if intelligence >= 4 {
        pick("upper body for expression and gesture", "upper body shot")
    } else {
        None
    };

    let aesthetic = if age >= 4 && intelligence >= 4 {
        pick("aged intellect reads as scholarly", "scholarly")
    } else if muscle >= 4 && attractiveness <= 2 {
        pick("brute force with rough looks reads as gritty", "gritty")
    } else if attractiveness >= 4 {
        pick("high charisma suits an ethereal look", "ethereal")
    } else {
        None
    };

    let genre_style = if muscle >= 4 && attractiveness <= 2 {
        pick("menacing strength suggests dark fantasy", "dark fantasy")
    } else if intelligence >= 4 {
        pick("brilliance suggests high fantasy", "high fantasy")
    } else {
        None
    };

    let rendering_style = if attractiveness >= 4 {
        pick("painterly rendering for beauty", "digital painting")
    } else if muscle >= 4 {
        pick("concept art for physicality", "concept art")
    } else {
        None
    };

    CompositionSuggestion {
        camera_angle,
        lighting,
        framing,
        aesthetic,
        genre_style,
        rendering_style,
        rationale: reasons.join("; "),
    }
}
