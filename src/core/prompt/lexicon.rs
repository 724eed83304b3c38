//! Static lexicon tables shared by every pipeline phase.
//!
//! Nothing in here is mutable. Matching helpers are case-insensitive and work
//! on whole words so that "elf" never matches inside "shelf".

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{Gender, StatAxis};

// ============================================================================
// Dead Words
// ============================================================================

/// Words that reliably produce bland or muddy generations. Any qualifier
/// containing one of these, even as a substring, never surfaces.
pub const DEAD_WORDS: &[&str] = &[
    "unremarkable",
    "common",
    "ordinary",
    "normal",
    "average",
    "typical",
    "regular",
    "generic",
    "mundane",
    "nondescript",
    "standard",
    "mediocre",
];

pub fn contains_dead_word(text: &str) -> bool {
    let lower = text.to_lowercase();
    DEAD_WORDS.iter().any(|dead| lower.contains(dead))
}

// ============================================================================
// Gender-Coded Adjectives
// ============================================================================

pub const FEMININE_CODED: &[&str] = &[
    "beautiful",
    "pretty",
    "lovely",
    "curvy",
    "curvaceous",
    "petite",
    "voluptuous",
    "dainty",
    "willowy",
    "buxom",
    "matronly",
];

pub const MASCULINE_CODED: &[&str] = &[
    "handsome",
    "burly",
    "brawny",
    "rugged",
    "chiseled",
    "barrel-chested",
    "manly",
    "bearded",
    "square-jawed",
];

/// Whether a qualifier carries a gender coding that clashes with `gender`.
/// Characters without a binary gender avoid both codings.
pub fn is_gender_incompatible(text: &str, gender: Gender) -> bool {
    let feminine = contains_any_word(text, FEMININE_CODED);
    let masculine = contains_any_word(text, MASCULINE_CODED);
    match gender {
        Gender::Female => masculine,
        Gender::Male => feminine,
        Gender::Other => feminine || masculine,
    }
}

// ============================================================================
// Equipment Weight Classes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightClass {
    Medium,
    Heavy,
}

impl WeightClass {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::Heavy => "heavy",
        }
    }
}

const EQUIPMENT_WEIGHTS: &[(&str, WeightClass)] = &[
    ("plate", WeightClass::Heavy),
    ("full plate", WeightClass::Heavy),
    ("plate armor", WeightClass::Heavy),
    ("plate armour", WeightClass::Heavy),
    ("plate mail", WeightClass::Heavy),
    ("splint mail", WeightClass::Heavy),
    ("heavy armor", WeightClass::Heavy),
    ("greatsword", WeightClass::Heavy),
    ("greataxe", WeightClass::Heavy),
    ("great axe", WeightClass::Heavy),
    ("warhammer", WeightClass::Heavy),
    ("maul", WeightClass::Heavy),
    ("halberd", WeightClass::Heavy),
    ("tower shield", WeightClass::Heavy),
    ("zweihander", WeightClass::Heavy),
    ("half plate", WeightClass::Medium),
    ("breastplate", WeightClass::Medium),
    ("chainmail", WeightClass::Medium),
    ("chain mail", WeightClass::Medium),
    ("chain shirt", WeightClass::Medium),
    ("scale mail", WeightClass::Medium),
    ("ring mail", WeightClass::Medium),
    ("brigandine", WeightClass::Medium),
    ("hide armor", WeightClass::Medium),
    ("longsword", WeightClass::Medium),
    ("battleaxe", WeightClass::Medium),
    ("kite shield", WeightClass::Medium),
];

/// Weight class of an equipment description; the longest matching keyword
/// wins so "half plate" is medium even though it contains "plate".
pub fn equipment_weight_class(text: &str) -> Option<WeightClass> {
    EQUIPMENT_WEIGHTS
        .iter()
        .filter(|(keyword, _)| contains_word(text, keyword))
        .max_by_key(|(keyword, _)| keyword.len())
        .map(|(_, class)| *class)
}

// ============================================================================
// Gear Quality
// ============================================================================

/// Five-bucket quality ladder, worst to best.
pub const GEAR_QUALITY_LADDER: [[&str; 3]; 5] = [
    ["rusty", "tattered", "broken"],
    ["worn", "weathered", "battered"],
    ["sturdy", "serviceable", "well-kept"],
    ["polished", "fine", "ornate"],
    ["gleaming", "masterwork", "flawless"],
];

/// Adjectives for a 1..=5 quality level.
pub fn quality_bucket(level: u8) -> &'static [&'static str; 3] {
    let index = usize::from(level.clamp(1, 5)) - 1;
    &GEAR_QUALITY_LADDER[index]
}

pub static QUALITY_ADJECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    let words: Vec<String> = GEAR_QUALITY_LADDER
        .iter()
        .flatten()
        .map(|w| regex::escape(w))
        .collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", words.join("|"))).expect("static quality regex")
});

// ============================================================================
// Poses
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acrobatics {
    Moderate,
    High,
}

pub const HIGHLY_ACROBATIC_POSES: &[&str] = &[
    "backflip",
    "frontflip",
    "flip",
    "somersault",
    "cartwheel",
    "handstand",
    "splits",
    "mid-air",
    "midair",
    "aerial",
    "wall run",
    "parkour",
    "acrobatic",
];

pub const MODERATELY_ACROBATIC_POSES: &[&str] = &[
    "leap",
    "leaping",
    "jump",
    "jumping",
    "kick",
    "kicking",
    "lunge",
    "lunging",
    "sprint",
    "sprinting",
    "running",
    "vaulting",
    "dodging",
    "rolling",
    "crouching",
];

pub fn pose_acrobatics(text: &str) -> Option<Acrobatics> {
    if contains_any_word(text, HIGHLY_ACROBATIC_POSES) {
        Some(Acrobatics::High)
    } else if contains_any_word(text, MODERATELY_ACROBATIC_POSES) {
        Some(Acrobatics::Moderate)
    } else {
        None
    }
}

// ============================================================================
// Facial Features
// ============================================================================

pub const YOUTHFUL_FEATURES: &[&str] = &[
    "freckles",
    "baby face",
    "chubby cheeks",
    "rosy cheeks",
    "button nose",
    "braces",
    "pigtails",
    "acne",
];

pub const ELDERLY_FEATURES: &[&str] = &[
    "wrinkles",
    "wrinkled",
    "crow's feet",
    "liver spots",
    "age spots",
    "gray beard",
    "grey beard",
    "white beard",
    "gray hair",
    "grey hair",
    "white hair",
    "jowls",
    "sagging skin",
    "balding",
];

// ============================================================================
// Monstrous Traits
// ============================================================================

/// Traits that need anatomical freedom; they suspend anatomy exclusions.
pub const MONSTROUS_TRAITS: &[&str] = &[
    "horns",
    "tusks",
    "fangs",
    "scales",
    "tentacles",
    "extra eyes",
    "third eye",
    "claws",
    "warts",
    "boils",
    "pustules",
    "scarred",
    "burn scars",
    "missing eye",
    "hunchback",
    "snout",
    "mandibles",
    "rotting",
    "deformed",
    "grotesque",
];

pub fn is_monstrous(text: &str) -> bool {
    contains_any_word(text, MONSTROUS_TRAITS)
}

// ============================================================================
// Fantasy Context
// ============================================================================

pub const FANTASY_TERMS: &[&str] = &[
    "elf",
    "elven",
    "drow",
    "dwarf",
    "dwarven",
    "orc",
    "goblin",
    "kobold",
    "halfling",
    "gnome",
    "tiefling",
    "dragonborn",
    "centaur",
    "fae",
    "fairy",
    "fantasy",
    "medieval",
    "sword and sorcery",
    "mythic",
    "arcane",
];

pub fn is_fantasy(text: &str) -> bool {
    contains_any_word(text, FANTASY_TERMS)
}

/// Phrase injected to keep fantasy characters out of modern settings.
pub const FANTASY_CONTEXT_PHRASE: &str = "medieval fantasy setting";

/// Prefix applied to equipment pieces in a fantasy context.
pub const FANTASY_EQUIPMENT_PREFIX: &str = "fantasy";

// ============================================================================
// Redundancy Rules
// ============================================================================

/// Drop one axis phrase when other axes already imply it.
#[derive(Debug, Clone, Copy)]
pub struct RedundancyRule {
    /// Axis whose phrase is eliminated.
    pub drop: StatAxis,
    /// Inclusive `(axis, min, max)` level ranges that must all hold.
    pub conditions: &'static [(StatAxis, u8, u8)],
}

pub const REDUNDANCY_RULES: &[RedundancyRule] = &[
    // Peak strength already reads as defined musculature.
    RedundancyRule {
        drop: StatAxis::MuscleDefinition,
        conditions: &[(StatAxis::Strength, 5, 5), (StatAxis::MuscleDefinition, 4, 5)],
    },
    // An emaciated build subsumes the weakness.
    RedundancyRule {
        drop: StatAxis::Strength,
        conditions: &[(StatAxis::Constitution, 1, 1), (StatAxis::Strength, 1, 1)],
    },
    RedundancyRule {
        drop: StatAxis::MuscleDefinition,
        conditions: &[(StatAxis::Strength, 1, 1), (StatAxis::MuscleDefinition, 1, 1)],
    },
];

// ============================================================================
// Summarization & Deduplication
// ============================================================================

/// Words that never count as significant when detecting repeated content.
pub const FILLER_WORDS: &[&str] = &[
    "with", "wearing", "that", "this", "from", "into", "very", "highly", "their", "while",
    "them", "over", "under", "upon",
];

pub fn is_filler(word: &str) -> bool {
    FILLER_WORDS.contains(&word)
}

/// Explicit adjectives that summarization removes regardless of suffix.
pub const SUMMARY_ADJECTIVES: &[&str] = &[
    "a", "an", "the", "dark", "bright", "light", "long", "short", "small", "large", "big", "old",
    "new", "red", "blue", "green", "black", "white", "gold", "silver", "brown", "grey", "gray",
    "fine", "worn", "sturdy", "soft", "hard", "thin", "thick", "deep", "pale", "wide",
];

/// Suffixes that mark a word as adjective-like for summarization.
pub const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ous", "ful", "ive", "ish", "less", "able", "ible", "ic", "al", "ed", "ing", "ly",
];

pub fn is_adjective_like(word: &str) -> bool {
    let lower = word.to_lowercase();
    SUMMARY_ADJECTIVES.contains(&lower.as_str())
        || QUALITY_ADJECTIVE_RE.is_match(&lower)
        || (lower.len() > 4 && ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)))
}

// ============================================================================
// Matching Helpers
// ============================================================================

/// Case-insensitive whole-word (or whole-phrase) containment.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    let haystack = haystack.to_lowercase();
    let needle = needle.to_lowercase();
    if needle.is_empty() {
        return false;
    }
    let is_word_char = |c: char| c.is_alphanumeric() || c == '\'';
    haystack.match_indices(&needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));
        before_ok && after_ok
    })
}

pub fn contains_any_word(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| contains_word(haystack, needle))
}

/// Lowercase words of a text, splitting on anything that is not part of a
/// tag token (`score_9`, `well-kept` and `crow's` stay whole).
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-' || c == '\''))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}
