//! Built-in level-indexed qualifier pools.
//!
//! The UI normally ships its own data cache; these pools let the engine run
//! standalone. Some entries are deliberately filtered at runtime (dead words,
//! gender-coded terms) so the pools can be shared with older data files.

use std::collections::BTreeMap;

use super::types::{CategoryData, DataCache, LevelRecord, StatAxis};

type LevelPools = [(&'static str, &'static [&'static str]); 5];

const STRENGTH: LevelPools = [
    ("Frail", &["frail", "feeble", "weak-limbed"]),
    ("Slight", &["slight", "slender-armed", "wiry"]),
    ("Average", &["ordinary", "fit", "able-bodied"]),
    ("Strong", &["strong", "muscular", "brawny", "powerfully built"]),
    ("Mighty", &["herculean", "massively muscular", "hulking", "burly"]),
];

const DEXTERITY: LevelPools = [
    ("Clumsy", &["clumsy", "stiff", "awkward posture"]),
    ("Unsteady", &["unsteady", "heavy-footed"]),
    ("Average", &["average", "steady"]),
    ("Agile", &["agile", "nimble", "light-footed"]),
    ("Acrobatic", &["acrobatic", "lithe", "catlike grace"]),
];

const CONSTITUTION: LevelPools = [
    ("Emaciated", &["emaciated", "gaunt", "skeletal frame"]),
    ("Lean", &["lean", "slender", "willowy"]),
    ("Average", &["common build", "medium build", "sturdy"]),
    ("Stocky", &["stocky", "thickset", "curvy"]),
    ("Heavyset", &["heavyset", "corpulent", "broad-bellied"]),
];

const AGE: LevelPools = [
    ("Youthful", &["youthful", "fresh-faced", "young adult"]),
    ("Young", &["young", "in their twenties"]),
    ("Adult", &["adult", "middle-aged", "ordinary adult"]),
    ("Mature", &["mature", "graying", "weathered"]),
    ("Elderly", &["elderly", "ancient", "aged"]),
];

const INTELLIGENCE: LevelPools = [
    ("Dull", &["vacant stare", "dull-eyed"]),
    ("Simple", &["simple", "guileless"]),
    ("Average", &["unremarkable", "attentive"]),
    ("Clever", &["clever", "sharp-eyed", "perceptive"]),
    ("Brilliant", &["brilliant", "scholarly", "piercing intellect"]),
];

const CHARISMA: LevelPools = [
    ("Repulsive", &["repulsive", "grotesque", "off-putting"]),
    ("Homely", &["homely", "rough-featured"]),
    ("Average", &["average looks", "pleasant"]),
    ("Attractive", &["attractive", "handsome", "pretty", "striking"]),
    ("Stunning", &["stunning", "beautiful", "breathtaking", "captivating"]),
];

const DEMEANOR: LevelPools = [
    ("Hostile", &["hostile", "menacing", "scowling"]),
    ("Guarded", &["guarded", "wary"]),
    ("Neutral", &["normal demeanor", "composed"]),
    ("Warm", &["warm", "approachable"]),
    ("Radiant", &["radiant", "magnetic presence", "serene"]),
];

const SKIN: LevelPools = [
    ("Ravaged", &["ravaged skin", "pockmarked"]),
    ("Rough", &["rough skin", "sun-beaten"]),
    ("Typical", &["typical skin", "clear skin"]),
    ("Smooth", &["smooth skin", "healthy glow"]),
    ("Flawless", &["flawless skin", "porcelain"]),
];

const GROOMING: LevelPools = [
    ("Unkempt", &["unkempt", "disheveled", "matted hair"]),
    ("Scruffy", &["scruffy", "untidy"]),
    ("Tidy", &["tidy", "regular grooming"]),
    ("Neat", &["neat", "well-groomed"]),
    ("Immaculate", &["immaculate", "impeccably groomed"]),
];

const MUSCLE_DEFINITION: LevelPools = [
    ("Soft", &["soft-bodied", "undefined physique"]),
    ("Slight", &["slightly toned"]),
    ("Toned", &["toned", "standard physique"]),
    ("Defined", &["defined muscles", "athletic"]),
    ("Chiseled", &["chiseled", "shredded", "sculpted musculature"]),
];

const HEIGHT: LevelPools = [
    ("Tiny", &["tiny", "diminutive", "petite"]),
    ("Short", &["short", "compact"]),
    ("Medium", &["medium height", "mid-height"]),
    ("Tall", &["tall", "long-limbed"]),
    ("Towering", &["towering", "giant", "imposing height"]),
];

fn pools_for(axis: StatAxis) -> &'static LevelPools {
    match axis {
        StatAxis::Strength => &STRENGTH,
        StatAxis::Dexterity => &DEXTERITY,
        StatAxis::Constitution => &CONSTITUTION,
        StatAxis::Age => &AGE,
        StatAxis::Intelligence => &INTELLIGENCE,
        StatAxis::Charisma => &CHARISMA,
        StatAxis::Demeanor => &DEMEANOR,
        StatAxis::Skin => &SKIN,
        StatAxis::Grooming => &GROOMING,
        StatAxis::MuscleDefinition => &MUSCLE_DEFINITION,
        StatAxis::Height => &HEIGHT,
    }
}

impl DataCache {
    /// Data cache holding the built-in pools for every stat axis.
    pub fn builtin() -> Self {
        let mut cache = DataCache::new();
        for axis in StatAxis::ALL {
            let levels: BTreeMap<String, LevelRecord> = pools_for(axis)
                .iter()
                .enumerate()
                .map(|(index, (name, qualifiers))| {
                    (
                        (index + 1).to_string(),
                        LevelRecord {
                            name: (*name).to_string(),
                            qualifiers: qualifiers.iter().map(|q| (*q).to_string()).collect(),
                        },
                    )
                })
                .collect();
            cache.insert(axis.key(), CategoryData::Levels(levels));
        }
        cache
    }
}
