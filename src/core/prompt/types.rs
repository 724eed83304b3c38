//! Core data models for prompt compilation.
//!
//! Everything that flows between the pipeline phases lives here: the stat
//! skeleton of a character, the untyped selection map handed over by the UI,
//! the data cache of option records, and the segment/result types produced
//! by the engine.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::Result;

// ============================================================================
// Stat Levels
// ============================================================================

/// Lowest allowed stat level.
pub const MIN_LEVEL: u8 = 1;

/// Highest allowed stat level.
pub const MAX_LEVEL: u8 = 5;

/// Level assumed for any stat the caller did not supply.
pub const DEFAULT_LEVEL: u8 = 3;

/// One of the eleven archetype axes of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatAxis {
    Strength,
    Dexterity,
    Constitution,
    Age,
    Intelligence,
    Charisma,
    Demeanor,
    Skin,
    Grooming,
    MuscleDefinition,
    Height,
}

impl StatAxis {
    /// All axes in canonical order.
    pub const ALL: [StatAxis; 11] = [
        StatAxis::Strength,
        StatAxis::Dexterity,
        StatAxis::Constitution,
        StatAxis::Age,
        StatAxis::Intelligence,
        StatAxis::Charisma,
        StatAxis::Demeanor,
        StatAxis::Skin,
        StatAxis::Grooming,
        StatAxis::MuscleDefinition,
        StatAxis::Height,
    ];

    /// Data cache category holding this axis' level-indexed pools.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Dexterity => "dexterity",
            Self::Constitution => "constitution",
            Self::Age => "age",
            Self::Intelligence => "intelligence",
            Self::Charisma => "charisma",
            Self::Demeanor => "demeanor",
            Self::Skin => "skin",
            Self::Grooming => "grooming",
            Self::MuscleDefinition => "muscle_definition",
            Self::Height => "height",
        }
    }

    /// Primary axes stay in the protected tier even when their level is
    /// unremarkable.
    pub fn is_primary(&self) -> bool {
        matches!(
            self,
            Self::Strength
                | Self::Dexterity
                | Self::Constitution
                | Self::Age
                | Self::Intelligence
                | Self::Charisma
        )
    }
}

impl fmt::Display for StatAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn default_level() -> u8 {
    DEFAULT_LEVEL
}

fn clamped_level<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(clamp_level(raw))
}

/// Clamp any integer into the valid `1..=5` range.
pub fn clamp_level(raw: i64) -> u8 {
    raw.clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as u8
}

/// The immutable archetype skeleton of one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatLevels {
    #[serde(default = "default_level", deserialize_with = "clamped_level")]
    pub strength: u8,
    #[serde(default = "default_level", deserialize_with = "clamped_level")]
    pub dexterity: u8,
    #[serde(default = "default_level", deserialize_with = "clamped_level")]
    pub constitution: u8,
    #[serde(default = "default_level", deserialize_with = "clamped_level")]
    pub age: u8,
    #[serde(default = "default_level", deserialize_with = "clamped_level")]
    pub intelligence: u8,
    #[serde(default = "default_level", deserialize_with = "clamped_level")]
    pub charisma: u8,
    #[serde(default = "default_level", deserialize_with = "clamped_level")]
    pub demeanor: u8,
    #[serde(default = "default_level", deserialize_with = "clamped_level")]
    pub skin: u8,
    #[serde(default = "default_level", deserialize_with = "clamped_level")]
    pub grooming: u8,
    #[serde(default = "default_level", deserialize_with = "clamped_level")]
    pub muscle_definition: u8,
    #[serde(default = "default_level", deserialize_with = "clamped_level")]
    pub height: u8,
}

impl Default for StatLevels {
    fn default() -> Self {
        Self::uniform(DEFAULT_LEVEL)
    }
}

impl StatLevels {
    /// Every axis at the same (clamped) level.
    pub fn uniform(level: u8) -> Self {
        let level = clamp_level(level as i64);
        Self {
            strength: level,
            dexterity: level,
            constitution: level,
            age: level,
            intelligence: level,
            charisma: level,
            demeanor: level,
            skin: level,
            grooming: level,
            muscle_definition: level,
            height: level,
        }
    }

    /// Builder-style setter; the level is clamped.
    pub fn with(mut self, axis: StatAxis, level: i64) -> Self {
        self.set(axis, level);
        self
    }

    pub fn set(&mut self, axis: StatAxis, level: i64) {
        let level = clamp_level(level);
        match axis {
            StatAxis::Strength => self.strength = level,
            StatAxis::Dexterity => self.dexterity = level,
            StatAxis::Constitution => self.constitution = level,
            StatAxis::Age => self.age = level,
            StatAxis::Intelligence => self.intelligence = level,
            StatAxis::Charisma => self.charisma = level,
            StatAxis::Demeanor => self.demeanor = level,
            StatAxis::Skin => self.skin = level,
            StatAxis::Grooming => self.grooming = level,
            StatAxis::MuscleDefinition => self.muscle_definition = level,
            StatAxis::Height => self.height = level,
        }
    }

    pub fn get(&self, axis: StatAxis) -> u8 {
        match axis {
            StatAxis::Strength => self.strength,
            StatAxis::Dexterity => self.dexterity,
            StatAxis::Constitution => self.constitution,
            StatAxis::Age => self.age,
            StatAxis::Intelligence => self.intelligence,
            StatAxis::Charisma => self.charisma,
            StatAxis::Demeanor => self.demeanor,
            StatAxis::Skin => self.skin,
            StatAxis::Grooming => self.grooming,
            StatAxis::MuscleDefinition => self.muscle_definition,
            StatAxis::Height => self.height,
        }
    }

    /// An extreme level (exactly 1 or 5) dominates perceived identity.
    pub fn is_extreme(&self, axis: StatAxis) -> bool {
        let level = self.get(axis);
        level == MIN_LEVEL || level == MAX_LEVEL
    }
}

// ============================================================================
// Gender
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    #[default]
    Other,
}

impl Gender {
    /// Lenient parse of a UI-supplied gender string.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "female" | "woman" | "girl" | "f" | "feminine" => Self::Female,
            "male" | "man" | "boy" | "m" | "masculine" => Self::Male,
            _ => Self::Other,
        }
    }

    /// Word used when rendering the identity segment.
    pub fn identity_word(&self) -> Option<&'static str> {
        match self {
            Self::Female => Some("female"),
            Self::Male => Some("male"),
            Self::Other => None,
        }
    }
}

// ============================================================================
// Model (Dialect)
// ============================================================================

/// Target text-to-image backend dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Model {
    /// Narrative, natural-language dialect.
    Flux,
    /// Tag dialect where tag order alone encodes weight.
    Pony,
    /// Weighted-keyword dialect, large context.
    #[default]
    Sdxl,
    /// Weighted-keyword dialect, single CLIP chunk.
    Sd15,
    /// Plain comma-separated tags, no weight markup.
    Illustrious,
    /// Curly-bracket emphasis dialect.
    NovelAi,
}

impl Model {
    pub const ALL: [Model; 6] = [
        Model::Flux,
        Model::Pony,
        Model::Sdxl,
        Model::Sd15,
        Model::Illustrious,
        Model::NovelAi,
    ];

    /// Hard token ceiling for the rendered prompt.
    pub fn token_limit(&self) -> usize {
        match self {
            Self::Flux => 256,
            Self::Pony => 150,
            Self::Sdxl => 150,
            Self::Sd15 => 75,
            Self::Illustrious => 150,
            Self::NovelAi => 225,
        }
    }

    /// Natural-language rather than tag output.
    pub fn is_narrative(&self) -> bool {
        matches!(self, Self::Flux)
    }

    /// Tag-oriented dialects prefer short, single-word qualifiers.
    pub fn is_tag_oriented(&self) -> bool {
        !self.is_narrative()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Flux => "Flux",
            Self::Pony => "Pony Diffusion",
            Self::Sdxl => "SDXL",
            Self::Sd15 => "Stable Diffusion 1.5",
            Self::Illustrious => "Illustrious",
            Self::NovelAi => "NovelAI",
        }
    }
}

impl std::str::FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' ', '.'], "_").as_str() {
            "flux" => Ok(Self::Flux),
            "pony" | "pony_diffusion" => Ok(Self::Pony),
            "sdxl" => Ok(Self::Sdxl),
            "sd15" | "sd1_5" | "sd_1_5" => Ok(Self::Sd15),
            "illustrious" => Ok(Self::Illustrious),
            "novel_ai" | "novelai" | "nai" => Ok(Self::NovelAi),
            other => Err(format!("unknown model: {other}")),
        }
    }
}

// ============================================================================
// Selections
// ============================================================================

/// A single value supplied by a UI control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionValue {
    Text(String),
    List(Vec<String>),
    Leveled { level: i64, qualifier: String },
}

impl SelectionValue {
    /// Flatten into the list of non-empty textual values.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Self::Text(s) => vec![s.as_str()],
            Self::List(items) => items.iter().map(String::as_str).collect(),
            Self::Leveled { qualifier, .. } => vec![qualifier.as_str()],
        }
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
    }

    pub fn level(&self) -> Option<u8> {
        match self {
            Self::Leveled { level, .. } => Some(clamp_level(*level)),
            Self::Text(s) => s.trim().parse::<i64>().ok().map(clamp_level),
            Self::List(_) => None,
        }
    }
}

impl From<&str> for SelectionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<&str>> for SelectionValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(str::to_string).collect())
    }
}

/// Open map from control identifier to value, in UI order.
pub type Selections = IndexMap<String, SelectionValue>;

/// Well-known control identifiers.
pub mod controls {
    pub const RACE: &str = "race";
    pub const GENDER: &str = "gender";
    pub const GENRE: &str = "genre";
    pub const AESTHETIC: &str = "aesthetic";
    pub const RENDERING_STYLE: &str = "rendering_style";
    pub const STYLE: &str = "style";
    pub const GEAR_QUALITY: &str = "gear_quality";
    pub const FACIAL_FEATURES: &str = "facial_features";
    pub const EXPRESSION: &str = "expression";
    pub const SPECIAL_TRAITS: &str = "special_traits";
    pub const POSE: &str = "pose";
    pub const SCENE: &str = "scene";
    pub const CAMERA_ANGLE: &str = "camera_angle";
    pub const LIGHTING: &str = "lighting";
    pub const FRAMING: &str = "framing";
    pub const DEPTH_OF_FIELD: &str = "depth_of_field";
    pub const MOOD: &str = "mood";
    pub const WEATHER: &str = "weather";
    pub const CUSTOM_TEXT: &str = "custom_text";
    pub const PORTRAIT: &str = "portrait";

    /// Equipment slots in rendering order.
    pub const EQUIPMENT_SLOTS: [&str; 8] = [
        "head",
        "chest",
        "legs",
        "hands",
        "feet",
        "outfit",
        "weapon",
        "accessories",
    ];
}

/// Convenience accessors over the untyped selection map.
pub trait SelectionsExt {
    fn texts_of(&self, key: &str) -> Vec<&str>;
    fn first_text(&self, key: &str) -> Option<&str>;
    fn gender(&self) -> Gender;
}

impl SelectionsExt for Selections {
    fn texts_of(&self, key: &str) -> Vec<&str> {
        self.get(key).map(SelectionValue::texts).unwrap_or_default()
    }

    fn first_text(&self, key: &str) -> Option<&str> {
        self.texts_of(key).into_iter().next()
    }

    fn gender(&self) -> Gender {
        self.first_text(controls::GENDER)
            .map(Gender::parse)
            .unwrap_or_default()
    }
}

// ============================================================================
// Data Cache
// ============================================================================

/// A selectable detail option (equipment piece, pose, feature...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifiers: Option<Vec<String>>,
}

impl OptionRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            qualifiers: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Text rendered into the prompt: the description when present.
    pub fn prompt_text(&self) -> &str {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(self.name.as_str())
    }
}

/// A named level of a stat axis with its qualifier pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRecord {
    pub name: String,
    #[serde(default)]
    pub qualifiers: Vec<String>,
}

impl LevelRecord {
    /// Qualifier pool, falling back to the bare level name.
    pub fn pool(&self) -> Vec<String> {
        if self.qualifiers.is_empty() {
            vec![self.name.clone()]
        } else {
            self.qualifiers.clone()
        }
    }
}

/// Contents of one data cache category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryData {
    Options(Vec<OptionRecord>),
    Levels(BTreeMap<String, LevelRecord>),
}

/// Category name to option data, as supplied by the surrounding UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataCache {
    categories: HashMap<String, CategoryData>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document of the form `{ "category": [...] | {...} }`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON data cache from disk.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn insert(&mut self, category: impl Into<String>, data: CategoryData) {
        self.categories.insert(category.into(), data);
    }

    pub fn with_category(mut self, category: impl Into<String>, data: CategoryData) -> Self {
        self.insert(category, data);
        self
    }

    pub fn category(&self, name: &str) -> Option<&CategoryData> {
        self.categories.get(name)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&String, &CategoryData)> {
        self.categories.iter()
    }

    /// Level record for a level-indexed category, if any.
    pub fn level_record(&self, category: &str, level: u8) -> Option<&LevelRecord> {
        match self.categories.get(category)? {
            CategoryData::Levels(levels) => levels.get(&level.to_string()),
            CategoryData::Options(_) => None,
        }
    }

    /// Option records for a list category; empty for anything else.
    pub fn options(&self, category: &str) -> &[OptionRecord] {
        match self.categories.get(category) {
            Some(CategoryData::Options(records)) => records,
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

// ============================================================================
// Foundation Keywords
// ============================================================================

/// One resolved phrase per stat axis. Derived, never hand-edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundationKeywords {
    phrases: BTreeMap<StatAxis, String>,
}

impl FoundationKeywords {
    /// Phrase for an axis; empty when absent or eliminated.
    pub fn phrase(&self, axis: StatAxis) -> &str {
        self.phrases.get(&axis).map(String::as_str).unwrap_or("")
    }

    pub(crate) fn set(&mut self, axis: StatAxis, phrase: String) {
        self.phrases.insert(axis, phrase);
    }

    pub(crate) fn clear(&mut self, axis: StatAxis) {
        self.phrases.remove(&axis);
    }

    /// Non-empty phrases in canonical axis order.
    pub fn iter(&self) -> impl Iterator<Item = (StatAxis, &str)> {
        StatAxis::ALL
            .into_iter()
            .filter_map(|axis| {
                let phrase = self.phrase(axis);
                (!phrase.is_empty()).then_some((axis, phrase))
            })
    }

    /// Stat-derived keywords, used to validate rewritten prompts.
    pub fn keywords(&self) -> Vec<String> {
        self.iter().map(|(_, phrase)| phrase.to_string()).collect()
    }

    /// All phrases joined, for inspection and tests.
    pub fn joined(&self) -> String {
        self.keywords().join(", ")
    }
}

// ============================================================================
// Segments
// ============================================================================

/// Semantic category of a prompt segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentCategory {
    Style,
    Context,
    Identity,
    Foundation,
    Charisma,
    Equipment,
    Facial,
    Expression,
    Special,
    Pose,
    Scene,
    Camera,
    Lighting,
    Framing,
    Depth,
    Mood,
    Weather,
    Custom,
}

impl SegmentCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Context => "context",
            Self::Identity => "identity",
            Self::Foundation => "foundation",
            Self::Charisma => "charisma",
            Self::Equipment => "equipment",
            Self::Facial => "facial",
            Self::Expression => "expression",
            Self::Special => "special",
            Self::Pose => "pose",
            Self::Scene => "scene",
            Self::Camera => "camera",
            Self::Lighting => "lighting",
            Self::Framing => "framing",
            Self::Depth => "depth",
            Self::Mood => "mood",
            Self::Weather => "weather",
            Self::Custom => "custom",
        }
    }

    /// Style-block segments are rendered ahead of the character.
    pub fn is_style(&self) -> bool {
        matches!(self, Self::Style | Self::Context)
    }

    /// Categories that receive explicit weight markup.
    pub fn is_weighted(&self) -> bool {
        matches!(self, Self::Identity | Self::Foundation | Self::Charisma)
    }
}

/// Highest tier value (lowest priority).
pub const MAX_TIER: u8 = 9;

/// Tiers at or below this value are never trimmed.
pub const PROTECTED_TIER: u8 = 2;

/// A prioritized piece of prompt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSegment {
    pub tier: u8,
    pub category: SegmentCategory,
    pub text: String,
    pub token_count: usize,
    pub summarizable: bool,
}

impl PromptSegment {
    /// Create a segment; the token estimate is computed immediately.
    pub fn new(tier: u8, category: SegmentCategory, text: impl Into<String>) -> Self {
        let text = text.into();
        let token_count = super::budget::estimate_tokens(&text);
        Self {
            tier: tier.min(MAX_TIER),
            category,
            text,
            token_count,
            summarizable: false,
        }
    }

    pub fn summarizable(mut self) -> Self {
        self.summarizable = true;
        self
    }

    pub fn is_protected(&self) -> bool {
        self.tier <= PROTECTED_TIER
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

// ============================================================================
// Validation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Modeled for the UI; never produced or enforced by the pipeline.
    Block,
    Warn,
    Info,
}

/// An advisory cross-check finding. Never halts generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationWarning {
    pub severity: Severity,
    pub message: String,
    pub conflicting_items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationWarning {
    pub fn new(severity: Severity, message: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            conflicting_items: items,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

// ============================================================================
// Request / Result
// ============================================================================

/// Everything the engine needs for one generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub stats: StatLevels,
    #[serde(default)]
    pub selections: Selections,
    #[serde(default)]
    pub model: Model,
    /// Reserved extension point; currently has no effect on output.
    #[serde(default = "default_level")]
    pub intensity: u8,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self::new(StatLevels::default(), Model::default())
    }
}

impl GenerationRequest {
    pub fn new(stats: StatLevels, model: Model) -> Self {
        Self {
            stats,
            selections: Selections::new(),
            model,
            intensity: DEFAULT_LEVEL,
        }
    }

    pub fn select(mut self, key: impl Into<String>, value: impl Into<SelectionValue>) -> Self {
        self.selections.insert(key.into(), value.into());
        self
    }
}

/// Final output of one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptResult {
    pub prompt: String,
    pub negative_prompt: String,
    pub token_count: usize,
    pub token_limit: usize,
    pub warnings: Vec<ValidationWarning>,
    pub segments: Vec<PromptSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_enhanced: Option<String>,
    #[serde(rename = "usedAI")]
    pub used_ai: bool,
}

impl PromptResult {
    /// The prompt the caller should use: the rewrite when one was accepted.
    pub fn effective_prompt(&self) -> &str {
        self.ai_enhanced.as_deref().unwrap_or(&self.prompt)
    }
}
