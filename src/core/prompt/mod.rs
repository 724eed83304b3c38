//! Character Prompt Compiler
//!
//! Turns a character sheet (eleven 1-5 stat levels plus detail selections)
//! into a text-to-image prompt for one of six model dialects, together with
//! a paired negative prompt.
//!
//! # Usage
//!
//! ```rust,ignore
//! use charprompt::core::prompt::{GenerationRequest, Model, PromptEngine, StatLevels};
//!
//! let engine = PromptEngine::default();
//! let request = GenerationRequest::new(StatLevels::default(), Model::Sdxl)
//!     .select("race", "elf")
//!     .select("gender", "female");
//! let result = engine.generate(&request, &mut rand::thread_rng());
//! println!("{}", result.prompt);
//! ```

pub mod budget;
pub mod composition;
pub mod defaults;
pub mod engine;
pub mod enhancer;
pub mod error;
pub mod formatter;
pub mod foundation;
pub mod lexicon;
pub mod negative;
pub mod segments;
pub mod types;
pub mod validator;

pub use budget::{enforce_token_budget, estimate_tokens, summarize, total_tokens};
pub use composition::{suggest_composition, CompositionSuggestion};
pub use engine::PromptEngine;
pub use enhancer::{check_gates, Enhancer};
pub use error::{PromptError, Result};
pub use formatter::{format_prompt, FormatContext};
pub use foundation::{apply_redundancy_rules, assemble_foundation, select_qualifier};
pub use negative::generate_negative;
pub use segments::{build_segments, NameIndex, SegmentInputs};
pub use types::*;
pub use validator::{inject_gear_quality, strip_quality_adjectives, validate_details, ValidationOutcome};
