/// charprompt - Character Sheet to Image Prompt Compiler
///
/// Core library turning stat levels and detail selections into prompts
/// for text-to-image model dialects, with an optional local rewrite step.

pub mod config;
pub mod core;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
