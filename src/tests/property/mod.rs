//! Property-based tests for the prompt compiler
//!
//! Property tests verify invariants that should hold for every character
//! sheet, rather than testing specific cases.
//!
//! ## Running Property Tests
//!
//! ```sh
//! cargo test property --release
//! ```
//!
//! ## Test Modules
//!
//! - `prompt_props`: pipeline invariants
//!   - Foundation text never contains a dead word
//!   - Budgeted segments fit the dialect limit unless the protected floor alone exceeds it
//!   - Protected tiers survive budget enforcement untouched
//!   - Negative prompts never exclude what the character is
//!   - Pony output never carries parenthesis weights
//!   - Segment category order is stable for a fixed seed
//!
//! ## Configuration
//!
//! By default, proptest runs 256 cases per property. This can be configured
//! via the `PROPTEST_CASES` environment variable:
//!
//! ```sh
//! PROPTEST_CASES=1000 cargo test property --release
//! ```

mod prompt_props;
