//! Character-level Markov model and word synthesis.
//!
//! - Per-prefix frequency tables and cumulative sampling (`FrequencyTable`)
//! - The order-k transition model (`TransitionModel`)
//! - Single-pass and chunked-parallel construction (`ModelBuilder`)
//! - Loop-guarded synthesis of unique words (`WordGenerator`)

/// Next-character counts and the cumulative table used to sample them.
pub mod frequency;

/// Prefix → frequency table mapping with sentinel start padding.
pub mod transition_model;

/// Builds transition models from a seed corpus.
pub mod builder;

/// Compiled, read-only sampling view of a model.
pub mod sampler;

/// Bounded generation of unique words, sequential or multi-threaded.
pub mod generator;

pub use builder::ModelBuilder;
pub use generator::{Expansion, Outcome, Shortfall, WordGenerator};
pub use transition_model::{ModelStats, TransitionModel};
