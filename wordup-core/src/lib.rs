//! Target-flavored wordlist synthesis.
//!
//! This crate expands a seed vocabulary harvested from an organization's own
//! pages into a much larger set of words that share its character patterns:
//! - Seed corpus validation and local text/HTML word extraction
//! - Rule-based mangling (leetspeak, separators, digits, suffixes)
//! - Order-k character transition model with sentinel start padding
//! - Weighted sampling and bounded, always-terminating generation
//! - Flat newline-delimited word list I/O

/// Explicit engine configuration with documented defaults.
pub mod config;

/// Error type and `Result` alias.
pub mod error;

/// Validated seed words and local word extraction.
pub mod corpus;

/// Transition model, builder, sampler and generator.
pub mod model;

/// Rule-based word variations.
pub mod mangle;

/// Builder + generator facade.
pub mod engine;

/// Word list reading and writing.
pub mod io;

pub use config::MarkovConfig;
pub use corpus::{SeedCorpus, WordExtractor};
pub use engine::{Engine, EngineReport};
pub use error::{Result, WordUpError};
pub use mangle::{MangleOptions, Mangler};
pub use model::{Expansion, ModelBuilder, ModelStats, Outcome, Shortfall, TransitionModel, WordGenerator};
