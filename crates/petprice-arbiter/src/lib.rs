//! Candidate arbitration for scrape-time product matching.
//!
//! When size and price checks leave more than one plausible search result,
//! an [`Arbiter`] decides. [`LlmArbiter`] asks a text-generation model through
//! [`OllamaClient`] and fails closed: errors, timeouts and unparseable answers
//! are all "no match".

pub mod arbiter;
pub mod client;
pub mod error;
pub mod pacing;
pub mod prompt;
pub mod resolve;

pub use arbiter::{select_best_match, Arbiter, LlmArbiter, StubArbiter};
pub use client::{OllamaClient, TextGenerator};
pub use error::ArbiterError;
pub use pacing::Pacer;
pub use resolve::{
    price_candidate, CandidateResolver, MatchMethod, Resolution, ResolveTarget, ResolvedMatch,
};
