//! Duet Algo - stable matching engine for the Duet matchmaking app
//!
//! This library implements eligibility-filtered deferred acceptance
//! (Gale-Shapley): questionnaire scores become ranked preference lists for a
//! proposer/acceptor partition of the population, and the proposal loop
//! settles them into stable pairs. Participants without any mutually
//! eligible counterpart are reported unmatched rather than dropped.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    accepts, build_preference_lists, find_blocking_pair, mutually_eligible, MatchPair,
    MatchResult, Matcher, MatchingEngine, MatchingError, PreferenceLists,
};
pub use crate::models::{
    DomainError, Gender, GenderPref, MatchReport, Participant, Partition, Role, ScoreMatrix,
};
