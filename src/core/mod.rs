// Core algorithm exports
pub mod eligibility;
pub mod engine;
pub mod matcher;
pub mod ranking;

pub use eligibility::{accepts, mutually_eligible};
pub use engine::{MatchPair, MatchResult, MatchingEngine, MatchingError};
pub use matcher::{find_blocking_pair, Matcher};
pub use ranking::{build_preference_lists, PreferenceLists};
