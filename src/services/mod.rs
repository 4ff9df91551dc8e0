// Service exports
pub mod dataset;
pub mod partition;
pub mod scoring;

pub use dataset::{DatasetError, PopulationData, RosterEntry};
pub use scoring::{build_score_matrix, compatibility};
