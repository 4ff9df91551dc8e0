// Model exports
pub mod domain;
pub mod report;

pub use domain::{DomainError, Gender, GenderPref, Participant, Partition, Role, ScoreMatrix};
pub use report::{MatchReport, ReportedPair, ReportedParticipant};
