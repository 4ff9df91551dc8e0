//! Matching input loading.
//!
//! Two source shapes are supported: a JSON questionnaire roster, from which
//! scores are computed, and a precomputed score matrix with companion label
//! files (one gender and one preference per line). Label parsing fails
//! closed: any token outside the known sets is an error, never a guess.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::InputSettings;
use crate::models::{DomainError, Gender, GenderPref, Participant, ScoreMatrix};
use crate::services::scoring;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: invalid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}:{line}: invalid score {token:?}")]
    InvalidNumber {
        path: String,
        line: usize,
        token: String,
    },

    #[error("{path}:{line}: {source}")]
    Label {
        path: String,
        line: usize,
        #[source]
        source: DomainError,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{what} covers {got} participants, the score matrix covers {expected}")]
    CountMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("roster entry {name:?} accepts no gender at all")]
    EmptyPreferences { name: String },

    #[error("roster entry {name:?} has {got} responses, expected {expected}")]
    ResponseCountMismatch {
        name: String,
        got: usize,
        expected: usize,
    },

    #[error("input settings must name either a roster or the scores, genders and preferences files")]
    IncompleteInput,
}

/// One questionnaire record from the roster file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub gender: Gender,
    /// Accepted match genders, as collected by the questionnaire
    pub preferences: Vec<Gender>,
    #[serde(rename = "gradYear")]
    pub grad_year: i32,
    pub responses: Vec<f64>,
}

impl RosterEntry {
    /// Whether this entry accepts candidates of `gender`
    pub fn accepts(&self, gender: Gender) -> bool {
        self.preferences.contains(&gender)
    }

    /// Collapse the accepted-genders list onto the closed preference set
    /// used by the matching core.
    pub fn participant(&self) -> Result<Participant, DatasetError> {
        let pref = GenderPref::from_accepted(&self.preferences).ok_or_else(|| {
            DatasetError::EmptyPreferences {
                name: self.name.clone(),
            }
        })?;
        Ok(Participant::new(self.gender, pref))
    }
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    users: Vec<RosterEntry>,
}

/// Everything the matching pipeline needs for one run
#[derive(Debug, Clone)]
pub struct PopulationData {
    pub participants: Vec<Participant>,
    /// Display names, present when the population came from a roster
    pub names: Option<Vec<String>>,
    pub matrix: ScoreMatrix,
}

/// Load matching inputs from the configured sources. A roster wins over the
/// precomputed-matrix trio when both are configured.
pub fn load(input: &InputSettings) -> Result<PopulationData, DatasetError> {
    if let Some(roster_path) = &input.roster {
        let roster = load_roster(roster_path)?;
        info!("loaded {} roster entries from {}", roster.len(), roster_path);
        return from_roster(&roster);
    }

    match (&input.scores, &input.genders, &input.preferences) {
        (Some(scores), Some(genders), Some(preferences)) => {
            let matrix = load_score_matrix(scores)?;
            let genders = load_genders(genders)?;
            let preferences = load_gender_prefs(preferences)?;
            info!(
                "loaded a {0}x{0} score matrix with labels for {1} participants",
                matrix.size(),
                genders.len()
            );

            if genders.len() != matrix.size() {
                return Err(DatasetError::CountMismatch {
                    what: "genders file",
                    got: genders.len(),
                    expected: matrix.size(),
                });
            }
            if preferences.len() != matrix.size() {
                return Err(DatasetError::CountMismatch {
                    what: "preferences file",
                    got: preferences.len(),
                    expected: matrix.size(),
                });
            }

            let participants = genders
                .into_iter()
                .zip(preferences)
                .map(|(gender, pref)| Participant::new(gender, pref))
                .collect();
            Ok(PopulationData {
                participants,
                names: None,
                matrix,
            })
        }
        _ => Err(DatasetError::IncompleteInput),
    }
}

/// Derive participants, display names and a computed score matrix from a
/// questionnaire roster.
pub fn from_roster(roster: &[RosterEntry]) -> Result<PopulationData, DatasetError> {
    validate_roster(roster)?;
    let participants = roster
        .iter()
        .map(RosterEntry::participant)
        .collect::<Result<Vec<_>, _>>()?;
    let names = roster.iter().map(|entry| entry.name.clone()).collect();
    let matrix = scoring::build_score_matrix(roster)?;
    Ok(PopulationData {
        participants,
        names: Some(names),
        matrix,
    })
}

fn validate_roster(roster: &[RosterEntry]) -> Result<(), DatasetError> {
    let Some(first) = roster.first() else {
        return Ok(());
    };
    let expected = first.responses.len();
    for entry in roster {
        if entry.responses.is_empty() || entry.responses.len() != expected {
            return Err(DatasetError::ResponseCountMismatch {
                name: entry.name.clone(),
                got: entry.responses.len(),
                expected: expected.max(1),
            });
        }
    }
    Ok(())
}

pub fn load_roster(path: impl AsRef<Path>) -> Result<Vec<RosterEntry>, DatasetError> {
    let path = path.as_ref();
    let text = read(path)?;
    let file: RosterFile = serde_json::from_str(&text).map_err(|source| DatasetError::Json {
        path: path.display().to_string(),
        source,
    })?;
    Ok(file.users)
}

pub fn load_score_matrix(path: impl AsRef<Path>) -> Result<ScoreMatrix, DatasetError> {
    let path = path.as_ref();
    parse_score_matrix(&path.display().to_string(), &read(path)?)
}

pub fn load_genders(path: impl AsRef<Path>) -> Result<Vec<Gender>, DatasetError> {
    let path = path.as_ref();
    parse_labels(&path.display().to_string(), &read(path)?)
}

pub fn load_gender_prefs(path: impl AsRef<Path>) -> Result<Vec<GenderPref>, DatasetError> {
    let path = path.as_ref();
    parse_labels(&path.display().to_string(), &read(path)?)
}

fn read(path: impl AsRef<Path>) -> Result<String, DatasetError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Non-blank lines paired with their 1-based line numbers
fn non_blank_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

fn parse_score_matrix(path: &str, text: &str) -> Result<ScoreMatrix, DatasetError> {
    let mut rows = Vec::new();
    for (line, content) in non_blank_lines(text) {
        let mut row = Vec::new();
        for token in content.split_whitespace() {
            let value: f64 = token
                .parse()
                .map_err(|_| DatasetError::InvalidNumber {
                    path: path.to_string(),
                    line,
                    token: token.to_string(),
                })?;
            row.push(value);
        }
        rows.push(row);
    }
    Ok(ScoreMatrix::from_rows(rows)?)
}

fn parse_labels<T>(path: &str, text: &str) -> Result<Vec<T>, DatasetError>
where
    T: std::str::FromStr<Err = DomainError>,
{
    non_blank_lines(text)
        .map(|(line, token)| {
            token.parse().map_err(|source| DatasetError::Label {
                path: path.to_string(),
                line,
                source,
            })
        })
        .collect()
}
