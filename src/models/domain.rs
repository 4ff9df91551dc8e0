use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while constructing matching inputs
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("unknown gender identity {0:?} (expected Male, Female or Non-binary)")]
    UnknownGender(String),

    #[error("unknown gender preference {0:?} (expected Men, Women or Bisexual)")]
    UnknownPreference(String),

    #[error("score matrix row {row} has {len} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("score[{row}][{col}] is {value}; scores must be finite and non-negative")]
    InvalidScore { row: usize, col: usize, value: f64 },

    #[error("participant {index} appears twice in the partition")]
    DuplicatePartitionIndex { index: usize },

    #[error("partition references participant {index}, but the population is {population}")]
    PartitionIndexOutOfRange { index: usize, population: usize },
}

/// Declared gender identity of a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    #[serde(rename = "Non-binary", alias = "Nonbinary", alias = "NonBinary")]
    NonBinary,
}

impl FromStr for Gender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Non-binary" | "Nonbinary" | "NonBinary" => Ok(Gender::NonBinary),
            other => Err(DomainError::UnknownGender(other.to_string())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::NonBinary => write!(f, "Non-binary"),
        }
    }
}

/// Declared gender preference; `Bisexual` is the accepts-any value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenderPref {
    Men,
    Women,
    Bisexual,
}

impl GenderPref {
    /// Collapse a questionnaire's accepted-genders list onto the closed
    /// preference set. A single exact gender keeps its narrow label; anything
    /// broader widens to `Bisexual`. An empty list has no label.
    pub fn from_accepted(accepted: &[Gender]) -> Option<Self> {
        if accepted.is_empty() {
            return None;
        }
        let men = accepted.contains(&Gender::Male);
        let women = accepted.contains(&Gender::Female);
        let non_binary = accepted.contains(&Gender::NonBinary);
        Some(match (men, women, non_binary) {
            (true, false, false) => GenderPref::Men,
            (false, true, false) => GenderPref::Women,
            _ => GenderPref::Bisexual,
        })
    }
}

impl FromStr for GenderPref {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Men" => Ok(GenderPref::Men),
            "Women" => Ok(GenderPref::Women),
            "Bisexual" => Ok(GenderPref::Bisexual),
            other => Err(DomainError::UnknownPreference(other.to_string())),
        }
    }
}

impl fmt::Display for GenderPref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenderPref::Men => write!(f, "Men"),
            GenderPref::Women => write!(f, "Women"),
            GenderPref::Bisexual => write!(f, "Bisexual"),
        }
    }
}

/// Immutable matching input: who a participant is and who they accept.
/// A participant's identifier is its position in the population slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub gender: Gender,
    pub pref: GenderPref,
}

impl Participant {
    pub fn new(gender: Gender, pref: GenderPref) -> Self {
        Self { gender, pref }
    }
}

/// Square matrix of non-negative compatibility scores.
///
/// `score(i, j)` is the compatibility of `i` toward `j`; the matrix may be
/// asymmetric when the caller scored both directions independently.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    size: usize,
    scores: Vec<f64>,
}

impl ScoreMatrix {
    /// Build a matrix from row vectors, rejecting non-square shapes and
    /// scores that are negative or not finite.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, DomainError> {
        let size = rows.len();
        let mut scores = Vec::with_capacity(size * size);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != size {
                return Err(DomainError::RaggedMatrix {
                    row,
                    len: values.len(),
                    expected: size,
                });
            }
            for (col, &value) in values.iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(DomainError::InvalidScore { row, col, value });
                }
                scores.push(value);
            }
        }
        Ok(Self { size, scores })
    }

    /// Number of participants the matrix covers
    pub fn size(&self) -> usize {
        self.size
    }

    /// Compatibility of `from` toward `to`
    #[inline]
    pub fn score(&self, from: usize, to: usize) -> f64 {
        self.scores[from * self.size + to]
    }
}

/// Side of the partition a participant plays during matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Proposer,
    Acceptor,
}

/// Disjoint split of the participant indices into a proposing side and an
/// accepting side. Validated on construction: with `n` the combined size of
/// both sides, every index in `0..n` must appear on exactly one side.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    proposers: Vec<usize>,
    acceptors: Vec<usize>,
    /// participant index -> (role, slot on that side)
    roles: Vec<(Role, usize)>,
}

impl Partition {
    pub fn new(proposers: Vec<usize>, acceptors: Vec<usize>) -> Result<Self, DomainError> {
        let population = proposers.len() + acceptors.len();
        let mut roles: Vec<Option<(Role, usize)>> = vec![None; population];
        for (slot, &index) in proposers.iter().enumerate() {
            Self::claim(&mut roles, index, Role::Proposer, slot, population)?;
        }
        for (slot, &index) in acceptors.iter().enumerate() {
            Self::claim(&mut roles, index, Role::Acceptor, slot, population)?;
        }
        // population claims over population entries with no duplicate fill
        // every entry, so flattening loses nothing
        let roles = roles.into_iter().flatten().collect();
        Ok(Self {
            proposers,
            acceptors,
            roles,
        })
    }

    fn claim(
        roles: &mut [Option<(Role, usize)>],
        index: usize,
        role: Role,
        slot: usize,
        population: usize,
    ) -> Result<(), DomainError> {
        match roles.get_mut(index) {
            None => Err(DomainError::PartitionIndexOutOfRange { index, population }),
            Some(Some(_)) => Err(DomainError::DuplicatePartitionIndex { index }),
            Some(entry) => {
                *entry = Some((role, slot));
                Ok(())
            }
        }
    }

    pub fn population(&self) -> usize {
        self.roles.len()
    }

    pub fn proposers(&self) -> &[usize] {
        &self.proposers
    }

    pub fn acceptors(&self) -> &[usize] {
        &self.acceptors
    }

    /// Role and side-local slot of a participant
    pub fn role_of(&self, index: usize) -> Option<(Role, usize)> {
        self.roles.get(index).copied()
    }

    /// Slot of `index` on the proposing side, if it proposes
    pub fn proposer_slot(&self, index: usize) -> Option<usize> {
        match self.role_of(index) {
            Some((Role::Proposer, slot)) => Some(slot),
            _ => None,
        }
    }

    /// Slot of `index` on the accepting side, if it accepts
    pub fn acceptor_slot(&self, index: usize) -> Option<usize> {
        match self.role_of(index) {
            Some((Role::Acceptor, slot)) => Some(slot),
            _ => None,
        }
    }
}
