use tracing::info;

use crate::core::engine::{MatchResult, MatchingEngine, MatchingError};
use crate::core::ranking::{build_preference_lists, PreferenceLists};
use crate::models::{Participant, Partition, ScoreMatrix};

/// Matching orchestrator
///
/// Validates the inputs once, derives eligibility-filtered preference lists
/// for both partition sides, and runs a fresh deferred-acceptance engine per
/// call. The precomputed lists make repeated runs over the same population
/// cheap.
#[derive(Debug, Clone)]
pub struct Matcher {
    lists: PreferenceLists,
    partition: Partition,
}

impl Matcher {
    /// Check the matrix and partition against the population, then build the
    /// preference lists.
    pub fn new(
        participants: &[Participant],
        matrix: &ScoreMatrix,
        partition: Partition,
    ) -> Result<Self, MatchingError> {
        if matrix.size() != participants.len() {
            return Err(MatchingError::MatrixSizeMismatch {
                matrix: matrix.size(),
                participants: participants.len(),
            });
        }
        if partition.population() != participants.len() {
            return Err(MatchingError::PartitionSizeMismatch {
                partition: partition.population(),
                participants: participants.len(),
            });
        }

        let lists = build_preference_lists(matrix, &partition, participants);
        Ok(Self { lists, partition })
    }

    /// Run deferred acceptance over the precomputed preference lists
    pub fn run(&self) -> Result<MatchResult, MatchingError> {
        let result = MatchingEngine::new(&self.lists, &self.partition).run()?;
        info!(
            "matching complete: {} pairs, {} unmatched proposers, {} unmatched acceptors, {} proposals",
            result.pairs.len(),
            result.unmatched_proposers.len(),
            result.unmatched_acceptors.len(),
            result.proposals_made
        );
        debug_assert!(
            find_blocking_pair(&result, &self.lists, &self.partition).is_none(),
            "deferred acceptance produced an unstable matching"
        );
        Ok(result)
    }

    pub fn preference_lists(&self) -> &PreferenceLists {
        &self.lists
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }
}

/// Search a result for a blocking pair: a proposer and an acceptor who would
/// both rather have each other than their assigned outcome. A stable matching
/// has none.
pub fn find_blocking_pair(
    result: &MatchResult,
    lists: &PreferenceLists,
    partition: &Partition,
) -> Option<(usize, usize)> {
    for (slot, &proposer) in partition.proposers().iter().enumerate() {
        let choices = lists.choices_for(slot);
        // Candidates this proposer ranks strictly above its own outcome; an
        // unmatched proposer would take anyone on its list
        let horizon = result
            .acceptor_of(proposer)
            .and_then(|assigned| choices.iter().position(|&c| c == assigned))
            .unwrap_or(choices.len());

        for &acceptor in &choices[..horizon] {
            let Some(acceptor_slot) = partition.acceptor_slot(acceptor) else {
                continue;
            };
            let prefers_proposer = match result.proposer_of(acceptor) {
                None => true,
                Some(current) => matches!(
                    (
                        lists.rank_of(acceptor_slot, proposer),
                        lists.rank_of(acceptor_slot, current),
                    ),
                    (Some(new_rank), Some(current_rank)) if new_rank < current_rank
                ),
            };
            if prefers_proposer {
                return Some((proposer, acceptor));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::MatchPair;
    use crate::models::{Gender, GenderPref};

    fn open_population(n: usize) -> Vec<Participant> {
        (0..n)
            .map(|i| {
                let gender = if i % 2 == 0 {
                    Gender::Male
                } else {
                    Gender::Female
                };
                Participant::new(gender, GenderPref::Bisexual)
            })
            .collect()
    }

    fn cross_matrix() -> ScoreMatrix {
        ScoreMatrix::from_rows(vec![
            vec![0.0, 0.0, 9.0, 1.0],
            vec![0.0, 0.0, 2.0, 8.0],
            vec![9.0, 2.0, 0.0, 0.0],
            vec![1.0, 8.0, 0.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_rejects_matrix_size_mismatch() {
        let participants = open_population(3);
        let partition = Partition::new(vec![0, 1], vec![2, 3]).unwrap();
        let err = Matcher::new(&participants, &cross_matrix(), partition).unwrap_err();
        assert_eq!(
            err,
            MatchingError::MatrixSizeMismatch {
                matrix: 4,
                participants: 3
            }
        );
    }

    #[test]
    fn test_rejects_partition_size_mismatch() {
        let participants = open_population(4);
        let partition = Partition::new(vec![0], vec![1]).unwrap();
        let err = Matcher::new(&participants, &cross_matrix(), partition).unwrap_err();
        assert_eq!(
            err,
            MatchingError::PartitionSizeMismatch {
                partition: 2,
                participants: 4
            }
        );
    }

    #[test]
    fn test_run_produces_stable_pairs() {
        let participants = open_population(4);
        let partition = Partition::new(vec![0, 1], vec![2, 3]).unwrap();
        let matcher = Matcher::new(&participants, &cross_matrix(), partition).unwrap();

        let result = matcher.run().unwrap();
        assert_eq!(result.pairs.len(), 2);
        assert_eq!(
            find_blocking_pair(&result, matcher.preference_lists(), matcher.partition()),
            None
        );
    }

    #[test]
    fn test_reruns_are_identical() {
        let participants = open_population(4);
        let partition = Partition::new(vec![0, 1], vec![2, 3]).unwrap();
        let matcher = Matcher::new(&participants, &cross_matrix(), partition).unwrap();

        assert_eq!(matcher.run().unwrap(), matcher.run().unwrap());
    }

    #[test]
    fn test_blocking_pair_found_in_swapped_result() {
        let participants = open_population(4);
        let partition = Partition::new(vec![0, 1], vec![2, 3]).unwrap();
        let matcher = Matcher::new(&participants, &cross_matrix(), partition).unwrap();

        // Swap the stable outcome by hand: 0 and 2 score each other highest,
        // so pairing them away from each other cannot be stable
        let swapped = MatchResult {
            pairs: vec![
                MatchPair {
                    proposer: 0,
                    acceptor: 3,
                },
                MatchPair {
                    proposer: 1,
                    acceptor: 2,
                },
            ],
            unmatched_proposers: vec![],
            unmatched_acceptors: vec![],
            proposals_made: 2,
        };

        assert_eq!(
            find_blocking_pair(&swapped, matcher.preference_lists(), matcher.partition()),
            Some((0, 2))
        );
    }
}
