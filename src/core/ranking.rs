use std::cmp::Ordering;
use std::collections::HashMap;

use crate::core::eligibility::mutually_eligible;
use crate::models::{Participant, Partition, ScoreMatrix};

/// Ranked candidate lists for both partition sides.
///
/// Proposer lists are walked front-to-back during matching and are never
/// mutated; acceptor rankings are stored as rank lookups so "do I prefer this
/// proposer" is a single map read.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceLists {
    /// proposer slot -> acceptor participant indices, best first
    proposer_choices: Vec<Vec<usize>>,
    /// acceptor slot -> proposer participant index -> rank (0 is best)
    acceptor_ranks: Vec<HashMap<usize, usize>>,
}

impl PreferenceLists {
    /// Ordered acceptor candidates for a proposer slot
    pub fn choices_for(&self, proposer_slot: usize) -> &[usize] {
        &self.proposer_choices[proposer_slot]
    }

    /// Rank an acceptor slot assigns a proposer, 0 being most preferred.
    /// `None` means the proposer is not eligible to this acceptor.
    pub fn rank_of(&self, acceptor_slot: usize, proposer: usize) -> Option<usize> {
        self.acceptor_ranks[acceptor_slot].get(&proposer).copied()
    }

    pub fn proposer_count(&self) -> usize {
        self.proposer_choices.len()
    }

    pub fn acceptor_count(&self) -> usize {
        self.acceptor_ranks.len()
    }
}

/// Build both sides' rankings from the score matrix.
///
/// Candidates failing the mutual eligibility gate are excluded outright, not
/// down-ranked. Each side ranks by its own outgoing scores, descending, with
/// ties broken by ascending participant index so identical inputs always
/// produce identical lists.
pub fn build_preference_lists(
    matrix: &ScoreMatrix,
    partition: &Partition,
    participants: &[Participant],
) -> PreferenceLists {
    let proposer_choices: Vec<Vec<usize>> = partition
        .proposers()
        .iter()
        .map(|&proposer| ranked_candidates(matrix, proposer, partition.acceptors(), participants))
        .collect();

    let acceptor_ranks: Vec<HashMap<usize, usize>> = partition
        .acceptors()
        .iter()
        .map(|&acceptor| {
            ranked_candidates(matrix, acceptor, partition.proposers(), participants)
                .into_iter()
                .enumerate()
                .map(|(rank, proposer)| (proposer, rank))
                .collect()
        })
        .collect();

    PreferenceLists {
        proposer_choices,
        acceptor_ranks,
    }
}

fn ranked_candidates(
    matrix: &ScoreMatrix,
    owner: usize,
    side: &[usize],
    participants: &[Participant],
) -> Vec<usize> {
    let mut candidates: Vec<usize> = side
        .iter()
        .copied()
        .filter(|&candidate| mutually_eligible(&participants[owner], &participants[candidate]))
        .collect();
    candidates.sort_by(|&a, &b| {
        matrix
            .score(owner, b)
            .partial_cmp(&matrix.score(owner, a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(&b))
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn test_choices_sorted_by_descending_score() {
        let participants = open_population(4);
        let matrix = ScoreMatrix::from_rows(vec![
            vec![0.0, 0.0, 2.0, 8.0],
            vec![0.0, 0.0, 5.0, 1.0],
            vec![2.0, 5.0, 0.0, 0.0],
            vec![8.0, 1.0, 0.0, 0.0],
        ])
        .unwrap();
        let partition = Partition::new(vec![0, 1], vec![2, 3]).unwrap();

        let lists = build_preference_lists(&matrix, &partition, &participants);
        assert_eq!(lists.choices_for(0), &[3, 2]);
        assert_eq!(lists.choices_for(1), &[2, 3]);
    }

    #[test]
    fn test_ties_break_by_ascending_index() {
        let participants = open_population(4);
        let matrix = ScoreMatrix::from_rows(vec![
            vec![0.0, 0.0, 4.0, 4.0],
            vec![0.0, 0.0, 4.0, 4.0],
            vec![4.0, 4.0, 0.0, 0.0],
            vec![4.0, 4.0, 0.0, 0.0],
        ])
        .unwrap();
        let partition = Partition::new(vec![0, 1], vec![2, 3]).unwrap();

        let lists = build_preference_lists(&matrix, &partition, &participants);
        assert_eq!(lists.choices_for(0), &[2, 3]);
        assert_eq!(lists.rank_of(0, 0), Some(0));
        assert_eq!(lists.rank_of(0, 1), Some(1));
    }

    #[test]
    fn test_ineligible_candidates_are_excluded() {
        // 0 is a straight man, 1 and 2 are gay men, 3 is a straight woman
        let participants = vec![
            Participant::new(Gender::Male, GenderPref::Women),
            Participant::new(Gender::Male, GenderPref::Men),
            Participant::new(Gender::Male, GenderPref::Men),
            Participant::new(Gender::Female, GenderPref::Men),
        ];
        let matrix = ScoreMatrix::from_rows(vec![
            vec![0.0, 0.0, 9.0, 1.0],
            vec![0.0, 0.0, 9.0, 9.0],
            vec![9.0, 9.0, 0.0, 0.0],
            vec![1.0, 9.0, 0.0, 0.0],
        ])
        .unwrap();
        let partition = Partition::new(vec![0, 1], vec![2, 3]).unwrap();

        let lists = build_preference_lists(&matrix, &partition, &participants);
        // 0's top raw score is a gay man, but mutual eligibility removes him
        assert_eq!(lists.choices_for(0), &[3]);
        // 1 accepts men only, so the straight woman drops out of his list
        assert_eq!(lists.choices_for(1), &[2]);
        // acceptor slot 0 (the gay man) holds no rank for the straight man
        assert_eq!(lists.rank_of(0, 0), None);
        assert_eq!(lists.rank_of(0, 1), Some(0));
        assert_eq!(lists.rank_of(1, 0), Some(0));
    }

    #[test]
    fn test_isolated_proposer_gets_empty_list() {
        let mut participants = open_population(4);
        // 1 accepts men only while both acceptors are women who accept men
        participants[1] = Participant::new(Gender::Female, GenderPref::Men);
        participants[2] = Participant::new(Gender::Female, GenderPref::Men);
        participants[3] = Participant::new(Gender::Female, GenderPref::Men);
        let matrix = ScoreMatrix::from_rows(vec![vec![1.0; 4]; 4]).unwrap();
        let partition = Partition::new(vec![0, 1], vec![2, 3]).unwrap();

        let lists = build_preference_lists(&matrix, &partition, &participants);
        assert!(lists.choices_for(1).is_empty());
        assert_eq!(lists.choices_for(0).len(), 2);
    }

    #[test]
    fn test_building_twice_is_deterministic() {
        let participants = open_population(6);
        let matrix = ScoreMatrix::from_rows(vec![
            vec![0.0, 3.0, 3.0, 7.0, 7.0, 2.0],
            vec![3.0, 0.0, 1.0, 4.0, 4.0, 4.0],
            vec![3.0, 1.0, 0.0, 5.0, 5.0, 5.0],
            vec![7.0, 4.0, 5.0, 0.0, 2.0, 2.0],
            vec![7.0, 4.0, 5.0, 2.0, 0.0, 1.0],
            vec![2.0, 4.0, 5.0, 2.0, 1.0, 0.0],
        ])
        .unwrap();
        let partition = Partition::new(vec![0, 1, 2], vec![3, 4, 5]).unwrap();

        let first = build_preference_lists(&matrix, &partition, &participants);
        let second = build_preference_lists(&matrix, &partition, &participants);
        assert_eq!(first, second);
        // Equal scores toward 3 and 4 rank the lower index first
        assert_eq!(first.choices_for(0), &[3, 4, 5]);
    }
}
