use std::collections::VecDeque;

use thiserror::Error;
use tracing::{debug, trace};

use crate::core::ranking::PreferenceLists;
use crate::models::Partition;

/// Hard failures of the matching pipeline.
///
/// Running out of candidates is never an error; exhausted participants land
/// in the result's unmatched sets. These variants cover malformed inputs
/// caught up front and internal defects that invalidate a run.
#[derive(Debug, Error, PartialEq)]
pub enum MatchingError {
    #[error("score matrix covers {matrix} participants, {participants} were provided")]
    MatrixSizeMismatch { matrix: usize, participants: usize },

    #[error("partition covers {partition} participants, {participants} were provided")]
    PartitionSizeMismatch {
        partition: usize,
        participants: usize,
    },

    #[error("proposal cap exceeded: {proposals} proposals for a population of {population}")]
    ProposalCapExceeded { proposals: usize, population: usize },

    #[error("matching invariant violated: {0}")]
    InvariantViolation(String),
}

/// One matched pair of participant indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPair {
    pub proposer: usize,
    pub acceptor: usize,
}

/// Outcome of one deferred-acceptance run.
///
/// Pairs follow the accepting side's partition order. The unmatched sets are
/// sorted ascending; membership there is a normal outcome, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub pairs: Vec<MatchPair>,
    pub unmatched_proposers: Vec<usize>,
    pub unmatched_acceptors: Vec<usize>,
    /// Total proposals issued; bounded by the square of the population
    pub proposals_made: usize,
}

impl MatchResult {
    /// Acceptor matched to `proposer`, if any
    pub fn acceptor_of(&self, proposer: usize) -> Option<usize> {
        self.pairs
            .iter()
            .find(|pair| pair.proposer == proposer)
            .map(|pair| pair.acceptor)
    }

    /// Proposer matched to `acceptor`, if any
    pub fn proposer_of(&self, acceptor: usize) -> Option<usize> {
        self.pairs
            .iter()
            .find(|pair| pair.acceptor == acceptor)
            .map(|pair| pair.proposer)
    }

    /// Participants on either side that ended the run unmatched
    pub fn unmatched_count(&self) -> usize {
        self.unmatched_proposers.len() + self.unmatched_acceptors.len()
    }
}

/// Deferred-acceptance (Gale-Shapley) engine.
///
/// Owns all mutable run state. Proposers are processed from a FIFO queue of
/// free slots; each proposal advances that proposer's cursor, so no acceptor
/// is ever asked twice by the same proposer and every run terminates.
/// Acceptors hold at most one tentative proposer and trade up whenever a
/// better-ranked one proposes.
pub struct MatchingEngine<'a> {
    lists: &'a PreferenceLists,
    partition: &'a Partition,
    /// Next unconsidered position in each proposer's choice list
    cursors: Vec<usize>,
    /// Proposer tentatively held by each acceptor slot
    engaged: Vec<Option<usize>>,
    /// Free proposer slots that still have candidates to try
    free: VecDeque<usize>,
    /// Proposer slots whose lists ran out; permanently unmatched
    exhausted: Vec<bool>,
    proposals: usize,
    proposal_cap: usize,
}

impl<'a> MatchingEngine<'a> {
    pub fn new(lists: &'a PreferenceLists, partition: &'a Partition) -> Self {
        let proposer_count = lists.proposer_count();
        let mut free = VecDeque::with_capacity(proposer_count);
        let mut exhausted = vec![false; proposer_count];

        for slot in 0..proposer_count {
            if lists.choices_for(slot).is_empty() {
                exhausted[slot] = true;
                debug!(
                    "proposer {} has no eligible acceptors",
                    partition.proposers()[slot]
                );
            } else {
                free.push_back(slot);
            }
        }

        let population = partition.population();
        Self {
            lists,
            partition,
            cursors: vec![0; proposer_count],
            engaged: vec![None; lists.acceptor_count()],
            free,
            exhausted,
            proposals: 0,
            proposal_cap: population * population,
        }
    }

    /// Run the proposal loop until no free proposer has candidates left
    pub fn run(mut self) -> Result<MatchResult, MatchingError> {
        while let Some(slot) = self.free.pop_front() {
            self.propose(slot)?;
        }
        self.into_result()
    }

    /// Let the proposer in `slot` try its best not-yet-considered candidate
    fn propose(&mut self, slot: usize) -> Result<(), MatchingError> {
        let proposer = self.partition.proposers()[slot];
        let choices = self.lists.choices_for(slot);

        let Some(&acceptor) = choices.get(self.cursors[slot]) else {
            self.exhausted[slot] = true;
            debug!("proposer {} exhausted its preference list", proposer);
            return Ok(());
        };
        self.cursors[slot] += 1;

        self.proposals += 1;
        if self.proposals > self.proposal_cap {
            return Err(MatchingError::ProposalCapExceeded {
                proposals: self.proposals,
                population: self.partition.population(),
            });
        }
        trace!("proposer {} proposing to acceptor {}", proposer, acceptor);

        let acceptor_slot = self.partition.acceptor_slot(acceptor).ok_or_else(|| {
            MatchingError::InvariantViolation(format!(
                "candidate {acceptor} is not on the accepting side"
            ))
        })?;

        match self.engaged[acceptor_slot] {
            None => {
                self.engaged[acceptor_slot] = Some(proposer);
                debug!(
                    "acceptor {} tentatively matched with proposer {}",
                    acceptor, proposer
                );
            }
            Some(current) => {
                if self.rank(acceptor_slot, acceptor, proposer)?
                    < self.rank(acceptor_slot, acceptor, current)?
                {
                    self.engaged[acceptor_slot] = Some(proposer);
                    debug!(
                        "acceptor {} dropped proposer {} for proposer {}",
                        acceptor, current, proposer
                    );
                    let current_slot = self.partition.proposer_slot(current).ok_or_else(|| {
                        MatchingError::InvariantViolation(format!(
                            "engaged proposer {current} is not on the proposing side"
                        ))
                    })?;
                    // The displaced proposer resumes from its unchanged cursor
                    self.free.push_back(current_slot);
                } else {
                    trace!("acceptor {} rejected proposer {}", acceptor, proposer);
                    self.free.push_back(slot);
                }
            }
        }
        Ok(())
    }

    fn rank(
        &self,
        acceptor_slot: usize,
        acceptor: usize,
        proposer: usize,
    ) -> Result<usize, MatchingError> {
        self.lists.rank_of(acceptor_slot, proposer).ok_or_else(|| {
            MatchingError::InvariantViolation(format!(
                "acceptor {acceptor} holds no rank for proposer {proposer}"
            ))
        })
    }

    /// Freeze the tentative engagements into a final result, verifying that
    /// every proposer ended either matched or exhausted and nobody was
    /// matched twice.
    fn into_result(self) -> Result<MatchResult, MatchingError> {
        let mut matched = vec![false; self.partition.population()];
        let mut pairs = Vec::with_capacity(self.engaged.len());

        for (acceptor_slot, held) in self.engaged.iter().enumerate() {
            let Some(proposer) = *held else { continue };
            let acceptor = self.partition.acceptors()[acceptor_slot];
            if matched[proposer] {
                return Err(MatchingError::InvariantViolation(format!(
                    "proposer {proposer} is matched to more than one acceptor"
                )));
            }
            matched[proposer] = true;
            matched[acceptor] = true;
            pairs.push(MatchPair { proposer, acceptor });
        }

        let mut unmatched_proposers = Vec::new();
        for (slot, &proposer) in self.partition.proposers().iter().enumerate() {
            match (matched[proposer], self.exhausted[slot]) {
                (true, false) => {}
                (false, true) => unmatched_proposers.push(proposer),
                (false, false) => {
                    return Err(MatchingError::InvariantViolation(format!(
                        "proposer {proposer} ended free with candidates left"
                    )))
                }
                (true, true) => {
                    return Err(MatchingError::InvariantViolation(format!(
                        "proposer {proposer} is both matched and exhausted"
                    )))
                }
            }
        }
        unmatched_proposers.sort_unstable();

        let mut unmatched_acceptors: Vec<usize> = self
            .partition
            .acceptors()
            .iter()
            .copied()
            .filter(|&acceptor| !matched[acceptor])
            .collect();
        unmatched_acceptors.sort_unstable();

        debug!(
            "deferred acceptance finished after {} proposals",
            self.proposals
        );

        Ok(MatchResult {
            pairs,
            unmatched_proposers,
            unmatched_acceptors,
            proposals_made: self.proposals,
        })
    }
}
