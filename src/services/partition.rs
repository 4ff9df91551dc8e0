//! Partition policies.
//!
//! The matching core treats the proposer/acceptor split as an opaque input;
//! the policies for producing one live here. Both split the population into
//! near-equal halves, with the smaller half proposing when the population is
//! odd.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::models::{DomainError, Partition};

/// Split the population in index order: the first half proposes
pub fn ordered(population: usize) -> Result<Partition, DomainError> {
    split((0..population).collect())
}

/// Shuffle the population with a seeded generator, then split. The same seed
/// always produces the same partition.
pub fn shuffled(population: usize, seed: u64) -> Result<Partition, DomainError> {
    let mut indices: Vec<usize> = (0..population).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    split(indices)
}

fn split(mut indices: Vec<usize>) -> Result<Partition, DomainError> {
    let acceptors = indices.split_off(indices.len() / 2);
    Partition::new(indices, acceptors)
}
