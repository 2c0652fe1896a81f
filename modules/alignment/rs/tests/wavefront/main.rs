use eyre::Result;
use rand::rngs::StdRng;
use rand::Rng;

use pimwave_alignment_rs::pairwise::{Aligner, Alignment, Config};
use pimwave_core_rs::num::Offset;
use pimwave_memory_rs::{Budget, Tiers};

mod properties;
mod reference;
mod scenarios;

pub const ALPHABET: &[u8] = b"ACGT";

pub fn align<O: Offset>(config: Config, pattern: &[u8], text: &[u8]) -> Result<Alignment> {
    let mut tiers = Tiers::new(config.budget);
    let mut aligner = Aligner::<O>::new(config)?;
    aligner.align(&mut tiers, pattern, text)
}

pub fn config(max_read_len: usize) -> Config {
    Config {
        max_read_len,
        budget: Budget::new(64 << 10, 8 << 20),
        ..Default::default()
    }
}

pub fn random_sequence(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}

/// Copies `sequence` introducing substitutions, insertions and deletions at the given rate.
pub fn mutate(rng: &mut StdRng, sequence: &[u8], rate: f64, max_len: usize) -> Vec<u8> {
    let mut result = Vec::with_capacity(sequence.len());
    for symbol in sequence {
        if !rng.gen_bool(rate) {
            result.push(*symbol);
            continue;
        }
        match rng.gen_range(0..3) {
            0 => result.push(ALPHABET[rng.gen_range(0..ALPHABET.len())]),
            1 => {
                result.push(*symbol);
                result.push(ALPHABET[rng.gen_range(0..ALPHABET.len())]);
            }
            _ => {}
        }
    }
    result.truncate(max_len);
    result
}
