use eyre::{ensure, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pimwave_alignment_rs::pairwise::wfa::Adaptive;
use pimwave_alignment_rs::pairwise::{Config, Penalties, Status};

use super::reference::gotoh;
use super::{align, config, mutate, random_sequence};

const SEED: u64 = 0xA11CE;
const ITERATIONS: usize = 300;

fn pairs(seed: u64, count: usize, max_len: usize) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let len = rng.gen_range(0..=max_len);
            let pattern = random_sequence(&mut rng, len);
            let text = if rng.gen_bool(0.2) {
                let len = rng.gen_range(0..=max_len);
                random_sequence(&mut rng, len)
            } else {
                mutate(&mut rng, &pattern, 0.15, max_len)
            };
            (pattern, text)
        })
        .collect()
}

#[test]
fn score_matches_reference() -> Result<()> {
    let schemes = [
        Penalties::default(),
        Penalties::new(0, 1, 6, 2),
        Penalties::new(0, 4, 2, 3),
        Penalties::new(0, 1, 1, 1),
    ];
    for penalties in schemes {
        let config = Config {
            penalties,
            ..config(30)
        };
        for (pattern, text) in pairs(SEED, ITERATIONS, 30) {
            let expected = gotoh(&pattern, &text, &penalties) as usize;
            let alignment = align::<i16>(config, &pattern, &text)?;
            ensure!(*alignment.status() == Status::Found);
            ensure!(
                *alignment.score() == expected,
                "{:?} vs {:?} with {:?}: expected {expected}, got {}",
                String::from_utf8_lossy(&pattern),
                String::from_utf8_lossy(&text),
                penalties,
                alignment.score()
            );
        }
    }
    Ok(())
}

#[test]
fn edit_script_round_trip() -> Result<()> {
    let config = config(40);
    for (pattern, text) in pairs(SEED + 1, ITERATIONS, 40) {
        let alignment = align::<i16>(config, &pattern, &text)?;
        let script = alignment
            .script()
            .as_ref()
            .ok_or_else(|| eyre::eyre!("Missing edit script"))?;

        script.validate(&pattern, &text)?;
        ensure!(script.penalty(&config.penalties) as usize == *alignment.score());
        ensure!(script.max_operations() == pattern.len() + text.len());
        ensure!(script.end() == script.max_operations());
    }
    Ok(())
}

#[test]
fn offset_widths_agree() -> Result<()> {
    let config = config(100);
    for (pattern, text) in pairs(SEED + 2, 100, 100) {
        let narrow = align::<i8>(config, &pattern, &text)?;
        let default = align::<i16>(config, &pattern, &text)?;
        let wide = align::<i32>(config, &pattern, &text)?;
        ensure!(narrow == default && default == wide);
    }
    Ok(())
}

#[test]
fn alignment_is_deterministic() -> Result<()> {
    let config = config(60);
    for (pattern, text) in pairs(SEED + 3, 50, 60) {
        let first = align::<i16>(config, &pattern, &text)?;
        let second = align::<i16>(config, &pattern, &text)?;
        ensure!(first == second);
    }
    Ok(())
}

#[test]
fn score_bound_is_respected() -> Result<()> {
    let config = Config {
        max_score: 12,
        ..config(30)
    };
    for (pattern, text) in pairs(SEED + 4, ITERATIONS, 30) {
        let expected = gotoh(&pattern, &text, &config.penalties) as usize;
        let alignment = align::<i16>(config, &pattern, &text)?;
        if expected <= config.max_score {
            ensure!(*alignment.status() == Status::Found && *alignment.score() == expected);
        } else {
            ensure!(*alignment.status() == Status::Exhausted);
            ensure!(*alignment.score() == config.max_score + 1);
        }
    }
    Ok(())
}

#[test]
fn long_reads_use_segmented_transfers() -> Result<()> {
    // i32 layers wider than 512 diagonals no longer fit into a single transfer
    let config = Config {
        max_score: 2000,
        budget: pimwave_memory_rs::Budget::new(1 << 20, 256 << 20),
        ..config(600)
    };
    for (pattern, text) in pairs(SEED + 5, 3, 600) {
        let alignment = align::<i32>(config, &pattern, &text)?;
        let expected = gotoh(&pattern, &text, &config.penalties) as usize;
        ensure!(*alignment.score() == expected);

        let script = alignment
            .script()
            .as_ref()
            .ok_or_else(|| eyre::eyre!("Missing edit script"))?;
        script.validate(&pattern, &text)?;
    }
    Ok(())
}

#[test]
fn reduction_yields_valid_upper_bounds() -> Result<()> {
    let config = Config {
        reduction: Some(Adaptive::new(4, 3)),
        ..config(80)
    };
    for (pattern, text) in pairs(SEED + 6, ITERATIONS, 80) {
        let optimal = gotoh(&pattern, &text, &config.penalties) as usize;
        let alignment = align::<i16>(config, &pattern, &text)?;
        if *alignment.status() == Status::Exhausted {
            continue;
        }
        ensure!(*alignment.score() >= optimal);

        let script = alignment
            .script()
            .as_ref()
            .ok_or_else(|| eyre::eyre!("Missing edit script"))?;
        script.validate(&pattern, &text)?;
        ensure!(script.penalty(&config.penalties) as usize == *alignment.score());
    }
    Ok(())
}
