use eyre::{ensure, Result};

use pimwave_alignment_rs::pairwise::{Aligner, Config, Penalties, Status};
use pimwave_alignment_rs::AlignmentError;
use pimwave_memory_rs::{Budget, MemoryError, Tiers};

use super::{align, config};

struct Workload<'a> {
    pattern: &'a [u8],
    text: &'a [u8],
    score: usize,
    rle: &'a str,
}

fn ensure_workload(config: Config, w: Workload<'_>) -> Result<()> {
    for alignment in [
        align::<i8>(config, w.pattern, w.text)?,
        align::<i16>(config, w.pattern, w.text)?,
        align::<i32>(config, w.pattern, w.text)?,
    ] {
        ensure!(*alignment.status() == Status::Found);
        ensure!(
            *alignment.score() == w.score,
            "{:?} vs {:?}: expected score {}, got {}",
            w.pattern,
            w.text,
            w.score,
            alignment.score()
        );

        let script = alignment
            .script()
            .as_ref()
            .ok_or_else(|| eyre::eyre!("Missing edit script"))?;
        ensure!(script.rle() == w.rle, "Expected {}, got {}", w.rle, script.rle());
        script.validate(w.pattern, w.text)?;
        ensure!(script.penalty(&config.penalties) as usize == w.score);
    }
    Ok(())
}

#[test]
fn identical_sequences() -> Result<()> {
    ensure_workload(
        config(110),
        Workload {
            pattern: b"ACGT",
            text: b"ACGT",
            score: 0,
            rle: "4M",
        },
    )
}

#[test]
fn single_deletion() -> Result<()> {
    ensure_workload(
        config(110),
        Workload {
            pattern: b"ACGT",
            text: b"AGT",
            score: 5,
            rle: "1M1D2M",
        },
    )
}

#[test]
fn single_mismatch() -> Result<()> {
    ensure_workload(
        config(110),
        Workload {
            pattern: b"AAAA",
            text: b"AAAT",
            score: 3,
            rle: "3M1X",
        },
    )
}

#[test]
fn affine_gaps_prefer_a_single_run() -> Result<()> {
    ensure_workload(
        config(110),
        Workload {
            pattern: b"ACGTTTTACG",
            text: b"ACGACG",
            score: 8,
            rle: "3M4D3M",
        },
    )?;
    ensure_workload(
        config(110),
        Workload {
            pattern: b"GATTACA",
            text: b"GATTACA",
            score: 0,
            rle: "7M",
        },
    )
}

#[test]
fn custom_penalties() -> Result<()> {
    // Mismatches are cheaper than a gap pair here, and a gap pair is cheaper after that
    let cheap = Config {
        penalties: Penalties::new(0, 1, 6, 2),
        ..config(110)
    };
    ensure_workload(
        cheap,
        Workload {
            pattern: b"ACGT",
            text: b"TCGA",
            score: 2,
            rle: "1X2M1X",
        },
    )?;

    let pricey = Config {
        penalties: Penalties::new(0, 20, 1, 1),
        ..config(110)
    };
    ensure_workload(
        pricey,
        Workload {
            pattern: b"AC",
            text: b"AG",
            score: 4,
            rle: "1M1I1D",
        },
    )
}

#[test]
fn exhausted_alignment_reports_sentinel() -> Result<()> {
    let config = Config {
        max_score: 10,
        ..config(110)
    };
    let alignment = align::<i16>(config, b"AAAAAAAAAA", b"CCCCCCCCCC")?;
    ensure!(*alignment.status() == Status::Exhausted);
    ensure!(*alignment.score() == 11);
    ensure!(alignment.script().is_none());
    Ok(())
}

#[test]
fn backtrace_can_be_disabled() -> Result<()> {
    let config = Config {
        backtrace: false,
        ..config(110)
    };
    let alignment = align::<i16>(config, b"ACGTACGTAC", b"ACGTTCGTAC")?;
    ensure!(*alignment.status() == Status::Found);
    ensure!(*alignment.score() == 3);
    ensure!(alignment.script().is_none());
    Ok(())
}

#[test]
fn tiny_fast_tier_is_fatal() {
    let config = Config {
        budget: Budget::new(64, 1 << 20),
        ..config(110)
    };
    let err = align::<i16>(config, b"ACGTACGTACGTACGT", b"TTTTACGTACGTAAAA").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MemoryError>(),
        Some(MemoryError::Exhausted { .. })
    ));
}

#[test]
fn tiny_external_tier_is_fatal() {
    let config = Config {
        budget: Budget::new(64 << 10, 256),
        ..config(110)
    };
    let err = align::<i16>(config, b"ACGTACGTACGTACGT", b"TTTTACGTACGTAAAA").unwrap_err();
    assert!(err.downcast_ref::<MemoryError>().is_some());
    assert!(err.downcast_ref::<AlignmentError>().is_none());
}

#[test]
fn aligner_is_reusable() -> Result<()> {
    let config = config(110);
    let mut tiers = Tiers::new(config.budget);
    let mut aligner = Aligner::<i16>::new(config)?;

    let first = aligner.align(&mut tiers, b"ACGTACGT", b"ACGAACGT")?;
    aligner.align(&mut tiers, b"TTTTTTTTTTTT", b"GGGG")?;
    let again = aligner.align(&mut tiers, b"ACGTACGT", b"ACGAACGT")?;
    ensure!(first == again);
    Ok(())
}
