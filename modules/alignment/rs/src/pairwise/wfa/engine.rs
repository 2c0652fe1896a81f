use derive_getters::{Dissolve, Getters};
use derive_more::Display;
use eyre::{ensure, Result};
use log::{debug, trace};

use pimwave_core_rs::num::Offset;
use pimwave_memory_rs::{Checkpoint, Tiers};

use crate::pairwise::config::Config;
use crate::pairwise::scoring::Costs;
use crate::pairwise::script::EditScript;

use super::backtrace::backtrace;
use super::compute::{compute, span, Predecessors};
use super::extend::extend;
use super::reduce::{reduce, Reduction};
use super::{Component, Frame, Header, Kernel, Layer, Projection, Store};

/// Position of the aligner in its per-score state machine.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Display)]
pub enum State {
    #[display("extending score {_0}")]
    Extending(usize),
    #[display("reducing score {_0}")]
    Reducing(usize),
    #[display("testing score {_0} for the end")]
    TestingEnd(usize),
    #[display("advancing from score {_0}")]
    Advancing(usize),
    #[display("found at score {_0}")]
    Found(usize),
    #[display("exhausted")]
    Exhausted,
}

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Status {
    /// The optimal score was found
    Found,
    /// No alignment within the score bound, the reported score is `max_score + 1`
    Exhausted,
}

#[derive(Clone, Eq, PartialEq, Debug, Getters, Dissolve)]
pub struct Alignment {
    score: usize,
    status: Status,
    /// Present only for found alignments with backtrace enabled
    script: Option<EditScript>,
}

/// Gap-affine wavefront aligner for a single worker.
///
/// Offsets are stored as `O`; the aligner keeps one component resident in the fast tier at a
/// time and persists every component to the external tier as soon as it is complete.
#[derive(Debug)]
pub struct Aligner<O: Offset> {
    config: Config,
    costs: Costs,
    reduction: Option<Box<dyn Reduction>>,
    store: Store<O>,
}

impl<O: Offset> Aligner<O> {
    pub fn new(config: Config) -> Result<Self> {
        config.validate::<O>()?;
        Ok(Self {
            costs: config.penalties.costs(),
            reduction: config
                .reduction
                .map(|x| Box::new(x) as Box<dyn Reduction>),
            store: Store::new(config.max_score),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the configured band reduction.
    pub fn set_reduction(&mut self, reduction: Option<Box<dyn Reduction>>) {
        self.reduction = reduction;
    }

    /// Aligns `pattern` against `text` using the given worker memory. Both tiers are reset
    /// before the alignment starts.
    pub fn align(&mut self, tiers: &mut Tiers, pattern: &[u8], text: &[u8]) -> Result<Alignment> {
        let max_read_len = self.config.max_read_len;
        ensure!(
            pattern.len() <= max_read_len && text.len() <= max_read_len,
            "Sequences of lengths {} and {} exceed the maximum read length {}",
            pattern.len(),
            text.len(),
            max_read_len
        );

        tiers.reset();
        self.store.reset(self.config.max_score);

        let frame = Frame::new::<O>(pattern, text);
        let target = frame.target();
        let base = tiers.fast.checkpoint();

        let mut origin = self.store.allocate(tiers, 0, 0, 0, Kernel::M_ONLY)?;
        origin.set(Layer::M, 0, O::zero());
        let mut current = Some(origin);

        let mut state = State::Extending(0);
        loop {
            trace!("Aligner is {state}");
            state = match state {
                State::Extending(score) => {
                    if let Some(component) = current.as_mut() {
                        extend(component, pattern, text);
                    }
                    match self.reduction {
                        Some(_) => State::Reducing(score),
                        None => State::TestingEnd(score),
                    }
                }
                State::Reducing(score) => {
                    if let (Some(reduction), Some(component)) =
                        (self.reduction.as_deref(), current.as_mut())
                    {
                        reduce(reduction, component, &frame);
                    }
                    State::TestingEnd(score)
                }
                State::TestingEnd(score) => match current.as_ref() {
                    None => {
                        self.store.forget(score);
                        State::Advancing(score)
                    }
                    Some(component) => {
                        self.store.persist(tiers, score, component)?;
                        match component.get(Layer::M, target) {
                            Some(offset) if offset.widen() >= frame.tlen => State::Found(score),
                            _ => State::Advancing(score),
                        }
                    }
                },
                State::Advancing(score) if score >= self.config.max_score => State::Exhausted,
                State::Advancing(score) => {
                    current = self.advance(tiers, &frame, score + 1, base)?;
                    State::Extending(score + 1)
                }
                State::Found(score) => {
                    let (fast, external) = tiers.take_usage();
                    debug!(
                        "Found alignment with score {score} (pattern {}, text {}): {fast} fast, {external} external bytes",
                        pattern.len(),
                        text.len()
                    );

                    let script = match (self.config.backtrace, current.as_ref()) {
                        (true, Some(component)) => {
                            let offset = component.raw(Layer::M, target).widen();
                            Some(backtrace(
                                &mut self.store,
                                tiers,
                                &frame,
                                &self.costs,
                                score,
                                offset,
                            )?)
                        }
                        _ => None,
                    };
                    return Ok(Alignment {
                        score,
                        status: Status::Found,
                        script,
                    });
                }
                State::Exhausted => {
                    let (fast, external) = tiers.take_usage();
                    debug!(
                        "Alignment abandoned after score {} (pattern {}, text {}): {fast} fast, {external} external bytes",
                        self.config.max_score,
                        pattern.len(),
                        text.len()
                    );
                    return Ok(Alignment {
                        score: self.config.max_score + 1,
                        status: Status::Exhausted,
                        script: None,
                    });
                }
            };
        }
    }

    /// Builds the component for `score` from its predecessors. Everything resident in the fast
    /// tier is released first, and the predecessors are released once the new component is
    /// computed.
    fn advance(
        &mut self,
        tiers: &mut Tiers,
        frame: &Frame,
        score: usize,
        base: Checkpoint,
    ) -> Result<Option<Component<O>>> {
        tiers.fast.rewind(base);

        let mismatch = Costs::before(score, self.costs.mismatch);
        let open = Costs::before(score, self.costs.open);
        let extend = Costs::before(score, self.costs.extend);

        let headers = [
            self.header(tiers, mismatch)?,
            self.header(tiers, open)?,
            self.header(tiers, extend)?,
        ];

        let Some(header) = span(headers[0].as_ref(), headers[1].as_ref(), headers[2].as_ref(), frame)
        else {
            trace!("Score {score}: unreachable");
            return Ok(None);
        };
        trace!(
            "Score {score}: diagonals [{}, {}], kernel {:#04b}",
            header.lo(),
            header.hi(),
            header.kernel().bits()
        );

        let (lo, hi, kernel) = (*header.lo(), *header.hi(), *header.kernel());
        let mut next = self.store.allocate(tiers, score, lo, hi, kernel)?;
        let scratch = tiers.fast.checkpoint();

        let [mismatch, open, extend] = self.store.gather(
            tiers,
            [
                mismatch.map(|x| (x, Projection::Match)),
                open.map(|x| (x, Projection::Match)),
                extend.map(|x| (x, Projection::Gaps)),
            ],
        )?;
        let predecessors = Predecessors {
            mismatch: mismatch.as_ref(),
            open: open.as_ref(),
            extend: extend.as_ref(),
        };
        compute(&predecessors, frame, &mut next);

        tiers.fast.rewind(scratch);
        Ok(Some(next))
    }

    fn header(&mut self, tiers: &mut Tiers, score: Option<usize>) -> Result<Option<Header>> {
        match score {
            Some(score) => self.store.header(tiers, score),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use pimwave_memory_rs::Budget;

    use super::*;

    fn align(pattern: &[u8], text: &[u8]) -> Alignment {
        let config = Config::default();
        let mut tiers = Tiers::new(Budget::new(16 << 10, 1 << 20));
        let mut aligner = Aligner::<i16>::new(config).unwrap();
        aligner.align(&mut tiers, pattern, text).unwrap()
    }

    #[test]
    fn test_scenarios() {
        for (pattern, text, score, rle) in [
            (&b"ACGT"[..], &b"ACGT"[..], 0, "4M"),
            (b"ACGT", b"AGT", 5, "1M1D2M"),
            (b"AAAA", b"AAAT", 3, "3M1X"),
            (b"A", b"C", 3, "1X"),
            (b"", b"AC", 6, "2I"),
            (b"AC", b"", 6, "2D"),
            (b"", b"", 0, ""),
        ] {
            let alignment = align(pattern, text);
            assert_eq!(*alignment.status(), Status::Found);
            assert_eq!(*alignment.score(), score);

            let script = alignment.script().as_ref().unwrap();
            assert_eq!(script.rle(), rle);
            assert_eq!(script.end(), pattern.len() + text.len());
        }
    }

    #[test]
    fn test_exhausted() {
        let config = Config {
            max_score: 4,
            ..Default::default()
        };
        let mut tiers = Tiers::new(Budget::new(16 << 10, 1 << 20));
        let mut aligner = Aligner::<i16>::new(config).unwrap();

        let alignment = aligner.align(&mut tiers, b"AAAA", b"TTTT").unwrap();
        assert_eq!(*alignment.status(), Status::Exhausted);
        assert_eq!(*alignment.score(), 5);
        assert!(alignment.script().is_none());
    }

    /// Keeps nothing but the diagonal closest to the target.
    #[derive(Debug)]
    struct TargetOnly {
        calls: Arc<AtomicUsize>,
    }

    impl Reduction for TargetOnly {
        fn band(&self, lo: i32, hi: i32, target: i32, _: &[Option<i32>]) -> (i32, i32) {
            self.calls.fetch_add(1, Ordering::Relaxed);
            let k = target.clamp(lo, hi);
            (k, k)
        }
    }

    #[test]
    fn test_custom_reduction() {
        let (pattern, text) = (b"ACGTACGTAC", b"CGTACGTACG");
        let mut tiers = Tiers::new(Budget::new(16 << 10, 1 << 20));
        let mut aligner = Aligner::<i16>::new(Config::default()).unwrap();

        let exact = aligner.align(&mut tiers, pattern, text).unwrap();
        assert_eq!(*exact.score(), 10);
        assert_eq!(exact.script().as_ref().unwrap().rle(), "1D9M1I");

        // Only the main diagonal survives, so gaps are never explored
        let calls = Arc::new(AtomicUsize::new(0));
        aligner.set_reduction(Some(Box::new(TargetOnly {
            calls: calls.clone(),
        })));
        let reduced = aligner.align(&mut tiers, pattern, text).unwrap();
        assert!(calls.load(Ordering::Relaxed) > 0);
        assert_eq!(*reduced.status(), Status::Found);
        assert_eq!(*reduced.score(), 30);

        let script = reduced.script().as_ref().unwrap();
        assert_eq!(script.rle(), "10X");
        script.validate(pattern, text).unwrap();
        assert_eq!(script.penalty(&aligner.config().penalties), 30);

        aligner.set_reduction(None);
        let restored = aligner.align(&mut tiers, pattern, text).unwrap();
        assert_eq!(restored, exact);
    }

    #[test]
    fn test_overlength_is_rejected() {
        let config = Config {
            max_read_len: 3,
            ..Default::default()
        };
        let mut tiers = Tiers::new(Budget::default());
        let mut aligner = Aligner::<i8>::new(config).unwrap();
        assert!(aligner.align(&mut tiers, b"ACGT", b"ACG").is_err());
    }
}
