use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use eyre::{eyre, Report, Result};
use rayon::ThreadPool;
use thread_local::ThreadLocal;

use pimwave_alignment_rs::pairwise::Config;
use pimwave_core_rs::num::Offset;
use pimwave_core_rs::parallelism;
use pimwave_memory_rs::Plan;

use crate::worker::Worker;
use crate::{Batch, EngineBuilder, Results};

/// Aligns batches of read pairs on a fixed set of workers.
///
/// Each worker owns a disjoint window of both memory tiers as described by the [`Plan`]. Work
/// items are split into contiguous shards and results are always returned in input order.
pub struct Engine<O: Offset> {
    config: Config,
    plan: Plan,
    thread_pool: Option<ThreadPool>,
    workers: ThreadLocal<RefCell<Worker<O>>>,
}

impl<O: Offset> Engine<O> {
    pub(crate) fn new(config: Config, plan: Plan, thread_pool: Option<ThreadPool>) -> Self {
        Self {
            config,
            plan,
            thread_pool,
            workers: ThreadLocal::new(),
        }
    }

    pub fn builder() -> EngineBuilder<O> {
        EngineBuilder::default()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn run(&mut self, batch: &Batch) -> Result<Results> {
        match self.thread_pool.take() {
            Some(pool) => {
                let result = pool.install(|| self._run(batch));
                self.thread_pool = Some(pool);
                result
            }
            None => self._run(batch),
        }
    }

    fn _run(&mut self, batch: &Batch) -> Result<Results> {
        if batch.max_read_len() > self.config.max_read_len {
            return Err(eyre!(
                "Batch is packed for reads of length {} while the engine supports at most {}",
                batch.max_read_len(),
                self.config.max_read_len
            ));
        }

        // Soft-reset all workers
        for worker in self.workers.iter_mut() {
            worker.get_mut().reset();
        }

        let shards = parallelism::shards(batch.len(), self.plan.workers());
        log::debug!(
            "Aligning {} work items in {} shards",
            batch.len(),
            shards.len()
        );

        let has_failed = AtomicBool::new(false);
        let errors: Mutex<Vec<Report>> = Mutex::new(Vec::new());
        let config = self.config;
        let workers = &self.workers;

        rayon::scope(|s| {
            for shard in &shards {
                if has_failed.load(Ordering::Relaxed) {
                    return;
                }

                let (has_failed, errors) = (&has_failed, &errors);
                s.spawn(move |_| {
                    if has_failed.load(Ordering::Relaxed) {
                        return;
                    }

                    let result = workers
                        .get_or_try(|| Worker::new(config).map(RefCell::new))
                        .and_then(|worker| worker.borrow_mut().process(shard.clone(), batch));

                    if let Err(err) = result {
                        has_failed.store(true, Ordering::Relaxed);
                        log::error!("Shard {shard:?} failed: {err:?}");
                        if let Ok(mut errors) = errors.lock() {
                            errors.push(err);
                        }
                    }
                });
            }
        });

        if has_failed.into_inner() {
            let errors = errors.into_inner().unwrap_or_default();
            let failed = errors.len();
            return Err(match errors.into_iter().next() {
                Some(err) => err.wrap_err(format!("Batch alignment failed in {failed} shard(s)")),
                None => eyre!("Batch alignment failed. See log for details."),
            });
        }

        let results = Worker::aggregate(
            batch.len(),
            config.max_operations(),
            config.backtrace,
            self.workers.iter_mut().map(|x| x.get_mut()),
        );

        let abandoned = results.abandoned();
        if abandoned > 0 {
            log::warn!(
                "{abandoned} of {} work items exceeded the max score {}",
                results.len(),
                config.max_score
            );
        }
        Ok(results)
    }
}
