use std::marker::PhantomData;

use eyre::{Result, WrapErr};
use rayon::{ThreadPool, ThreadPoolBuilder};

use pimwave_alignment_rs::pairwise::Config;
use pimwave_core_rs::num::Offset;
use pimwave_core_rs::parallelism;
use pimwave_memory_rs::Plan;

use crate::Engine;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
struct Memory {
    fast_total: usize,
    external_total: usize,
    reserved: usize,
}

#[derive(Debug)]
pub struct EngineBuilder<O: Offset> {
    config: Config,
    thread_pool: Option<ThreadPool>,
    threads: Option<isize>,
    memory: Option<Memory>,
    phantom: PhantomData<O>,
}

impl<O: Offset> Default for EngineBuilder<O> {
    fn default() -> Self {
        Self {
            config: Config::default(),
            thread_pool: None,
            threads: None,
            memory: None,
            phantom: PhantomData,
        }
    }
}

impl<O: Offset> EngineBuilder<O> {
    pub fn set_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Runs all work on the given pool. Its size defines the number of workers.
    pub fn set_thread_pool(mut self, pool: ThreadPool) -> Self {
        self.thread_pool = Some(pool);
        self
    }

    /// Builds a dedicated pool with this many workers when no pool is given. Negative values count
    /// back from the number of available cores.
    pub fn set_threads(mut self, threads: isize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Shared memories to split evenly between workers. Without it every worker receives the
    /// per-worker budget of the configuration.
    pub fn set_memory(mut self, fast_total: usize, external_total: usize, reserved: usize) -> Self {
        self.memory = Some(Memory {
            fast_total,
            external_total,
            reserved,
        });
        self
    }

    pub fn build(self) -> Result<Engine<O>> {
        let thread_pool = match (self.thread_pool, self.threads) {
            (Some(pool), _) => Some(pool),
            (None, Some(threads)) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(parallelism::available(threads)?)
                    .build()?,
            ),
            (None, None) => None,
        };
        let workers = match &thread_pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        };

        let budget = self.config.budget;
        let plan = match self.memory {
            Some(memory) => Plan::split(
                workers,
                memory.fast_total,
                memory.external_total,
                memory.reserved,
            ),
            None => Plan::fixed(
                workers,
                budget,
                budget.fast.saturating_mul(workers),
                budget.external.saturating_mul(workers),
                0,
            ),
        }
        .wrap_err("Failed to partition worker memory")?;

        let mut config = self.config;
        config.budget = plan.budget();
        config.validate::<O>()?;

        log::debug!(
            "Engine with {} workers, {} fast and {} external bytes per worker",
            plan.workers(),
            plan.budget().fast,
            plan.budget().external
        );
        Ok(Engine::new(config, plan, thread_pool))
    }
}
