use std::ops::Range;

use eyre::{Result, WrapErr};

use pimwave_alignment_rs::pairwise::{Aligner, Config};
use pimwave_core_rs::num::Offset;
use pimwave_memory_rs::Tiers;

use crate::batch::Batch;
use crate::result::{Record, Results};

/// Output of a contiguous range of work items.
#[derive(Clone, Debug)]
struct Shard {
    start: usize,
    records: Vec<Record>,
    operations: Vec<u8>,
}

/// Per-thread state: an aligner, the memory window of the worker and the outputs of every shard
/// it has processed since the last reset.
#[derive(Debug)]
pub struct Worker<O: Offset> {
    aligner: Aligner<O>,
    tiers: Tiers,
    stride: usize,
    shards: Vec<Shard>,
}

impl<O: Offset> Worker<O> {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            aligner: Aligner::new(config)?,
            tiers: Tiers::new(config.budget),
            stride: config.max_operations(),
            shards: Vec::new(),
        })
    }

    pub fn reset(&mut self) {
        self.shards.clear();
    }

    pub fn process(&mut self, items: Range<usize>, batch: &Batch) -> Result<()> {
        let stride = self.stride;
        let mut shard = Shard {
            start: items.start,
            records: Vec::with_capacity(items.len()),
            operations: match self.aligner.config().backtrace {
                true => vec![0; items.len() * stride],
                false => Vec::new(),
            },
        };

        for (slot, item) in items.enumerate() {
            let request = batch.requests()[item];
            let alignment = self
                .aligner
                .align(&mut self.tiers, batch.pattern(item), batch.text(item))
                .wrap_err_with(|| format!("Failed to align work item {}", request.index()))?;

            let (score, status, script) = alignment.dissolve();
            let (begin, end, max_operations) = match script {
                Some(script) => {
                    let dst = &mut shard.operations[slot * stride..(slot + 1) * stride];
                    script.write_bytes(&mut dst[script.begin()..])?;
                    (script.begin(), script.end(), script.max_operations())
                }
                None => (0, 0, request.pattern_len() + request.text_len()),
            };
            shard.records.push(Record::new(
                *request.index(),
                score,
                status,
                begin,
                end,
                max_operations,
            ));
        }

        self.shards.push(shard);
        Ok(())
    }

    /// Collects shard outputs of all workers back into input order.
    pub fn aggregate<'a>(
        items: usize,
        stride: usize,
        backtrace: bool,
        workers: impl Iterator<Item = &'a mut Self>,
    ) -> Results
    where
        O: 'a,
    {
        let mut shards: Vec<Shard> = workers.flat_map(|x| x.shards.drain(..)).collect();
        shards.sort_by_key(|x| x.start);

        let mut records = Vec::with_capacity(items);
        let mut operations = Vec::with_capacity(if backtrace { items * stride } else { 0 });
        for shard in shards {
            debug_assert_eq!(shard.start, records.len());
            records.extend(shard.records);
            operations.extend(shard.operations);
        }
        debug_assert_eq!(records.len(), items);

        Results::new(records, operations, stride)
    }
}
