// Copyright 2023 The Fairq Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use anyhow::anyhow;
use anyhow::Context;
use fairq::BoundedBlockingQueue;
use fairq::CountDownLatch;
use parking_lot::Mutex;
use tabled::settings::Style;
use tabled::Table;
use tabled::Tabled;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::info;

use crate::bench_config::BenchConfig;
use crate::bench_config::QueueKind;

/// The queue operations the benchmark needs.
pub trait BenchQueue: Send + Sync {
    fn name(&self) -> &'static str;

    fn put(&self, item: u64) -> anyhow::Result<()>;

    fn clear(&self);
}

impl BenchQueue for BoundedBlockingQueue<u64> {
    fn name(&self) -> &'static str {
        "fairq::BoundedBlockingQueue"
    }

    fn put(&self, item: u64) -> anyhow::Result<()> {
        BoundedBlockingQueue::put(self, item)?;
        Ok(())
    }

    fn clear(&self) {
        BoundedBlockingQueue::clear(self)
    }
}

/// Bounded tokio channel used from OS threads, the reference implementation.
pub struct TokioChannelQueue {
    tx: mpsc::Sender<u64>,
    rx: Mutex<mpsc::Receiver<u64>>,
}

impl TokioChannelQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        TokioChannelQueue {
            tx,
            rx: Mutex::new(rx),
        }
    }
}

impl BenchQueue for TokioChannelQueue {
    fn name(&self) -> &'static str {
        "tokio::sync::mpsc::channel"
    }

    fn put(&self, item: u64) -> anyhow::Result<()> {
        self.tx
            .blocking_send(item)
            .map_err(|_| anyhow!("tokio channel receiver dropped"))
    }

    fn clear(&self) {
        let mut rx = self.rx.lock();
        while rx.try_recv().is_ok() {}
    }
}

pub fn build_queue(config: &BenchConfig) -> anyhow::Result<Arc<dyn BenchQueue>> {
    let queue: Arc<dyn BenchQueue> = match config.kind {
        QueueKind::Fairq => {
            let queue = BoundedBlockingQueue::<u64>::with_config(config.queue_config())?;
            Arc::new(queue)
        }
        QueueKind::Tokio => Arc::new(TokioChannelQueue::new(config.items)),
    };
    Ok(queue)
}

#[derive(Tabled, Debug, Clone)]
pub struct BenchReport {
    #[tabled(rename = "Queue")]
    pub queue: &'static str,

    #[tabled(rename = "Producers")]
    pub producers: usize,

    #[tabled(rename = "Items")]
    pub items: usize,

    #[tabled(rename = "Warmup(ms)")]
    pub warmup_ms: u128,

    #[tabled(rename = "Run(ms)")]
    pub run_ms: u128,
}

impl BenchReport {
    pub fn print(&self) {
        let mut table = Table::new([self.clone()]);
        table.with(Style::extended());
        println!("{table}");
    }
}

/// Fills the queue from one thread, clears it, then fills it again from `producers` threads
/// released at the same instant.
pub fn run(config: &BenchConfig) -> anyhow::Result<BenchReport> {
    config.validate()?;
    let queue = build_queue(config)?;
    info!("Using queue: {}", queue.name());

    let warmup = fill_single_thread(queue.as_ref(), config.items)?;
    info!(
        "Warmup done... 1 thread produced {} items in {}ms",
        config.items,
        warmup.as_millis()
    );
    queue.clear();

    let run = fill_concurrently(&queue, config.producers, config.items / config.producers)?;
    info!(
        "{} threads produced {} items in {}ms",
        config.producers,
        config.items / config.producers * config.producers,
        run.as_millis()
    );

    Ok(BenchReport {
        queue: queue.name(),
        producers: config.producers,
        items: config.items,
        warmup_ms: warmup.as_millis(),
        run_ms: run.as_millis(),
    })
}

fn fill_single_thread(queue: &dyn BenchQueue, items: usize) -> anyhow::Result<Duration> {
    let start = Instant::now();
    for i in 0..items as u64 {
        queue.put(i)?;
    }
    Ok(start.elapsed())
}

fn fill_concurrently(
    queue: &Arc<dyn BenchQueue>,
    producers: usize,
    per_producer: usize,
) -> anyhow::Result<Duration> {
    let start_gate = CountDownLatch::new(1);
    let handles = (0..producers)
        .map(|id| {
            let queue = Arc::clone(queue);
            let start_gate = start_gate.clone();
            thread::Builder::new()
                .name(format!("fairq-producer-{id}"))
                .spawn(move || -> anyhow::Result<()> {
                    start_gate.wait();
                    for i in 0..per_producer as u64 {
                        queue.put(i)?;
                    }
                    debug!(producer = id, "producer finished");
                    Ok(())
                })
                .context("failed to spawn producer thread")
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let start = Instant::now();
    start_gate.count_down();
    for handle in handles {
        handle
            .join()
            .map_err(|_| anyhow!("producer thread panicked"))??;
    }
    Ok(start.elapsed())
}
