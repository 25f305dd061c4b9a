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

use clap::ValueEnum;
use fairq::QueueConfig;
use fairq::QueueError;
use fairq::QueueResult;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QueueKind {
    /// `fairq::BoundedBlockingQueue`
    Fairq,
    /// `tokio::sync::mpsc` bounded channel, driven from plain threads
    Tokio,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub producers: usize,
    pub items: usize,
    pub kind: QueueKind,
    /// Lock options of the fairq queue, its capacity is always `items`.
    pub queue: QueueConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            producers: 4,
            items: 100_000,
            kind: QueueKind::Fairq,
            queue: QueueConfig::default(),
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> QueueResult<()> {
        if self.producers == 0 {
            return Err(QueueError::config("producers must be greater than 0"));
        }
        if self.items == 0 {
            return Err(QueueError::config("items must be greater than 0"));
        }
        if self.kind == QueueKind::Tokio && self.items > tokio::sync::Semaphore::MAX_PERMITS {
            return Err(QueueError::config(format!(
                "items must not exceed {} for the tokio channel",
                tokio::sync::Semaphore::MAX_PERMITS
            )));
        }
        Ok(())
    }

    /// The queue options actually used: `queue` with its capacity set to `items`.
    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            capacity: self.items,
            ..self.queue
        }
    }
}
