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

use std::fmt::Debug;
use std::path::Path;

use config::Config;
use fairq_error::QueueError;
use fairq_error::QueueResult;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Construction options for a [`BoundedBlockingQueue`](crate::BoundedBlockingQueue).
#[derive(Clone, Copy, Deserialize, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum number of buffered items, must be greater than 0.
    pub capacity: usize,
    /// Hand the lock to the longest waiting thread on every release.
    pub fair: bool,
    /// Non-blocking lock attempts before falling back to a blocking acquire.
    /// `0` always blocks.
    pub spin_tries: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            fair: true,
            spin_tries: 0,
        }
    }
}

impl QueueConfig {
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> QueueResult<()> {
        if self.capacity == 0 {
            return Err(QueueError::invalid_capacity(self.capacity));
        }
        Ok(())
    }
}

/// Loads any deserializable configuration from a file, the format is picked from the
/// file extension.
pub fn parse_config_file<C>(config_file: &Path) -> QueueResult<C>
where
    C: Debug + DeserializeOwned,
{
    let cfg = Config::builder()
        .add_source(config::File::from(config_file))
        .build()
        .map_err(|e| QueueError::config(e.to_string()))?;
    cfg.try_deserialize::<C>()
        .map_err(|e| QueueError::config(e.to_string()))
}
