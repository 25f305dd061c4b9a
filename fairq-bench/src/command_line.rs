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

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use crate::bench_config::BenchConfig;
use crate::bench_config::QueueKind;

#[derive(Parser, Debug)]
#[command(
    author = "The Fairq Authors",
    version,
    about = "Measure how fast producer threads fill a bounded blocking queue"
)]
pub struct RootCli {
    #[arg(
        short,
        long,
        value_name = "N",
        help = "Number of producer threads, overrides the config file"
    )]
    pub producers: Option<usize>,

    #[arg(
        short,
        long,
        value_name = "N",
        help = "Items produced per run, also used as the queue capacity, overrides the config file"
    )]
    pub items: Option<usize>,

    #[arg(
        short,
        long,
        value_enum,
        value_name = "KIND",
        help = "Queue implementation to measure, overrides the config file"
    )]
    pub kind: Option<QueueKind>,

    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Benchmark config file (toml, yaml or json)"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "LEVEL", default_value = "info", help = "Max log level")]
    pub log_level: Level,
}

impl RootCli {
    /// Applies the command line values on top of `config`.
    pub fn merge_into(&self, mut config: BenchConfig) -> BenchConfig {
        if let Some(producers) = self.producers {
            config.producers = producers;
        }
        if let Some(items) = self.items {
            config.items = items;
        }
        if let Some(kind) = self.kind {
            config.kind = kind;
        }
        config
    }
}
