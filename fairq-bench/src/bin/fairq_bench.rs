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

use clap::Parser;
use fairq::config::parse_config_file;
use fairq_bench::bench_config::BenchConfig;
use fairq_bench::command_line::RootCli;
use fairq_bench::driver;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let cli = RootCli::parse();
    tracing_subscriber::fmt().with_max_level(cli.log_level).init();

    let file_config = match &cli.config {
        Some(path) => parse_config_file::<BenchConfig>(path)?,
        None => BenchConfig::default(),
    };
    let config = cli.merge_into(file_config);
    info!("fairq-bench config: {:?}", config);

    let report = driver::run(&config)?;
    report.print();
    Ok(())
}
