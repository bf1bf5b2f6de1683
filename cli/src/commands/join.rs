// MIT License
//
// Copyright (c) 2025 quex developers
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cling::prelude::*;
use quex::{
    BlockNestedJoin, BlockNestedJoinOptions, BoxedNode, CsvScan, HashJoin, HashJoinOptions,
    NestedLoopJoin,
};

use crate::commands::{run_plan, split_condition};

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
pub enum Algorithm {
    #[default]
    Naive,
    Block,
    Hash,
}

#[derive(Run, Parser, Collect, Clone)]
#[cling(run = "run_join")]
pub struct JoinCommand {
    /// Path of the left delimited text file
    left: String,

    /// Path of the right delimited text file
    right: String,

    /// Join condition, as left-field=right-field
    #[clap(long)]
    on: String,

    #[clap(long, value_enum, default_value_t = Algorithm::Naive)]
    algorithm: Algorithm,

    /// Left-page budget of the block algorithm, in pages
    #[clap(long, default_value_t = 1)]
    page_count: usize,

    /// Partition count of the hash algorithm
    #[clap(long, default_value_t = 8)]
    partitions: usize,

    /// Where the hash algorithm spills its partitions; defaults to a
    /// per-process directory under the system temp dir. Spill files
    /// are left behind for inspection.
    #[clap(long)]
    spill_dir: Option<PathBuf>,
}

fn csv_headers(path: &str) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("could not open {path}"))?;
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .with_context(|| format!("could not read the header row of {path}"))?;
    Ok(line.trim_end().split(',').map(str::to_string).collect())
}

pub fn run_join(args: &JoinCommand, common_opts: &crate::opts::CommonOpts) -> Result<()> {
    let (left_field, right_field) = split_condition(&args.on)?;
    let left: BoxedNode = Box::new(CsvScan::new(args.left.as_str()));
    let right: BoxedNode = Box::new(CsvScan::new(args.right.as_str()));

    let join: BoxedNode = match args.algorithm {
        Algorithm::Naive => Box::new(NestedLoopJoin::new(left_field, right_field, left, right)),
        Algorithm::Block => {
            let opts = BlockNestedJoinOptions::builder()
                .left_field(left_field)
                .right_field(right_field)
                .page_count(args.page_count)
                .build();
            Box::new(BlockNestedJoin::new(opts, left, right))
        }
        Algorithm::Hash => {
            let spill_dir = args.spill_dir.clone().unwrap_or_else(|| {
                std::env::temp_dir().join(format!("quexcli-join-{}", std::process::id()))
            });
            let opts = HashJoinOptions::builder()
                .left_field(left_field)
                .right_field(right_field)
                .left_schema(csv_headers(&args.left)?)
                .right_schema(csv_headers(&args.right)?)
                .partition_count(args.partitions)
                .left_spill_dir(spill_dir.join("r"))
                .right_spill_dir(spill_dir.join("s"))
                .build();
            Box::new(HashJoin::new(opts, left, right))
        }
    };

    let records = run_plan(join, format!("join {} with {}", args.left, args.right))?;
    crate::output::print_records(&records, &common_opts.output)
}
