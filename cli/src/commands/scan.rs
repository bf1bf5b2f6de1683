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

use anyhow::Result;
use clap::Parser;
use cling::prelude::*;
use quex::{BoxedNode, CompareOp, Filter, Limit, Projection};

use crate::commands::{run_plan, scan_node, split_condition, InputFormat};

#[derive(Run, Parser, Collect, Clone)]
#[cling(run = "run_scan")]
pub struct ScanCommand {
    /// Path of the file to scan
    path: String,

    #[clap(long, value_enum, default_value_t = InputFormat::Csv)]
    format: InputFormat,

    /// Keep only records whose field equals a value, as field=value
    #[clap(long)]
    filter: Option<String>,

    /// Comma-separated list of fields to keep, in output order
    #[clap(long)]
    project: Option<String>,

    /// Stop after this many records
    #[clap(long)]
    limit: Option<usize>,
}

pub fn run_scan(args: &ScanCommand, common_opts: &crate::opts::CommonOpts) -> Result<()> {
    let mut node: BoxedNode = scan_node(args.format, &args.path);
    if let Some(condition) = &args.filter {
        let (field, value) = split_condition(condition)?;
        node = Box::new(Filter::new(field, CompareOp::Eq, value, node));
    }
    if let Some(project) = &args.project {
        let fields = project.split(',').map(str::to_string).collect();
        node = Box::new(Projection::new(fields, node));
    }
    if let Some(limit) = args.limit {
        node = Box::new(Limit::new(limit, node));
    }

    let records = run_plan(node, format!("scan {}", args.path))?;
    crate::output::print_records(&records, &common_opts.output)
}
