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

pub mod avg;
pub mod info;
pub mod join;
pub mod scan;

use anyhow::{bail, Result};
use quex::{BoxedNode, Command, QueryDescriptor, QueryExecutor, Record};

/// Input kinds a scan can read.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
pub enum InputFormat {
    #[default]
    Csv,
    Rff,
}

pub(crate) fn scan_node(format: InputFormat, path: &str) -> BoxedNode {
    match format {
        InputFormat::Csv => Box::new(quex::CsvScan::new(path)),
        InputFormat::Rff => Box::new(quex::RecordFileScan::new(path)),
    }
}

/// Splits a `field=value` condition argument.
pub(crate) fn split_condition(condition: &str) -> Result<(&str, &str)> {
    match condition.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field, value)),
        _ => bail!("condition must have the form field=value, got {condition:?}"),
    }
}

pub(crate) fn run_plan(root: BoxedNode, text: String) -> Result<Vec<Record>> {
    let mut qd = QueryDescriptor::new(Command::Select, text, root);
    Ok(QueryExecutor::new().execute(&mut qd)?)
}
