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
use comfy_table::{Cell, Table};

#[derive(Run, Parser, Collect, Clone)]
#[cling(run = "run_info")]
pub struct InfoCommand {
    /// Path of the record file
    path: String,
}

pub fn run_info(args: &InfoCommand, common_opts: &crate::opts::CommonOpts) -> Result<()> {
    let reader = recfile::Reader::open(&args.path)?;
    let header = reader.header();

    match common_opts.output {
        crate::opts::OutputFormat::Json => {
            let fields: Vec<serde_json::Value> = header
                .fields
                .iter()
                .zip(header.field_types.iter())
                .map(|(name, field_type)| {
                    serde_json::json!({
                        "name": name,
                        "type": field_type.code(),
                        "width": field_type.width(),
                    })
                })
                .collect();
            let info = serde_json::json!({
                "record_count": header.record_count,
                "record_width": header.record_width(),
                "fields": fields,
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        crate::opts::OutputFormat::Table => {
            let mut table = Table::new();
            table.set_header(vec!["Name", "Value"]);
            table.add_row(vec![
                Cell::new("Record-Count"),
                Cell::new(header.record_count),
            ]);
            table.add_row(vec![
                Cell::new("Field-Count"),
                Cell::new(header.fields.len()),
            ]);
            table.add_row(vec![
                Cell::new("Record-Width"),
                Cell::new(header.record_width()),
            ]);
            for (name, field_type) in header.fields.iter().zip(header.field_types.iter()) {
                table.add_row(vec![
                    Cell::new(format!("Field/{name}")),
                    Cell::new(format!(
                        "type {} ({} bytes)",
                        field_type.code(),
                        field_type.width()
                    )),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}
