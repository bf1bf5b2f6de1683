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
use comfy_table::Table;
use quex::{Record, Value};

use crate::opts::OutputFormat;

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Int(i) => serde_json::json!(i),
        Value::Float(f) => serde_json::json!(f),
    }
}

/// Prints query results in the selected output format. Table output
/// derives its columns from the first record; all records of a plan
/// share one field set.
pub fn print_records(records: &[Record], output: &OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = records
                .iter()
                .map(|record| {
                    let mut object = serde_json::Map::new();
                    for (name, value) in record.iter() {
                        object.insert(name.clone(), value_to_json(value));
                    }
                    serde_json::Value::Object(object)
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Table => {
            let Some(first) = records.first() else {
                println!("(0 records)");
                return Ok(());
            };
            let headers: Vec<&str> = first.field_names().collect();

            let mut table = Table::new();
            table.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
            table.set_header(headers.clone());
            for record in records {
                table.add_row(
                    headers
                        .iter()
                        .map(|&name| record.get(name).map(|v| v.render()).unwrap_or_default()),
                );
            }
            println!("{table}");
            println!("({} records)", records.len());
        }
    }
    Ok(())
}
