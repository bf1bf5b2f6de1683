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

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use log::debug;
use typed_builder::TypedBuilder;

use super::PAGE_BYTES;
use crate::errors::{io_error, EngineError};
use crate::node::{BoxedNode, PlanNode};
use crate::record::Record;

#[derive(TypedBuilder)]
pub struct HashJoinOptions {
    #[builder(setter(into))]
    pub left_field: String,
    #[builder(setter(into))]
    pub right_field: String,
    /// Field order used when spilling left-side records to partition
    /// files, and when reading them back.
    pub left_schema: Vec<String>,
    pub right_schema: Vec<String>,
    #[builder(default = 8)]
    pub partition_count: usize,
    /// Directory for left-side partition files, `part-<i>`.
    #[builder(setter(into))]
    pub left_spill_dir: PathBuf,
    #[builder(setter(into))]
    pub right_spill_dir: PathBuf,
}

/// Partitioned (Grace-style) hash join with on-disk spill.
///
/// Build: each side is pulled through a single page of input buffer;
/// records are routed to `partition_count` partitions by their join
/// key parsed as a signed integer, and per-partition buffers are
/// flushed to text files once they outgrow a page. Probe: for each
/// partition index, the left partition file is loaded into a hash map
/// keyed by the join field's textual value, then the right partition
/// file is streamed against it.
///
/// The build map holds one left record per key: on duplicate left join
/// keys the last record read wins. Spill files are left on disk when
/// the join completes; removing them is the caller's concern.
pub struct HashJoin {
    opts: HashJoinOptions,
    inputs: Vec<BoxedNode>,
    cache: Option<Vec<Record>>,
    cursor: usize,
}

impl HashJoin {
    pub fn new(opts: HashJoinOptions, left: BoxedNode, right: BoxedNode) -> Self {
        HashJoin {
            opts,
            inputs: vec![left, right],
            cache: None,
            cursor: 0,
        }
    }

    fn materialize(&mut self) -> Result<Vec<Record>, EngineError> {
        partition_input(
            &mut self.inputs[0],
            &self.opts.left_field,
            &self.opts.left_schema,
            &self.opts.left_spill_dir,
            self.opts.partition_count,
        )?;
        partition_input(
            &mut self.inputs[1],
            &self.opts.right_field,
            &self.opts.right_schema,
            &self.opts.right_spill_dir,
            self.opts.partition_count,
        )?;
        self.probe()
    }

    fn probe(&self) -> Result<Vec<Record>, EngineError> {
        let mut out = Vec::new();
        for index in 0..self.opts.partition_count {
            let left_path = partition_path(&self.opts.left_spill_dir, index);
            let mut build: HashMap<String, Record> = HashMap::new();
            if left_path.exists() {
                let path_str = left_path.display().to_string();
                let file = File::open(&left_path).map_err(|e| io_error(&path_str, e))?;
                for (line_no, line) in BufReader::new(file).lines().enumerate() {
                    let line = line.map_err(|e| io_error(&path_str, e))?;
                    let record =
                        parse_partition_line(&line, &self.opts.left_schema, line_no as u64 + 1)?;
                    let key = record
                        .get(&self.opts.left_field)
                        .ok_or_else(|| EngineError::MissingField {
                            field: self.opts.left_field.clone(),
                        })?
                        .render();
                    // last writer wins on duplicate build keys
                    build.insert(key, record);
                }
            }

            let right_path = partition_path(&self.opts.right_spill_dir, index);
            if !right_path.exists() {
                continue;
            }
            let path_str = right_path.display().to_string();
            let file = File::open(&right_path).map_err(|e| io_error(&path_str, e))?;
            for (line_no, line) in BufReader::new(file).lines().enumerate() {
                let line = line.map_err(|e| io_error(&path_str, e))?;
                let record =
                    parse_partition_line(&line, &self.opts.right_schema, line_no as u64 + 1)?;
                let key = record
                    .get(&self.opts.right_field)
                    .ok_or_else(|| EngineError::MissingField {
                        field: self.opts.right_field.clone(),
                    })?
                    .render();
                if let Some(build_record) = build.get(&key) {
                    out.push(record.concat(build_record));
                }
            }
        }
        Ok(out)
    }
}

impl PlanNode for HashJoin {
    fn init(&mut self) -> Result<(), EngineError> {
        if self.opts.partition_count == 0 {
            return Err(EngineError::InvalidParameter {
                name: "partition_count",
                got: 0,
            });
        }
        for dir in [&self.opts.left_spill_dir, &self.opts.right_spill_dir] {
            std::fs::create_dir_all(dir)
                .map_err(|e| io_error(&dir.display().to_string(), e))?;
        }
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Record>, EngineError> {
        if self.cache.is_none() {
            let records = self.materialize()?;
            self.cache = Some(records);
            self.cursor = 0;
        }
        let record = self
            .cache
            .as_ref()
            .and_then(|cache| cache.get(self.cursor))
            .cloned();
        if record.is_some() {
            self.cursor += 1;
        }
        Ok(record)
    }

    /// Rewinds the replay cursor and resets the children. The
    /// materialized result is kept: partition files are append-only,
    /// so re-running the build phase over existing spill files would
    /// duplicate them.
    fn reset(&mut self) -> Result<(), EngineError> {
        self.cursor = 0;
        for input in &mut self.inputs {
            input.reset()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn inputs(&mut self) -> &mut [BoxedNode] {
        &mut self.inputs
    }
}

fn partition_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("part-{index}"))
}

/// Drains `input` into per-partition spill files under `dir`.
///
/// Records are buffered one input page at a time, routed by join key
/// modulo the partition count, collected into per-partition buffers of
/// at most one page, and appended to the partition files as
/// comma-separated lines in `schema` order.
fn partition_input(
    input: &mut BoxedNode,
    field: &str,
    schema: &[String],
    dir: &Path,
    partition_count: usize,
) -> Result<(), EngineError> {
    let mut input_buf: Vec<Record> = Vec::new();
    let mut input_size = 0usize;
    let mut out_bufs: Vec<Vec<Record>> = vec![Vec::new(); partition_count];
    let mut out_sizes: Vec<usize> = vec![0usize; partition_count];

    let mut done = false;
    while !done {
        match input.next()? {
            Some(record) => {
                input_size += record.estimated_size();
                input_buf.push(record);
                if input_size < PAGE_BYTES {
                    continue;
                }
            }
            None => done = true,
        }

        // Route the buffered page into the partition buffers.
        for record in input_buf.drain(..) {
            let key = record
                .get(field)
                .ok_or_else(|| EngineError::MissingField {
                    field: field.to_string(),
                })?
                .as_i64()?;
            // rem_euclid keeps negative keys in range
            let index = key.rem_euclid(partition_count as i64) as usize;
            out_sizes[index] += record.estimated_size();
            out_bufs[index].push(record);
            if out_sizes[index] > PAGE_BYTES {
                flush_partition(dir, index, schema, &mut out_bufs[index])?;
                out_sizes[index] = 0;
            }
        }
        input_size = 0;
    }

    for (index, buf) in out_bufs.iter_mut().enumerate() {
        if !buf.is_empty() {
            flush_partition(dir, index, schema, buf)?;
        }
    }
    Ok(())
}

fn flush_partition(
    dir: &Path,
    index: usize,
    schema: &[String],
    records: &mut Vec<Record>,
) -> Result<(), EngineError> {
    let path = partition_path(dir, index);
    let path_str = path.display().to_string();
    debug!("spilling {} records to {path_str}", records.len());

    let mut text = String::new();
    for record in records.drain(..) {
        for (position, name) in schema.iter().enumerate() {
            let value = record.get(name).ok_or_else(|| EngineError::MissingField {
                field: name.clone(),
            })?;
            if position > 0 {
                text.push(',');
            }
            text.push_str(&value.render());
        }
        text.push('\n');
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| io_error(&path_str, e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| io_error(&path_str, e))?;
    Ok(())
}

fn parse_partition_line(
    line: &str,
    schema: &[String],
    line_no: u64,
) -> Result<Record, EngineError> {
    let values: Vec<&str> = line.split(',').collect();
    if values.len() != schema.len() {
        return Err(EngineError::ArityMismatch {
            line: line_no,
            expect: schema.len(),
            got: values.len(),
        });
    }
    let mut record = Record::new();
    for (name, value) in schema.iter().zip(values) {
        record.push(name.clone(), value);
    }
    Ok(record)
}
