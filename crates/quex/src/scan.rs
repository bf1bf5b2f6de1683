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

//! Leaf nodes producing records from in-memory tables, delimited text
//! files and record files.

use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::errors::{io_error, EngineError};
use crate::node::{BoxedNode, PlanNode};
use crate::record::{Record, Table};

/// Scans an in-memory [`Table`] row by row.
pub struct TableScan {
    table: Table,
    cursor: usize,
}

impl TableScan {
    pub fn new(table: Table) -> Self {
        TableScan { table, cursor: 0 }
    }
}

impl PlanNode for TableScan {
    fn init(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Record>, EngineError> {
        match self.table.row(self.cursor) {
            Some(row) => {
                self.cursor += 1;
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    fn reset(&mut self) -> Result<(), EngineError> {
        self.cursor = 0;
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn inputs(&mut self) -> &mut [BoxedNode] {
        &mut []
    }
}

fn strip_line_ending(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
    }
    if line.ends_with('\r') {
        line.pop();
    }
}

/// Scans a newline-delimited, comma-separated text file whose first
/// line is the header row.
///
/// There is no quoting and no escaping: the delimiter is the literal
/// comma, and field values are the raw substrings between commas. An
/// empty line ends the stream, as does end of file.
pub struct CsvScan {
    path: String,
    reader: Option<BufReader<File>>,
    headers: Vec<String>,
    line: u64,
    done: bool,
}

impl CsvScan {
    pub fn new(path: impl Into<String>) -> Self {
        CsvScan {
            path: path.into(),
            reader: None,
            headers: Vec::new(),
            line: 0,
            done: false,
        }
    }

    /// The header names read at init time.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn open_file(&mut self) -> Result<(), EngineError> {
        let file = File::open(&self.path).map_err(|e| io_error(&self.path, e))?;
        let mut reader = BufReader::new(file);

        let mut header_line = String::new();
        let n = reader
            .read_line(&mut header_line)
            .map_err(|e| io_error(&self.path, e))?;
        if n == 0 {
            return Err(EngineError::MissingHeader(self.path.clone()));
        }
        strip_line_ending(&mut header_line);
        self.headers = header_line.split(',').map(str::to_string).collect();
        self.reader = Some(reader);
        self.line = 1;
        self.done = false;
        Ok(())
    }
}

impl PlanNode for CsvScan {
    fn init(&mut self) -> Result<(), EngineError> {
        self.open_file()
    }

    fn next(&mut self) -> Result<Option<Record>, EngineError> {
        if self.done {
            return Ok(None);
        }
        let reader = self.reader.as_mut().ok_or(EngineError::NotInitialized)?;

        let mut line = String::new();
        let n = reader
            .read_line(&mut line)
            .map_err(|e| io_error(&self.path, e))?;
        if n == 0 {
            self.done = true;
            return Ok(None);
        }
        self.line += 1;
        strip_line_ending(&mut line);
        if line.is_empty() {
            self.done = true;
            return Ok(None);
        }

        let values: Vec<&str> = line.split(',').collect();
        if values.len() != self.headers.len() {
            return Err(EngineError::ArityMismatch {
                line: self.line,
                expect: self.headers.len(),
                got: values.len(),
            });
        }

        let mut record = Record::new();
        for (header, value) in self.headers.iter().zip(values) {
            record.push(header.clone(), value);
        }
        Ok(Some(record))
    }

    fn reset(&mut self) -> Result<(), EngineError> {
        self.open_file()
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.reader = None;
        Ok(())
    }

    fn inputs(&mut self) -> &mut [BoxedNode] {
        &mut []
    }
}

/// Scans the fixed-width records of a record file (see the `recfile`
/// crate for the format).
pub struct RecordFileScan {
    path: String,
    reader: Option<recfile::Reader>,
    done: bool,
}

impl RecordFileScan {
    pub fn new(path: impl Into<String>) -> Self {
        RecordFileScan {
            path: path.into(),
            reader: None,
            done: false,
        }
    }
}

impl PlanNode for RecordFileScan {
    fn init(&mut self) -> Result<(), EngineError> {
        self.reader = Some(recfile::Reader::open(&self.path)?);
        self.done = false;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Record>, EngineError> {
        if self.done {
            return Ok(None);
        }
        let reader = self.reader.as_mut().ok_or(EngineError::NotInitialized)?;
        match reader.read()? {
            Some(file_record) => {
                let mut record = Record::new();
                for (name, value) in file_record.pairs {
                    record.push(name, value);
                }
                Ok(Some(record))
            }
            None => {
                self.done = true;
                Ok(None)
            }
        }
    }

    fn reset(&mut self) -> Result<(), EngineError> {
        let reader = self.reader.as_mut().ok_or(EngineError::NotInitialized)?;
        reader.rewind()?;
        self.done = false;
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.reader = None;
        Ok(())
    }

    fn inputs(&mut self) -> &mut [BoxedNode] {
        &mut []
    }
}
