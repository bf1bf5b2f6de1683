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

use thiserror::Error;

/// Errors surfaced by plan nodes and the executor. Errors from child
/// nodes propagate verbatim; the executor reports the first one and
/// still closes the whole plan.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum EngineError {
    #[error("could not operate on file {0}: {1}")]
    Io(String, String),

    #[error("field {field} does not exist in record")]
    MissingField { field: String },

    #[error("no header row found in {0}")]
    MissingHeader(String),

    #[error("line {line} has {got} fields, the header has {expect}")]
    ArityMismatch { line: u64, expect: usize, got: usize },

    #[error("could not parse {value:?} as {target}")]
    Parse { value: String, target: &'static str },

    #[error("parameter {name} must be positive, got {got}")]
    InvalidParameter { name: &'static str, got: usize },

    #[error("operator used before init")]
    NotInitialized,

    #[error(transparent)]
    RecordFile(#[from] recfile::Error),
}

pub(crate) fn io_error(path: &str, err: std::io::Error) -> EngineError {
    EngineError::Io(path.to_string(), err.to_string())
}
