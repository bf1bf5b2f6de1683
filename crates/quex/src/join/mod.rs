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

//! Inner equi-join nodes.
//!
//! All three joins materialize their full output on the first pull and
//! replay it afterwards. They differ in how they trade memory for
//! right-side rescans: tuple-at-a-time nested loops, page-oriented
//! nested loops under a byte budget, and a partitioned hash join that
//! spills both sides to disk.

mod block;
mod hash;
mod nested;

pub use block::{BlockNestedJoin, BlockNestedJoinOptions};
pub use hash::{HashJoin, HashJoinOptions};
pub use nested::NestedLoopJoin;

use crate::errors::EngineError;
use crate::record::Record;

/// Notional page size used for join memory budgets, in bytes.
pub const PAGE_BYTES: usize = 8196;

/// Compares the join key of two records by textual rendering. A record
/// without its join field fails the query.
pub(crate) fn keys_match(
    left: &Record,
    left_field: &str,
    right: &Record,
    right_field: &str,
) -> Result<bool, EngineError> {
    let left_value = left.get(left_field).ok_or_else(|| EngineError::MissingField {
        field: left_field.to_string(),
    })?;
    let right_value = right
        .get(right_field)
        .ok_or_else(|| EngineError::MissingField {
            field: right_field.to_string(),
        })?;
    Ok(left_value.render() == right_value.render())
}
