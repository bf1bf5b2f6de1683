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

//! A pull-based relational query executor.
//!
//! Queries are built as trees of [`PlanNode`]s by the caller and
//! driven to a materialized result by [`QueryExecutor`]. Records flow
//! demand-first: each node pulls from its children, one record per
//! `next` call, until the stream ends. Execution is single-threaded
//! and read-only.
//!
//! Sources are in-memory tables ([`TableScan`]), comma-delimited text
//! files ([`CsvScan`]) and fixed-width record files
//! ([`RecordFileScan`], see the `recfile` crate). On top of those sit
//! projection, single-column equality filtering, limit, a blocking
//! average, and three inner equi-join strategies ranging from naive
//! nested loops to a disk-spilling partitioned hash join.

mod errors;
mod executor;
mod join;
mod node;
mod plan;
mod record;
mod scan;
mod transform;

pub use errors::EngineError;
pub use executor::{close_node, init_node, QueryExecutor};
pub use join::{
    BlockNestedJoin, BlockNestedJoinOptions, HashJoin, HashJoinOptions, NestedLoopJoin,
    PAGE_BYTES,
};
pub use node::{BoxedNode, PlanNode};
pub use plan::{Command, QueryDescriptor};
pub use record::{Record, Table, Value, VALUE_SLOT_BYTES};
pub use scan::{CsvScan, RecordFileScan, TableScan};
pub use transform::{Average, CompareOp, Filter, Limit, Projection};
