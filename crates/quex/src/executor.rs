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

use log::debug;

use crate::errors::EngineError;
use crate::node::PlanNode;
use crate::plan::QueryDescriptor;
use crate::record::Record;

/// Drives a plan through its three phases: a pre-order init walk over
/// the operator tree, a pull loop on the root, and a close walk that
/// visits every node exactly once even when an earlier phase failed.
#[derive(Default)]
pub struct QueryExecutor;

impl QueryExecutor {
    pub fn new() -> Self {
        QueryExecutor
    }

    /// Runs the plan to completion and returns the materialized
    /// records, or the first error. The close phase always runs.
    pub fn execute(&self, qd: &mut QueryDescriptor) -> Result<Vec<Record>, EngineError> {
        debug!("initializing plan for query: {}", qd.text());
        let pulled = match init_node(qd.root_mut()) {
            Ok(()) => self.pull(qd),
            Err(e) => Err(e),
        };

        debug!("closing plan for query: {}", qd.text());
        let closed = close_node(qd.root_mut());

        let records = pulled?;
        closed?;
        Ok(records)
    }

    fn pull(&self, qd: &mut QueryDescriptor) -> Result<Vec<Record>, EngineError> {
        let root = qd.root_mut();
        let mut records = Vec::new();
        while let Some(record) = root.next()? {
            records.push(record);
        }
        debug!("plan produced {} records", records.len());
        Ok(records)
    }
}

/// Initializes `node` and then, recursively, its children. Parents are
/// initialized before children, though no node may rely on the order.
pub fn init_node(node: &mut dyn PlanNode) -> Result<(), EngineError> {
    node.init()?;
    for child in node.inputs() {
        init_node(child.as_mut())?;
    }
    Ok(())
}

/// Closes every node in the tree exactly once, keeping going past
/// failures and reporting the first error encountered.
pub fn close_node(node: &mut dyn PlanNode) -> Result<(), EngineError> {
    let mut first_error = node.close().err();
    for child in node.inputs() {
        if let Err(e) = close_node(child.as_mut()) {
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
