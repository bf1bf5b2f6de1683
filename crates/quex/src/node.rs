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

use crate::errors::EngineError;
use crate::record::Record;

pub type BoxedNode = Box<dyn PlanNode>;

/// The demand-driven iterator protocol every plan node implements.
/// Parents pull records from their children; the executor drives the
/// root.
///
/// Lifecycle: a node is built by the caller, initialized exactly once
/// by the executor's pre-order walk, pulled zero or more times, and
/// closed exactly once. `next` returning `Ok(None)` is end-of-stream
/// and is sticky until the node is reset.
pub trait PlanNode {
    /// Opens this node's own resources. Children are initialized by
    /// the executor's traversal, not here, and no node may depend on
    /// its children being initialized first.
    fn init(&mut self) -> Result<(), EngineError>;

    /// Produces the next record, or `Ok(None)` at end-of-stream.
    fn next(&mut self) -> Result<Option<Record>, EngineError>;

    /// Restores this node and, recursively, all of its descendants to
    /// their post-init state. A reset subtree reproduces its record
    /// sequence exactly.
    fn reset(&mut self) -> Result<(), EngineError>;

    /// Releases this node's own resources. Must tolerate being called
    /// on a node whose init never ran: the executor closes the whole
    /// tree even when initialization failed part-way.
    fn close(&mut self) -> Result<(), EngineError>;

    /// The node's ordered children, used by the executor for
    /// traversal.
    fn inputs(&mut self) -> &mut [BoxedNode];
}
