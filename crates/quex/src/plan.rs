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

use crate::node::{BoxedNode, PlanNode};

/// The statement kind of a query. Only reads exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Select,
}

/// A runnable query: the root of an operator tree plus metadata the
/// engine itself never interprets.
pub struct QueryDescriptor {
    cmd: Command,
    text: String,
    root: BoxedNode,
}

impl QueryDescriptor {
    pub fn new(cmd: Command, text: impl Into<String>, root: BoxedNode) -> Self {
        QueryDescriptor {
            cmd,
            text: text.into(),
            root,
        }
    }

    pub fn command(&self) -> Command {
        self.cmd
    }

    /// The original query text, kept for logging and display only.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root_mut(&mut self) -> &mut dyn PlanNode {
        self.root.as_mut()
    }
}
