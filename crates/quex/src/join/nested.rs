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

use super::keys_match;
use crate::errors::EngineError;
use crate::node::{BoxedNode, PlanNode};
use crate::record::Record;

/// Tuple-at-a-time nested loop join: for every left record, the right
/// subtree is drained and then reset. O(|L|·|R|) pulls; the right
/// subtree must support reset. Output order is lexicographic over
/// (left index, right index).
pub struct NestedLoopJoin {
    left_field: String,
    right_field: String,
    inputs: Vec<BoxedNode>,
    cache: Option<Vec<Record>>,
    cursor: usize,
}

impl NestedLoopJoin {
    pub fn new(
        left_field: impl Into<String>,
        right_field: impl Into<String>,
        left: BoxedNode,
        right: BoxedNode,
    ) -> Self {
        NestedLoopJoin {
            left_field: left_field.into(),
            right_field: right_field.into(),
            inputs: vec![left, right],
            cache: None,
            cursor: 0,
        }
    }

    fn materialize(&mut self) -> Result<Vec<Record>, EngineError> {
        let mut out = Vec::new();
        while let Some(left) = self.inputs[0].next()? {
            while let Some(right) = self.inputs[1].next()? {
                if keys_match(&left, &self.left_field, &right, &self.right_field)? {
                    out.push(left.concat(&right));
                }
            }
            self.inputs[1].reset()?;
        }
        Ok(out)
    }
}

impl PlanNode for NestedLoopJoin {
    fn init(&mut self) -> Result<(), EngineError> {
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

    fn reset(&mut self) -> Result<(), EngineError> {
        self.cache = None;
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
