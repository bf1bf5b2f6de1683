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

use typed_builder::TypedBuilder;

use super::{keys_match, PAGE_BYTES};
use crate::errors::EngineError;
use crate::node::{BoxedNode, PlanNode};
use crate::record::Record;

#[derive(TypedBuilder)]
pub struct BlockNestedJoinOptions {
    #[builder(setter(into))]
    pub left_field: String,
    #[builder(setter(into))]
    pub right_field: String,
    /// Number of pages of left records buffered per right-side scan.
    #[builder(default = 1)]
    pub page_count: usize,
}

/// Page-oriented nested loop join.
///
/// Left records are buffered up to a budget of
/// `page_count * PAGE_BYTES` estimated bytes, then the right side is
/// scanned once against the whole buffer and reset. A left record that
/// would overflow the budget is carried over to the next pass; a
/// record larger than the entire budget still forms a one-record page,
/// so nothing is ever dropped. `page_count = 1` is the classic
/// page-at-a-time nested loop; larger budgets amortize right-side
/// rescans.
pub struct BlockNestedJoin {
    opts: BlockNestedJoinOptions,
    inputs: Vec<BoxedNode>,
    cache: Option<Vec<Record>>,
    cursor: usize,
}

impl BlockNestedJoin {
    pub fn new(opts: BlockNestedJoinOptions, left: BoxedNode, right: BoxedNode) -> Self {
        BlockNestedJoin {
            opts,
            inputs: vec![left, right],
            cache: None,
            cursor: 0,
        }
    }

    fn materialize(&mut self) -> Result<Vec<Record>, EngineError> {
        let budget = self.opts.page_count * PAGE_BYTES;
        let mut out = Vec::new();
        let mut carry: Option<Record> = None;
        let mut left_done = false;

        while !left_done || carry.is_some() {
            // Fill a page from the carry-over and the left input.
            let mut page = Vec::new();
            let mut page_size = 0;
            if let Some(record) = carry.take() {
                page_size += record.estimated_size();
                page.push(record);
            }
            while !left_done {
                match self.inputs[0].next()? {
                    Some(record) => {
                        let size = record.estimated_size();
                        if !page.is_empty() && page_size + size > budget {
                            carry = Some(record);
                            break;
                        }
                        page_size += size;
                        page.push(record);
                    }
                    None => left_done = true,
                }
            }
            if page.is_empty() {
                break;
            }

            // One right-side scan per page, then rewind it for the next
            // pass.
            while let Some(right) = self.inputs[1].next()? {
                for left in &page {
                    if keys_match(left, &self.opts.left_field, &right, &self.opts.right_field)? {
                        out.push(left.concat(&right));
                    }
                }
            }
            self.inputs[1].reset()?;
        }
        Ok(out)
    }
}

impl PlanNode for BlockNestedJoin {
    fn init(&mut self) -> Result<(), EngineError> {
        if self.opts.page_count == 0 {
            return Err(EngineError::InvalidParameter {
                name: "page_count",
                got: 0,
            });
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
