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

//! Single-input nodes: projection, filtering, limiting and the
//! blocking average aggregate.

use crate::errors::EngineError;
use crate::node::{BoxedNode, PlanNode};
use crate::record::{Record, Value};

/// Keeps exactly the named fields, in the requested order. A record
/// missing one of them fails the query.
pub struct Projection {
    required: Vec<String>,
    inputs: Vec<BoxedNode>,
}

impl Projection {
    pub fn new(required: Vec<String>, input: BoxedNode) -> Self {
        Projection {
            required,
            inputs: vec![input],
        }
    }
}

impl PlanNode for Projection {
    fn init(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Record>, EngineError> {
        let Some(record) = self.inputs[0].next()? else {
            return Ok(None);
        };

        let mut out = Record::new();
        for name in &self.required {
            let value = record.get(name).ok_or_else(|| EngineError::MissingField {
                field: name.clone(),
            })?;
            out.push(name.clone(), value.clone());
        }
        Ok(Some(out))
    }

    fn reset(&mut self) -> Result<(), EngineError> {
        self.inputs[0].reset()
    }

    fn close(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn inputs(&mut self) -> &mut [BoxedNode] {
        &mut self.inputs
    }
}

/// Comparison operator for [`Filter`]. Only equality exists; other
/// comparisons are unrepresentable rather than silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
}

/// Forwards records whose named field compares equal to a literal.
/// Comparison is an exact match on the value's textual rendering.
pub struct Filter {
    field: String,
    op: CompareOp,
    value: String,
    inputs: Vec<BoxedNode>,
}

impl Filter {
    pub fn new(
        field: impl Into<String>,
        op: CompareOp,
        value: impl Into<String>,
        input: BoxedNode,
    ) -> Self {
        Filter {
            field: field.into(),
            op,
            value: value.into(),
            inputs: vec![input],
        }
    }
}

impl PlanNode for Filter {
    fn init(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Record>, EngineError> {
        loop {
            let Some(record) = self.inputs[0].next()? else {
                return Ok(None);
            };
            let value = record
                .get(&self.field)
                .ok_or_else(|| EngineError::MissingField {
                    field: self.field.clone(),
                })?;
            let matches = match self.op {
                CompareOp::Eq => value.render() == self.value,
            };
            if matches {
                return Ok(Some(record));
            }
        }
    }

    fn reset(&mut self) -> Result<(), EngineError> {
        self.inputs[0].reset()
    }

    fn close(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn inputs(&mut self) -> &mut [BoxedNode] {
        &mut self.inputs
    }
}

/// Passes through the first `limit` records, then ends the stream.
pub struct Limit {
    limit: usize,
    returned: usize,
    done: bool,
    inputs: Vec<BoxedNode>,
}

impl Limit {
    pub fn new(limit: usize, input: BoxedNode) -> Self {
        Limit {
            limit,
            returned: 0,
            done: false,
            inputs: vec![input],
        }
    }
}

impl PlanNode for Limit {
    fn init(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Record>, EngineError> {
        if self.done || self.returned >= self.limit {
            return Ok(None);
        }
        match self.inputs[0].next()? {
            Some(record) => {
                self.returned += 1;
                Ok(Some(record))
            }
            None => {
                self.done = true;
                Ok(None)
            }
        }
    }

    fn reset(&mut self) -> Result<(), EngineError> {
        self.returned = 0;
        self.done = false;
        self.inputs[0].reset()
    }

    fn close(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn inputs(&mut self) -> &mut [BoxedNode] {
        &mut self.inputs
    }
}

/// Blocking average over a named field. The first pull drains the
/// child, parsing every value as a base-10 float; the result is a
/// single record `{average: <f64>}`. An empty input produces an empty
/// stream rather than a record.
pub struct Average {
    field: String,
    computed: bool,
    result: Option<Record>,
    inputs: Vec<BoxedNode>,
}

impl Average {
    pub fn new(field: impl Into<String>, input: BoxedNode) -> Self {
        Average {
            field: field.into(),
            computed: false,
            result: None,
            inputs: vec![input],
        }
    }
}

impl PlanNode for Average {
    fn init(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Record>, EngineError> {
        if !self.computed {
            let mut sum = 0f64;
            let mut count = 0u64;
            while let Some(record) = self.inputs[0].next()? {
                let value = record
                    .get(&self.field)
                    .ok_or_else(|| EngineError::MissingField {
                        field: self.field.clone(),
                    })?;
                sum += value.as_f64()?;
                count += 1;
            }
            self.computed = true;
            if count > 0 {
                let mut record = Record::new();
                record.push("average", Value::Float(sum / count as f64));
                self.result = Some(record);
            }
        }
        Ok(self.result.take())
    }

    fn reset(&mut self) -> Result<(), EngineError> {
        self.computed = false;
        self.result = None;
        self.inputs[0].reset()
    }

    fn close(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn inputs(&mut self) -> &mut [BoxedNode] {
        &mut self.inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Table;
    use crate::scan::TableScan;

    fn movies_scan() -> BoxedNode {
        let headers = vec!["id".to_string(), "name".to_string(), "genre".to_string()];
        let rows = [
            (1i64, "Lion King", "Comedy"),
            (2, "Psycho", "Horror"),
            (3, "Chaplin", "Comedy"),
            (4, "American Horror Story", "Thriller"),
        ]
        .iter()
        .map(|&(id, name, genre)| {
            let mut record = Record::new();
            record.push("id", id);
            record.push("name", name);
            record.push("genre", genre);
            record
        })
        .collect();
        Box::new(TableScan::new(Table::new(headers, rows)))
    }

    fn ratings_scan(ratings: &[&str]) -> BoxedNode {
        let headers = vec!["rating".to_string()];
        let rows = ratings
            .iter()
            .map(|&r| {
                let mut record = Record::new();
                record.push("rating", r);
                record
            })
            .collect();
        Box::new(TableScan::new(Table::new(headers, rows)))
    }

    fn drain(node: &mut dyn PlanNode) -> Vec<Record> {
        std::iter::from_fn(|| node.next().unwrap()).collect()
    }

    #[test]
    fn test_projection_subsets_and_orders() {
        let mut projection =
            Projection::new(vec!["genre".to_string(), "id".to_string()], movies_scan());
        projection.init().unwrap();
        let record = projection.next().unwrap().unwrap();
        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, vec!["genre", "id"]);
        assert_eq!(record.get("genre"), Some(&Value::Text("Comedy".to_string())));
    }

    #[test]
    fn test_projection_missing_field() {
        let mut projection = Projection::new(vec!["studio".to_string()], movies_scan());
        projection.init().unwrap();
        assert_eq!(
            projection.next().unwrap_err(),
            EngineError::MissingField {
                field: "studio".to_string(),
            }
        );
    }

    #[test]
    fn test_filter_equality() {
        let mut filter = Filter::new("genre", CompareOp::Eq, "Comedy", movies_scan());
        filter.init().unwrap();
        let out = drain(&mut filter);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].get("id"), Some(&Value::Int(1)));
        assert_eq!(out[1].get("id"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let inner = Filter::new("genre", CompareOp::Eq, "Comedy", movies_scan());
        let mut twice = Filter::new("genre", CompareOp::Eq, "Comedy", Box::new(inner));
        twice.init().unwrap();
        let out = drain(&mut twice);

        let mut once = Filter::new("genre", CompareOp::Eq, "Comedy", movies_scan());
        once.init().unwrap();
        assert_eq!(out, drain(&mut once));
    }

    #[test]
    fn test_filter_missing_field() {
        let mut filter = Filter::new("studio", CompareOp::Eq, "MGM", movies_scan());
        filter.init().unwrap();
        assert_eq!(
            filter.next().unwrap_err(),
            EngineError::MissingField {
                field: "studio".to_string(),
            }
        );
    }

    #[test]
    fn test_limit_truncates() {
        let mut limit = Limit::new(2, movies_scan());
        limit.init().unwrap();
        assert_eq!(drain(&mut limit).len(), 2);
        assert_eq!(limit.next().unwrap(), None);
    }

    #[test]
    fn test_limit_zero_is_empty() {
        let mut limit = Limit::new(0, movies_scan());
        limit.init().unwrap();
        assert_eq!(limit.next().unwrap(), None);
    }

    #[test]
    fn test_limit_larger_than_input() {
        let mut limit = Limit::new(5, movies_scan());
        limit.init().unwrap();
        assert_eq!(drain(&mut limit).len(), 4);
        assert_eq!(limit.next().unwrap(), None);
    }

    #[test]
    fn test_average_blocks_and_emits_once() {
        let mut average = Average::new("rating", ratings_scan(&["4.0", "3.5", "4.5"]));
        average.init().unwrap();
        let record = average.next().unwrap().unwrap();
        assert_eq!(record.get("average"), Some(&Value::Float(4.0)));
        assert_eq!(average.next().unwrap(), None);
        assert_eq!(average.next().unwrap(), None);
    }

    #[test]
    fn test_average_empty_input() {
        let mut average = Average::new("rating", ratings_scan(&[]));
        average.init().unwrap();
        assert_eq!(average.next().unwrap(), None);
    }

    #[test]
    fn test_average_parse_failure_is_fatal() {
        let mut average = Average::new("rating", ratings_scan(&["4.0", "great"]));
        average.init().unwrap();
        assert_eq!(
            average.next().unwrap_err(),
            EngineError::Parse {
                value: "great".to_string(),
                target: "f64",
            }
        );
    }

    #[test]
    fn test_average_reset_recomputes() {
        let mut average = Average::new("rating", ratings_scan(&["1.0", "3.0"]));
        average.init().unwrap();
        let first = average.next().unwrap().unwrap();
        average.reset().unwrap();
        let second = average.next().unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.get("average"), Some(&Value::Float(2.0)));
    }
}
