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

/// Fixed per-value cost used when estimating record sizes for memory
/// budgeting. The estimate is key length plus this constant per field;
/// its exact value moves page boundaries, never results.
pub const VALUE_SLOT_BYTES: usize = 16;

/// A single field value. Scan nodes always produce `Text`; in-memory
/// tables may carry `Int`; the average aggregate produces `Float`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Value {
    /// The textual rendering used for filtering, joining and display.
    pub fn render(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
        }
    }

    pub fn as_f64(&self) -> Result<f64, EngineError> {
        match self {
            Value::Text(s) => s.parse::<f64>().map_err(|_| EngineError::Parse {
                value: s.clone(),
                target: "f64",
            }),
            Value::Int(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
        }
    }

    pub fn as_i64(&self) -> Result<i64, EngineError> {
        match self {
            Value::Text(s) => s.parse::<i64>().map_err(|_| EngineError::Parse {
                value: s.clone(),
                target: "i64",
            }),
            Value::Int(i) => Ok(*i),
            Value::Float(f) => Err(EngineError::Parse {
                value: f.to_string(),
                target: "i64",
            }),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

/// An ordered mapping from field name to value, the unit of data flow
/// between plan nodes. Order is insertion order and is preserved by
/// every operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.fields.iter()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Concatenates `other` onto a copy of this record. On a name
    /// collision the right-hand value replaces the left-hand one; join
    /// sides are expected to have disjoint names apart from the join
    /// key, whose values are equal on emitted rows anyway.
    pub fn concat(&self, other: &Record) -> Record {
        let mut out = self.clone();
        for (name, value) in &other.fields {
            match out.fields.iter_mut().find(|(n, _)| n == name) {
                Some((_, existing)) => *existing = value.clone(),
                None => out.fields.push((name.clone(), value.clone())),
            }
        }
        out
    }

    /// Estimated in-memory size used for page budgeting.
    pub fn estimated_size(&self) -> usize {
        self.fields
            .iter()
            .map(|(name, _)| name.len() + VALUE_SLOT_BYTES)
            .sum()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Record {
            fields: iter.into_iter().collect(),
        }
    }
}

/// An in-memory table: ordered headers plus ordered rows. Immutable
/// while a query runs.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Record>) -> Self {
        Table { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row(&self, idx: usize) -> Option<&Record> {
        self.rows.get(idx)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_render() {
        assert_eq!(Value::Text("abc".to_string()).render(), "abc");
        assert_eq!(Value::Int(42).render(), "42");
        assert_eq!(Value::Float(3.5).render(), "3.5");
    }

    #[test]
    fn test_value_as_f64() {
        assert_eq!(Value::Text("4.25".to_string()).as_f64().unwrap(), 4.25);
        assert_eq!(Value::Int(3).as_f64().unwrap(), 3.0);
        assert_eq!(Value::Float(1.5).as_f64().unwrap(), 1.5);
        assert_eq!(
            Value::Text("not a number".to_string()).as_f64().unwrap_err(),
            EngineError::Parse {
                value: "not a number".to_string(),
                target: "f64",
            }
        );
    }

    #[test]
    fn test_record_preserves_order() {
        let mut record = Record::new();
        record.push("b", "2");
        record.push("a", "1");
        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_concat_right_side_wins_on_collision() {
        let mut left = Record::new();
        left.push("id", "1");
        left.push("name", "Lion King");
        let mut right = Record::new();
        right.push("id", "1");
        right.push("rating", "4.0");

        let joined = left.concat(&right);
        let names: Vec<&str> = joined.field_names().collect();
        assert_eq!(names, vec!["id", "name", "rating"]);
        assert_eq!(joined.get("id"), Some(&Value::Text("1".to_string())));
    }

    #[test]
    fn test_estimated_size() {
        let mut record = Record::new();
        record.push("id", "1"); // 2 + 16
        record.push("genre", "Comedy"); // 5 + 16
        assert_eq!(record.estimated_size(), 39);
    }
}
