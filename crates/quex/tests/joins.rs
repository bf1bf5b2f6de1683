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

//! Cross-checks of the three join implementations against each other
//! and against fixed expectations.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use quex::{
    Average, BlockNestedJoin, BlockNestedJoinOptions, BoxedNode, Command, CompareOp, CsvScan,
    EngineError, Filter, HashJoin, HashJoinOptions, NestedLoopJoin, PlanNode, QueryDescriptor,
    QueryExecutor, Record, Table, Value,
};

fn testdata(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("testdata")
        .join(name)
        .display()
        .to_string()
}

fn movies_scan() -> BoxedNode {
    Box::new(CsvScan::new(testdata("movies.csv")))
}

fn filtered_ratings_scan() -> BoxedNode {
    let ratings = Box::new(CsvScan::new(testdata("ratings.csv")));
    Box::new(Filter::new("movieId", CompareOp::Eq, "1", ratings))
}

fn movies_schema() -> Vec<String> {
    vec!["movieId", "title", "genres"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn ratings_schema() -> Vec<String> {
    vec!["userId", "movieId", "rating", "timestamp"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

enum JoinKind {
    Naive,
    Block { page_count: usize },
    Hash { partition_count: usize },
}

/// Builds the canonical join between movies and the movieId=1 slice of
/// ratings. Hash joins spill under `scratch`.
fn build_join(kind: &JoinKind, scratch: &Path) -> BoxedNode {
    let left = movies_scan();
    let right = filtered_ratings_scan();
    match kind {
        JoinKind::Naive => Box::new(NestedLoopJoin::new("movieId", "movieId", left, right)),
        JoinKind::Block { page_count } => {
            let opts = BlockNestedJoinOptions::builder()
                .left_field("movieId")
                .right_field("movieId")
                .page_count(*page_count)
                .build();
            Box::new(BlockNestedJoin::new(opts, left, right))
        }
        JoinKind::Hash { partition_count } => {
            let opts = HashJoinOptions::builder()
                .left_field("movieId")
                .right_field("movieId")
                .left_schema(movies_schema())
                .right_schema(ratings_schema())
                .partition_count(*partition_count)
                .left_spill_dir(scratch.join("r"))
                .right_spill_dir(scratch.join("s"))
                .build();
            Box::new(HashJoin::new(opts, left, right))
        }
    }
}

fn execute(root: BoxedNode) -> Result<Vec<Record>, EngineError> {
    let mut qd = QueryDescriptor::new(Command::Select, "test plan", root);
    QueryExecutor::new().execute(&mut qd)
}

/// Join output field order differs between the nested and hash
/// families, so cross-family comparisons go through name -> value
/// maps.
fn as_map(record: &Record) -> BTreeMap<String, String> {
    record
        .iter()
        .map(|(name, value)| (name.clone(), value.render()))
        .collect()
}

fn as_sorted_maps(records: &[Record]) -> Vec<BTreeMap<String, String>> {
    let mut maps: Vec<_> = records.iter().map(as_map).collect();
    maps.sort();
    maps
}

fn all_kinds() -> Vec<JoinKind> {
    vec![
        JoinKind::Naive,
        JoinKind::Block { page_count: 1 },
        JoinKind::Block { page_count: 3 },
        JoinKind::Hash { partition_count: 1 },
        JoinKind::Hash { partition_count: 8 },
    ]
}

#[test]
fn test_average_over_join_is_identical_across_families() {
    for kind in all_kinds() {
        let scratch = tempfile::tempdir().unwrap();
        let join = build_join(&kind, scratch.path());
        let root: BoxedNode = Box::new(Average::new("rating", join));
        let records = execute(root).unwrap();
        assert_eq!(records.len(), 1);
        // ratings of movie 1: 4.0 + 3.5 + 4.5 + 3.0 + 5.0 + 4.0 over 6
        assert_eq!(records[0].get("average"), Some(&Value::Float(4.0)));
    }
}

#[test]
fn test_join_families_produce_equal_multisets() {
    let expected_text = fs::read_to_string(testdata("expected_join.json")).unwrap();
    let mut expected: Vec<BTreeMap<String, String>> =
        serde_json::from_str(&expected_text).unwrap();
    expected.sort();

    for kind in all_kinds() {
        let scratch = tempfile::tempdir().unwrap();
        let records = execute(build_join(&kind, scratch.path())).unwrap();
        assert_eq!(as_sorted_maps(&records), expected);
    }
}

#[test]
fn test_nested_join_output_order_is_left_then_right() {
    let expected_text = fs::read_to_string(testdata("expected_join.json")).unwrap();
    let expected: Vec<BTreeMap<String, String>> = serde_json::from_str(&expected_text).unwrap();

    let scratch = tempfile::tempdir().unwrap();
    let records = execute(build_join(&JoinKind::Naive, scratch.path())).unwrap();
    let maps: Vec<BTreeMap<String, String>> = records.iter().map(as_map).collect();
    // movies is the outer side, so rows come out in rating-file order
    // within the single matching movie
    assert_eq!(maps, expected);
}

#[test]
fn test_empty_right_side_yields_no_rows() {
    for kind in all_kinds() {
        let scratch = tempfile::tempdir().unwrap();
        let left = movies_scan();
        let ratings = Box::new(CsvScan::new(testdata("ratings.csv")));
        let right: BoxedNode = Box::new(Filter::new("movieId", CompareOp::Eq, "999", ratings));
        let join: BoxedNode = match &kind {
            JoinKind::Naive => Box::new(NestedLoopJoin::new("movieId", "movieId", left, right)),
            JoinKind::Block { page_count } => {
                let opts = BlockNestedJoinOptions::builder()
                    .left_field("movieId")
                    .right_field("movieId")
                    .page_count(*page_count)
                    .build();
                Box::new(BlockNestedJoin::new(opts, left, right))
            }
            JoinKind::Hash { partition_count } => {
                let opts = HashJoinOptions::builder()
                    .left_field("movieId")
                    .right_field("movieId")
                    .left_schema(movies_schema())
                    .right_schema(ratings_schema())
                    .partition_count(*partition_count)
                    .left_spill_dir(scratch.path().join("r"))
                    .right_spill_dir(scratch.path().join("s"))
                    .build();
                Box::new(HashJoin::new(opts, left, right))
            }
        };
        assert_eq!(execute(join).unwrap(), Vec::<Record>::new());
    }
}

#[test]
fn test_empty_left_side_yields_no_rows() {
    let movies = movies_scan();
    let left: BoxedNode = Box::new(Filter::new("genres", CompareOp::Eq, "Nope", movies));
    let join: BoxedNode = Box::new(NestedLoopJoin::new(
        "movieId",
        "movieId",
        left,
        filtered_ratings_scan(),
    ));
    assert_eq!(execute(join).unwrap(), Vec::<Record>::new());
}

fn keyed_table(field_names: (&str, &str), rows: &[(&str, &str)]) -> Table {
    let (key_name, value_name) = field_names;
    let headers = vec![key_name.to_string(), value_name.to_string()];
    let records = rows
        .iter()
        .map(|&(key, value)| {
            let mut record = Record::new();
            record.push(key_name, key);
            record.push(value_name, value);
            record
        })
        .collect();
    Table::new(headers, records)
}

#[test]
fn test_block_join_multiple_pages_match_naive() {
    // ~35 estimated bytes per record, so a one-page budget splits 600
    // left records into three passes
    let left_rows: Vec<(String, String)> = (0..600)
        .map(|i| (i.to_string(), format!("left-{i}")))
        .collect();
    let right_rows: Vec<(String, String)> = (0..600)
        .rev()
        .map(|i| (i.to_string(), format!("right-{i}")))
        .collect();
    let left_refs: Vec<(&str, &str)> = left_rows
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let right_refs: Vec<(&str, &str)> = right_rows
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let block: BoxedNode = {
        let left = Box::new(quex::TableScan::new(keyed_table(("k", "lv"), &left_refs)));
        let right = Box::new(quex::TableScan::new(keyed_table(("j", "rv"), &right_refs)));
        let opts = BlockNestedJoinOptions::builder()
            .left_field("k")
            .right_field("j")
            .page_count(1)
            .build();
        Box::new(BlockNestedJoin::new(opts, left, right))
    };
    let naive: BoxedNode = {
        let left = Box::new(quex::TableScan::new(keyed_table(("k", "lv"), &left_refs)));
        let right = Box::new(quex::TableScan::new(keyed_table(("j", "rv"), &right_refs)));
        Box::new(NestedLoopJoin::new("k", "j", left, right))
    };

    let block_out = execute(block).unwrap();
    let naive_out = execute(naive).unwrap();
    assert_eq!(block_out.len(), 600);
    assert_eq!(as_sorted_maps(&block_out), as_sorted_maps(&naive_out));
}

#[test]
fn test_block_join_record_larger_than_budget() {
    // a single left record whose estimate exceeds the whole one-page
    // budget must still form its own page
    let wide_name = "w".repeat(9000);
    let headers = vec!["k".to_string(), wide_name.clone()];
    let mut wide_record = Record::new();
    wide_record.push("k", "1");
    wide_record.push(wide_name, "x");
    let left = Box::new(quex::TableScan::new(Table::new(headers, vec![wide_record])));
    let right = Box::new(quex::TableScan::new(keyed_table(
        ("j", "rv"),
        &[("1", "only")],
    )));

    let opts = BlockNestedJoinOptions::builder()
        .left_field("k")
        .right_field("j")
        .page_count(1)
        .build();
    let join: BoxedNode = Box::new(BlockNestedJoin::new(opts, left, right));
    let records = execute(join).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].get("rv"),
        Some(&Value::Text("only".to_string()))
    );
}

#[test]
fn test_hash_join_duplicate_build_keys_last_writer_wins() {
    let scratch = tempfile::tempdir().unwrap();
    let left = Box::new(quex::TableScan::new(keyed_table(
        ("movieId", "title"),
        &[("7", "first"), ("7", "second")],
    )));
    let right = Box::new(quex::TableScan::new(keyed_table(
        ("movieId", "userId"),
        &[("7", "42")],
    )));
    let opts = HashJoinOptions::builder()
        .left_field("movieId")
        .right_field("movieId")
        .left_schema(vec!["movieId".to_string(), "title".to_string()])
        .right_schema(vec!["movieId".to_string(), "userId".to_string()])
        .partition_count(4)
        .left_spill_dir(scratch.path().join("r"))
        .right_spill_dir(scratch.path().join("s"))
        .build();
    let join: BoxedNode = Box::new(HashJoin::new(opts, left, right));

    let records = execute(join).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].get("title"),
        Some(&Value::Text("second".to_string()))
    );
}

#[test]
fn test_hash_join_negative_keys_stay_in_range() {
    let scratch = tempfile::tempdir().unwrap();
    let left = Box::new(quex::TableScan::new(keyed_table(
        ("id", "lv"),
        &[("-3", "a"), ("5", "b")],
    )));
    let right = Box::new(quex::TableScan::new(keyed_table(
        ("id", "rv"),
        &[("-3", "c")],
    )));
    let opts = HashJoinOptions::builder()
        .left_field("id")
        .right_field("id")
        .left_schema(vec!["id".to_string(), "lv".to_string()])
        .right_schema(vec!["id".to_string(), "rv".to_string()])
        .partition_count(4)
        .left_spill_dir(scratch.path().join("r"))
        .right_spill_dir(scratch.path().join("s"))
        .build();
    let join: BoxedNode = Box::new(HashJoin::new(opts, left, right));

    let records = execute(join).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("lv"), Some(&Value::Text("a".to_string())));
}

#[test]
fn test_hash_join_non_integer_key_fails() {
    let scratch = tempfile::tempdir().unwrap();
    let left = Box::new(quex::TableScan::new(keyed_table(
        ("id", "lv"),
        &[("abc", "a")],
    )));
    let right = Box::new(quex::TableScan::new(keyed_table(("id", "rv"), &[("1", "c")])));
    let opts = HashJoinOptions::builder()
        .left_field("id")
        .right_field("id")
        .left_schema(vec!["id".to_string(), "lv".to_string()])
        .right_schema(vec!["id".to_string(), "rv".to_string()])
        .partition_count(2)
        .left_spill_dir(scratch.path().join("r"))
        .right_spill_dir(scratch.path().join("s"))
        .build();
    let join: BoxedNode = Box::new(HashJoin::new(opts, left, right));

    let err = execute(join).unwrap_err();
    assert_eq!(
        err,
        EngineError::Parse {
            value: "abc".to_string(),
            target: "i64",
        }
    );
}

#[test]
fn test_hash_join_leaves_spill_files_behind() {
    let scratch = tempfile::tempdir().unwrap();
    let records = execute(build_join(
        &JoinKind::Hash { partition_count: 2 },
        scratch.path(),
    ))
    .unwrap();
    assert_eq!(records.len(), 6);

    let spilled: Vec<_> = fs::read_dir(scratch.path().join("r"))
        .unwrap()
        .chain(fs::read_dir(scratch.path().join("s")).unwrap())
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    // movieId 1 lands in partition 1 of 2 on both sides
    assert!(spilled.contains(&"part-1".to_string()));
}

#[test]
fn test_join_reset_reproduces_sequence() {
    let mut join = NestedLoopJoin::new("movieId", "movieId", movies_scan(), filtered_ratings_scan());
    quex::init_node(&mut join).unwrap();

    let first: Vec<Record> = std::iter::from_fn(|| join.next().unwrap()).collect();
    assert_eq!(join.next().unwrap(), None);
    join.reset().unwrap();
    let second: Vec<Record> = std::iter::from_fn(|| join.next().unwrap()).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 6);

    quex::close_node(&mut join).unwrap();
}

#[test]
fn test_invalid_partition_count_rejected() {
    let scratch = tempfile::tempdir().unwrap();
    let opts = HashJoinOptions::builder()
        .left_field("movieId")
        .right_field("movieId")
        .left_schema(movies_schema())
        .right_schema(ratings_schema())
        .partition_count(0)
        .left_spill_dir(scratch.path().join("r"))
        .right_spill_dir(scratch.path().join("s"))
        .build();
    let join: BoxedNode = Box::new(HashJoin::new(opts, movies_scan(), filtered_ratings_scan()));
    assert_eq!(
        execute(join).unwrap_err(),
        EngineError::InvalidParameter {
            name: "partition_count",
            got: 0,
        }
    );
}
