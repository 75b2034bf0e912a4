mod common;

use serde_json::json;
use variant_view::{
    expand::{UnrollDepth, discover, expand, unroll, variants_by_frequency},
    schema::Schema,
    value::Value,
};

use common::{int, int_or_nested_schema, records};

fn signatures(variants: &[Schema]) -> Vec<String> {
    variants.iter().map(Schema::signature).collect()
}

#[test]
fn union_field_discovers_one_variant_per_observed_shape() {
    let schema = int_or_nested_schema();
    let sample = records(&[json!({"a": 5}), json!({"a": {"b": 7}})]);

    let variants = expand(&schema, &sample, 100).expect("expand");

    assert_eq!(
        signatures(variants.as_slice()),
        vec![r#"{"a":int}"#, r#"{"a":{"b":int}}"#]
    );
}

#[test]
fn array_elements_collapse_to_a_single_variant() {
    let schema = Schema::record([("x", Schema::array(int()))]);
    let sample = records(&[json!({"x": [1, 2, 3]})]);

    let variants = expand(&schema, &sample, 100).expect("expand");

    assert_eq!(signatures(variants.as_slice()), vec![r#"{"x":[int]}"#]);
}

#[test]
fn array_emits_one_variant_per_distinct_element_shape() {
    let schema = Schema::record([(
        "xs",
        Schema::array(Schema::union([int(), Schema::record([("b", int())])])),
    )]);
    let record = Value::from(json!({"xs": [1, {"b": 2}, 3]}));

    let variants = unroll(&schema, &record).expect("array matches");

    assert_eq!(
        signatures(&variants),
        vec![r#"{"xs":[int]}"#, r#"{"xs":[{"b":int}]}"#]
    );
}

#[test]
fn missing_field_rejects_the_whole_record() {
    let schema = Schema::record([("a", int())]);
    let record = Value::from(json!({}));

    assert_eq!(unroll(&schema, &record), None);
    let sample = vec![record];
    let variants = expand(&schema, &sample, 100).expect("expand");
    assert!(variants.is_empty());
}

#[test]
fn null_field_counts_as_absent() {
    let schema = Schema::record([("a", int()), ("b", int())]);
    let record = Value::from(json!({"a": 1, "b": null}));

    assert_eq!(unroll(&schema, &record), None);
}

#[test]
fn empty_string_is_present() {
    let schema = Schema::record([("a", Schema::primitive("string"))]);
    let record = Value::from(json!({"a": ""}));

    assert_eq!(unroll(&schema, &record), Some(vec![schema.clone()]));
}

#[test]
fn map_fields_accept_object_values() {
    let schema = Schema::record([("id", int()), ("attrs", Schema::primitive("map"))]);
    let sample = records(&[json!({"id": 1, "attrs": {"k": "v"}})]);

    let variants = expand(&schema, &sample, 100).expect("expand");

    assert_eq!(signatures(variants.as_slice()), vec![r#"{"id":int,"attrs":map}"#]);
    let list = Value::array([Value::text("1")]);
    assert_eq!(unroll(&Schema::primitive("map"), &list), None);
}

#[test]
fn shape_mismatches_are_no_match() {
    let leaf = Value::text("1");
    let list = Value::array([Value::text("1")]);
    let nested = Value::record([("b", Value::text("1"))]);

    assert_eq!(unroll(&int(), &list), None);
    assert_eq!(unroll(&int(), &nested), None);
    assert_eq!(unroll(&Schema::array(int()), &leaf), None);
    assert_eq!(unroll(&Schema::record([("b", int())]), &leaf), None);
}

#[test]
fn every_compatible_union_branch_contributes() {
    let schema = Schema::record([(
        "a",
        Schema::union([int(), Schema::primitive("string")]),
    )]);
    let record = Value::from(json!({"a": "5"}));

    let variants = unroll(&schema, &record).expect("record matches");

    assert_eq!(
        signatures(&variants),
        vec![r#"{"a":int}"#, r#"{"a":string}"#]
    );
}

#[test]
fn union_with_no_compatible_branch_yields_no_candidates() {
    let schema = Schema::union([int(), Schema::primitive("string")]);
    let record = Value::from(json!({"b": 1}));

    assert_eq!(unroll(&schema, &record), Some(Vec::new()));
}

#[test]
fn discovery_stops_at_the_sample_limit() {
    let mut documents = (0..100).map(|n| json!({"a": n})).collect::<Vec<_>>();
    documents.extend((0..50).map(|n| json!({"a": {"b": n}})));
    let sample = records(&documents);

    let discovery =
        discover(&int_or_nested_schema(), &sample, 100, UnrollDepth::Full).expect("discover");

    assert_eq!(discovery.records_scanned, 100);
    assert!(discovery.has_more_rows);
    assert_eq!(signatures(discovery.variants.as_slice()), vec![r#"{"a":int}"#]);
}

#[test]
fn discovery_counts_rejected_records() {
    let sample = records(&[json!({"a": 1}), json!({"z": 2}), json!([1])]);

    let discovery =
        discover(&int_or_nested_schema(), &sample, 100, UnrollDepth::Full).expect("discover");

    assert_eq!(discovery.records_scanned, 3);
    assert_eq!(discovery.records_rejected, 2);
    assert!(!discovery.has_more_rows);
}

#[test]
fn frequency_ranking_puts_most_common_variant_first() {
    let sample = records(&[
        json!({"a": 5}),
        json!({"a": {"b": 7}}),
        json!({"a": {"b": 8}}),
    ]);

    let ranked = variants_by_frequency(&int_or_nested_schema(), &sample, 100, UnrollDepth::Full)
        .expect("rank variants");

    let summary = ranked
        .iter()
        .map(|(schema, count)| (schema.signature(), *count))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        vec![
            (r#"{"a":{"b":int}}"#.to_string(), 2),
            (r#"{"a":int}"#.to_string(), 1),
        ]
    );
}

#[test]
fn frequency_ties_keep_discovery_order() {
    let sample = records(&[json!({"a": {"b": 7}}), json!({"a": 5})]);

    let ranked = variants_by_frequency(&int_or_nested_schema(), &sample, 100, UnrollDepth::Full)
        .expect("rank variants");

    assert_eq!(ranked[0].0.signature(), r#"{"a":{"b":int}}"#);
    assert_eq!(ranked[1].0.signature(), r#"{"a":int}"#);
}

#[test]
fn top_level_only_unrolls_a_root_union() {
    let schema = Schema::union([
        Schema::record([("a", int())]),
        Schema::record([("b", Schema::union([int(), Schema::primitive("string")]))]),
    ]);
    let sample = records(&[json!({"a": 1}), json!({"b": 2})]);

    let discovery = discover(&schema, &sample, 100, UnrollDepth::TopLevelOnly).expect("discover");

    assert_eq!(
        signatures(discovery.variants.as_slice()),
        vec![r#"{"a":int}"#, r#"{"b":<int|string>}"#]
    );
    assert!(!discovery.variants.as_slice()[1].is_union_free());
}

#[test]
fn discovery_is_idempotent_on_a_frozen_sample() {
    let sample = records(&[
        json!({"a": 5}),
        json!({"a": {"b": 7}}),
        json!({"a": "x"}),
    ]);
    let schema = int_or_nested_schema();

    let first = expand(&schema, &sample, 100).expect("first expand");
    let second = expand(&schema, &sample, 100).expect("second expand");

    assert_eq!(first.as_slice(), second.as_slice());
}
