//! Union unrolling and concrete variant discovery.
//!
//! [`unroll`] resolves the union nodes of a declared schema against one
//! runtime value, producing every union-free schema the value is structurally
//! compatible with. [`expand`] runs it over a bounded sample of a record
//! source and keeps each distinct variant once, in first-discovery order.

use std::{cmp::Reverse, collections::HashMap};

use anyhow::Result;
use itertools::Itertools;
use log::{debug, info};

use crate::{
    schema::{Field, Schema},
    source::RecordSource,
    value::Value,
};

/// Reference sample size for both the discovery and classification scans.
pub const DEFAULT_SAMPLE_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnrollDepth {
    /// Resolve every union in the tree.
    #[default]
    Full,
    /// Resolve only a union at the root; nested unions are kept as declared.
    TopLevelOnly,
}

/// Distinct schemas keyed by signature, in insertion order. The position of a
/// variant is its variant index.
#[derive(Debug, Clone, Default)]
pub struct VariantSet {
    variants: Vec<Schema>,
    positions: HashMap<String, usize>,
}

impl VariantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `schema` unless an equal signature is present. Returns the
    /// variant index and whether the schema was new.
    pub fn insert(&mut self, schema: Schema) -> (usize, bool) {
        let signature = schema.signature();
        if let Some(&idx) = self.positions.get(&signature) {
            return (idx, false);
        }
        let idx = self.variants.len();
        self.positions.insert(signature, idx);
        self.variants.push(schema);
        (idx, true)
    }

    pub fn position(&self, schema: &Schema) -> Option<usize> {
        self.positions.get(&schema.signature()).copied()
    }

    pub fn get(&self, idx: usize) -> Option<&Schema> {
        self.variants.get(idx)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Schema> {
        self.variants.iter()
    }

    pub fn as_slice(&self) -> &[Schema] {
        &self.variants
    }

    pub fn into_vec(self) -> Vec<Schema> {
        self.variants
    }
}

impl FromIterator<Schema> for VariantSet {
    fn from_iter<I: IntoIterator<Item = Schema>>(iter: I) -> Self {
        let mut set = VariantSet::new();
        for schema in iter {
            set.insert(schema);
        }
        set
    }
}

impl IntoIterator for VariantSet {
    type Item = Schema;
    type IntoIter = std::vec::IntoIter<Schema>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.into_iter()
    }
}

impl<'a> IntoIterator for &'a VariantSet {
    type Item = &'a Schema;
    type IntoIter = std::slice::Iter<'a, Schema>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.iter()
    }
}

/// Outcome of one bounded discovery scan.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub variants: VariantSet,
    /// How many sampled records produced each variant, by variant index.
    pub candidate_counts: Vec<usize>,
    pub records_scanned: usize,
    /// Sampled records that matched no branch of the schema.
    pub records_rejected: usize,
    pub has_more_rows: bool,
}

impl Discovery {
    /// Variant indexes ordered by descending candidate count, ties by
    /// discovery order.
    pub fn ranked_indexes(&self) -> Vec<usize> {
        (0..self.variants.len())
            .filter(|&idx| self.candidate_counts[idx] > 0)
            .sorted_by_key(|&idx| (Reverse(self.candidate_counts[idx]), idx))
            .collect()
    }
}

/// Resolves every union in `schema` against `value`. `None` means the value is
/// structurally incompatible with the schema.
pub fn unroll(schema: &Schema, value: &Value) -> Option<Vec<Schema>> {
    unroll_with_depth(schema, value, UnrollDepth::Full)
}

pub fn unroll_with_depth(schema: &Schema, value: &Value, depth: UnrollDepth) -> Option<Vec<Schema>> {
    unroll_node(schema, value, depth, true)
}

fn unroll_node(schema: &Schema, value: &Value, depth: UnrollDepth, is_root: bool) -> Option<Vec<Schema>> {
    match (schema, value) {
        (Schema::Record(fields), Value::Record(_)) => unroll_record(fields, value, depth),
        (Schema::Record(_), _) => None,
        (Schema::Union(alternatives), _) => {
            if depth == UnrollDepth::TopLevelOnly && !is_root {
                return Some(vec![schema.clone()]);
            }
            Some(
                alternatives
                    .iter()
                    .filter_map(|alternative| unroll_node(alternative, value, depth, false))
                    .flatten()
                    .collect(),
            )
        }
        (Schema::Array(element), Value::Array(items)) => {
            let elements = items
                .iter()
                .filter_map(|item| unroll_node(element, item, depth, false))
                .flatten()
                .collect::<VariantSet>();
            Some(elements.into_iter().map(Schema::array).collect())
        }
        (Schema::Array(_), _) => None,
        (Schema::Primitive(_), Value::Record(_)) if schema.is_map() => Some(vec![schema.clone()]),
        (Schema::Primitive(_), Value::Record(_) | Value::Array(_)) => None,
        (Schema::Primitive(_), Value::Leaf(_)) => Some(vec![schema.clone()]),
    }
}

fn unroll_record(fields: &[Field], value: &Value, depth: UnrollDepth) -> Option<Vec<Schema>> {
    let mut per_field = Vec::with_capacity(fields.len());
    for field in fields {
        let field_value = value.field(&field.name).filter(|v| !v.is_absent())?;
        per_field.push(unroll_node(&field.schema, field_value, depth, false)?);
    }
    if fields.is_empty() {
        return Some(vec![Schema::Record(Vec::new())]);
    }
    let records = per_field
        .iter()
        .map(|candidates| candidates.iter())
        .multi_cartesian_product()
        .map(|combination| {
            Schema::Record(
                fields
                    .iter()
                    .zip(combination)
                    .map(|(field, schema)| Field::new(field.name.clone(), schema.clone()))
                    .collect(),
            )
        })
        .collect();
    Some(records)
}

/// Scans up to `sample_limit` records, unrolling `schema` against each.
pub fn discover<S>(
    schema: &Schema,
    source: &S,
    sample_limit: usize,
    depth: UnrollDepth,
) -> Result<Discovery>
where
    S: RecordSource + ?Sized,
{
    let mut discovery = Discovery::default();
    for record in source.records()? {
        if discovery.records_scanned >= sample_limit {
            discovery.has_more_rows = true;
            break;
        }
        let record = record?;
        discovery.records_scanned += 1;
        let Some(candidates) = unroll_with_depth(schema, &record, depth) else {
            discovery.records_rejected += 1;
            continue;
        };
        for candidate in candidates {
            let (idx, is_new) = discovery.variants.insert(candidate);
            if is_new {
                debug!(
                    "Discovered variant #{idx} at record {}: {}",
                    discovery.records_scanned,
                    discovery.variants.as_slice()[idx]
                );
                discovery.candidate_counts.push(0);
            }
            discovery.candidate_counts[idx] += 1;
        }
    }
    info!(
        "Discovered {} variant(s) from {} sampled record(s) ({} rejected)",
        discovery.variants.len(),
        discovery.records_scanned,
        discovery.records_rejected
    );
    Ok(discovery)
}

/// Concrete variants observed in the first `sample_limit` records.
pub fn expand<S>(schema: &Schema, source: &S, sample_limit: usize) -> Result<VariantSet>
where
    S: RecordSource + ?Sized,
{
    Ok(discover(schema, source, sample_limit, UnrollDepth::Full)?.variants)
}

/// Variants observed at least once, most frequent first.
pub fn variants_by_frequency<S>(
    schema: &Schema,
    source: &S,
    sample_limit: usize,
    depth: UnrollDepth,
) -> Result<Vec<(Schema, usize)>>
where
    S: RecordSource + ?Sized,
{
    let discovery = discover(schema, source, sample_limit, depth)?;
    let ranked = discovery.ranked_indexes();
    let counts = discovery.candidate_counts;
    let mut variants = discovery.variants.into_vec().into_iter().map(Some).collect::<Vec<_>>();
    Ok(ranked
        .into_iter()
        .filter_map(|idx| variants[idx].take().map(|schema| (schema, counts[idx])))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> Schema {
        Schema::primitive("int")
    }

    #[test]
    fn record_cross_product_follows_field_order() {
        let schema = Schema::record([
            ("a", Schema::union([int(), Schema::primitive("string")])),
            ("b", Schema::union([int(), Schema::primitive("long")])),
        ]);
        let record = Value::record([("a", Value::text("1")), ("b", Value::text("2"))]);
        let variants = unroll(&schema, &record).expect("record matches");
        let signatures = variants.iter().map(Schema::signature).collect::<Vec<_>>();
        assert_eq!(
            signatures,
            vec![
                r#"{"a":int,"b":int}"#,
                r#"{"a":int,"b":long}"#,
                r#"{"a":string,"b":int}"#,
                r#"{"a":string,"b":long}"#,
            ]
        );
    }

    #[test]
    fn empty_array_yields_no_candidates_rather_than_no_match() {
        let schema = Schema::record([("x", Schema::array(int()))]);
        let record = Value::record([("x", Value::Array(Vec::new()))]);
        assert_eq!(unroll(&schema, &record), Some(Vec::new()));
    }

    #[test]
    fn top_level_only_keeps_nested_unions() {
        let nested = Schema::union([int(), Schema::record([("b", int())])]);
        let schema = Schema::record([("a", nested.clone())]);
        let record = Value::record([("a", Value::text("5"))]);
        let variants = unroll_with_depth(&schema, &record, UnrollDepth::TopLevelOnly)
            .expect("record matches");
        assert_eq!(variants, vec![Schema::record([("a", nested)])]);
    }

    #[test]
    fn variant_set_keeps_first_seen_order() {
        let set = [int(), Schema::primitive("string"), int()]
            .into_iter()
            .collect::<VariantSet>();
        assert_eq!(set.len(), 2);
        assert_eq!(set.position(&Schema::primitive("string")), Some(1));
    }
}
