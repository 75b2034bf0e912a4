//! Best-fit assignment of records to concrete variants.
//!
//! A record is scored against each variant by how many of the variant's leaf
//! paths resolve to non-empty text. The strictly highest score wins, ties go
//! to the earliest discovered variant, and a record scoring zero everywhere
//! is left unmatched.

use serde::Serialize;

use crate::{
    error::ShapeError,
    expand::VariantSet,
    flatten::{LeafPath, flatten, leaf_schema},
    schema::Schema,
    value::Value,
};

/// A variant together with its leaf paths. The same paths drive both
/// classification and header construction.
#[derive(Debug, Clone, Serialize)]
pub struct VariantColumns {
    pub index: usize,
    pub schema: Schema,
    pub paths: Vec<LeafPath>,
    /// Per path, whether the declared leaf is a `map`.
    #[serde(skip)]
    map_leaves: Vec<bool>,
}

impl VariantColumns {
    pub fn catalog(variants: &VariantSet) -> Result<Vec<VariantColumns>, ShapeError> {
        variants
            .iter()
            .enumerate()
            .map(|(index, schema)| {
                let paths = flatten(schema)?;
                let map_leaves = paths
                    .iter()
                    .map(|path| leaf_schema(schema, path).is_some_and(Schema::is_map))
                    .collect();
                Ok(VariantColumns {
                    index,
                    schema: schema.clone(),
                    paths,
                    map_leaves,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedRecord {
    pub variant: usize,
    /// One entry per leaf path of the variant, empty where unresolved.
    pub values: Vec<String>,
}

impl ClassifiedRecord {
    /// Leaf values joined by single spaces, trimmed.
    pub fn raw_text(&self) -> String {
        self.values.join(" ").trim().to_string()
    }
}

/// Resolves a leaf path against a record. Descent only passes through nested
/// records; arrays are not addressable by path. A leaf that is itself a
/// record resolves to nothing, an array leaf to its display text.
pub fn nested_value(record: &Value, path: &LeafPath) -> String {
    column_value(record, path, false)
}

/// Like [`nested_value`], but a leaf declared as a map renders its entries
/// when `is_map` is set.
pub fn column_value(record: &Value, path: &LeafPath, is_map: bool) -> String {
    let Some((leaf, parents)) = path.segments().split_last() else {
        return String::new();
    };
    let mut current = record;
    for segment in parents {
        match current.field(segment) {
            Some(next @ Value::Record(_)) => current = next,
            _ => return String::new(),
        }
    }
    match current.field(leaf) {
        Some(Value::Leaf(Some(text))) => text.clone(),
        Some(array @ Value::Array(_)) => array.as_display(),
        Some(entries @ Value::Record(_)) if is_map => entries.as_display(),
        Some(Value::Record(_) | Value::Leaf(None)) | None => String::new(),
    }
}

pub fn classify(record: &Value, catalog: &[VariantColumns]) -> Option<ClassifiedRecord> {
    let mut best: Option<(usize, ClassifiedRecord)> = None;
    for variant in catalog {
        let values = variant
            .paths
            .iter()
            .zip(&variant.map_leaves)
            .map(|(path, is_map)| column_value(record, path, *is_map))
            .collect::<Vec<_>>();
        let resolved = values.iter().filter(|value| !value.is_empty()).count();
        let best_score = best.as_ref().map_or(0, |(score, _)| *score);
        if resolved > best_score {
            best = Some((
                resolved,
                ClassifiedRecord {
                    variant: variant.index,
                    values,
                },
            ));
        }
    }
    best.map(|(_, classified)| classified)
}
