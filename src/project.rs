//! Table projection: the three display orderings of a classified sample.
//!
//! - **raw**: one single-column table, one row per accepted record, holding
//!   the record's leaf values joined by spaces.
//! - **dataorder**: one table per contiguous run of records sharing a
//!   variant, in sequence order.
//! - **schemaorder**: one table per variant with at least one record, most
//!   populated first.
//!
//! [`inspect`] runs the whole pipeline: discovery, flattening, then a second
//! bounded scan that classifies and projects.

use std::{cmp::Reverse, collections::HashMap};

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{debug, info};
use serde::Serialize;

use crate::{
    classify::{ClassifiedRecord, VariantColumns, classify},
    expand::{DEFAULT_SAMPLE_LIMIT, UnrollDepth, discover},
    flatten::LeafPath,
    header::{self, HeaderHierarchy},
    schema::Schema,
    source::RecordSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectOptions {
    /// Records examined per scan, for discovery and for classification.
    pub sample_limit: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayTable {
    /// Variant the rows were classified into; `None` for the raw table.
    pub variant: Option<usize>,
    pub columns: Vec<LeafPath>,
    pub header: HeaderHierarchy,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VariantFrequency {
    pub variant: usize,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Projection {
    pub raw: Vec<DisplayTable>,
    #[serde(rename = "dataorder")]
    pub data_order: Vec<DisplayTable>,
    #[serde(rename = "schemaorder")]
    pub schema_order: Vec<DisplayTable>,
    pub variants: Vec<VariantColumns>,
    pub variant_frequency: Vec<VariantFrequency>,
    pub rows_scanned: usize,
    pub rows_dropped: usize,
    pub has_more_rows: bool,
}

impl Projection {
    pub fn collections(&self) -> [(&'static str, &[DisplayTable]); 3] {
        [
            ("raw", self.raw.as_slice()),
            ("dataorder", self.data_order.as_slice()),
            ("schemaorder", self.schema_order.as_slice()),
        ]
    }
}

/// Records accepted by one bounded classification scan, in sequence order.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedSample {
    pub records: Vec<ClassifiedRecord>,
    pub scanned: usize,
    pub dropped: usize,
    pub has_more_rows: bool,
}

pub fn classify_sample<S>(
    source: &S,
    catalog: &[VariantColumns],
    sample_limit: usize,
) -> Result<ClassifiedSample>
where
    S: RecordSource + ?Sized,
{
    let mut sample = ClassifiedSample::default();
    for record in source.records()? {
        if sample.scanned >= sample_limit {
            sample.has_more_rows = true;
            break;
        }
        let record = record?;
        sample.scanned += 1;
        match classify(&record, catalog) {
            Some(classified) => sample.records.push(classified),
            None => {
                debug!("Record {} matched no variant; skipping", sample.scanned);
                sample.dropped += 1;
            }
        }
    }
    info!(
        "Classified {} of {} scanned record(s); {} dropped",
        sample.records.len(),
        sample.scanned,
        sample.dropped
    );
    Ok(sample)
}

/// Classifies up to `sample_limit` records against `catalog` and groups them
/// into the three display orderings.
pub fn project<S>(source: &S, catalog: &[VariantColumns], sample_limit: usize) -> Result<Projection>
where
    S: RecordSource + ?Sized,
{
    let sample = classify_sample(source, catalog, sample_limit)?;
    let mut projection = Projection {
        variants: catalog.to_vec(),
        rows_scanned: sample.scanned,
        rows_dropped: sample.dropped,
        has_more_rows: sample.has_more_rows,
        ..Projection::default()
    };
    if catalog.is_empty() {
        return Ok(projection);
    }

    let positions = catalog
        .iter()
        .enumerate()
        .map(|(position, variant)| (variant.index, position))
        .collect::<HashMap<_, _>>();
    let headers = catalog
        .iter()
        .map(|variant| header::build(&variant.paths))
        .collect::<Vec<_>>();
    let table_for = |position: usize, rows: Vec<Vec<String>>| DisplayTable {
        variant: Some(catalog[position].index),
        columns: catalog[position].paths.clone(),
        header: headers[position].clone(),
        rows,
    };

    projection.raw.push(DisplayTable {
        variant: None,
        columns: Vec::new(),
        header: HeaderHierarchy::single(""),
        rows: sample
            .records
            .iter()
            .map(|record| vec![record.raw_text()])
            .collect(),
    });

    let runs = sample.records.iter().chunk_by(|record| record.variant);
    for (variant, run) in &runs {
        let rows = run.map(|record| record.values.clone()).collect();
        projection.data_order.push(table_for(positions[&variant], rows));
    }

    let mut grouped = vec![Vec::new(); catalog.len()];
    for record in &sample.records {
        grouped[positions[&record.variant]].push(record.values.clone());
    }
    projection.variant_frequency = catalog
        .iter()
        .zip(&grouped)
        .map(|(variant, rows)| VariantFrequency {
            variant: variant.index,
            count: rows.len(),
        })
        .collect();
    let order = (0..catalog.len())
        .filter(|&position| !grouped[position].is_empty())
        .sorted_by_key(|&position| (Reverse(grouped[position].len()), catalog[position].index))
        .collect::<Vec<_>>();
    for position in order {
        let rows = std::mem::take(&mut grouped[position]);
        projection.schema_order.push(table_for(position, rows));
    }

    info!(
        "Projected {} data-order table(s) and {} schema-order table(s)",
        projection.data_order.len(),
        projection.schema_order.len()
    );
    Ok(projection)
}

/// Discovers the variants of `schema` in `source`, then classifies and
/// projects the same bounded sample.
pub fn inspect<S>(schema: &Schema, source: &S, options: &InspectOptions) -> Result<Projection>
where
    S: RecordSource + ?Sized,
{
    let discovery = discover(schema, source, options.sample_limit, UnrollDepth::Full)?;
    let catalog = VariantColumns::catalog(&discovery.variants)
        .context("Flattening discovered variants")?;
    let mut projection = project(source, &catalog, options.sample_limit)?;
    projection.has_more_rows |= discovery.has_more_rows;
    if projection.has_more_rows {
        info!(
            "Sample limit of {} record(s) reached; more rows exist",
            options.sample_limit
        );
    }
    Ok(projection)
}
