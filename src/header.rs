//! Multi-row, span-merged column headers built from leaf paths.

use itertools::Itertools;
use serde::Serialize;

use crate::flatten::LeafPath;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    pub label: String,
    pub span: usize,
    pub is_leaf_row: bool,
}

impl HeaderCell {
    pub fn new(label: impl Into<String>, span: usize, is_leaf_row: bool) -> Self {
        Self {
            label: label.into(),
            span,
            is_leaf_row,
        }
    }
}

/// Header rows, outermost first. Every cell of the last row is a leaf cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HeaderHierarchy {
    rows: Vec<Vec<HeaderCell>>,
}

impl HeaderHierarchy {
    /// A one-column header with a single leaf cell.
    pub fn single(label: impl Into<String>) -> Self {
        Self {
            rows: vec![vec![HeaderCell::new(label, 1, true)]],
        }
    }

    pub fn rows(&self) -> &[Vec<HeaderCell>] {
        &self.rows
    }

    pub fn depth(&self) -> usize {
        self.rows.len()
    }

    pub fn leaf_row(&self) -> &[HeaderCell] {
        self.rows.last().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn column_count(&self) -> usize {
        self.leaf_row().iter().map(|cell| cell.span).sum()
    }
}

/// Builds one header row per path level. Row `k` from the bottom holds the
/// `k`-th segment from the end of each path, blank where the path is shorter,
/// and equal labels are merged only when adjacent.
pub fn build(paths: &[LeafPath]) -> HeaderHierarchy {
    let depth = paths.iter().map(LeafPath::depth).max().unwrap_or(0);
    let mut rows = Vec::with_capacity(depth);
    for level in 0..depth {
        let row = paths
            .iter()
            .map(|path| {
                let segments = path.segments();
                if level < segments.len() {
                    segments[segments.len() - 1 - level].as_str()
                } else {
                    ""
                }
            })
            .dedup_with_count()
            .map(|(span, label)| HeaderCell::new(label, span, level == 0))
            .collect::<Vec<_>>();
        rows.push(row);
    }
    rows.reverse();
    HeaderHierarchy { rows }
}
