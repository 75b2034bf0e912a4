use proptest::prelude::*;
use variant_view::{
    flatten::LeafPath,
    header::{HeaderCell, build},
};

fn paths(texts: &[&str]) -> Vec<LeafPath> {
    texts.iter().map(|text| LeafPath::from_dotted(text)).collect()
}

#[test]
fn gap_under_a_shorter_path_is_not_merged() {
    let header = build(&paths(&["a.b", "a.c", "d"]));

    assert_eq!(
        header.rows(),
        &[
            vec![HeaderCell::new("a", 2, false), HeaderCell::new("", 1, false)],
            vec![
                HeaderCell::new("b", 1, true),
                HeaderCell::new("c", 1, true),
                HeaderCell::new("d", 1, true),
            ],
        ]
    );
}

#[test]
fn flat_paths_produce_a_single_leaf_row() {
    let header = build(&paths(&["id", "name"]));

    assert_eq!(header.depth(), 1);
    assert_eq!(
        header.leaf_row(),
        &[HeaderCell::new("id", 1, true), HeaderCell::new("name", 1, true)]
    );
}

#[test]
fn deep_paths_are_aligned_from_the_bottom() {
    let header = build(&paths(&["x", "a.b.c"]));

    let labels = header
        .rows()
        .iter()
        .map(|row| row.iter().map(|cell| cell.label.as_str()).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    assert_eq!(labels, vec![vec!["", "a"], vec!["", "b"], vec!["x", "c"]]);
}

#[test]
fn merging_is_per_row_and_adjacency_only() {
    let header = build(&paths(&["a.id", "b.id", "a.name"]));

    let leaf_labels = header
        .leaf_row()
        .iter()
        .map(|cell| (cell.label.as_str(), cell.span))
        .collect::<Vec<_>>();
    assert_eq!(leaf_labels, vec![("id", 2), ("name", 1)]);
    assert_eq!(header.column_count(), 3);
}

#[test]
fn variant_without_leaf_paths_has_an_empty_header() {
    let header = build(&[]);

    assert!(header.rows().is_empty());
    assert_eq!(header.column_count(), 0);
}

fn path_strategy() -> impl Strategy<Value = LeafPath> {
    prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 1..4)
        .prop_map(|segments| LeafPath::new(segments.into_iter().map(str::to_string).collect()))
}

proptest! {
    #[test]
    fn every_row_spans_all_leaf_paths(leaf_paths in prop::collection::vec(path_strategy(), 0..10)) {
        let header = build(&leaf_paths);
        let deepest = leaf_paths.iter().map(LeafPath::depth).max().unwrap_or(0);

        prop_assert_eq!(header.depth(), deepest);
        for (idx, row) in header.rows().iter().enumerate() {
            let total: usize = row.iter().map(|cell| cell.span).sum();
            prop_assert_eq!(total, leaf_paths.len());
            let is_bottom = idx + 1 == header.depth();
            prop_assert!(row.iter().all(|cell| cell.is_leaf_row == is_bottom));
            prop_assert!(row.iter().all(|cell| cell.span >= 1));
            prop_assert!(row.windows(2).all(|pair| pair[0].label != pair[1].label));
        }
    }
}
