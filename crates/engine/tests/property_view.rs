// Property-based tests for the derivation pipeline and reveal window.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;

use rowdeck_engine::reveal::RevealWindow;
use rowdeck_engine::row::{Column, Row, RowId, Schema};
use rowdeck_engine::view::{derive, FilterSet, SortDirection, SortSpec};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn schema() -> Schema {
    Schema::new(vec![
        Column::text("Title"),
        Column::text("Author"),
        Column::numeric("PublishedYear"),
    ])
}

/// Title pool with heavy duplication so sorts hit ties.
fn arb_title() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(vec!["alpha", "beta", "gamma", "delta"])
            .prop_map(|s| s.to_string()),
        1 => r"[a-zA-Z ]{0,12}",
    ]
}

/// Year values: mostly 4-digit, sometimes unparsable or blank.
fn arb_year() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (1900..2024i64).prop_map(|y| y.to_string()),
        1 => Just("n/a".to_string()),
        1 => Just("".to_string()),
    ]
}

fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec((arb_title(), arb_title(), arb_year()), 0..60).prop_map(|cells| {
        cells
            .into_iter()
            .enumerate()
            .map(|(i, (title, author, year))| {
                Row::with_fields(
                    RowId(i as u64 + 1),
                    [
                        ("Title".to_string(), title),
                        ("Author".to_string(), author),
                        ("PublishedYear".to_string(), year),
                    ],
                )
            })
            .collect()
    })
}

fn arb_filters() -> impl Strategy<Value = FilterSet> {
    (
        prop::option::of(r"[a-z ]{0,3}"),
        prop::option::of(r"[0-9]{0,2}"),
    )
        .prop_map(|(title, year)| {
            let mut filters = FilterSet::new();
            if let Some(p) = title {
                filters.set("Title", p);
            }
            if let Some(p) = year {
                filters.set("PublishedYear", p);
            }
            filters
        })
}

fn arb_sort() -> impl Strategy<Value = Option<SortSpec>> {
    prop_oneof![
        1 => Just(None),
        2 => (
            prop::sample::select(vec!["Title", "Author", "PublishedYear"]),
            prop::bool::ANY,
        )
            .prop_map(|(col, desc)| {
                Some(SortSpec {
                    column: col.to_string(),
                    direction: if desc {
                        SortDirection::Descending
                    } else {
                        SortDirection::Ascending
                    },
                })
            }),
    ]
}

/// Window operations driven against a random sequence of view lengths.
#[derive(Debug, Clone)]
enum WindowOp {
    Reset,
    Clamp(usize),
    Advance(usize),
}

fn arb_window_ops() -> impl Strategy<Value = Vec<WindowOp>> {
    prop::collection::vec(
        prop_oneof![
            1 => Just(WindowOp::Reset),
            3 => (0..600usize).prop_map(WindowOp::Clamp),
            3 => (0..600usize).prop_map(WindowOp::Advance),
        ],
        0..40,
    )
}

// ---------------------------------------------------------------------------
// Derivation properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn derive_is_deterministic(rows in arb_rows(), filters in arb_filters(), sort in arb_sort()) {
        let first = derive(&rows, &schema(), &filters, sort.as_ref());
        let second = derive(&rows, &schema(), &filters, sort.as_ref());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn empty_filters_unsorted_is_identity(rows in arb_rows()) {
        let view = derive(&rows, &schema(), &FilterSet::new(), None);
        let identity: Vec<usize> = (0..rows.len()).collect();
        prop_assert_eq!(view, identity);
    }

    #[test]
    fn filtered_view_is_a_subsequence(rows in arb_rows(), filters in arb_filters()) {
        let view = derive(&rows, &schema(), &filters, None);
        // Unsorted output preserves store order: strictly increasing indices
        for pair in view.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        for &idx in &view {
            prop_assert!(idx < rows.len());
        }
    }

    #[test]
    fn sort_only_permutes_the_filtered_set(
        rows in arb_rows(),
        filters in arb_filters(),
        sort in arb_sort(),
    ) {
        let unsorted = derive(&rows, &schema(), &filters, None);
        let sorted = derive(&rows, &schema(), &filters, sort.as_ref());
        let mut a = unsorted.clone();
        let mut b = sorted.clone();
        a.sort_unstable();
        b.sort_unstable();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn toggle_and_back_restores_duplicate_order(rows in arb_rows()) {
        let asc = SortSpec {
            column: "Title".to_string(),
            direction: SortDirection::Ascending,
        };
        let desc = SortSpec {
            column: "Title".to_string(),
            direction: SortDirection::Descending,
        };
        let before = derive(&rows, &schema(), &FilterSet::new(), Some(&asc));
        let _ = derive(&rows, &schema(), &FilterSet::new(), Some(&desc));
        let after = derive(&rows, &schema(), &FilterSet::new(), Some(&asc));
        prop_assert_eq!(before, after);
    }

    #[test]
    fn descending_ties_keep_filtered_order(rows in arb_rows()) {
        let desc = SortSpec {
            column: "Title".to_string(),
            direction: SortDirection::Descending,
        };
        let view = derive(&rows, &schema(), &FilterSet::new(), Some(&desc));
        for pair in view.windows(2) {
            let a = rows[pair[0]].get("Title");
            let b = rows[pair[1]].get("Title");
            if a == b {
                // Equal keys: earlier store index first, both directions
                prop_assert!(pair[0] < pair[1]);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Reveal window properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn window_invariant_holds_under_any_op_sequence(ops in arb_window_ops()) {
        let mut window = RevealWindow::new(100, 50);
        let mut view_len = 600usize;
        window.clamp(view_len);

        for op in ops {
            match op {
                WindowOp::Reset => {
                    window.reset();
                    window.clamp(view_len);
                }
                WindowOp::Clamp(len) => {
                    view_len = len;
                    window.clamp(view_len);
                }
                WindowOp::Advance(len) => {
                    view_len = len;
                    window.clamp(view_len);
                    window.advance(view_len);
                }
            }
            prop_assert!(window.len() <= view_len);
            prop_assert!(window.len() >= window.floor().min(view_len));
        }
    }

    #[test]
    fn growth_is_monotonic_between_resets(steps in 1..30usize, view_len in 0..600usize) {
        let mut window = RevealWindow::new(100, 50);
        window.clamp(view_len);
        let mut last = window.len();
        for _ in 0..steps {
            window.advance(view_len);
            prop_assert!(window.len() >= last);
            last = window.len();
        }
    }
}
