//! Test suite for the augmented interval tree.

use super::node::Node;
use super::*;
use qtty::Second;

type TestTree = IntervalTree<Second>;

/// Helper to create timespans more concisely in tests.
fn ts(start: f64, end: f64) -> Timespan<Second> {
    Timespan::from_f64(start, end).unwrap()
}

/// Helper to create a busy time.
fn bt(id: &str, start: f64, end: f64) -> BusyTime<Second> {
    BusyTime::new(id, ts(start, end))
}

/// Walks the whole structure and asserts every internal invariant: id map
/// consistency, BST key order, AVL balance, height and max_end augmentation.
fn check_invariants(tree: &TestTree) {
    for (id, &idx) in &tree.by_id {
        let node = tree.slots[idx]
            .as_ref()
            .unwrap_or_else(|| panic!("id `{}` maps to a vacant slot", id));
        assert_eq!(node.busy.id(), id);
    }

    let counted = match tree.root {
        Some(root) => check_subtree(tree, root, None, None).0,
        None => 0,
    };
    assert_eq!(counted, tree.len(), "tree walk and id map disagree on size");
}

fn check_subtree(
    tree: &TestTree,
    idx: usize,
    lo: Option<super::node::EntryKey>,
    hi: Option<super::node::EntryKey>,
) -> (usize, i32, f64) {
    let node: &Node<Second> = tree.slots[idx].as_ref().unwrap();
    let key = node.key();
    if let Some(lo) = lo {
        assert!(key > lo, "BST order violated on the left bound");
    }
    if let Some(hi) = hi {
        assert!(key < hi, "BST order violated on the right bound");
    }

    let (left_count, left_height, left_max) = match node.left {
        Some(l) => check_subtree(tree, l, lo, Some(key)),
        None => (0, 0, f64::NEG_INFINITY),
    };
    let (right_count, right_height, right_max) = match node.right {
        Some(r) => check_subtree(tree, r, Some(key), hi),
        None => (0, 0, f64::NEG_INFINITY),
    };

    assert!(
        (left_height - right_height).abs() <= 1,
        "AVL balance violated at `{}`",
        node.busy.id()
    );

    let height = 1 + left_height.max(right_height);
    assert_eq!(node.height, height, "stale height at `{}`", node.busy.id());

    let max_end = node.busy.end().value().max(left_max).max(right_max);
    assert_eq!(
        node.max_end, max_end,
        "stale max_end at `{}`",
        node.busy.id()
    );

    (1 + left_count + right_count, height, max_end)
}

#[cfg(test)]
mod basic_operations {
    use super::*;

    #[test]
    fn test_new_tree_is_empty() {
        let tree = TestTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(tree.query(ts(0.0, 100.0)).is_empty());
    }

    #[test]
    fn test_add_single() {
        let mut tree = TestTree::new();
        tree.add(bt("1", 0.0, 10.0)).unwrap();
        assert_eq!(tree.len(), 1);
        assert!(tree.contains("1"));
    }

    #[test]
    fn test_add_duplicate_id_fails() {
        let mut tree = TestTree::new();
        tree.add(bt("1", 0.0, 10.0)).unwrap();
        let result = tree.add(bt("1", 20.0, 30.0));
        assert_eq!(result, Err(TreeError::DuplicateId("1".to_string())));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_get_by_id() {
        let mut tree = TestTree::new();
        tree.add(bt("1", 0.0, 10.0)).unwrap();
        tree.add(bt("2", 20.0, 30.0)).unwrap();

        assert_eq!(tree.get("1").map(|b| b.span()), Some(ts(0.0, 10.0)));
        assert_eq!(tree.get("2").map(|b| b.span()), Some(ts(20.0, 30.0)));
        assert_eq!(tree.get("999"), None);
    }

    #[test]
    fn test_seq_follows_add_order() {
        let mut tree = TestTree::new();
        tree.add(bt("late", 50.0, 60.0)).unwrap();
        tree.add(bt("early", 0.0, 10.0)).unwrap();

        assert_eq!(tree.seq_of("late"), Some(0));
        assert_eq!(tree.seq_of("early"), Some(1));
        assert_eq!(tree.seq_of("missing"), None);
    }

    #[test]
    fn test_remove_returns_busy_time() {
        let mut tree = TestTree::new();
        tree.add(bt("1", 0.0, 10.0)).unwrap();
        tree.add(bt("2", 20.0, 30.0)).unwrap();

        let removed = tree.remove("1").unwrap();
        assert_eq!(removed.id(), "1");
        assert_eq!(removed.span(), ts(0.0, 10.0));
        assert_eq!(tree.len(), 1);
        assert!(!tree.contains("1"));
        assert!(tree.contains("2"));
    }

    #[test]
    fn test_remove_missing_fails() {
        let mut tree = TestTree::new();
        tree.add(bt("1", 0.0, 10.0)).unwrap();

        let result = tree.remove("999");
        assert_eq!(result, Err(TreeError::NotFound("999".to_string())));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_add_remove_add_same_id() {
        let mut tree = TestTree::new();
        tree.add(bt("1", 0.0, 10.0)).unwrap();
        tree.remove("1").unwrap();

        tree.add(bt("1", 20.0, 30.0)).unwrap();
        assert_eq!(tree.get("1").map(|b| b.span()), Some(ts(20.0, 30.0)));
        check_invariants(&tree);
    }

    #[test]
    fn test_clear() {
        let mut tree = TestTree::new();
        tree.add(bt("1", 0.0, 10.0)).unwrap();
        tree.add(bt("2", 20.0, 30.0)).unwrap();

        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.query(ts(0.0, 100.0)).is_empty());

        // A cleared tree starts sequences over.
        tree.add(bt("3", 0.0, 5.0)).unwrap();
        assert_eq!(tree.seq_of("3"), Some(0));
    }
}

#[cfg(test)]
mod overlap_queries {
    use super::*;

    fn ids(hits: Vec<&BusyTime<Second>>) -> Vec<String> {
        hits.into_iter().map(|b| b.id().to_string()).collect()
    }

    #[test]
    fn test_single_hit() {
        let mut tree = TestTree::new();
        tree.add(bt("1", 0.0, 10.0)).unwrap();
        tree.add(bt("2", 20.0, 30.0)).unwrap();

        assert_eq!(ids(tree.query(ts(5.0, 15.0))), vec!["1"]);
        assert_eq!(ids(tree.query(ts(25.0, 35.0))), vec!["2"]);
    }

    #[test]
    fn test_no_hit_between_spans() {
        let mut tree = TestTree::new();
        tree.add(bt("1", 0.0, 10.0)).unwrap();
        tree.add(bt("2", 20.0, 30.0)).unwrap();

        assert!(tree.query(ts(12.0, 18.0)).is_empty());
    }

    #[test]
    fn test_touching_spans_do_not_hit() {
        let mut tree = TestTree::new();
        tree.add(bt("1", 0.0, 10.0)).unwrap();

        // Half-open: [10, 20) shares no point with [0, 10).
        assert!(tree.query(ts(10.0, 20.0)).is_empty());
        assert_eq!(ids(tree.query(ts(9.999, 20.0))), vec!["1"]);
    }

    #[test]
    fn test_contained_and_containing() {
        let mut tree = TestTree::new();
        tree.add(bt("wide", 0.0, 100.0)).unwrap();

        assert_eq!(ids(tree.query(ts(40.0, 50.0))), vec!["wide"]);
        assert_eq!(ids(tree.query(ts(-50.0, 200.0))), vec!["wide"]);
    }

    #[test]
    fn test_hits_ordered_by_insertion() {
        let mut tree = TestTree::new();
        // Added out of time order on purpose.
        tree.add(bt("c", 40.0, 60.0)).unwrap();
        tree.add(bt("a", 0.0, 55.0)).unwrap();
        tree.add(bt("b", 20.0, 45.0)).unwrap();

        assert_eq!(ids(tree.query(ts(42.0, 44.0))), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_equal_starts_ordered_by_insertion() {
        let mut tree = TestTree::new();
        tree.add(bt("x", 5.0, 30.0)).unwrap();
        tree.add(bt("y", 5.0, 10.0)).unwrap();
        tree.add(bt("z", 5.0, 20.0)).unwrap();

        assert_eq!(ids(tree.query(ts(0.0, 100.0))), vec!["x", "y", "z"]);
        check_invariants(&tree);
    }

    #[test]
    fn test_query_after_remove() {
        let mut tree = TestTree::new();
        tree.add(bt("1", 0.0, 10.0)).unwrap();
        tree.add(bt("2", 5.0, 15.0)).unwrap();
        tree.add(bt("3", 8.0, 12.0)).unwrap();

        tree.remove("2").unwrap();
        assert_eq!(ids(tree.query(ts(9.0, 11.0))), vec!["1", "3"]);
        check_invariants(&tree);
    }

    #[test]
    fn test_zero_length_busy_time() {
        let mut tree = TestTree::new();
        tree.add(bt("point", 10.0, 10.0)).unwrap();

        // A zero-length span is hit only by queries strictly containing it.
        assert_eq!(ids(tree.query(ts(0.0, 20.0))), vec!["point"]);
        assert!(tree.query(ts(10.0, 20.0)).is_empty());
        assert!(tree.query(ts(0.0, 10.0)).is_empty());
    }

    #[test]
    fn test_negative_times() {
        let mut tree = TestTree::new();
        tree.add(bt("1", -100.0, -50.0)).unwrap();
        tree.add(bt("2", -40.0, 0.0)).unwrap();

        assert_eq!(ids(tree.query(ts(-60.0, -30.0))), vec!["1", "2"]);
    }
}

#[cfg(test)]
mod iteration {
    use super::*;

    #[test]
    fn test_iter_in_start_order() {
        let mut tree = TestTree::new();
        tree.add(bt("3", 40.0, 50.0)).unwrap();
        tree.add(bt("1", 0.0, 10.0)).unwrap();
        tree.add(bt("2", 20.0, 30.0)).unwrap();

        let order: Vec<&str> = tree.iter().map(|b| b.id()).collect();
        assert_eq!(order, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_iter_equal_starts_in_insertion_order() {
        let mut tree = TestTree::new();
        tree.add(bt("x", 5.0, 30.0)).unwrap();
        tree.add(bt("y", 5.0, 10.0)).unwrap();
        tree.add(bt("z", 5.0, 20.0)).unwrap();

        let order: Vec<&str> = tree.iter().map(|b| b.id()).collect();
        assert_eq!(order, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_iter_empty() {
        let tree = TestTree::new();
        assert_eq!(tree.iter().count(), 0);
    }
}

#[cfg(test)]
mod balance {
    use super::*;

    #[test]
    fn test_ascending_inserts_stay_balanced() {
        let mut tree = TestTree::new();
        for i in 0..64 {
            let start = i as f64 * 10.0;
            tree.add(bt(&i.to_string(), start, start + 5.0)).unwrap();
        }
        check_invariants(&tree);
    }

    #[test]
    fn test_descending_inserts_stay_balanced() {
        let mut tree = TestTree::new();
        for i in (0..64).rev() {
            let start = i as f64 * 10.0;
            tree.add(bt(&i.to_string(), start, start + 5.0)).unwrap();
        }
        check_invariants(&tree);
    }

    #[test]
    fn test_remove_interior_nodes_keeps_structure() {
        let mut tree = TestTree::new();
        for i in 0..32 {
            let start = i as f64;
            tree.add(bt(&i.to_string(), start, start + 0.5)).unwrap();
        }
        for i in (0..32).step_by(3) {
            tree.remove(&i.to_string()).unwrap();
            check_invariants(&tree);
        }
        assert_eq!(tree.len(), 21);
    }

    #[test]
    fn test_max_end_shrinks_after_removing_long_span() {
        let mut tree = TestTree::new();
        tree.add(bt("short", 0.0, 10.0)).unwrap();
        tree.add(bt("long", 5.0, 1000.0)).unwrap();
        tree.add(bt("mid", 20.0, 30.0)).unwrap();

        tree.remove("long").unwrap();
        check_invariants(&tree);
        assert!(tree.query(ts(500.0, 600.0)).is_empty());
    }
}

#[cfg(test)]
mod stress {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn brute_force(mirror: &[(String, Timespan<Second>)], span: Timespan<Second>) -> Vec<String> {
        mirror
            .iter()
            .filter(|(_, s)| s.overlaps(&span))
            .map(|(id, _)| id.clone())
            .collect()
    }

    #[test]
    fn test_random_ops_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        let mut tree = TestTree::new();
        let mut mirror: Vec<(String, Timespan<Second>)> = Vec::new();

        for step in 0..600 {
            if mirror.is_empty() || rng.gen_bool(0.6) {
                let start = rng.gen_range(0.0..1000.0);
                let span = ts(start, start + rng.gen_range(0.0..120.0));
                let id = format!("bt-{}", step);
                tree.add(BusyTime::new(id.clone(), span)).unwrap();
                mirror.push((id, span));
            } else {
                let victim = rng.gen_range(0..mirror.len());
                let (id, _) = mirror.remove(victim);
                tree.remove(&id).unwrap();
            }
            check_invariants(&tree);

            let qs = rng.gen_range(0.0..1000.0);
            let span = ts(qs, qs + rng.gen_range(0.0..200.0));
            let got: Vec<String> = tree
                .query(span)
                .into_iter()
                .map(|b| b.id().to_string())
                .collect();
            assert_eq!(got, brute_force(&mirror, span), "mismatch at step {}", step);
        }
    }
}

// =============================================================================
// Serde serialization tests
// =============================================================================

#[cfg(feature = "serde")]
mod serde_tests {
    use super::*;

    #[test]
    fn test_roundtrip_preserves_order() {
        let mut tree = TestTree::new();
        tree.add(bt("c", 40.0, 60.0)).unwrap();
        tree.add(bt("a", 0.0, 55.0)).unwrap();
        tree.add(bt("b", 20.0, 45.0)).unwrap();

        let json = serde_json::to_string(&tree).unwrap();
        let restored: TestTree = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.len(), 3);
        assert_eq!(restored.get("a").map(|b| b.span()), Some(ts(0.0, 55.0)));
        let order: Vec<String> = restored
            .query(ts(42.0, 44.0))
            .into_iter()
            .map(|b| b.id().to_string())
            .collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_json_format() {
        let mut tree = TestTree::new();
        tree.add(bt("meeting", 100.0, 200.0)).unwrap();

        let json = serde_json::to_string_pretty(&tree).unwrap();
        assert!(json.contains("\"id\""));
        assert!(json.contains("\"meeting\""));
        assert!(json.contains("\"span\""));
        assert!(json.contains("\"start\""));
        assert!(json.contains("\"end\""));
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let json = r#"[
            {"id": "dup", "span": {"start": 0.0, "end": 10.0}},
            {"id": "dup", "span": {"start": 20.0, "end": 30.0}}
        ]"#;

        let result: Result<TestTree, _> = serde_json::from_str(json);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("already indexed"));
    }

    #[test]
    fn test_empty_tree_roundtrip() {
        let tree = TestTree::new();
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, "[]");

        let restored: TestTree = serde_json::from_str(&json).unwrap();
        assert!(restored.is_empty());
    }
}
