use super::*;
use crate::node::{LeafNode, Node};

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeSet;

fn validate_tree<V>(t: &IntervalTree<V>) {
    fn visit(node: &Node, depth: u32, fanout: usize, len: usize, seen: &mut BTreeSet<usize>) {
        assert!(depth <= MAX_DEPTH, "node below the last radix digit: depth={depth}");

        match node {
            Node::Hierarchical(h) => {
                for child in h.children.iter().flatten() {
                    visit(child, depth + 1, fanout, len, seen);
                }
            }
            Node::Leaf(leaf) => {
                assert_eq!(
                    leaf.intervals.len(),
                    leaf.indices.len(),
                    "leaf lists must stay parallel"
                );
                for &index in &leaf.indices {
                    assert!(index < len, "index {index} outside the value store");
                    seen.insert(index);
                }

                // The last checkpoint this leaf passed must have found
                // nothing to split on.
                if depth < MAX_DEPTH && leaf.len() > fanout {
                    let checkpoint = (leaf.len() - 1) / fanout * fanout;
                    let prefix = LeafNode {
                        intervals: leaf.intervals[..checkpoint].to_vec(),
                        indices: leaf.indices[..checkpoint].to_vec(),
                    };
                    assert!(
                        !prefix.should_split(),
                        "leaf at depth {depth} skipped a promotion"
                    );
                }
            }
        }
    }

    let mut seen = BTreeSet::new();
    for child in t.root.children.iter().flatten() {
        visit(child, 1, t.config.leaf_fanout, t.len(), &mut seen);
    }

    // Every well-formed interval lands in at least one leaf.
    for (index, (interval, _)) in t.iter().enumerate() {
        if interval.is_well_formed() {
            assert!(seen.contains(&index), "{interval} is not stored anywhere");
        }
    }
}

fn brute_force(intervals: &[Interval], start: u64, end: u64) -> Vec<usize> {
    intervals
        .iter()
        .enumerate()
        .filter(|(_, iv)| iv.overlaps(start, end))
        .map(|(i, _)| i)
        .collect()
}

fn sorted_pair((a, b): (u64, u64)) -> Interval {
    Interval::new(a.min(b), a.max(b))
}

fn interval_strategy() -> impl Strategy<Value = Interval> {
    prop_oneof![
        // Short intervals scattered over the whole domain.
        13 => (any::<u64>(), 0..1u64 << 40)
            .prop_map(|(start, len)| Interval::new(start, start.saturating_add(len))),
        // Crowded near zero: shares every leading digit.
        6 => (0u64..64, 0u64..64).prop_map(sorted_pair),
        // Crowded at the top of the domain.
        2 => (u64::MAX - 64..=u64::MAX, u64::MAX - 64..=u64::MAX).prop_map(sorted_pair),
        // Wide, replicated into many buckets.
        1 => (any::<u64>(), any::<u64>()).prop_map(sorted_pair),
    ]
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 3)]
    Add(#[proptest(strategy = "interval_strategy()")] Interval),
    Query(#[proptest(strategy = "interval_strategy()")] Interval),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=300)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_matches_brute_force(ops in ops_strategy()) {
        let mut t: IntervalTree<usize> = IntervalTree::new();
        let mut intervals: Vec<Interval> = Vec::new();

        for op in ops {
            match op {
                Op::Add(interval) => {
                    t.add(interval, intervals.len());
                    intervals.push(interval);
                }
                Op::Query(q) => {
                    let expected = brute_force(&intervals, q.start, q.end);
                    let got = t.all_intersections(q.start, q.end);
                    prop_assert_eq!(got.is_some(), !expected.is_empty());
                    let got: Vec<usize> = got.unwrap_or_default().into_iter().copied().collect();
                    prop_assert_eq!(got, expected);
                }
            }

            prop_assert_eq!(t.len(), intervals.len());
        }

        validate_tree(&t);
    }

    #[test]
    fn prop_queries_are_idempotent(
        intervals in prop::collection::vec(interval_strategy(), 0..=200),
        q in interval_strategy(),
    ) {
        let t: IntervalTree<usize> = intervals.iter().copied().zip(0..).collect();
        let first = t.all_intersections(q.start, q.end);
        let second = t.all_intersections(q.start, q.end);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.is_some(), t.any_intersection(q.start, q.end));
    }
}

// Tiny fanouts promote on almost every insert, which multiplies the copies
// of wide intervals; keep these cases smaller.
proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_small_fanout_matches_brute_force(
        intervals in prop::collection::vec(interval_strategy(), 0..=60),
        queries in prop::collection::vec(interval_strategy(), 1..=20),
        fanout in 1usize..=4,
    ) {
        let mut t = IntervalTree::with_config(Config {
            leaf_fanout: fanout,
            ..Config::default()
        })
        .unwrap();
        for (i, interval) in intervals.iter().enumerate() {
            t.add(*interval, i);
        }
        validate_tree(&t);

        for q in queries {
            let indices = t.intersecting_indices(q.start, q.end);
            prop_assert_eq!(indices.sorted(), brute_force(&intervals, q.start, q.end));
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let sub_bucket = 1u64 << (u64::BITS - BRANCHING_FACTOR_POWER);
    let intervals = vec![
        Interval::new(0, 10),
        Interval::new(5, 5),
        Interval::new(sub_bucket - 1, sub_bucket),
        Interval::new(3 * sub_bucket, 7 * sub_bucket + 3),
        Interval::new(0, u64::MAX),
        Interval::point(u64::MAX),
    ];
    let queries = [
        (0, 0),
        (6, 9),
        (11, sub_bucket - 2),
        (sub_bucket, sub_bucket),
        (4 * sub_bucket, 5 * sub_bucket),
        (u64::MAX, u64::MAX),
        (0, u64::MAX),
    ];

    for_each_permutation(&intervals, |perm| {
        // Small fanout so that every ordering goes through promotions.
        let mut t = IntervalTree::with_config(Config {
            leaf_fanout: 2,
            ..Config::default()
        })
        .unwrap();
        for interval in &perm {
            t.add(*interval, *interval);
        }
        validate_tree(&t);

        for (start, end) in queries {
            let mut got: Vec<Interval> = t
                .all_intersections(start, end)
                .unwrap_or_default()
                .into_iter()
                .copied()
                .collect();
            got.sort();
            let mut expected: Vec<Interval> = intervals
                .iter()
                .copied()
                .filter(|iv| iv.overlaps(start, end))
                .collect();
            expected.sort();
            assert_eq!(got, expected, "query [{start}, {end}] after {perm:?}");
        }
    });
}

#[test]
fn many_identical_intervals_use_linear_scan() {
    let mut t = IntervalTree::new();
    for i in 0..10 * DEFAULT_LEAF_FANOUT {
        t.add(Interval::new(7, 9), i);
    }
    validate_tree(&t);
    assert_eq!(t.stats().leaf_nodes, 1);
    assert_eq!(
        t.all_intersections(9, 100).map(|v| v.len()),
        Some(10 * DEFAULT_LEAF_FANOUT)
    );
    assert_eq!(t.all_intersections(10, 100), None);
}
