extern crate imgtree;
use imgtree::test_utilities::*;
use imgtree::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_random_edge_lists_keep_the_universal_invariants() {
    let mut rng = StdRng::seed_from_u64(0xbeef);
    for _ in 0..50 {
        let leaves = rng.gen_range(2..40) as NodeT;
        let edges_number = rng.gen_range(1..120);
        let mut edges = Vec::new();
        for _ in 0..edges_number {
            let a = rng.gen_range(0..leaves);
            let b = rng.gen_range(0..leaves);
            if a != b {
                edges.push((a, b, rng.gen_range(0..8) as u8));
            }
        }
        if edges.is_empty() {
            continue;
        }
        let tree = build_from_edge_list(leaves, &edges).unwrap();
        default_test_suite(&tree).unwrap();
        assert!(tree.get_components_number() <= leaves - 1);
        // every node below a root, levels non-decreasing upward
        for node in 0..tree.get_nodes_number() {
            if let Some(parent) = tree.get_parent(node) {
                assert!(parent > node);
                assert!(tree.get_node_level(parent) >= tree.get_node_level(node));
            }
        }
    }
}

#[test]
fn test_random_edge_lists_round_trip_through_the_altitude_tree() {
    let mut rng = StdRng::seed_from_u64(0xfeed);
    for _ in 0..30 {
        let leaves = rng.gen_range(2..24) as NodeT;
        let edges_number = rng.gen_range(1..80);
        let mut edges = Vec::new();
        for _ in 0..edges_number {
            let a = rng.gen_range(0..leaves);
            let b = rng.gen_range(0..leaves);
            if a != b {
                edges.push((a, b, rng.gen_range(0..6) as u8));
            }
        }
        if edges.is_empty() {
            continue;
        }
        let alpha = build_from_edge_list(leaves, &edges).unwrap();
        let altitude = build_altitude_from_edge_list(leaves, &edges, true).unwrap();
        assert_eq!(
            alpha.get_components_number(),
            altitude.get_components_number()
        );
        for a in 0..leaves {
            for b in (a + 1)..leaves {
                assert_eq!(alpha.get_merge_level(a, b), altitude.get_merge_level(a, b));
            }
        }
    }
}

#[test]
fn test_trees_over_random_images_pass_the_default_suite() {
    for seed in 0..5 {
        let (width, height) = (12 + seed as u32 * 7, 9 + seed as u32 * 5);
        let image = random_image(width, height, seed);
        let size = RasterSize::new(width, height);
        let alpha = Tree::<u8>::build_alpha(
            size,
            Connectivity::C4,
            absolute_difference(&image, width),
            &BuildOptions::default(),
        )
        .unwrap();
        default_test_suite(&alpha).unwrap();
        let report = alpha.report();
        assert_eq!(report["roots_number"], "1");
        assert!(report.contains_key("height"));
        assert!(report.contains_key("min_level"));
    }
}

#[test]
fn test_children_lists_can_be_skipped() {
    let image = random_image(10, 10, 5);
    let tree = Tree::<u8>::build_alpha(
        RasterSize::new(10, 10),
        Connectivity::C4,
        absolute_difference(&image, 10),
        &BuildOptions {
            child_list: false,
            ..BuildOptions::default()
        },
    )
    .unwrap();
    assert!(tree.must_have_children_lists().is_err());
    assert!(tree.check_invariants().is_ok());
}

#[test]
fn test_height_of_a_weight_chain_is_the_chain_length() {
    // distinct weights along a path build one component per edge
    let edges: Vec<(NodeT, NodeT, u8)> = (0..9).map(|i| (i, i + 1, i as u8)).collect();
    let tree = build_from_edge_list(10, &edges).unwrap();
    assert_eq!(tree.get_components_number(), 9);
    assert_eq!(tree.get_height(), 9);
    let dfs_count = {
        let mut count = 0;
        tree.for_each_dfs(|_| count += 1, |_| {}, |_| {});
        count
    };
    assert_eq!(dfs_count, tree.get_components_number());
}
