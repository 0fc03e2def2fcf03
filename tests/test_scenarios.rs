extern crate imgtree;
use imgtree::test_utilities::*;
use imgtree::*;

/// Eight leaves, three weight layers, with redundant edges sprinkled in.
fn scenario_edges() -> Vec<(NodeT, NodeT, u8)> {
    vec![
        (0, 1, 0),
        (0, 4, 0),
        (6, 7, 0),
        (3, 7, 1),
        (4, 5, 1),
        (1, 2, 2),
        (0, 1, 2),
        (5, 6, 2),
        (1, 5, 2),
        (2, 6, 3),
    ]
}

#[test]
fn test_alpha_tree_of_layered_edge_list() {
    let tree = build_from_edge_list(8, &scenario_edges()).unwrap();
    default_test_suite(&tree).unwrap();
    assert_eq!(tree.get_leaves_number(), 8);
    assert_eq!(tree.get_roots_number(), 1);
    // the last edge closes a cycle: everything is connected at weight 2
    assert_eq!(tree.get_components_number(), 5);
    let mut levels = tree.get_component_levels().to_vec();
    levels.sort_unstable();
    assert_eq!(levels, vec![0, 0, 1, 1, 2]);
    let root = tree.get_roots()[0];
    assert_eq!(tree.get_node_level(root), 2);
    assert!(tree.get_height() <= 4);
    // pixels 0 and 1 touch at weight 0, 1 and 5 only through 0-4-5
    assert_eq!(tree.get_merge_level(0, 1), Some(0));
    assert_eq!(tree.get_merge_level(0, 4), Some(0));
    assert_eq!(tree.get_merge_level(1, 5), Some(1));
    assert_eq!(tree.get_merge_level(3, 7), Some(1));
    assert_eq!(tree.get_merge_level(2, 6), Some(2));
}

#[test]
fn test_alpha_tree_of_uniform_edge_list() {
    let edges: Vec<(NodeT, NodeT, u8)> = scenario_edges()
        .into_iter()
        .map(|(a, b, _)| (a, b, 0))
        .collect();
    let tree = build_from_edge_list(8, &edges).unwrap();
    default_test_suite(&tree).unwrap();
    // a single component at weight zero adopts every leaf directly
    assert_eq!(tree.get_components_number(), 1);
    assert_eq!(tree.get_component_level(0), 0);
    assert_eq!(tree.get_children(0).len(), 8);
    assert_eq!(tree.get_height(), 1);
}

#[test]
fn test_alpha_forest_of_disconnected_edge_list() {
    // dropping the two bridges leaves {0,1,2,4,5} and {3,6,7} apart
    let edges: Vec<(NodeT, NodeT, u8)> = scenario_edges()
        .into_iter()
        .filter(|&(a, b, _)| !(a == 5 && b == 6) && !(a == 2 && b == 6))
        .collect();
    let mut builder = AlphaTreeBuilder::new(8).unwrap();
    let expected_roots = vec![7, 6, 5, 4, 3, 2, 2, 2];
    for (&(a, b, w), &roots) in edges.iter().zip(expected_roots.iter()) {
        builder.add_edge(a, b, w);
        assert_eq!(builder.get_roots_number(), roots);
    }
    let tree = builder.finish(true);
    default_test_suite(&tree).unwrap();
    assert_eq!(tree.get_roots_number(), 2);
    assert_eq!(tree.get_merge_level(0, 2), Some(2));
    assert_eq!(tree.get_merge_level(3, 6), Some(1));
    // leaves of different trees never meet
    assert_eq!(tree.get_merge_level(0, 3), None);
    assert_eq!(tree.get_merge_level(5, 7), None);
}

#[test]
fn test_altitude_tree_of_layered_edge_list() {
    let tree = build_altitude_from_edge_list(8, &scenario_edges(), false).unwrap();
    default_test_suite(&tree).unwrap();
    // one binary component per accepted edge
    assert_eq!(tree.get_components_number(), 7);
    assert_eq!(tree.get_roots_number(), 1);
    for c in 0..tree.get_components_number() {
        assert_eq!(tree.get_children(c).len(), 2);
    }
}

#[test]
fn test_canonicalised_altitude_tree_matches_alpha_tree() {
    let alpha = build_from_edge_list(8, &scenario_edges()).unwrap();
    let altitude = build_altitude_from_edge_list(8, &scenario_edges(), true).unwrap();
    assert_eq!(
        alpha.get_components_number(),
        altitude.get_components_number()
    );
    for a in 0..8 {
        for b in (a + 1)..8 {
            assert_eq!(
                alpha.get_merge_level(a, b),
                altitude.get_merge_level(a, b),
                "leaves {} and {} merge at different levels",
                a,
                b
            );
        }
    }
}

#[test]
fn test_distinct_weights_make_alpha_and_altitude_agree() {
    let edges: Vec<(NodeT, NodeT, u8)> = (0..7).map(|i| (i, i + 1, i as u8)).collect();
    let alpha = build_from_edge_list(8, &edges).unwrap();
    let altitude = build_altitude_from_edge_list(8, &edges, false).unwrap();
    assert_eq!(alpha.get_components_number(), 7);
    assert_eq!(altitude.get_components_number(), 7);
    for a in 0..8 {
        for b in (a + 1)..8 {
            assert_eq!(alpha.get_merge_level(a, b), altitude.get_merge_level(a, b));
        }
    }
}

#[test]
fn test_edge_list_builders_handle_trivial_inputs() {
    let tree = build_from_edge_list(0, &[]).unwrap();
    assert_eq!(tree.get_nodes_number(), 0);
    assert_eq!(tree.get_roots_number(), 0);
    let tree = build_from_edge_list(1, &[]).unwrap();
    assert_eq!(tree.get_leaves_number(), 1);
    assert_eq!(tree.get_components_number(), 0);
    assert_eq!(tree.get_roots_number(), 1);
}
