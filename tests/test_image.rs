extern crate imgtree;
use imgtree::test_utilities::*;
use imgtree::*;

#[test]
fn test_constant_image_collapses_into_one_component() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (width, height) = (16, 12);
    let image = constant_image(width, height, 80);
    for &connectivity in &[Connectivity::C4, Connectivity::C8] {
        let tree = Tree::<u8>::build_alpha(
            RasterSize::new(width, height),
            connectivity,
            absolute_difference(&image, width),
            &BuildOptions::default(),
        )
        .unwrap();
        default_test_suite(&tree).unwrap();
        assert_eq!(tree.get_components_number(), 1);
        assert_eq!(tree.get_component_level(0), 0);
        assert_eq!(
            tree.get_children(0).len() as u64,
            RasterSize::new(width, height).get_vertices_number()
        );
    }
}

#[test]
fn test_ramp_image_has_a_single_weight_layer() {
    let (width, height) = (20, 9);
    let image = ramp_image(width, height);
    let tree = Tree::<u8>::build_alpha(
        RasterSize::new(width, height),
        Connectivity::C4,
        absolute_difference(&image, width),
        &BuildOptions::default(),
    )
    .unwrap();
    default_test_suite(&tree).unwrap();
    // every 4-connected neighbour differs by exactly one
    assert_eq!(tree.get_components_number(), 1);
    assert_eq!(tree.get_component_level(0), 1);
}

#[test]
fn test_random_image_invariants_across_connectivities() {
    let (width, height) = (23, 17);
    let image = random_image(width, height, 0x5eed);
    for &connectivity in &[
        Connectivity::C4,
        Connectivity::C6P,
        Connectivity::C6N,
        Connectivity::C8,
    ] {
        let tree = Tree::<u8>::build_alpha(
            RasterSize::new(width, height),
            connectivity,
            absolute_difference(&image, width),
            &BuildOptions::default(),
        )
        .unwrap();
        default_test_suite(&tree).unwrap();
        assert_eq!(tree.get_roots_number(), 1);
        assert!(tree.get_components_number() <= tree.get_leaves_number() - 1);
        let altitude = Tree::<u8>::build_altitude(
            RasterSize::new(width, height),
            connectivity,
            absolute_difference(&image, width),
            &BuildOptions::default(),
        )
        .unwrap();
        default_test_suite(&altitude).unwrap();
        assert_eq!(
            altitude.get_components_number(),
            altitude.get_leaves_number() - 1
        );
    }
}

#[test]
fn test_wider_weight_types_go_through_the_comparison_sort() {
    let (width, height) = (15, 11);
    let image = random_image(width, height, 99);
    let narrow = Tree::<u8>::build_alpha(
        RasterSize::new(width, height),
        Connectivity::C4,
        absolute_difference(&image, width),
        &BuildOptions::default(),
    )
    .unwrap();
    let wide = Tree::<f32>::build_alpha(
        RasterSize::new(width, height),
        Connectivity::C4,
        |a, b| {
            let w = width;
            let ia = (a.y * w + a.x) as usize;
            let ib = (b.y * w + b.x) as usize;
            (image[ia] as f32 - image[ib] as f32).abs()
        },
        &BuildOptions::default(),
    )
    .unwrap();
    default_test_suite(&wide).unwrap();
    // same partitions, just another weight representation
    assert_eq!(narrow.get_components_number(), wide.get_components_number());
    for a in 0..narrow.get_leaves_number() {
        let b = (a * 7 + 3) % narrow.get_leaves_number();
        if a == b {
            continue;
        }
        assert_eq!(
            narrow.get_merge_level(a, b).map(|w| w as f32),
            wide.get_merge_level(a, b)
        );
    }
}

#[test]
fn test_extraction_tile_does_not_change_the_partitions() {
    let (width, height) = (33, 21);
    let image = random_image(width, height, 7);
    let plain = Tree::<u8>::build_alpha(
        RasterSize::new(width, height),
        Connectivity::C4,
        absolute_difference(&image, width),
        &BuildOptions::default(),
    )
    .unwrap();
    let tiled = Tree::<u8>::build_alpha(
        RasterSize::new(width, height),
        Connectivity::C4,
        absolute_difference(&image, width),
        &BuildOptions {
            tile: Some((8, 8)),
            ..BuildOptions::default()
        },
    )
    .unwrap();
    assert_eq!(plain.get_components_number(), tiled.get_components_number());
    assert_eq!(plain.get_leaf_levels(), tiled.get_leaf_levels());
}

#[test]
fn test_edge_component_labels_point_at_common_ancestors() {
    let (width, height) = (16, 16);
    let image = random_image(width, height, 1234);
    let size = RasterSize::new(width, height);
    let (tree, labels) = Tree::<u8>::build_alpha_with_edge_components(
        size,
        Connectivity::C4,
        absolute_difference(&image, width),
        &BuildOptions::default(),
    )
    .unwrap();
    let edges = get_sorted_edges(
        size.as_rect(),
        None,
        Connectivity::C4,
        absolute_difference(&image, width),
    );
    assert_eq!(labels.len(), edges.len());
    let is_ancestor = |component: NodeT, leaf: NodeT| -> bool {
        let target = component + tree.get_leaves_number();
        let mut node = leaf;
        while let Some(parent) = tree.get_parent(node) {
            if parent == target {
                return true;
            }
            node = parent;
        }
        false
    };
    for (edge, &label) in edges.iter().zip(labels.iter()) {
        assert!(label < tree.get_components_number());
        assert!(is_ancestor(label, edge.source));
        assert!(is_ancestor(label, edge.destination));
        // the component the endpoints met in cannot sit above the edge
        assert!(tree.get_component_level(label) <= edge.weight);
    }
}

#[test]
fn test_invalid_configurations_are_rejected_before_building() {
    let image = constant_image(4, 4, 0);
    let weight = absolute_difference(&image, 4);
    assert!(Tree::<u8>::build_alpha(
        RasterSize::new(0, 4),
        Connectivity::C4,
        &weight,
        &BuildOptions::default()
    )
    .is_err());
    assert!(Tree::<u8>::build_alpha(
        RasterSize::new(4, 0),
        Connectivity::C4,
        &weight,
        &BuildOptions::default()
    )
    .is_err());
    assert!(Tree::<u8>::build_alpha(
        RasterSize::new(4, 4),
        Connectivity::C4,
        &weight,
        &BuildOptions {
            depth: MAX_PARALLEL_DEPTH + 1,
            ..BuildOptions::default()
        }
    )
    .is_err());
    assert!(Tree::<u8>::build_alpha(
        RasterSize::new(4, 4),
        Connectivity::C8,
        &weight,
        &BuildOptions {
            depth: 1,
            ..BuildOptions::default()
        }
    )
    .is_err());
    assert!(Tree::<u8>::build_alpha(
        RasterSize::new(4, 4),
        Connectivity::C4,
        &weight,
        &BuildOptions {
            tile: Some((0, 8)),
            ..BuildOptions::default()
        }
    )
    .is_err());
    assert!(Tree::<u8>::build_alpha_with_edge_components(
        RasterSize::new(4, 4),
        Connectivity::C4,
        &weight,
        &BuildOptions {
            depth: 1,
            ..BuildOptions::default()
        }
    )
    .is_err());
}
