use super::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Returns a grayscale image whose intensity grows with `x + y`.
pub fn ramp_image(width: u32, height: u32) -> Vec<u8> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| ((x + y) % 256) as u8))
        .collect()
}

/// Returns a grayscale image with a single intensity everywhere.
pub fn constant_image(width: u32, height: u32, value: u8) -> Vec<u8> {
    vec![value; width as usize * height as usize]
}

/// Returns a reproducible random grayscale image.
pub fn random_image(width: u32, height: u32, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width as usize * height as usize)
        .map(|_| rng.gen())
        .collect()
}

/// Returns the absolute grayscale difference weight functor over the
/// given image.
pub fn absolute_difference(image: &[u8], width: u32) -> impl Fn(Point, Point) -> u8 + Send + Sync + '_ {
    move |a: Point, b: Point| {
        let ia = (a.y * width + a.x) as usize;
        let ib = (b.y * width + b.x) as usize;
        (image[ia] as i16 - image[ib] as i16).abs() as u8
    }
}

/// Builds an alpha-tree straight from an explicit edge list, sorting it
/// stably by weight first.
pub fn build_from_edge_list(
    leaves_number: NodeT,
    edges: &[(NodeT, NodeT, u8)],
) -> Result<Tree<u8>, String> {
    let mut sorted = edges.to_vec();
    sorted.sort_by_key(|edge| edge.2);
    let mut builder = AlphaTreeBuilder::new(leaves_number)?;
    for &(a, b, w) in &sorted {
        builder.add_edge(a, b, w);
    }
    Ok(builder.finish(true))
}

/// Builds an altitude-tree straight from an explicit edge list.
pub fn build_altitude_from_edge_list(
    leaves_number: NodeT,
    edges: &[(NodeT, NodeT, u8)],
    canonicalize: bool,
) -> Result<Tree<u8>, String> {
    let mut sorted = edges.to_vec();
    sorted.sort_by_key(|edge| edge.2);
    let mut builder = AltitudeTreeBuilder::new(leaves_number)?;
    for &(a, b, w) in &sorted {
        builder.add_edge(a, b, w);
    }
    Ok(builder.finish(canonicalize, true))
}

/// Runs the standard battery of structural checks on a finished tree.
pub fn default_test_suite<W: Weight>(tree: &Tree<W>) -> Result<(), String> {
    tree.check_invariants()?;
    tree.must_have_children_lists()?;
    let report = tree.report();
    if report["leaves_number"] != tree.get_leaves_number().to_string() {
        return Err("The report disagrees with the tree on the leaf count.".to_string());
    }
    if tree.get_components_number() > 0 && tree.get_height() == 0 {
        return Err("A tree with components cannot have height zero.".to_string());
    }
    // merge levels are symmetric
    if tree.get_leaves_number() >= 2 && tree.get_roots_number() == 1 {
        let a = 0;
        let b = tree.get_leaves_number() - 1;
        if tree.get_merge_level(a, b) != tree.get_merge_level(b, a) {
            return Err("Merge levels are not symmetric.".to_string());
        }
    }
    Ok(())
}
