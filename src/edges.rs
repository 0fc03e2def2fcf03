use super::*;

/// Weighted edge of an image graph.
///
/// Endpoints are leaf indices relative to the rectangle the edge was
/// extracted from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge<W> {
    pub source: NodeT,
    pub destination: NodeT,
    pub weight: W,
}

/// Calls `f` for every edge of the rectangle, scanning row by row.
///
/// Each row first yields its horizontal edges, then the vertical and
/// diagonal edges towards the next row.
pub fn for_each_edge<F>(rect: Rect, connectivity: Connectivity, mut f: F)
where
    F: FnMut(Point, Point),
{
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    let last_x = rect.x + rect.width - 1;
    let last_y = rect.y + rect.height - 1;
    let mut y = rect.y;
    loop {
        for x in rect.x..last_x {
            f(Point::new(x, y), Point::new(x + 1, y));
        }
        if y >= last_y {
            break;
        }
        for x in rect.x..=last_x {
            f(Point::new(x, y), Point::new(x, y + 1));
            if connectivity.has_positive_diagonal() && x < last_x {
                f(Point::new(x, y), Point::new(x + 1, y + 1));
            }
            if connectivity.has_negative_diagonal() && x > rect.x {
                f(Point::new(x, y), Point::new(x - 1, y + 1));
            }
        }
        y += 1;
    }
}

/// Calls `f` for every edge of the rectangle, visiting it tile by tile.
///
/// Every edge is emitted exactly once, by the tile owning its first
/// endpoint; the order differs from [`for_each_edge`] but the coverage is
/// identical. Smaller tiles keep both extraction passes of the counting
/// sort within the cache.
pub fn for_each_edge_tiled<F>(rect: Rect, tile: (u32, u32), connectivity: Connectivity, mut f: F)
where
    F: FnMut(Point, Point),
{
    debug_assert!(tile.0 > 0 && tile.1 > 0);
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    let last_x = rect.x + rect.width - 1;
    let last_y = rect.y + rect.height - 1;
    let mut ty = rect.y;
    while ty <= last_y {
        let tile_last_y = ty.saturating_add(tile.1 - 1).min(last_y);
        let mut tx = rect.x;
        while tx <= last_x {
            let tile_last_x = tx.saturating_add(tile.0 - 1).min(last_x);
            for y in ty..=tile_last_y {
                for x in tx..=tile_last_x {
                    if x < last_x {
                        f(Point::new(x, y), Point::new(x + 1, y));
                    }
                    if y < last_y {
                        f(Point::new(x, y), Point::new(x, y + 1));
                        if connectivity.has_positive_diagonal() && x < last_x {
                            f(Point::new(x, y), Point::new(x + 1, y + 1));
                        }
                        if connectivity.has_negative_diagonal() && x > rect.x {
                            f(Point::new(x, y), Point::new(x - 1, y + 1));
                        }
                    }
                }
            }
            tx = tile_last_x + 1;
        }
        ty = tile_last_y + 1;
    }
}

fn scan_edges<F>(rect: Rect, tile: Option<(u32, u32)>, connectivity: Connectivity, f: F)
where
    F: FnMut(Point, Point),
{
    match tile {
        Some(tile) => for_each_edge_tiled(rect, tile, connectivity, f),
        None => for_each_edge(rect, connectivity, f),
    }
}

/// Extracts the edges of a rectangle and returns them sorted by
/// non-decreasing weight.
///
/// Endpoint ids are relative to the rectangle. Weights with a small
/// counting domain are sorted in O(E) with two extraction passes
/// (histogram, then placement); anything else goes through a stable
/// comparison sort. Both are stable, so equal weights keep extraction
/// order and the output is deterministic for a given input.
pub fn get_sorted_edges<W, F>(
    rect: Rect,
    tile: Option<(u32, u32)>,
    connectivity: Connectivity,
    weight: F,
) -> Vec<Edge<W>>
where
    W: Weight,
    F: Fn(Point, Point) -> W,
{
    let total = rect.size().get_edges_number(connectivity) as usize;
    if let Some(domain) = W::COUNTING_DOMAIN {
        let mut histogram = vec![0usize; domain];
        scan_edges(rect, tile, connectivity, |a, b| {
            histogram[weight(a, b).counting_key()] += 1;
        });
        // prefix sum into running cursors
        let mut cursors = vec![0usize; domain];
        let mut sum = 0usize;
        for (cursor, count) in cursors.iter_mut().zip(histogram.iter()) {
            *cursor = sum;
            sum += count;
        }
        debug_assert_eq!(sum, total);
        let mut edges = vec![
            Edge {
                source: 0,
                destination: 0,
                weight: W::default(),
            };
            total
        ];
        scan_edges(rect, tile, connectivity, |a, b| {
            let w = weight(a, b);
            let slot = cursors[w.counting_key()];
            cursors[w.counting_key()] += 1;
            edges[slot] = Edge {
                source: point_id_in(a, rect),
                destination: point_id_in(b, rect),
                weight: w,
            };
        });
        edges
    } else {
        let mut edges = Vec::with_capacity(total);
        scan_edges(rect, tile, connectivity, |a, b| {
            edges.push(Edge {
                source: point_id_in(a, rect),
                destination: point_id_in(b, rect),
                weight: weight(a, b),
            });
        });
        edges.sort_by(|a, b| a.weight.cmp_weight(&b.weight));
        edges
    }
}

/// Stable counting reorder for already extracted edges.
fn counting_reorder<W: Weight>(edges: Vec<Edge<W>>, domain: usize) -> Vec<Edge<W>> {
    let mut histogram = vec![0usize; domain];
    for edge in &edges {
        histogram[edge.weight.counting_key()] += 1;
    }
    let mut cursors = vec![0usize; domain];
    let mut sum = 0usize;
    for (cursor, count) in cursors.iter_mut().zip(histogram.iter()) {
        *cursor = sum;
        sum += count;
    }
    let mut sorted = vec![
        Edge {
            source: 0,
            destination: 0,
            weight: W::default(),
        };
        edges.len()
    ];
    for edge in edges {
        let slot = cursors[edge.weight.counting_key()];
        cursors[edge.weight.counting_key()] += 1;
        sorted[slot] = edge;
    }
    sorted
}

fn sort_connectors<W: Weight>(edges: Vec<Edge<W>>) -> Vec<Edge<W>> {
    match W::COUNTING_DOMAIN {
        Some(domain) => counting_reorder(edges, domain),
        None => {
            let mut edges = edges;
            edges.sort_by(|a, b| a.weight.cmp_weight(&b.weight));
            edges
        }
    }
}

/// Extracts the `height` edges crossing a vertical split between columns
/// `x` and `x + 1`, sorted by weight, with ids relative to `id_rect`.
pub fn get_sorted_horizontal_connectors<W, F>(
    x: u32,
    y: u32,
    height: u32,
    id_rect: Rect,
    weight: F,
) -> Vec<Edge<W>>
where
    W: Weight,
    F: Fn(Point, Point) -> W,
{
    let mut edges = Vec::with_capacity(height as usize);
    for i in 0..height {
        let a = Point::new(x, y + i);
        let b = Point::new(x + 1, y + i);
        edges.push(Edge {
            source: point_id_in(a, id_rect),
            destination: point_id_in(b, id_rect),
            weight: weight(a, b),
        });
    }
    sort_connectors(edges)
}

/// Extracts the `width` edges crossing a horizontal split between rows
/// `y` and `y + 1`, sorted by weight, with ids relative to `id_rect`.
pub fn get_sorted_vertical_connectors<W, F>(
    y: u32,
    x: u32,
    width: u32,
    id_rect: Rect,
    weight: F,
) -> Vec<Edge<W>>
where
    W: Weight,
    F: Fn(Point, Point) -> W,
{
    let mut edges = Vec::with_capacity(width as usize);
    for i in 0..width {
        let a = Point::new(x + i, y);
        let b = Point::new(x + i, y + 1);
        edges.push(Edge {
            source: point_id_in(a, id_rect),
            destination: point_id_in(b, id_rect),
            weight: weight(a, b),
        });
    }
    sort_connectors(edges)
}

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_edge_counts_match_formula() {
        for &connectivity in &[
            Connectivity::C4,
            Connectivity::C6P,
            Connectivity::C6N,
            Connectivity::C8,
        ] {
            for &(w, h) in &[(1u32, 1u32), (3, 1), (1, 4), (5, 4), (7, 7)] {
                let rect = Rect::new(0, 0, w, h);
                let mut count = 0u64;
                for_each_edge(rect, connectivity, |_, _| count += 1);
                assert_eq!(count, rect.size().get_edges_number(connectivity));
                let mut tiled = 0u64;
                for_each_edge_tiled(rect, (2, 2), connectivity, |_, _| tiled += 1);
                assert_eq!(tiled, count);
            }
        }
    }

    #[test]
    fn test_sorted_edges_are_sorted_and_deterministic() {
        let rect = Rect::new(0, 0, 6, 5);
        let weight = |a: Point, b: Point| ((a.x + b.y * 3 + b.x) % 7) as u8;
        let edges = get_sorted_edges(rect, None, Connectivity::C8, weight);
        assert_eq!(
            edges.len() as u64,
            rect.size().get_edges_number(Connectivity::C8)
        );
        for pair in edges.windows(2) {
            assert!(pair[0].weight <= pair[1].weight);
        }
        let again = get_sorted_edges(rect, None, Connectivity::C8, weight);
        assert_eq!(edges, again);
    }

    #[test]
    fn test_connectors_cross_the_split() {
        let rect = Rect::new(0, 0, 8, 4);
        let weight = |a: Point, b: Point| (a.x + a.y + b.x + b.y) as u8;
        let connectors = get_sorted_horizontal_connectors(3, 0, 4, rect, weight);
        assert_eq!(connectors.len(), 4);
        for edge in &connectors {
            assert_eq!(edge.destination, edge.source + 1);
        }
        let connectors = get_sorted_vertical_connectors(1, 0, 8, rect, weight);
        assert_eq!(connectors.len(), 8);
        for edge in &connectors {
            assert_eq!(edge.destination, edge.source + rect.width);
        }
    }
}
