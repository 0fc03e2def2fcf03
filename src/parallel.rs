use super::*;
use std::cmp::Ordering;

/// Tiles whose long side is at or below this are built sequentially.
const SPLIT_FLOOR: u32 = 64;

/// A finished, compact sub-tree over one tile rectangle, together with
/// the union-find that still knows the component of every one of its
/// leaves. Leaf ids are relative to the rectangle.
pub(crate) struct TilePartial<W: Weight> {
    rect: Rect,
    tree: Tree<W>,
    finder: RootFinder,
}

/// Splits a rectangle along its longer side.
///
/// Vertical split columns are aligned up to a 64 pixel multiple so that
/// the two workers never write leaf slots sharing a cache line.
fn split_rect(rect: Rect) -> Option<(Rect, Rect, bool)> {
    if rect.width.max(rect.height) <= SPLIT_FLOOR {
        return None;
    }
    if rect.width > rect.height {
        let w2 = ((rect.width / 2 + 63) & !63).min(rect.width - 1);
        Some((
            Rect::new(rect.x, rect.y, w2, rect.height),
            Rect::new(rect.x + w2, rect.y, rect.width - w2, rect.height),
            true,
        ))
    } else {
        let h2 = rect.height / 2;
        Some((
            Rect::new(rect.x, rect.y, rect.width, h2),
            Rect::new(rect.x, rect.y + h2, rect.width, rect.height - h2),
            false,
        ))
    }
}

/// Maps a leaf id local to `from` onto the id space of `to`.
fn remap_leaf(local: NodeT, from: Rect, to: Rect) -> NodeT {
    let x = from.x + local % from.width;
    let y = from.y + local / from.width;
    point_id_in(Point::new(x, y), to)
}

/// Merge-phase state over the union of two absorbed tile arenas.
///
/// On top of the arena it tracks per-component child counts (the arena
/// has no child lists yet) and the redirect map recording which
/// components were folded into which; both feed the level finalisation.
pub(crate) struct MergeBuilder<W: Weight> {
    rect: Rect,
    tree: Tree<W>,
    finder: RootFinder,
    redirect: Vec<NodeT>,
    child_count: Vec<NodeT>,
    root_count: NodeT,
}

impl<W: Weight> MergeBuilder<W> {
    /// Takes unique ownership of both tile arenas and concatenates them
    /// into a fresh arena over the union rectangle.
    ///
    /// The tiles address disjoint pixel sets, so leaf slots transfer by
    /// rectangle arithmetic alone; the second tile's component indices
    /// are fixed up by a base offset. Capacity reserves two components
    /// per connector edge, the worst case of the zip.
    pub(crate) fn absorb(
        a: TilePartial<W>,
        b: TilePartial<W>,
        rect: Rect,
        connectors_number: usize,
    ) -> MergeBuilder<W> {
        let leaves_number = (rect.width as u64 * rect.height as u64) as NodeT;
        let ca = a.tree.get_components_number();
        let cb = b.tree.get_components_number();
        let comp_capacity = ca + cb + 2 * connectors_number as NodeT;
        let mut tree = Tree::with_capacity(leaves_number, comp_capacity);
        let mut finder = RootFinder::new(leaves_number);
        let root_count = a.tree.get_roots_number() + b.tree.get_roots_number();
        ingest(&mut tree, &mut finder, &a, rect, 0);
        ingest(&mut tree, &mut finder, &b, rect, ca);
        tree.node_count = leaves_number + ca + cb;
        let mut child_count = vec![0 as NodeT; comp_capacity as usize];
        let mark = tree.root_mark();
        for i in 0..tree.node_count as usize {
            let p = tree.parent[i];
            if p != mark {
                child_count[p as usize] += 1;
            }
        }
        MergeBuilder {
            rect,
            tree,
            finder,
            redirect: (0..=comp_capacity).collect(),
            child_count,
            root_count,
        }
    }

    fn leaves_number(&self) -> NodeT {
        self.tree.leaf_count
    }

    pub(crate) fn get_roots_number(&self) -> NodeT {
        self.root_count
    }

    /// Chases the redirect map to the surviving component, compressing
    /// the visited path.
    fn resolve_comp(&mut self, c: NodeT) -> NodeT {
        let mut r = c;
        while self.redirect[r as usize] != r {
            r = self.redirect[r as usize];
        }
        let mut i = c;
        while i != r {
            let next = self.redirect[i as usize];
            self.redirect[i as usize] = r;
            i = next;
        }
        r
    }

    fn resolve_node(&mut self, n: NodeT) -> NodeT {
        if n < self.leaves_number() {
            n
        } else {
            let lc = self.leaves_number();
            lc + self.resolve_comp(n - lc)
        }
    }

    fn level(&self, n: NodeT) -> W {
        debug_assert!(!self.tree.is_leaf(n));
        self.tree.comp_level[(n - self.leaves_number()) as usize]
    }

    /// Resolved parent of a node, `None` for roots.
    fn parent_of(&mut self, n: NodeT) -> Option<NodeT> {
        let p = self.tree.parent[n as usize];
        if p == self.tree.root_mark() {
            None
        } else {
            let lc = self.leaves_number();
            Some(lc + self.resolve_comp(p))
        }
    }

    fn alloc(&mut self, level: W) -> NodeT {
        self.tree.alloc_component(level)
    }

    /// Links `child` under the component `parent`.
    fn attach(&mut self, child: NodeT, parent: NodeT) {
        debug_assert!(!self.tree.is_leaf(parent));
        let c = parent - self.leaves_number();
        self.tree.parent[child as usize] = c;
        self.child_count[c as usize] += 1;
    }

    /// Detaches a node from its parent, returning the resolved former
    /// parent.
    fn detach(&mut self, child: NodeT) -> Option<NodeT> {
        let p = self.tree.parent[child as usize];
        self.tree.parent[child as usize] = self.tree.root_mark();
        if p == self.tree.root_mark() {
            None
        } else {
            let lc = self.leaves_number();
            let parent = lc + self.resolve_comp(p);
            self.child_count[(parent - lc) as usize] -= 1;
            Some(parent)
        }
    }

    fn relink(&mut self, child: NodeT, new_parent: NodeT) -> Option<NodeT> {
        let old = self.detach(child);
        self.attach(child, new_parent);
        old
    }

    /// Folds the component `dead` into `survivor` of the same level; its
    /// children follow through the redirect map at finalisation.
    fn fold(&mut self, dead: NodeT, survivor: NodeT) {
        debug_assert_ne!(dead, survivor);
        debug_assert_eq!(
            self.level(dead).cmp_weight(&self.level(survivor)),
            Ordering::Equal
        );
        self.detach(dead);
        let lc = self.leaves_number();
        let d = (dead - lc) as usize;
        debug_assert_eq!(self.redirect[d], dead - lc);
        self.redirect[d] = survivor - lc;
        self.child_count[(survivor - lc) as usize] += self.child_count[d];
        self.tree.invalid_count += 1;
    }

    /// Drops an emptied component; nothing redirects into it, so its
    /// redirect entry just points past it for the validity sweep.
    fn drop_empty(&mut self, dead: NodeT) -> NodeT {
        debug_assert_eq!(self.child_count[(dead - self.leaves_number()) as usize], 0);
        let parent = self.detach(dead);
        let parent = parent.expect("an emptied component cannot be the only root");
        let lc = self.leaves_number();
        self.redirect[(dead - lc) as usize] = parent - lc;
        self.tree.invalid_count += 1;
        parent
    }

    /// Inserts a fresh component at weight `w` between `n` and its
    /// parent when `n` sits strictly below `w`; otherwise returns `n`.
    fn lift_above(&mut self, n: NodeT, w: W) -> NodeT {
        if self.level(n).cmp_weight(&w) == Ordering::Less {
            let m = self.alloc(w);
            let lc = self.leaves_number();
            // m takes n's slot under n's parent, then adopts n
            self.tree.parent[m as usize] = self.tree.parent[n as usize];
            self.tree.parent[n as usize] = m - lc;
            self.child_count[(m - lc) as usize] = 1;
            m
        } else {
            n
        }
    }

    fn child_count_of(&self, n: NodeT) -> NodeT {
        self.child_count[(n - self.leaves_number()) as usize]
    }

    /// Merges the two sub-tree roots above leaves `a` and `b` for a
    /// connector of weight `w`.
    ///
    /// This is the root-level variant of the sequential step: the lift
    /// targets the union-find root instead of the layer watermark, and
    /// equal-level roots adopt the one with more children. Returns the
    /// common root.
    pub(crate) fn merge_roots(&mut self, a: NodeT, b: NodeT, w: W) -> NodeT {
        let ha = self.finder.find_update(a);
        let hb = self.finder.find_update(b);
        if ha == hb {
            let data = self.finder.get_data(ha);
            return self.resolve_node(data);
        }
        let data_a = self.finder.get_data(ha);
        let data_b = self.finder.get_data(hb);
        let mut na = self.resolve_node(data_a);
        let mut nb = self.resolve_node(data_b);
        debug_assert!(self.tree.is_root(na));
        debug_assert!(self.tree.is_root(nb));
        let lc = self.leaves_number();
        // keep na at or above nb; leaves sit below every component
        let swap = if na < lc {
            nb >= lc
        } else if nb < lc {
            false
        } else {
            self.level(na).cmp_weight(&self.level(nb)) == Ordering::Less
        };
        if swap {
            std::mem::swap(&mut na, &mut nb);
        }
        // lift the higher side to the connector weight
        if na < lc || self.level(na).cmp_weight(&w) == Ordering::Less {
            let m = self.alloc(w);
            self.attach(na, m);
            na = m;
        }
        // attach or fuse the lower side
        if nb < lc
            || self.level(nb).cmp_weight(&w) == Ordering::Less
            || self.level(nb).cmp_weight(&self.level(na)) == Ordering::Less
        {
            self.attach(nb, na);
        } else {
            // two roots at the same level: adopt the larger one
            if self.child_count_of(na) < self.child_count_of(nb) {
                std::mem::swap(&mut na, &mut nb);
            }
            self.fold(nb, na);
        }
        self.root_count -= 1;
        self.finder.merge_set(ha, hb, na);
        na
    }

    /// Returns true when the level of `n` does not exceed `w`, meaning a
    /// connector of weight `w` cannot restructure anything below `n`.
    pub(crate) fn is_level_at_most(&self, n: NodeT, w: W) -> bool {
        self.level(n).cmp_weight(&w) != Ordering::Greater
    }

    /// Zips the two leaf-to-root paths of a connector `(a, b, w)` so the
    /// merged tree reflects the connection at weight `w`.
    ///
    /// Both leaves already share a root whose level exceeds `w`. The
    /// three cases mirror the sequential invariants: create a fresh
    /// component below both paths, splice one leaf into the other path,
    /// or walk both paths synchronously and fuse where they meet.
    pub(crate) fn merge_paths(&mut self, a: NodeT, b: NodeT, w: W) {
        let mut la = a;
        let mut lb = b;
        let mut na = match self.parent_of(la) {
            Some(n) => n,
            None => return,
        };
        let mut nb = match self.parent_of(lb) {
            Some(n) => n,
            None => return,
        };
        if self.level(na).cmp_weight(&self.level(nb)) == Ordering::Less {
            std::mem::swap(&mut la, &mut lb);
            std::mem::swap(&mut na, &mut nb);
        }
        let mut pa = self.parent_of(na);
        let mut pb = self.parent_of(nb);
        if w.cmp_weight(&self.level(nb)) == Ordering::Less {
            // the connector sits strictly below both paths: both leaves
            // move under a fresh component spliced beneath nb
            let n = self.alloc(w);
            let old_a = self.relink(la, n);
            debug_assert_eq!(old_a, Some(na));
            let old_b = self.relink(lb, n);
            debug_assert_eq!(old_b, Some(nb));
            self.attach(n, nb);
            if na == nb {
                return;
            }
            if self.level(na).cmp_weight(&self.level(nb)) == Ordering::Equal {
                // the emptier sibling is folded into the fuller one
                if self.child_count_of(na) > self.child_count_of(nb) {
                    std::mem::swap(&mut na, &mut nb);
                    std::mem::swap(&mut pa, &mut pb);
                }
                let dead = na;
                na = pa.expect("equal-level distinct components cannot be the root");
                self.fold(dead, nb);
            }
        } else if self.level(na).cmp_weight(&w) == Ordering::Greater {
            // nb at or below the connector, na above it: walk b's path to
            // the insertion point and splice leaf a there
            loop {
                let p = pb.expect("paths must converge above the connector weight");
                if self.level(p).cmp_weight(&w) == Ordering::Greater {
                    break;
                }
                nb = p;
                pb = self.parent_of(nb);
            }
            nb = self.lift_above(nb, w);
            let old_a = self.relink(la, nb);
            debug_assert_eq!(old_a, Some(na));
        } else {
            // both paths start at or below the connector: advance them
            // synchronously until their parents rise above it
            if na == nb {
                return;
            }
            loop {
                let p = match pb {
                    Some(p) => p,
                    None => break,
                };
                if self.level(p).cmp_weight(&w) == Ordering::Greater {
                    break;
                }
                nb = p;
                pb = self.parent_of(nb);
                if na == nb {
                    return;
                }
                if self.level(na).cmp_weight(&self.level(nb)) == Ordering::Less {
                    std::mem::swap(&mut na, &mut nb);
                    std::mem::swap(&mut pa, &mut pb);
                }
            }
            loop {
                let p = match pa {
                    Some(p) => p,
                    None => break,
                };
                if self.level(p).cmp_weight(&w) == Ordering::Greater {
                    break;
                }
                na = p;
                pa = self.parent_of(na);
                if na == nb {
                    return;
                }
            }
            na = self.lift_above(na, w);
            if self.level(nb).cmp_weight(&w) == Ordering::Less {
                let old = self.relink(nb, na);
                nb = old.expect("a spliced path head always had a parent");
            } else {
                if self.child_count_of(na) < self.child_count_of(nb) {
                    std::mem::swap(&mut na, &mut nb);
                }
                let dead = nb;
                let after = self.parent_of(dead);
                self.fold(dead, na);
                nb = after.expect("a fused path head always had a parent");
            }
            std::mem::swap(&mut na, &mut nb);
        }
        // remove components that lost their last child along path a
        while self.child_count_of(na) == 0 {
            na = self.drop_empty(na);
        }
        debug_assert_ne!(na, nb);
        debug_assert_eq!(
            self.level(nb).cmp_weight(&self.level(na)),
            Ordering::Less
        );
        // zip the two ancestor chains, always advancing the lower one;
        // the spine grows bottom-up from nb
        let mut node = nb;
        let mut nb = match self.detach(node) {
            Some(p) => p,
            None => return,
        };
        loop {
            if na == nb {
                break;
            }
            let next = match self.level(na).cmp_weight(&self.level(nb)) {
                Ordering::Less => {
                    let x = na;
                    na = self.detach(x).expect("chains converge before the root");
                    x
                }
                Ordering::Greater => {
                    let x = nb;
                    nb = self.detach(x).expect("chains converge before the root");
                    x
                }
                Ordering::Equal => {
                    if self.child_count_of(na) < self.child_count_of(nb) {
                        std::mem::swap(&mut na, &mut nb);
                    }
                    let survivor = na;
                    na = self
                        .detach(survivor)
                        .expect("chains converge before the root");
                    let dead = nb;
                    let after = self.parent_of(dead);
                    self.fold(dead, survivor);
                    nb = after.expect("chains converge before the root");
                    survivor
                }
            };
            self.attach(node, next);
            node = next;
        }
        self.attach(node, nb);
    }

    /// Splices out components the seam zip left with a single component
    /// child.
    ///
    /// A tile can hold a component whose pixels all reconnect at a lower
    /// weight through the other tile; after the zip it keeps exactly one
    /// child, duplicates that child's pixel set at a higher level and has
    /// no counterpart in a sequential build. Runs after redirect
    /// resolution, so surviving parents are already final.
    fn drop_unary_components(&mut self) {
        const NONE: NodeT = NodeT::MAX;
        let lc = self.tree.leaf_count;
        let cc = self.tree.node_count - lc;
        let mark = self.tree.root_mark();
        let mut counts = vec![0 as NodeT; cc as usize];
        let mut only_child = vec![NONE; cc as usize];
        for i in 0..self.tree.node_count {
            if i >= lc && self.redirect[(i - lc) as usize] != i - lc {
                continue;
            }
            let p = self.tree.parent[i as usize];
            if p == mark {
                continue;
            }
            counts[p as usize] += 1;
            only_child[p as usize] = if counts[p as usize] == 1 { i } else { NONE };
        }
        for c in (0..cc).rev() {
            if self.redirect[c as usize] != c {
                continue;
            }
            if counts[c as usize] != 1 {
                continue;
            }
            let x = only_child[c as usize];
            if x == NONE || self.tree.is_leaf(x) {
                continue;
            }
            let node = lc + c;
            let praw = self.tree.parent[node as usize];
            self.tree.parent[x as usize] = praw;
            self.redirect[c as usize] = x - lc;
            self.tree.invalid_count += 1;
            if praw != mark && only_child[praw as usize] == node {
                only_child[praw as usize] = x;
            }
        }
    }

    /// Resolves the merge-phase redirects, drops seam-made unary chains,
    /// compacts the arena and remaps the carried union-find handles,
    /// turning the merge result back into a tile indistinguishable from a
    /// sequentially built one.
    ///
    /// Validity comes from the redirect map rather than the invalid
    /// parent marker: during a merge a component of the second tile may
    /// legitimately point at component `0` of the first.
    pub(crate) fn finish_level(mut self) -> TilePartial<W> {
        self.tree.resolve_redirects(&mut self.redirect);
        self.drop_unary_components();
        let lut = self.tree.compact(&self.redirect);
        let lc = self.tree.leaf_count;
        for i in 0..lc as usize {
            let d = self.finder.data[i];
            if d >= lc {
                // the unary sweep can extend redirect chains past the
                // compression the resolution pass did
                let mut c = self.redirect[(d - lc) as usize];
                while self.redirect[c as usize] != c {
                    c = self.redirect[c as usize];
                }
                self.finder.data[i] = lc + lut[c as usize];
            }
        }
        TilePartial {
            rect: self.rect,
            tree: self.tree,
            finder: self.finder,
        }
    }
}

/// Copies one tile arena into the union arena, remapping leaf ids by
/// rectangle arithmetic and offsetting component indices.
fn ingest<W: Weight>(
    tree: &mut Tree<W>,
    finder: &mut RootFinder,
    tile: &TilePartial<W>,
    rect: Rect,
    comp_offset: NodeT,
) {
    let union_lc = tree.leaf_count;
    let union_mark = tree.root_mark();
    let tile_lc = tile.tree.leaf_count;
    let tile_mark = tile.tree.root_mark();
    for local in 0..tile_lc {
        let u = remap_leaf(local, tile.rect, rect);
        let p = tile.tree.parent[local as usize];
        tree.parent[u as usize] = if p == tile_mark {
            union_mark
        } else {
            p + comp_offset
        };
        tree.leaf_level[u as usize] = tile.tree.leaf_level[local as usize];
        let up = tile.finder.parent[local as usize];
        finder.parent[u as usize] = if up >= tile_lc {
            // a root: carry the packed rank over
            union_lc + (up - tile_lc)
        } else {
            remap_leaf(up, tile.rect, rect)
        };
        let d = tile.finder.data[local as usize];
        finder.data[u as usize] = if d < tile_lc {
            remap_leaf(d, tile.rect, rect)
        } else {
            union_lc + (d - tile_lc) + comp_offset
        };
    }
    for c in 0..tile.tree.get_components_number() {
        let p = tile.tree.parent[(tile_lc + c) as usize];
        tree.parent[(union_lc + comp_offset + c) as usize] = if p == tile_mark {
            union_mark
        } else {
            p + comp_offset
        };
        tree.comp_level[(comp_offset + c) as usize] =
            tile.tree.comp_level[c as usize];
    }
}

/// Builds the alpha-tree of one rectangle, splitting and recursing while
/// depth remains and the rectangle is large enough, and otherwise
/// running the sequential builder over the tile.
fn build_tile<W, F>(
    rect: Rect,
    tile: Option<(u32, u32)>,
    weight: &F,
    depth: u32,
) -> Result<TilePartial<W>, String>
where
    W: Weight,
    F: Fn(Point, Point) -> W + Send + Sync,
{
    let split = if depth == 0 { None } else { split_rect(rect) };
    let (ra, rb, vertical) = match split {
        Some(split) => split,
        None => {
            let edges = get_sorted_edges(rect, tile, Connectivity::C4, weight);
            let leaves = (rect.width as u64 * rect.height as u64) as NodeT;
            let mut builder = AlphaTreeBuilder::new(leaves)?;
            for edge in &edges {
                if builder.get_roots_number() == 1 {
                    break;
                }
                builder.add_edge(edge.source, edge.destination, edge.weight);
            }
            return Ok(finish_tile(builder, rect));
        }
    };
    let (a, b) = rayon::join(
        || build_tile(ra, tile, weight, depth - 1),
        || build_tile(rb, tile, weight, depth - 1),
    );
    let (a, b) = (a?, b?);
    let connectors = if vertical {
        get_sorted_horizontal_connectors(ra.x + ra.width - 1, rect.y, rect.height, rect, weight)
    } else {
        get_sorted_vertical_connectors(rb.y - 1, rect.x, rect.width, rect, weight)
    };
    let mut builder = MergeBuilder::absorb(a, b, rect, connectors.len());
    let mut i = 0;
    let mut top: Option<NodeT> = None;
    while builder.get_roots_number() > 1 && i < connectors.len() {
        let edge = &connectors[i];
        let n = builder.merge_roots(edge.source, edge.destination, edge.weight);
        top = Some(n);
        i += 1;
        if builder.is_level_at_most(n, edge.weight) {
            continue;
        }
        builder.merge_paths(edge.source, edge.destination, edge.weight);
    }
    // a single root remains: stop as soon as no connector can lower it
    if let Some(top) = top {
        while i < connectors.len() {
            let edge = &connectors[i];
            if builder.is_level_at_most(top, edge.weight) {
                break;
            }
            builder.merge_paths(edge.source, edge.destination, edge.weight);
            i += 1;
        }
    }
    Ok(builder.finish_level())
}

/// Compacts a finished tile build while keeping its union-find alive for
/// the merges above it.
fn finish_tile<W: Weight>(builder: AlphaTreeBuilder<W>, rect: Rect) -> TilePartial<W> {
    let (mut tree, mut finder, mut redirect) = builder.into_parts();
    tree.resolve_redirects(&mut redirect);
    let lut = tree.compact(&redirect);
    let lc = tree.leaf_count;
    for i in 0..lc as usize {
        let d = finder.data[i];
        if d >= lc {
            let c = redirect[(d - lc) as usize];
            finder.data[i] = lc + lut[c as usize];
        }
    }
    TilePartial { rect, tree, finder }
}

/// Parallel divide-and-merge alpha-tree construction over the whole
/// image.
pub(crate) fn build_alpha_parallel<W, F>(
    size: RasterSize,
    tile: Option<(u32, u32)>,
    weight: F,
    depth: u32,
    child_list: bool,
) -> Result<Tree<W>, String>
where
    W: Weight,
    F: Fn(Point, Point) -> W + Send + Sync,
{
    let partial = build_tile(size.as_rect(), tile, &weight, depth)?;
    let mut tree = partial.tree;
    if child_list {
        tree.build_children();
    }
    Ok(tree)
}
