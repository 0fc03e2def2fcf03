use super::parallel;
use super::utils::get_loading_bar;
use super::*;
use indicatif::ProgressIterator;
use log::{info, warn};

/// Hard cap on the recursive split depth of the parallel driver.
pub const MAX_PARALLEL_DEPTH: u32 = 16;

/// Options recognised by the tree builders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Maximum recursive split depth; zero builds sequentially.
    pub depth: u32,
    /// Optional inner extraction tile for cache locality.
    pub tile: Option<(u32, u32)>,
    /// Whether to build the `child_offset`/`children` lists.
    pub child_list: bool,
    /// Whether to show a loading bar while consuming edges.
    pub verbose: bool,
}

impl Default for BuildOptions {
    fn default() -> BuildOptions {
        BuildOptions {
            depth: 0,
            tile: None,
            child_list: true,
            verbose: false,
        }
    }
}

impl BuildOptions {
    /// Returns options with a split depth matching the machine's
    /// logical cores.
    pub fn parallel() -> BuildOptions {
        let cores = num_cpus::get().max(1) as u32;
        BuildOptions {
            depth: (32 - cores.leading_zeros()).min(MAX_PARALLEL_DEPTH),
            ..BuildOptions::default()
        }
    }

    fn validate(&self, size: RasterSize, connectivity: Connectivity) -> Result<(), String> {
        if size.width == 0 || size.height == 0 {
            return Err(format!(
                "The image dimensions must be positive, {}x{} was provided.",
                size.width, size.height
            ));
        }
        if size.get_vertices_number() > (NodeT::MAX / 2) as u64 {
            return Err(format!(
                "The image has {} pixels, which does not leave room for the component arena within 32-bit node indices.",
                size.get_vertices_number()
            ));
        }
        if self.depth > MAX_PARALLEL_DEPTH {
            return Err(format!(
                "The requested split depth ({}) is higher than the maximum supported one ({}).",
                self.depth, MAX_PARALLEL_DEPTH
            ));
        }
        if self.depth > 0 && connectivity != Connectivity::C4 {
            return Err(
                "Parallel builds only support 4-connectivity: the border connectors of a split cover exactly the straight edges crossing it."
                    .to_string(),
            );
        }
        if let Some((tile_width, tile_height)) = self.tile {
            if tile_width == 0 || tile_height == 0 {
                return Err(format!(
                    "The extraction tile dimensions must be positive, {}x{} was provided.",
                    tile_width, tile_height
                ));
            }
        }
        Ok(())
    }
}

/// # Tree constructors.
impl<W: Weight> Tree<W> {
    /// Builds the alpha-tree of the image graph described by the weight
    /// functor.
    ///
    /// Sequential when `options.depth` is zero, divide-and-merge
    /// parallel otherwise.
    ///
    /// # Arguments
    /// * `size`: RasterSize - Dimensions of the image.
    /// * `connectivity`: Connectivity - Neighbourhood of each pixel.
    /// * `weight`: F - Pure, total, deterministic pixel-pair weight.
    /// * `options`: &BuildOptions - Depth, tiling and output options.
    pub fn build_alpha<F>(
        size: RasterSize,
        connectivity: Connectivity,
        weight: F,
        options: &BuildOptions,
    ) -> Result<Tree<W>, String>
    where
        F: Fn(Point, Point) -> W + Send + Sync,
    {
        options.validate(size, connectivity)?;
        info!(
            "building alpha-tree over {}x{} pixels ({} edges, depth {})",
            size.width,
            size.height,
            size.get_edges_number(connectivity),
            options.depth
        );
        if options.depth == 0 {
            build_alpha_sequential(size, connectivity, weight, options)
        } else {
            parallel::build_alpha_parallel(
                size,
                options.tile,
                weight,
                options.depth,
                options.child_list,
            )
        }
    }

    /// Sequential alpha-tree build that additionally labels every edge of
    /// the sorted stream with the component its endpoints met in.
    ///
    /// Returns the tree and the labels, aligned with the sorted edge
    /// order; the labels stay valid through redirect resolution and
    /// compaction.
    pub fn build_alpha_with_edge_components<F>(
        size: RasterSize,
        connectivity: Connectivity,
        weight: F,
        options: &BuildOptions,
    ) -> Result<(Tree<W>, Vec<NodeT>), String>
    where
        F: Fn(Point, Point) -> W + Send + Sync,
    {
        options.validate(size, connectivity)?;
        if options.depth != 0 {
            return Err(
                "Edge-to-component tables are only produced by sequential builds.".to_string(),
            );
        }
        let rect = size.as_rect();
        let edges = get_sorted_edges(rect, options.tile, connectivity, &weight);
        let leaves = size.get_vertices_number() as NodeT;
        let mut builder = AlphaTreeBuilder::new(leaves)?;
        let mut edge_comps = Vec::with_capacity(edges.len());
        let pb = get_loading_bar(options.verbose, "Building alpha-tree", edges.len());
        for edge in edges.iter().progress_with(pb) {
            let comp = match builder.add_edge(edge.source, edge.destination, edge.weight) {
                Some(node) => node - leaves,
                None => builder.get_component_of(edge.source) - leaves,
            };
            edge_comps.push(comp);
        }
        let tree = builder.finish_with_edge_components(&mut edge_comps, options.child_list);
        Ok((tree, edge_comps))
    }

    /// Builds the altitude-tree (binary partition tree) of the image
    /// graph: one binary component per accepted edge, in weight order.
    ///
    /// Altitude builds are sequential; a non-zero depth is accepted for
    /// signature parity with [`Self::build_alpha`] and ignored.
    pub fn build_altitude<F>(
        size: RasterSize,
        connectivity: Connectivity,
        weight: F,
        options: &BuildOptions,
    ) -> Result<Tree<W>, String>
    where
        F: Fn(Point, Point) -> W + Send + Sync,
    {
        options.validate(size, connectivity)?;
        if options.depth > 0 {
            warn!(
                "altitude-tree builds are sequential; ignoring depth {}",
                options.depth
            );
        }
        info!(
            "building altitude-tree over {}x{} pixels ({} edges)",
            size.width,
            size.height,
            size.get_edges_number(connectivity)
        );
        let rect = size.as_rect();
        let edges = get_sorted_edges(rect, options.tile, connectivity, &weight);
        let leaves = size.get_vertices_number() as NodeT;
        let mut builder = AltitudeTreeBuilder::new(leaves)?;
        let pb = get_loading_bar(options.verbose, "Building altitude-tree", edges.len());
        for edge in edges.iter().progress_with(pb) {
            if builder.get_roots_number() == 1 {
                break;
            }
            builder.add_edge(edge.source, edge.destination, edge.weight);
        }
        Ok(builder.finish(false, options.child_list))
    }
}

fn build_alpha_sequential<W, F>(
    size: RasterSize,
    connectivity: Connectivity,
    weight: F,
    options: &BuildOptions,
) -> Result<Tree<W>, String>
where
    W: Weight,
    F: Fn(Point, Point) -> W,
{
    let rect = size.as_rect();
    let edges = get_sorted_edges(rect, options.tile, connectivity, &weight);
    let leaves = size.get_vertices_number() as NodeT;
    let mut builder = AlphaTreeBuilder::new(leaves)?;
    let pb = get_loading_bar(options.verbose, "Building alpha-tree", edges.len());
    for edge in edges.iter().progress_with(pb) {
        if builder.get_roots_number() == 1 {
            break;
        }
        builder.add_edge(edge.source, edge.destination, edge.weight);
    }
    Ok(builder.finish(options.child_list))
}
