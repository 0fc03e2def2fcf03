use super::*;

/// Pixel coordinates, scanned row by row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Point {
        Point { x, y }
    }
}

/// Dimensions of an image understood as a planar graph of pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterSize {
    pub width: u32,
    pub height: u32,
}

impl RasterSize {
    pub fn new(width: u32, height: u32) -> RasterSize {
        RasterSize { width, height }
    }

    /// Returns the number of graph vertices, one per pixel.
    pub fn get_vertices_number(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns the number of graph edges under the given connectivity.
    pub fn get_edges_number(&self, connectivity: Connectivity) -> u64 {
        if self.width == 0 || self.height == 0 {
            return 0;
        }
        let (w, h) = (self.width as u64, self.height as u64);
        w * (h - 1) + (w - 1) * h + connectivity.get_diagonals_number() * (w - 1) * (h - 1)
    }

    pub fn as_rect(&self) -> Rect {
        Rect {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }
}

/// Axis-aligned rectangle of pixels inside an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> RasterSize {
        RasterSize {
            width: self.width,
            height: self.height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }
}

/// Variants of pixel connectivity.
///
/// `C6P` adds the top-left to bottom-right diagonal to the 4-connected
/// grid, `C6N` the other one, `C8` both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connectivity {
    C4,
    C6P,
    C6N,
    C8,
}

impl Connectivity {
    /// Number of diagonal neighbours per pixel pair block.
    pub fn get_diagonals_number(&self) -> u64 {
        match self {
            Connectivity::C4 => 0,
            Connectivity::C6P | Connectivity::C6N => 1,
            Connectivity::C8 => 2,
        }
    }

    pub(crate) fn has_positive_diagonal(&self) -> bool {
        matches!(self, Connectivity::C6P | Connectivity::C8)
    }

    pub(crate) fn has_negative_diagonal(&self) -> bool {
        matches!(self, Connectivity::C6N | Connectivity::C8)
    }
}

/// Row-major index of a point inside the whole image.
pub fn point_id(point: Point, size: RasterSize) -> NodeT {
    debug_assert!(point.x < size.width);
    debug_assert!(point.y < size.height);
    (point.y as u64 * size.width as u64 + point.x as u64) as NodeT
}

/// Row-major index of a point relative to a rectangle.
pub fn point_id_in(point: Point, rect: Rect) -> NodeT {
    debug_assert!(rect.contains(point));
    ((point.y - rect.y) as u64 * rect.width as u64 + (point.x - rect.x) as u64) as NodeT
}

/// Inverse of [`point_id`].
pub fn id_to_point(id: NodeT, size: RasterSize) -> Point {
    debug_assert!(size.width > 0);
    Point {
        x: id % size.width,
        y: id / size.width,
    }
}
