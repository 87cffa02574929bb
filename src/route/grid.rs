use log::warn;

use crate::geometry::{Point, Rect};

/// Grid coordinate, `(column, row)`.
pub type CellCoord = (usize, usize);

/// Occupancy of one grid cell. `Shape` blocks hard; `Traffic` (a cell an
/// existing route already passes through) only carries a soft cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Free,
    Shape,
    Traffic,
}

/// Compute the search region for a routing request: the minimal rectangle
/// covering both endpoints, expanded to enclose every intersecting
/// obstacle with one cell of padding on each side.
///
/// Expansion runs to a fixed point (capped at `max_passes`): an obstacle
/// just outside the current bounds can itself pull the bounds outward and
/// expose further overlaps, so a single pass can under-expand.
pub fn build_search_bounds(
    a: Point,
    b: Point,
    obstacles: &[Rect],
    cell_size: f32,
    max_passes: usize,
) -> Rect {
    // Whichever point has the smaller coordinates becomes the start
    // corner; normalization covers all four quadrant cases.
    let mut bounds = Rect::from_points(a, b);

    for pass in 0..max_passes.max(1) {
        let mut changed = false;
        for obstacle in obstacles {
            if !bounds.intersects(obstacle) {
                continue;
            }
            let padded = obstacle.expanded(cell_size, cell_size);
            let grown = bounds.union(&padded);
            if grown != bounds {
                bounds = grown;
                changed = true;
            }
        }
        if !changed {
            return bounds;
        }
        if pass + 1 == max_passes.max(1) {
            warn!(
                "search bounds still growing after {} passes; routing inside {:?}",
                max_passes, bounds
            );
        }
    }
    bounds
}

/// A uniform occupancy grid over one search region. Ephemeral: rebuilt
/// for every routing request and discarded afterwards.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    region: Rect,
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl OccupancyGrid {
    /// Partition `region` into cells and mark occupancy. A cell is
    /// `Shape`-blocked if any obstacle overlaps it by more than zero
    /// area; waypoints of `routes` mark surviving cells as `Traffic`.
    ///
    /// Degenerate (zero-span) regions are widened to a minimum of one
    /// cell so the matrix is never empty.
    pub fn generate(region: Rect, cell_size: f32, obstacles: &[Rect], routes: &[&[Point]]) -> Self {
        let cell_size = cell_size.max(1.0);
        let mut region = region;
        if region.width <= 0.0 {
            region.x -= cell_size / 2.0;
            region.width = cell_size;
        }
        if region.height <= 0.0 {
            region.y -= cell_size / 2.0;
            region.height = cell_size;
        }

        let cols = (region.width / cell_size).ceil() as usize + 1;
        let rows = (region.height / cell_size).ceil() as usize + 1;
        let mut grid = Self {
            region,
            cell_size,
            cols,
            rows,
            cells: vec![Cell::Free; cols * rows],
        };

        for obstacle in obstacles {
            // Ceiling-rounded span of candidate cells, clamped to the grid.
            let start_col = (((obstacle.x - region.x) / cell_size).floor()).max(0.0) as usize;
            let start_row = (((obstacle.y - region.y) / cell_size).floor()).max(0.0) as usize;
            let end_col =
                ((((obstacle.right() - region.x) / cell_size).ceil()).max(0.0) as usize).min(cols);
            let end_row =
                ((((obstacle.bottom() - region.y) / cell_size).ceil()).max(0.0) as usize).min(rows);
            for row in start_row..end_row {
                for col in start_col..end_col {
                    let cell_rect = grid.cell_rect(col, row);
                    if obstacle.overlap_area(&cell_rect) > 0.0 {
                        grid.cells[row * cols + col] = Cell::Shape;
                    }
                }
            }
        }

        for route in routes {
            for point in route.iter() {
                if let Some((col, row)) = grid.cell_of(*point) {
                    grid.mark_traffic(col, row);
                }
            }
        }

        grid
    }

    pub fn region(&self) -> Rect {
        self.region
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Occupancy of a cell, or `None` outside the grid.
    pub fn cell(&self, col: usize, row: usize) -> Option<Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(self.cells[row * self.cols + col])
    }

    pub(crate) fn mark_traffic(&mut self, col: usize, row: usize) {
        let slot = &mut self.cells[row * self.cols + col];
        if *slot == Cell::Free {
            *slot = Cell::Traffic;
        }
    }

    fn cell_rect(&self, col: usize, row: usize) -> Rect {
        Rect::new(
            self.region.x + col as f32 * self.cell_size,
            self.region.y + row as f32 * self.cell_size,
            self.cell_size,
            self.cell_size,
        )
    }

    /// Exact cell containing `p`, or None when `p` lies outside the grid.
    pub fn cell_of(&self, p: Point) -> Option<CellCoord> {
        let col = ((p.x - self.region.x) / self.cell_size).floor();
        let row = ((p.y - self.region.y) / self.cell_size).floor();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some((col, row))
    }

    /// Cell for `p`, clamping inward by one cell when floor/ceiling
    /// mismatch at the far edges pushes the index out of bounds.
    pub fn cell_near(&self, p: Point) -> CellCoord {
        let col = ((p.x - self.region.x) / self.cell_size).floor().max(0.0) as usize;
        let row = ((p.y - self.region.y) / self.cell_size).floor().max(0.0) as usize;
        (col.min(self.cols - 1), row.min(self.rows - 1))
    }

    /// Continuous-space position of a cell: region origin plus a
    /// half-cell anchor offset, aligning routes with connector pills.
    pub fn point_at(&self, (col, row): CellCoord) -> Point {
        Point::new(
            self.region.x + col as f32 * self.cell_size + self.cell_size / 2.0,
            self.region.y + row as f32 * self.cell_size + self.cell_size / 2.0,
        )
    }
}
