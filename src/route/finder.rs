use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::RouteConfig;

use super::grid::{Cell, CellCoord, OccupancyGrid};

/// Cost of one orthogonal step.
const ORTHO_COST: u32 = 10;
/// Cost of one diagonal step (~sqrt(2) * orthogonal).
const DIAG_COST: u32 = 14;

/// When the search may cut corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagonalPolicy {
    Never,
    /// Diagonal steps only where both adjacent orthogonal cells are free
    /// of shapes, so routes never clip a corner of an obstacle.
    WhenNoObstacle,
    Always,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct SearchEntry {
    cost: u32,
    col: usize,
    row: usize,
}

impl Ord for SearchEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| self.row.cmp(&other.row))
            .then_with(|| self.col.cmp(&other.col))
    }
}

impl PartialOrd for SearchEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Uniform-cost shortest path from `start` to `end` over the grid.
///
/// Dijkstra rather than heuristic search: cells carrying existing route
/// traffic have nonuniform soft costs, and correctness under those costs
/// is required. The search is bounded by `config.max_steps`; on budget
/// exhaustion or an enclosed destination the result is empty, which is a
/// normal outcome the caller degrades from (never an error).
///
/// Cells on the returned path are marked as traffic in the grid, so a
/// second search over the same grid tends to avoid self-intersection
/// (best effort, not a guarantee).
pub fn find_path(
    grid: &mut OccupancyGrid,
    start: CellCoord,
    end: CellCoord,
    config: &RouteConfig,
) -> Vec<CellCoord> {
    if start == end {
        return vec![start];
    }

    let cols = grid.cols();
    let rows = grid.rows();
    let traffic_cost = config.traffic_cost.saturating_mul(ORTHO_COST);
    let max_steps = config.max_steps.max(1);

    let mut best_cost = vec![u32::MAX; cols * rows];
    let mut prev: Vec<Option<usize>> = vec![None; cols * rows];
    let mut heap = BinaryHeap::new();

    let start_idx = start.1 * cols + start.0;
    best_cost[start_idx] = 0;
    heap.push(SearchEntry {
        cost: 0,
        col: start.0,
        row: start.1,
    });

    let mut steps = 0usize;
    let mut reached = false;

    while let Some(SearchEntry { cost, col, row }) = heap.pop() {
        steps += 1;
        if steps > max_steps {
            debug!("path search exhausted {} step budget", max_steps);
            break;
        }
        let idx = row * cols + col;
        if cost != best_cost[idx] {
            continue;
        }
        if (col, row) == end {
            reached = true;
            break;
        }

        for &(dx, dy) in neighbor_offsets(config.diagonal) {
            let ncol = col as i64 + dx as i64;
            let nrow = row as i64 + dy as i64;
            if ncol < 0 || nrow < 0 || ncol >= cols as i64 || nrow >= rows as i64 {
                continue;
            }
            let (ncol, nrow) = (ncol as usize, nrow as usize);
            let diagonal = dx != 0 && dy != 0;
            // The destination cell is always enterable; the endpoint may
            // sit on the boundary of a shape the grid marked blocked.
            if (ncol, nrow) != end {
                if grid.cell(ncol, nrow) == Some(Cell::Shape) {
                    continue;
                }
                if diagonal
                    && config.diagonal == DiagonalPolicy::WhenNoObstacle
                    && (grid.cell(ncol, row) == Some(Cell::Shape)
                        || grid.cell(col, nrow) == Some(Cell::Shape))
                {
                    continue;
                }
            }

            let mut next_cost =
                cost.saturating_add(if diagonal { DIAG_COST } else { ORTHO_COST });
            if grid.cell(ncol, nrow) == Some(Cell::Traffic) {
                next_cost = next_cost.saturating_add(traffic_cost);
            }
            let next_idx = nrow * cols + ncol;
            if next_cost >= best_cost[next_idx] {
                continue;
            }
            best_cost[next_idx] = next_cost;
            prev[next_idx] = Some(idx);
            heap.push(SearchEntry {
                cost: next_cost,
                col: ncol,
                row: nrow,
            });
        }
    }

    if !reached {
        return Vec::new();
    }

    let mut path: Vec<CellCoord> = Vec::new();
    let mut cursor = end.1 * cols + end.0;
    loop {
        path.push((cursor % cols, cursor / cols));
        match prev[cursor] {
            Some(parent) => cursor = parent,
            None => break,
        }
    }
    path.reverse();

    for &(col, row) in &path {
        grid.mark_traffic(col, row);
    }

    path
}

fn neighbor_offsets(policy: DiagonalPolicy) -> &'static [(i32, i32)] {
    const ORTHO: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
    const ALL: [(i32, i32); 8] = [
        (0, -1),
        (0, 1),
        (-1, 0),
        (1, 0),
        (-1, -1),
        (1, -1),
        (-1, 1),
        (1, 1),
    ];
    match policy {
        DiagonalPolicy::Never => &ORTHO,
        _ => &ALL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect};

    const CELL: f32 = 25.0;

    fn open_grid() -> OccupancyGrid {
        OccupancyGrid::generate(Rect::new(0.0, 0.0, 250.0, 250.0), CELL, &[], &[])
    }

    #[test]
    fn open_grid_path_is_monotonic_toward_destination() {
        let mut grid = open_grid();
        let start = (0usize, 0usize);
        let end = (8usize, 5usize);
        let path = find_path(&mut grid, start, end, &RouteConfig::default());
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&end));
        let remaining = |(col, row): CellCoord| {
            (col as i64 - end.0 as i64).unsigned_abs() + (row as i64 - end.1 as i64).unsigned_abs()
        };
        for pair in path.windows(2) {
            assert!(
                remaining(pair[1]) < remaining(pair[0]),
                "backtracking step {:?} -> {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn path_avoids_shape_cells() {
        let region = Rect::new(0.0, 0.0, 250.0, 250.0);
        let wall = Rect::new(100.0, 0.0, 50.0, 200.0);
        let mut grid = OccupancyGrid::generate(region, CELL, &[wall], &[]);
        let start = grid.cell_near(Point::new(10.0, 10.0));
        let end = grid.cell_near(Point::new(240.0, 10.0));
        let path = find_path(&mut grid, start, end, &RouteConfig::default());
        assert!(!path.is_empty());
        for &(col, row) in &path {
            assert_ne!(
                grid.cell(col, row),
                Some(Cell::Shape),
                "waypoint in blocked cell"
            );
        }
    }

    #[test]
    fn fully_walled_destination_yields_empty_path() {
        let region = Rect::new(0.0, 0.0, 250.0, 250.0);
        // Wall spanning the full region height with no gaps.
        let wall = Rect::new(100.0, -50.0, 50.0, 400.0);
        let mut grid = OccupancyGrid::generate(region, CELL, &[wall], &[]);
        let start = grid.cell_near(Point::new(10.0, 125.0));
        let end = grid.cell_near(Point::new(240.0, 125.0));
        let path = find_path(&mut grid, start, end, &RouteConfig::default());
        assert!(path.is_empty());
    }

    #[test]
    fn traffic_cells_are_avoided_when_a_clean_lane_exists() {
        let region = Rect::new(0.0, 0.0, 250.0, 125.0);
        let occupied: Vec<Point> = (0..10)
            .map(|i| Point::new(i as f32 * CELL + 12.0, 62.0))
            .collect();
        let mut grid = OccupancyGrid::generate(region, CELL, &[], &[&occupied]);
        let start = grid.cell_near(Point::new(10.0, 62.0));
        let end = grid.cell_near(Point::new(240.0, 62.0));
        let config = RouteConfig {
            diagonal: DiagonalPolicy::Never,
            ..RouteConfig::default()
        };
        let path = find_path(&mut grid, start, end, &config);
        assert!(!path.is_empty());
        let through_traffic = path
            .iter()
            .filter(|&&(col, row)| {
                // Start and end sit on the congested row themselves.
                (col, row) != start && (col, row) != end && row == start.1
            })
            .count();
        assert!(
            through_traffic < 8,
            "path hugged the congested lane for {through_traffic} cells"
        );
    }

    #[test]
    fn exhausted_budget_returns_best_effort_empty() {
        let mut grid = open_grid();
        let config = RouteConfig {
            max_steps: 2,
            ..RouteConfig::default()
        };
        let path = find_path(&mut grid, (0, 0), (9, 9), &config);
        assert!(path.is_empty());
    }
}
