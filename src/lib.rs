//! # pipe_routing
//!
//! A grid-based pathfinding system for pipe-connection puzzles. Implements
//! [hill climbing](https://en.wikipedia.org/wiki/Hill_climbing) on the
//! [Manhattan distance](https://en.wikipedia.org/wiki/Taxicab_geometry) with
//! exhaustive backtracking at local maxima, so the search recovers from dead
//! ends instead of giving up. Note that the path found is not guaranteed to be
//! the shortest one. Pre-computes
//! [connected components](https://en.wikipedia.org/wiki/Component_(graph_theory))
//! to avoid flood-filling behaviour if no path exists.
pub mod game;
mod hillclimb;

use grid_util::grid::{BoolGrid, Grid};
use grid_util::point::Point;
use log::info;
use petgraph::unionfind::UnionFind;

use crate::hillclimb::hillclimb;
use core::fmt;

/// Cardinal neighbour offsets in the order left, right, up, down. The enumeration
/// order decides which of several equally close neighbours is committed to during
/// descent and in which order branches are explored at a local maximum.
const NEIGHBOUR_ORDER: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Heuristic distance between two cells: the Manhattan distance. Admissible, but
/// only used as a greedy descent signal, never for optimality guarantees.
pub fn heuristic(a: &Point, b: &Point) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// [RoutingGrid] maintains information about components using a [UnionFind] structure in addition
/// to the raw [bool] grid values in the [BoolGrid] that determine whether a cell is blocked
/// ([true]) or open ([false]). Implements [Grid] by building on [BoolGrid].
#[derive(Clone, Debug)]
pub struct RoutingGrid {
    pub grid: BoolGrid,
    pub components: UnionFind<usize>,
    pub components_dirty: bool,
}

impl Default for RoutingGrid {
    fn default() -> RoutingGrid {
        RoutingGrid {
            grid: BoolGrid::default(),
            components: UnionFind::new(0),
            components_dirty: false,
        }
    }
}

impl RoutingGrid {
    /// The up to four orthogonally adjacent cells of `point` that lie on the grid,
    /// enumerated left, right, up, down.
    pub fn neighbours(&self, point: &Point) -> Vec<Point> {
        NEIGHBOUR_ORDER
            .iter()
            .map(|&(dx, dy)| Point::new(point.x + dx, point.y + dy))
            .filter(|p| self.in_bounds(p.x, p.y))
            .collect()
    }
    fn open_neighbours(&self, point: &Point) -> Vec<Point> {
        self.neighbours(point)
            .into_iter()
            .filter(|p| self.can_move_to(*p))
            .collect()
    }
    pub fn can_move_to(&self, pos: Point) -> bool {
        self.in_bounds(pos.x, pos.y) && !self.grid.get(pos.x as usize, pos.y as usize)
    }
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && self.grid.index_in_bounds(x as usize, y as usize)
    }
    /// Retrieves the component id a given [Point] belongs to.
    pub fn get_component(&self, point: &Point) -> usize {
        self.components.find(self.get_ix_point(point))
    }
    /// Checks if start and goal are on the same component.
    pub fn reachable(&self, start: &Point, goal: &Point) -> bool {
        !self.unreachable(start, goal)
    }
    /// Checks if start and goal are not on the same component.
    pub fn unreachable(&self, start: &Point, goal: &Point) -> bool {
        if self.in_bounds(start.x, start.y) && self.in_bounds(goal.x, goal.y) {
            let start_ix = self.get_ix_point(start);
            let goal_ix = self.get_ix_point(goal);
            if self.components.equiv(start_ix, goal_ix) {
                false
            } else {
                info!("{} and {} are not equivalent components", start_ix, goal_ix);
                true
            }
        } else {
            true
        }
    }
    /// Computes a path from start to goal by greedy descent on [heuristic] with
    /// backtracking at local maxima. Returns the cells of the path in order, start
    /// first and goal last, or [None] when the search exhausts every reachable
    /// branch. A failed search is a normal negative result, not an error.
    ///
    /// Expects components to be up to date (see [update](Self::update)); start and
    /// goal in different components short-circuit to [None] without searching.
    pub fn find_path(&self, start: Point, goal: Point) -> Option<Vec<Point>> {
        if self.unreachable(&start, &goal) {
            info!("{} is not reachable from {}", goal, start);
            return None;
        }
        info!("{} is reachable from {}, computing path", goal, start);
        hillclimb(
            &start,
            |node| self.open_neighbours(node),
            |point| heuristic(point, &goal),
            |point| *point == goal,
        )
    }
    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            info!("Components are dirty: regenerating components");
            self.generate_components();
        }
    }
    /// Generates a new [UnionFind] structure and links up grid neighbours to the same components.
    pub fn generate_components(&mut self) {
        info!("Generating connected components");
        let w = self.grid.width;
        let h = self.grid.height;
        self.components = UnionFind::new(w * h);
        self.components_dirty = false;
        for x in 0..w {
            for y in 0..h {
                if !self.grid.get(x, y) {
                    let parent_ix = self.grid.get_ix(x, y);
                    let point = Point::new(x as i32, y as i32);
                    // Linking the right and down neighbours covers the full
                    // 4-neighbourhood over the whole sweep
                    let neighbours = vec![
                        Point::new(point.x + 1, point.y),
                        Point::new(point.x, point.y + 1),
                    ]
                    .into_iter()
                    .filter(|p| self.grid.point_in_bounds(*p) && !self.grid.get_point(*p))
                    .map(|p| self.grid.get_ix(p.x as usize, p.y as usize))
                    .collect::<Vec<usize>>();
                    for ix in neighbours {
                        self.components.union(parent_ix, ix);
                    }
                }
            }
        }
    }
}

impl fmt::Display for RoutingGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Grid:")?;
        for y in 0..self.grid.height {
            let values = (0..self.grid.width)
                .map(|x| self.grid.get(x, y) as i32)
                .collect::<Vec<i32>>();
            writeln!(f, "{:?}", values)?;
        }
        Ok(())
    }
}

impl Grid<bool> for RoutingGrid {
    fn new(width: usize, height: usize, default_value: bool) -> Self {
        RoutingGrid {
            grid: BoolGrid::new(width, height, default_value),
            components: UnionFind::new(width * height),
            components_dirty: false,
        }
    }
    fn get(&self, x: usize, y: usize) -> bool {
        self.grid.get(x, y)
    }
    /// Updates a position on the grid. Joins newly connected components and flags the components
    /// as dirty if components are (potentially) broken apart into multiple.
    fn set(&mut self, x: usize, y: usize, blocked: bool) {
        let p = Point::new(x as i32, y as i32);
        if self.grid.get(x, y) != blocked && blocked {
            self.components_dirty = true;
        } else {
            for n in self.open_neighbours(&p) {
                self.components.union(
                    self.grid.get_ix(x, y),
                    self.grid.get_ix(n.x as usize, n.y as usize),
                );
            }
        }
        self.grid.set(x, y, blocked);
    }
    fn width(&self) -> usize {
        self.grid.width()
    }
    fn height(&self) -> usize {
        self.grid.height()
    }
}
