//! Round setup and play logic for the pipe-connection game.
//!
//! A round scatters obstacles on a square grid between a random start and end
//! cell. In [Auto](Mode::Auto) mode the route is computed by
//! [find_path](RoutingGrid::find_path) when [play](PipeGame::play) is called; in
//! [Manual](Mode::Manual) mode the caller builds the route one cell at a time
//! with [extend_route](PipeGame::extend_route). Rendering and input handling are
//! left to the caller.

use grid_util::grid::Grid;
use grid_util::point::Point;
use log::info;
use rand::Rng;

use crate::RoutingGrid;
use core::fmt;

/// Default side length of the round grid.
pub const GRID_SIZE: usize = 10;
/// Default number of blocked cells placed each round.
pub const NUM_OBSTACLES: usize = 15;

/// How the route gets built during a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// The solver builds the route when [play](PipeGame::play) is called.
    Auto,
    /// The caller extends the route cell by cell.
    Manual,
}

/// Outcome of evaluating a round: either the route connects start to end, or no
/// route was found. There are no other cases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    Win,
    NoPath,
}

/// One round of the pipe-connection game: a grid with obstacles, a start and an
/// end cell, and the route built so far. An L-shaped guide corridor between the
/// endpoints is kept free of obstacles so the endpoints always stay connected.
#[derive(Clone, Debug)]
pub struct PipeGame {
    pub grid: RoutingGrid,
    pub start: Point,
    pub end: Point,
    pub mode: Mode,
    route: Vec<Point>,
    guide: Vec<Point>,
    win: bool,
}

impl PipeGame {
    /// Sets up a round on a `size` x `size` grid with `n_obstacles` blocked cells.
    pub fn new<R: Rng>(size: usize, n_obstacles: usize, mode: Mode, rng: &mut R) -> PipeGame {
        let mut game = PipeGame {
            grid: RoutingGrid::new(size, size, false),
            start: Point::new(0, 0),
            end: Point::new(0, 0),
            mode,
            route: Vec::new(),
            guide: Vec::new(),
            win: false,
        };
        game.setup(n_obstacles, rng);
        game
    }

    /// Starts a fresh round on the same grid dimensions: new endpoints, new
    /// obstacles, cleared route.
    pub fn reset<R: Rng>(&mut self, n_obstacles: usize, rng: &mut R) {
        let size = self.grid.width();
        self.grid = RoutingGrid::new(size, size, false);
        self.route.clear();
        self.win = false;
        self.setup(n_obstacles, rng);
    }

    /// Switches the play mode and starts a fresh round.
    pub fn change_mode<R: Rng>(&mut self, mode: Mode, n_obstacles: usize, rng: &mut R) {
        self.mode = mode;
        self.reset(n_obstacles, rng);
    }

    fn setup<R: Rng>(&mut self, n_obstacles: usize, rng: &mut R) {
        self.randomize_endpoints(rng);
        self.guide = self.generate_guide();
        self.place_obstacles(n_obstacles, rng);
        self.grid.generate_components();
    }

    /// Draws distinct start and end cells uniformly at random.
    fn randomize_endpoints<R: Rng>(&mut self, rng: &mut R) {
        let size = self.grid.width() as i32;
        loop {
            self.start = Point::new(rng.gen_range(0..size), rng.gen_range(0..size));
            self.end = Point::new(rng.gen_range(0..size), rng.gen_range(0..size));
            if self.start != self.end {
                break;
            }
        }
    }

    /// An L-shaped corridor from start to end: along the x axis on the start's
    /// row, then along the y axis on the end's column.
    fn generate_guide(&self) -> Vec<Point> {
        let mut guide = Vec::new();
        let (x1, y1) = (self.start.x, self.start.y);
        let (x2, y2) = (self.end.x, self.end.y);
        if x1 < x2 {
            guide.extend((x1..=x2).map(|x| Point::new(x, y1)));
        } else if x1 > x2 {
            guide.extend((x2..=x1).rev().map(|x| Point::new(x, y1)));
        }
        let vertical: Vec<i32> = if y1 < y2 {
            (y1..=y2).collect()
        } else if y1 > y2 {
            (y2..=y1).rev().collect()
        } else {
            Vec::new()
        };
        for y in vertical {
            let p = Point::new(x2, y);
            if !guide.contains(&p) {
                guide.push(p);
            }
        }
        guide
    }

    /// Scatters blocked cells uniformly at random, avoiding the guide corridor
    /// and both endpoints. The requested count is capped by the number of
    /// placeable cells so placement always terminates.
    fn place_obstacles<R: Rng>(&mut self, n_obstacles: usize, rng: &mut R) {
        let size = self.grid.width() as i32;
        let placeable = self.grid.width() * self.grid.height() - self.guide.len();
        let target = n_obstacles.min(placeable);
        let mut placed = 0;
        while placed < target {
            let p = Point::new(rng.gen_range(0..size), rng.gen_range(0..size));
            if self.is_valid_obstacle(&p) {
                self.grid.set(p.x as usize, p.y as usize, true);
                placed += 1;
            }
        }
    }

    fn is_valid_obstacle(&self, p: &Point) -> bool {
        !self.grid.get(p.x as usize, p.y as usize)
            && *p != self.start
            && *p != self.end
            && !self.guide.contains(p)
    }

    /// Evaluates the round. In [Auto](Mode::Auto) mode the solver first computes
    /// the route from start to end; in [Manual](Mode::Manual) mode the route
    /// built so far is judged as is. The round is won exactly when the route
    /// contains the end cell.
    pub fn play(&mut self) -> PlayOutcome {
        if self.mode == Mode::Auto {
            match self.grid.find_path(self.start, self.end) {
                Some(route) => self.route = route,
                None => {
                    info!("No route from {} to {}", self.start, self.end);
                    self.route.clear();
                }
            }
        }
        if self.route.contains(&self.end) {
            self.win = true;
            PlayOutcome::Win
        } else {
            PlayOutcome::NoPath
        }
    }

    /// Extends the route with `cell` in manual mode. Blocked cells and cells
    /// already on the route are rejected. Reaching the end cell wins the round
    /// and freezes the route. Returns whether the cell was accepted.
    pub fn extend_route(&mut self, cell: Point) -> bool {
        if self.mode != Mode::Manual || self.win {
            return false;
        }
        if !self.grid.can_move_to(cell) || self.route.contains(&cell) {
            return false;
        }
        self.route.push(cell);
        if cell == self.end {
            self.win = true;
        }
        true
    }

    /// The route built so far, start first.
    pub fn route(&self) -> &[Point] {
        &self.route
    }

    /// Whether the current route connects start to end.
    pub fn won(&self) -> bool {
        self.win
    }
}

impl fmt::Display for PipeGame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.grid.height() as i32 {
            for x in 0..self.grid.width() as i32 {
                let p = Point::new(x, y);
                let c = if p == self.start {
                    'S'
                } else if p == self.end {
                    'E'
                } else if self.grid.get(x as usize, y as usize) {
                    '#'
                } else if self.route.contains(&p) {
                    '*'
                } else {
                    '.'
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic;
    use rand::prelude::*;

    #[test]
    fn endpoints_distinct_and_open() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let game = PipeGame::new(GRID_SIZE, NUM_OBSTACLES, Mode::Auto, &mut rng);
            assert_ne!(game.start, game.end);
            assert!(game.grid.can_move_to(game.start));
            assert!(game.grid.can_move_to(game.end));
        }
    }

    /// The guide corridor stays clear, so start and end are always connected.
    #[test]
    fn guide_corridor_stays_clear() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let game = PipeGame::new(GRID_SIZE, NUM_OBSTACLES, Mode::Auto, &mut rng);
            for p in &game.guide {
                assert!(game.grid.can_move_to(*p));
            }
            assert!(game.grid.reachable(&game.start, &game.end));
        }
    }

    #[test]
    fn obstacle_count_matches() {
        let mut rng = StdRng::seed_from_u64(7);
        let game = PipeGame::new(GRID_SIZE, NUM_OBSTACLES, Mode::Auto, &mut rng);
        let blocked = (0..GRID_SIZE)
            .flat_map(|x| (0..GRID_SIZE).map(move |y| (x, y)))
            .filter(|&(x, y)| game.grid.get(x, y))
            .count();
        assert_eq!(blocked, NUM_OBSTACLES);
    }

    /// Without obstacles the solver descends straight to the end cell.
    #[test]
    fn obstacle_free_round_is_won() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut game = PipeGame::new(GRID_SIZE, 0, Mode::Auto, &mut rng);
            assert_eq!(game.play(), PlayOutcome::Win);
            assert!(game.won());
            assert_eq!(game.route().first(), Some(&game.start));
            assert_eq!(game.route().last(), Some(&game.end));
            assert_eq!(
                game.route().len() as i32,
                heuristic(&game.start, &game.end) + 1
            );
        }
    }

    /// Whatever the outcome, a found route is well formed and the round state is
    /// consistent with it.
    #[test]
    fn play_outcome_matches_route() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut game = PipeGame::new(GRID_SIZE, NUM_OBSTACLES, Mode::Auto, &mut rng);
            match game.play() {
                PlayOutcome::Win => {
                    assert!(game.won());
                    assert_eq!(game.route().first(), Some(&game.start));
                    assert_eq!(game.route().last(), Some(&game.end));
                    for pair in game.route().windows(2) {
                        assert_eq!(heuristic(&pair[0], &pair[1]), 1);
                    }
                }
                PlayOutcome::NoPath => {
                    assert!(!game.won());
                    assert!(game.route().is_empty());
                }
            }
        }
    }

    /// Identically seeded rounds play out identically.
    #[test]
    fn rounds_are_deterministic() {
        let mut rng_a = StdRng::seed_from_u64(3);
        let mut rng_b = StdRng::seed_from_u64(3);
        let mut game_a = PipeGame::new(GRID_SIZE, NUM_OBSTACLES, Mode::Auto, &mut rng_a);
        let mut game_b = PipeGame::new(GRID_SIZE, NUM_OBSTACLES, Mode::Auto, &mut rng_b);
        assert_eq!(game_a.start, game_b.start);
        assert_eq!(game_a.end, game_b.end);
        assert_eq!(game_a.play(), game_b.play());
        assert_eq!(game_a.route(), game_b.route());
    }

    #[test]
    fn manual_route_rejects_blocked_and_repeated_cells() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut game = PipeGame::new(GRID_SIZE, NUM_OBSTACLES, Mode::Manual, &mut rng);
        let blocked = (0..GRID_SIZE as i32)
            .flat_map(|x| (0..GRID_SIZE as i32).map(move |y| Point::new(x, y)))
            .find(|p| !game.grid.can_move_to(*p))
            .unwrap();
        assert!(!game.extend_route(blocked));
        assert!(game.extend_route(game.start));
        assert!(!game.extend_route(game.start));
        assert_eq!(game.route(), &[game.start]);
    }

    /// Walking the guide corridor by hand wins the round, after which the route
    /// is frozen.
    #[test]
    fn manual_round_won_on_reaching_end() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut game = PipeGame::new(GRID_SIZE, NUM_OBSTACLES, Mode::Manual, &mut rng);
        for cell in game.guide.clone() {
            assert!(game.extend_route(cell));
        }
        assert!(game.won());
        assert_eq!(game.play(), PlayOutcome::Win);
        let len = game.route().len();
        assert!(!game.extend_route(game.start));
        assert_eq!(game.route().len(), len);
    }

    /// Auto mode ignores manual extension; manual mode ignores the solver.
    #[test]
    fn modes_are_exclusive() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut game = PipeGame::new(GRID_SIZE, 0, Mode::Auto, &mut rng);
        assert!(!game.extend_route(game.start));
        game.change_mode(Mode::Manual, 0, &mut rng);
        assert!(game.route().is_empty());
        assert_eq!(game.play(), PlayOutcome::NoPath);
    }

    #[test]
    fn reset_clears_round() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut game = PipeGame::new(GRID_SIZE, 0, Mode::Auto, &mut rng);
        assert_eq!(game.play(), PlayOutcome::Win);
        game.reset(NUM_OBSTACLES, &mut rng);
        assert!(!game.won());
        assert!(game.route().is_empty());
        assert_ne!(game.start, game.end);
    }
}
