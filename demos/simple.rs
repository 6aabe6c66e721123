use grid_util::grid::Grid;
use grid_util::point::Point;
use pipe_routing::RoutingGrid;

// In this example a route is found on a 3x3 grid with shape
//  ___
// |S  |
// | # |
// |  E|
//  ___
// where
// - # marks an obstacle
// - S marks the start
// - E marks the end
//
// Cells have a 4-neighborhood

fn main() {
    let mut grid = RoutingGrid::new(3, 3, false);
    grid.set(1, 1, true);
    grid.generate_components();
    println!("{}", grid);
    let start = Point::new(0, 0);
    let end = Point::new(2, 2);
    let route = grid.find_path(start, end).unwrap();
    println!("Route:");
    for p in route {
        println!("{:?}", p);
    }
}
