use pipe_routing::game::{Mode, PipeGame, PlayOutcome, GRID_SIZE, NUM_OBSTACLES};
use rand::prelude::*;

// Plays one automatic round of the pipe-connection game: random start and end
// cells, random obstacles, and the hill-climbing solver connecting the two.

fn main() {
    let mut rng = StdRng::from_entropy();
    let mut game = PipeGame::new(GRID_SIZE, NUM_OBSTACLES, Mode::Auto, &mut rng);
    match game.play() {
        PlayOutcome::Win => println!("Win!"),
        PlayOutcome::NoPath => println!("No valid route found."),
    }
    print!("{}", game);
}
