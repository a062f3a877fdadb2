use std::time::Duration;

use chili::{choose_move, Action, Board, MoveRecord, SearchConfig, Side, Square, Weights};
use chili_bot_utils::{initialize_logging, Bot};

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
struct Args {
    /// Search depth in plies
    #[arg(short, long, default_value_t = 3)]
    depth: u8,
    /// Time budget per move, in milliseconds
    #[arg(short, long, default_value_t = 4000)]
    time_budget: u64,
    /// Also force the simulated opponent to capture when it can
    #[arg(long)]
    replies_must_capture: bool,
    /// Weight of the piece count difference
    #[arg(long, default_value_t = 100)]
    piece_weight: i32,
    /// Weight of the mobility difference
    #[arg(long, default_value_t = 2)]
    mobility_weight: i32,
    /// Weight of the positional difference
    #[arg(long, default_value_t = 1)]
    position_weight: i32,
    /// RNG seed, used when the search runs out of time
    #[arg(long)]
    seed: Option<u64>,
    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

struct MinimaxBot {
    side: Side,
    config: SearchConfig,
    rng: StdRng,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    initialize_logging(args.log_level);
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, depth = args.depth, "Starting");

    let config = SearchConfig {
        depth: args.depth,
        time_budget: Duration::from_millis(args.time_budget),
        weights: Weights {
            piece: args.piece_weight,
            mobility: args.mobility_weight,
            position: args.position_weight,
        },
        replies_must_capture: args.replies_must_capture,
    };
    MinimaxBot {
        side: Side::Black,
        config,
        rng: StdRng::seed_from_u64(seed),
    }
    .run()
}

impl Bot for MinimaxBot {
    fn new_game(&mut self, side: Side) {
        self.side = side;
    }

    fn play_turn(&mut self, board: Board, chain: Option<Square>) -> Action {
        // A pending chain is always continued while a capture is left.
        let outcome = choose_move(&board, self.side, chain, &self.config, &mut self.rng);
        match outcome.best_move {
            Some(mv) => Action::Move(MoveRecord::from(mv)),
            None => {
                if chain.is_none() {
                    warn!(side = %self.side, "No legal move");
                }
                Action::EndTurn
            }
        }
    }
}
