use chili::{Action, Board, CapturePriority, MoveRecord, Side, Square};
use chili_bot_utils::{initialize_logging, Bot};

use clap::Parser;
use rand::rngs::StdRng;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
struct Args {
    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,
    /// Chance of ending the turn instead of continuing a capture chain
    #[arg(long, default_value_t = 0.0, value_parser = parse_chance)]
    stop_chance: f64,
    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "warn")]
    log_level: LevelFilter,
}

fn parse_chance(s: &str) -> Result<f64, String> {
    let chance: f64 = s.parse().map_err(|err| format!("{}", err))?;
    if (0.0..=1.0).contains(&chance) {
        Ok(chance)
    } else {
        Err(format!("{} is not a probability between 0 and 1", s))
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    initialize_logging(args.log_level);
    let seed = args.seed.unwrap_or_else(rand::random);
    debug!(seed, "Starting");
    let rng = StdRng::seed_from_u64(seed);

    RandomBot {
        rng,
        side: Side::Black,
        stop_chance: args.stop_chance,
    }
    .run()
}

struct RandomBot {
    rng: StdRng,
    side: Side,
    stop_chance: f64,
}

impl Bot for RandomBot {
    fn new_game(&mut self, side: Side) {
        self.side = side;
    }

    fn play_turn(&mut self, board: Board, chain: Option<Square>) -> Action {
        if chain.is_some() && self.rng.gen_bool(self.stop_chance) {
            return Action::EndTurn;
        }
        let moves = board.turn_moves(self.side, chain, CapturePriority::Nobody);
        match moves.choose(&mut self.rng) {
            Some(&mv) => Action::Move(MoveRecord::from(mv)),
            None => Action::EndTurn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_chance_must_be_a_probability() {
        assert_eq!(parse_chance("0.25"), Ok(0.25));
        assert_eq!(parse_chance("1"), Ok(1.0));
        for bad in ["NaN", "inf", "-0.5", "1.5", "often"] {
            assert!(parse_chance(bad).is_err(), "{}", bad);
        }
    }

    #[test]
    fn always_stopping_ends_a_chain() {
        let mut bot = RandomBot {
            rng: StdRng::seed_from_u64(0),
            side: Side::Black,
            stop_chance: 1.0,
        };
        let board: Board = "
            .....
            .W...
            ..B..
            .....
            .....
        "
        .parse()
        .unwrap();
        assert_eq!(bot.play_turn(board, Some(Square::at(2, 2))), Action::EndTurn);
        assert!(matches!(bot.play_turn(board, None), Action::Move(_)));
    }
}
