use std::collections::HashMap;
use std::path::PathBuf;

use chili::Side;
use clap::Parser;
use itertools::Itertools;
use judge::{play_game, GameResult, Player, PlayerConfig, Recorder};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
struct Args {
    /// Path to the config JSON files of players
    #[clap(num_args(2..), value_delimiter = ' ')]
    player_configs: Vec<PathBuf>,

    /// How many games to play per pair of players
    #[arg(short, long, default_value_t = 100)]
    num_games: usize,

    /// Games that are not decided after this many turns are a tie
    #[arg(short, long, default_value_t = 200)]
    max_turns: u32,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop the tournament as soon as one player makes an illegal move
    #[arg(short, long, default_value_t = false)]
    stop_on_illegal_move: bool,

    /// Record the game's interactions as JSON files into this directory
    #[arg(short, long)]
    record_games_to_directory: Option<PathBuf>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

struct MatchupOptions {
    num_games: usize,
    max_turns: u32,
    stop_on_illegal_move: bool,
}

#[derive(Default)]
struct MatchupScore {
    wins: [usize; 2],
    /// The subset of `wins` where the winner played black.
    wins_as_black: [usize; 2],
    illegal_moves: [usize; 2],
    ties: usize,
    total_turns: u64,
}

impl MatchupScore {
    fn num_games(&self) -> usize {
        self.wins[0] + self.wins[1] + self.ties
    }

    /// Win percentages of player 1 and player 2, and the tie percentage.
    fn percentages(&self) -> [f32; 3] {
        let num_games = self.num_games().max(1) as f32;
        [
            self.wins[0] as f32 / num_games * 100.0,
            self.wins[1] as f32 / num_games * 100.0,
            self.ties as f32 / num_games * 100.0,
        ]
    }
}

fn play_matchup(
    players: [&mut Player; 2],
    options: &MatchupOptions,
    rng: &mut StdRng,
    recorder: &mut Option<Recorder>,
) -> anyhow::Result<MatchupScore> {
    let [player_1, player_2] = players;
    let player_names = [player_1.name.clone(), player_2.name.clone()];
    let mut score = MatchupScore::default();

    for game_idx in 0..options.num_games {
        let report = play_game(rng, player_1, player_2, recorder, options.max_turns)?;
        score.total_turns += u64::from(report.turns);
        match report.result {
            GameResult::WonByPlayer { player_idx } => {
                debug!(winner = player_names[player_idx], game_idx, turns = report.turns);
                score.wins[player_idx] += 1;
                if report.sides[player_idx] == Side::Black {
                    score.wins_as_black[player_idx] += 1;
                }
            }
            GameResult::Tie => {
                debug!(game_idx, "Tie");
                score.ties += 1;
            }
            GameResult::IllegalMoveByPlayer { player_idx, err } => {
                info!(
                    player = player_names[player_idx],
                    side = %report.sides[player_idx],
                    game_idx,
                    "Illegal move by player"
                );
                let mut err_dyn = &err as &dyn std::error::Error;
                while let Some(src_err) = err_dyn.source() {
                    info!("{}", err_dyn);
                    err_dyn = src_err;
                }
                info!("{}", err_dyn);
                if options.stop_on_illegal_move {
                    break;
                } else {
                    score.wins[1 - player_idx] += 1;
                    score.illegal_moves[player_idx] += 1;
                }
            }
        }
    }

    let mut summary = String::from("End result:");
    for idx in 0..2 {
        summary += &format!(
            "\n- {} wins by {} ({} as black",
            score.wins[idx], player_names[idx], score.wins_as_black[idx]
        );
        if score.illegal_moves[1 - idx] > 0 {
            summary += &format!(
                ", {} through illegal moves by {}",
                score.illegal_moves[1 - idx],
                player_names[1 - idx]
            );
        }
        summary += ")";
    }
    summary += &format!("\n- {} ties", score.ties);
    if score.num_games() > 0 {
        summary += &format!(
            "\n- {:.1} turns per game",
            score.total_turns as f64 / score.num_games() as f64
        );
    }
    eprintln!("{}", summary);

    Ok(score)
}

// prints an upper triangular matrix of the results of the tournament
fn print_tournament_results(
    player_configs: &[PlayerConfig],
    match_results: &HashMap<(usize, usize), MatchupScore>,
) {
    println!("\nTournament results (p1 win %, p2 win %, tie %):\n");
    print!(" {:19} |", "p1 ↓           p2 →");
    for config in player_configs.iter().rev() {
        print!(" {:19} |", config.nick);
    }
    println!();
    for (i, config) in player_configs.iter().enumerate() {
        println!("{}", "---------------------|".repeat(player_configs.len() - i + 1));
        print!(" {:19} |", config.nick);
        for j in (0..player_configs.len()).rev() {
            if i >= j {
                print!("    ");
            } else if let Some(score) = match_results.get(&(i, j)) {
                let [win_1, win_2, tie] = score.percentages();
                print!("{:5.1}% {:5.1}% {:5.1}% |", win_1, win_2, tie);
            } else {
                print!(" {:19} |", "N/A");
            }
        }
        println!();
    }
    println!("---------------------|");
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    // Get a random seed
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut recorder = match args.record_games_to_directory {
        Some(dir_path) => Some(Recorder::new(dir_path)?),
        None => None,
    };

    let player_configs = args
        .player_configs
        .iter()
        .map(|path| PlayerConfig::load(path))
        .collect::<Result<Vec<PlayerConfig>, anyhow::Error>>()?;

    let options = MatchupOptions {
        num_games: args.num_games,
        max_turns: args.max_turns,
        stop_on_illegal_move: args.stop_on_illegal_move,
    };

    let mut match_results = HashMap::new();
    for (i1, i2) in (0..player_configs.len()).tuple_combinations() {
        let mut player_1 = Player::from_config(&player_configs[i1])?;
        let mut player_2 = Player::from_config(&player_configs[i2])?;

        let score = play_matchup(
            [&mut player_1, &mut player_2],
            &options,
            &mut rng,
            &mut recorder,
        )?;

        match_results.insert((i1, i2), score);
    }

    if player_configs.len() > 2 {
        print_tournament_results(&player_configs, &match_results);
    }

    Ok(())
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().event_format(format))
        .with(filter)
        .init();
}
