use chili::{Action, BoardSnapshot, IllegalMove, Match, Okay, Outcome, Request, Side};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::IllegalAction;
use crate::player::Player;
use crate::recording::Recorder;

pub enum GameResult {
    WonByPlayer { player_idx: usize },
    Tie,
    IllegalMoveByPlayer { player_idx: usize, err: IllegalAction },
}

/// The result of a game, and how it got there.
pub struct GameReport {
    pub result: GameResult,
    /// The side each player had.
    pub sides: [Side; 2],
    /// Completed turns.
    pub turns: u32,
}

impl GameResult {
    fn describe(&self, names: [&str; 2]) -> String {
        match self {
            GameResult::WonByPlayer { player_idx } => format!("{} won", names[*player_idx]),
            GameResult::Tie => String::from("tie"),
            GameResult::IllegalMoveByPlayer { player_idx, err } => {
                format!("{} lost by an illegal action: {}", names[*player_idx], err)
            }
        }
    }
}

/// Applies one bot action to the match. A rejected action leaves it unchanged.
pub fn apply_action(game: &mut Match, action: Action) -> Result<(), IllegalMove> {
    match action {
        Action::Move(record) => {
            let (from, to) = record.squares()?;
            game.play(from, to).map(|_| ())
        }
        Action::EndTurn => game.end_turn(),
    }
}

/// Returns an error only on communication failure, not when an
/// illegal move is played.
///
/// Games that are not decided after `max_turns` turns are a tie.
pub fn play_game(
    rng: &mut StdRng,
    player_1: &mut Player,
    player_2: &mut Player,
    recorder: &mut Option<Recorder>,
    max_turns: u32,
) -> anyhow::Result<GameReport> {
    // Assign the sides randomly; black moves first
    let sides = {
        let mut arr = [Side::Black, Side::White];
        arr.shuffle(rng);
        arr
    };
    let mut players = [player_1, player_2];

    // Inform the players about the new game, so that they can reset their state
    for (player, side) in players.iter_mut().zip(sides) {
        let _: Okay = player.perform_request(recorder, &Request::NewGame { side })?;
    }

    let mut game = Match::new();
    let mut action_idx = 0;
    let game_result = loop {
        if let Outcome::Won(winner) = game.outcome() {
            let player_idx = if sides[0] == winner { 0 } else { 1 };
            break GameResult::WonByPlayer { player_idx };
        }
        if game.turns() >= max_turns {
            break GameResult::Tie;
        }

        let to_move = game.to_move();
        let player_idx = if sides[0] == to_move { 0 } else { 1 };
        let req = Request::PlayTurn {
            board: BoardSnapshot::from(game.board()),
            chain: game.chain().map(<[i8; 2]>::from),
        };
        let action: Action = players[player_idx].perform_request(recorder, &req)?;
        if let Err(err) = apply_action(&mut game, action) {
            break GameResult::IllegalMoveByPlayer {
                player_idx,
                err: IllegalAction {
                    action_idx,
                    action,
                    err,
                },
            };
        }
        action_idx = if game.to_move() == to_move {
            action_idx + 1
        } else {
            0
        };
    };
    debug!(turns = game.turns(), "Game ended\n{}", game.board());

    if let Some(rec) = recorder {
        let names = [players[0].name.as_str(), players[1].name.as_str()];
        rec.write_game_recording(&game_result.describe(names))?;
    }

    Ok(GameReport {
        result: game_result,
        sides,
        turns: game.turns(),
    })
}
