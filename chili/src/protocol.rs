use serde::{Deserialize, Serialize};

use crate::{Board, IllegalMove, Outcome, Side, Square, BOARD_SIZE};

/// Request for a bot to do something.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Request to reset the bot's state for a new game.
    ///
    /// The response should be an [`Okay`].
    NewGame { side: Side },
    /// Request to play the next move of the bot's turn.
    ///
    /// The response should be an [`Action`].
    PlayTurn {
        board: BoardSnapshot,
        /// Set when the bot already captured this turn. Only further captures
        /// by the piece on this square are legal, or [`Action::EndTurn`].
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chain: Option<[i8; 2]>,
    },
    /// The bot should shut down.
    Bye,
}

/// Dummy struct for use in bot communication.
///
/// Used to signal an acknowledgement without data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Okay();

/// The response of a bot to [`Request::PlayTurn`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    Move(MoveRecord),
    /// Stop capturing. Only allowed while a capture chain is pending.
    EndTurn,
}

/// A move as sent over the wire.
///
/// The coordinates are not validated on deserialization, so that a bad
/// coordinate can be reported as an [`IllegalMove`] instead of a protocol error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub from: [i8; 2],
    pub to: [i8; 2],
}

impl MoveRecord {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn squares(&self) -> Result<(Square, Square), IllegalMove> {
        Ok((Square::try_from(self.from)?, Square::try_from(self.to)?))
    }
}

impl From<crate::Move> for MoveRecord {
    fn from(mv: crate::Move) -> Self {
        Self::new(mv.from, mv.to)
    }
}

/// The board as a grid of `"black"`, `"white"` or `null`, rows first.
///
/// Anything that is not a 5 x 5 grid of those values fails to deserialize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot(pub [[Option<Side>; BOARD_SIZE as usize]; BOARD_SIZE as usize]);

impl From<&Board> for BoardSnapshot {
    fn from(board: &Board) -> Self {
        let mut grid = [[None; BOARD_SIZE as usize]; BOARD_SIZE as usize];
        for sq in Square::all() {
            grid[sq.i() as usize][sq.j() as usize] = board.get(sq);
        }
        Self(grid)
    }
}

impl From<&BoardSnapshot> for Board {
    fn from(snapshot: &BoardSnapshot) -> Self {
        let mut board = Board::empty();
        for sq in Square::all() {
            board.set(sq, snapshot.0[sq.i() as usize][sq.j() as usize]);
        }
        board
    }
}

/// A message from a player's client to the relay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom,
    JoinRoom {
        room: String,
    },
    Move {
        room: String,
        #[serde(rename = "move")]
        mv: MoveRecord,
    },
    EndTurn {
        room: String,
    },
    /// Asks the relay to run the end-of-game check on the sender's board.
    CheckGameState {
        room: String,
        board: BoardSnapshot,
    },
    Chat {
        room: String,
        message: String,
    },
    RequestRematch {
        room: String,
    },
    /// Answer to the opponent's rematch request.
    RematchResponse {
        room: String,
        accepted: bool,
    },
}

/// A message from the relay to a player's client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomCreated {
        room: String,
    },
    /// Sent to both participants once the room is full.
    StartGame {
        side: Side,
        room: String,
    },
    OpponentMoved {
        #[serde(rename = "move")]
        mv: MoveRecord,
    },
    OpponentEndedTurn,
    GameOver {
        winner: Side,
    },
    OpponentDisconnected,
    /// A chat line, echoed to its sender too.
    Chat {
        from_opponent: bool,
        message: String,
    },
    RematchRequested,
    RematchResponse {
        accepted: bool,
    },
    /// Both players start over from the initial position, keeping their sides.
    ResetGame,
    Error {
        message: String,
    },
}

impl ServerMessage {
    /// The message announcing `outcome`, if the game is over.
    pub fn game_over(outcome: Outcome) -> Option<Self> {
        outcome.winner().map(|winner| ServerMessage::GameOver { winner })
    }
}
