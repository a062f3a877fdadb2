use std::collections::HashMap;

use chili::{Board, BoardSnapshot, ClientMessage, IllegalMove, Match, MoveRecord, ServerMessage, Side};
use rand::Rng;
use tracing::{debug, info};

use crate::RoomCode;

/// Identifies one client connection.
pub type ConnId = u64;

/// Messages to deliver, in order, to the given connections.
pub type Outbox = Vec<(ConnId, ServerMessage)>;

/// How much the relay checks the moves it forwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TrustMode {
    /// Forward moves unchecked and decide the game on the board snapshots the
    /// clients send.
    #[default]
    Trusting,
    /// Keep a board per room, reject illegal moves and decide the game on the
    /// relay's own board. Snapshots are ignored.
    Authoritative,
}

/// The error type for a client message, reported back to the sender.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayError {
    InvalidRoomCode(String),
    RoomNotFound(RoomCode),
    RoomFull(RoomCode),
    AlreadyInRoom(RoomCode),
    NotInRoom(RoomCode),
    GameNotStarted,
    NotYourTurn,
    IllegalMove(IllegalMove),
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelayError::IllegalMove(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::InvalidRoomCode(code) => {
                write!(f, "'{}' is not a room code, expected four letters", code)
            }
            RelayError::RoomNotFound(code) => write!(f, "Room {} not found", code),
            RelayError::RoomFull(code) => write!(f, "Room {} is full", code),
            RelayError::AlreadyInRoom(code) => write!(f, "Already in room {}", code),
            RelayError::NotInRoom(code) => write!(f, "Not in room {}", code),
            RelayError::GameNotStarted => write!(f, "The game has not started yet"),
            RelayError::NotYourTurn => write!(f, "It is not your turn"),
            RelayError::IllegalMove(err) => write!(f, "{}", err),
        }
    }
}

impl From<IllegalMove> for RelayError {
    fn from(err: IllegalMove) -> Self {
        RelayError::IllegalMove(err)
    }
}

struct Room {
    /// The creator is black, the joiner white. At most two.
    members: Vec<(ConnId, Side)>,
    /// Only kept in [`TrustMode::Authoritative`], once both players are present.
    game: Option<Match>,
}

impl Room {
    fn side_of(&self, conn: ConnId) -> Option<Side> {
        self.members
            .iter()
            .find(|&&(member, _)| member == conn)
            .map(|&(_, side)| side)
    }

    fn others(&self, conn: ConnId) -> impl Iterator<Item = ConnId> + '_ {
        self.members
            .iter()
            .map(|&(member, _)| member)
            .filter(move |&member| member != conn)
    }

    fn everyone(&self, msg: ServerMessage) -> Outbox {
        self.members
            .iter()
            .map(|&(member, _)| (member, msg.clone()))
            .collect()
    }
}

/// The state of all rooms, independent of any transport.
///
/// Every handler returns the messages to send; nothing is sent directly.
pub struct Relay<R> {
    rooms: HashMap<RoomCode, Room>,
    memberships: HashMap<ConnId, RoomCode>,
    mode: TrustMode,
    rng: R,
}

impl<R: Rng> Relay<R> {
    pub fn new(mode: TrustMode, rng: R) -> Self {
        Self {
            rooms: HashMap::new(),
            memberships: HashMap::new(),
            mode,
            rng,
        }
    }

    pub fn mode(&self) -> TrustMode {
        self.mode
    }

    pub fn num_rooms(&self) -> usize {
        self.rooms.len()
    }

    pub fn handle(&mut self, conn: ConnId, msg: ClientMessage) -> Outbox {
        let result = match msg {
            ClientMessage::CreateRoom => self.create_room(conn),
            ClientMessage::JoinRoom { room } => self.join_room(conn, &room),
            ClientMessage::Move { room, mv } => self.forward_move(conn, &room, mv),
            ClientMessage::EndTurn { room } => self.forward_end_turn(conn, &room),
            ClientMessage::CheckGameState { room, board } => {
                self.check_game_state(conn, &room, &board)
            }
            ClientMessage::Chat { room, message } => self.chat(conn, &room, message),
            ClientMessage::RequestRematch { room } => self.request_rematch(conn, &room),
            ClientMessage::RematchResponse { room, accepted } => {
                self.answer_rematch(conn, &room, accepted)
            }
        };
        result.unwrap_or_else(|err| {
            debug!(conn, %err, "Rejected client message");
            vec![(
                conn,
                ServerMessage::Error {
                    message: err.to_string(),
                },
            )]
        })
    }

    /// Removes the connection from its room. The remaining player is told,
    /// and an empty room is closed.
    pub fn disconnect(&mut self, conn: ConnId) -> Outbox {
        let Some(code) = self.memberships.remove(&conn) else {
            return Vec::new();
        };
        let Some(room) = self.rooms.get_mut(&code) else {
            return Vec::new();
        };
        room.members.retain(|&(member, _)| member != conn);
        if room.members.is_empty() {
            self.rooms.remove(&code);
            info!(room = %code, "Room closed");
            Vec::new()
        } else {
            room.everyone(ServerMessage::OpponentDisconnected)
        }
    }

    fn create_room(&mut self, conn: ConnId) -> Result<Outbox, RelayError> {
        if let Some(&code) = self.memberships.get(&conn) {
            return Err(RelayError::AlreadyInRoom(code));
        }
        let code = loop {
            let code = RoomCode::random(&mut self.rng);
            if !self.rooms.contains_key(&code) {
                break code;
            }
        };
        self.rooms.insert(
            code,
            Room {
                members: vec![(conn, Side::Black)],
                game: None,
            },
        );
        self.memberships.insert(conn, code);
        info!(room = %code, conn, "Room created");
        Ok(vec![(
            conn,
            ServerMessage::RoomCreated {
                room: code.to_string(),
            },
        )])
    }

    fn join_room(&mut self, conn: ConnId, room: &str) -> Result<Outbox, RelayError> {
        let code = RoomCode::parse(room).ok_or_else(|| RelayError::InvalidRoomCode(room.to_string()))?;
        match self.memberships.get(&conn) {
            // Joining twice is a no-op.
            Some(&current) if current == code => return Ok(Vec::new()),
            Some(&current) => return Err(RelayError::AlreadyInRoom(current)),
            None => {}
        }
        let mode = self.mode;
        let room = self.rooms.get_mut(&code).ok_or(RelayError::RoomNotFound(code))?;
        if room.members.len() >= 2 {
            return Err(RelayError::RoomFull(code));
        }
        // Normally white; after a disconnect the free side is taken.
        let side = match room.members.first() {
            Some(&(_, taken)) => taken.opponent(),
            None => Side::Black,
        };
        room.members.push((conn, side));
        self.memberships.insert(conn, code);
        if mode == TrustMode::Authoritative {
            room.game = Some(Match::new());
        }
        info!(room = %code, conn, "Game started");
        Ok(room
            .members
            .iter()
            .map(|&(member, side)| {
                let msg = ServerMessage::StartGame {
                    side,
                    room: code.to_string(),
                };
                (member, msg)
            })
            .collect())
    }

    /// The room `conn` is a member of, if it is the one named `room`.
    fn room_of(&mut self, conn: ConnId, room: &str) -> Result<(RoomCode, &mut Room), RelayError> {
        let code = RoomCode::parse(room).ok_or_else(|| RelayError::InvalidRoomCode(room.to_string()))?;
        if self.memberships.get(&conn) != Some(&code) {
            return Err(RelayError::NotInRoom(code));
        }
        let room = self.rooms.get_mut(&code).ok_or(RelayError::RoomNotFound(code))?;
        Ok((code, room))
    }

    /// In authoritative mode, runs `f` on the room's match for the sender's side.
    fn check_authoritative<T>(
        room: &mut Room,
        conn: ConnId,
        f: impl FnOnce(&mut Match) -> Result<T, IllegalMove>,
    ) -> Result<Option<ServerMessage>, RelayError> {
        let side = room.side_of(conn);
        let game = room.game.as_mut().ok_or(RelayError::GameNotStarted)?;
        if side != Some(game.to_move()) && !game.outcome().is_over() {
            return Err(RelayError::NotYourTurn);
        }
        f(game)?;
        Ok(ServerMessage::game_over(game.outcome()))
    }

    fn forward_move(&mut self, conn: ConnId, room: &str, mv: MoveRecord) -> Result<Outbox, RelayError> {
        let mode = self.mode;
        let (_, room) = self.room_of(conn, room)?;
        let game_over = match mode {
            TrustMode::Trusting => None,
            TrustMode::Authoritative => Self::check_authoritative(room, conn, |game| {
                let (from, to) = mv.squares()?;
                game.play(from, to)
            })?,
        };
        let mut outbox: Outbox = room
            .others(conn)
            .map(|other| (other, ServerMessage::OpponentMoved { mv }))
            .collect();
        if let Some(msg) = game_over {
            outbox.extend(room.everyone(msg));
        }
        Ok(outbox)
    }

    fn forward_end_turn(&mut self, conn: ConnId, room: &str) -> Result<Outbox, RelayError> {
        let mode = self.mode;
        let (_, room) = self.room_of(conn, room)?;
        if mode == TrustMode::Authoritative {
            Self::check_authoritative(room, conn, Match::end_turn)?;
        }
        Ok(room
            .others(conn)
            .map(|other| (other, ServerMessage::OpponentEndedTurn))
            .collect())
    }

    fn check_game_state(
        &mut self,
        conn: ConnId,
        room: &str,
        snapshot: &BoardSnapshot,
    ) -> Result<Outbox, RelayError> {
        let mode = self.mode;
        let (code, room) = self.room_of(conn, room)?;
        let outcome = match mode {
            // White is checked first: if both sides are stuck, black wins.
            TrustMode::Trusting => Board::from(snapshot).outcome(Side::White),
            TrustMode::Authoritative => match &room.game {
                Some(game) => game.outcome(),
                None => return Err(RelayError::GameNotStarted),
            },
        };
        match ServerMessage::game_over(outcome) {
            Some(msg) => {
                info!(room = %code, ?outcome, "Game over");
                Ok(room.everyone(msg))
            }
            None => Ok(Vec::new()),
        }
    }

    fn chat(&mut self, conn: ConnId, room: &str, message: String) -> Result<Outbox, RelayError> {
        let (_, room) = self.room_of(conn, room)?;
        let mut outbox: Outbox = room
            .others(conn)
            .map(|other| {
                let msg = ServerMessage::Chat {
                    from_opponent: true,
                    message: message.clone(),
                };
                (other, msg)
            })
            .collect();
        outbox.push((
            conn,
            ServerMessage::Chat {
                from_opponent: false,
                message,
            },
        ));
        Ok(outbox)
    }

    fn request_rematch(&mut self, conn: ConnId, room: &str) -> Result<Outbox, RelayError> {
        let (_, room) = self.room_of(conn, room)?;
        Ok(room
            .others(conn)
            .map(|other| (other, ServerMessage::RematchRequested))
            .collect())
    }

    /// An accepted rematch restarts the game for both players.
    fn answer_rematch(&mut self, conn: ConnId, room: &str, accepted: bool) -> Result<Outbox, RelayError> {
        let mode = self.mode;
        let (code, room) = self.room_of(conn, room)?;
        let mut outbox: Outbox = room
            .others(conn)
            .map(|other| (other, ServerMessage::RematchResponse { accepted }))
            .collect();
        if accepted {
            if mode == TrustMode::Authoritative && room.members.len() == 2 {
                room.game = Some(Match::new());
            }
            info!(room = %code, "Rematch");
            outbox.extend(room.everyone(ServerMessage::ResetGame));
        }
        Ok(outbox)
    }
}

#[cfg(test)]
mod tests {
    use chili::Square;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    const ALICE: ConnId = 1;
    const BOB: ConnId = 2;
    const CAROL: ConnId = 3;

    fn relay(mode: TrustMode) -> Relay<StdRng> {
        Relay::new(mode, StdRng::seed_from_u64(42))
    }

    /// Alice creates a room and Bob joins it. Returns the room code.
    fn start(relay: &mut Relay<StdRng>) -> String {
        let outbox = relay.handle(ALICE, ClientMessage::CreateRoom);
        let room = match &outbox[..] {
            [(ALICE, ServerMessage::RoomCreated { room })] => room.clone(),
            other => panic!("unexpected {:?}", other),
        };
        let outbox = relay.handle(
            BOB,
            ClientMessage::JoinRoom {
                room: room.to_lowercase(),
            },
        );
        assert_eq!(
            outbox,
            vec![
                (
                    ALICE,
                    ServerMessage::StartGame {
                        side: Side::Black,
                        room: room.clone()
                    }
                ),
                (
                    BOB,
                    ServerMessage::StartGame {
                        side: Side::White,
                        room: room.clone()
                    }
                ),
            ]
        );
        room
    }

    fn is_error(outbox: &Outbox, conn: ConnId) -> bool {
        matches!(&outbox[..], [(to, ServerMessage::Error { .. })] if *to == conn)
    }

    fn record(from: [i8; 2], to: [i8; 2]) -> MoveRecord {
        MoveRecord { from, to }
    }

    #[test]
    fn room_lifecycle() {
        let mut relay = relay(TrustMode::Trusting);
        let room = start(&mut relay);
        assert_eq!(relay.num_rooms(), 1);

        let full = relay.handle(CAROL, ClientMessage::JoinRoom { room: room.clone() });
        assert!(is_error(&full, CAROL));
        // Either unknown or, by chance, the full room.
        let unknown = relay.handle(CAROL, ClientMessage::JoinRoom { room: "ZZZZ".into() });
        assert!(is_error(&unknown, CAROL));
        let invalid = relay.handle(CAROL, ClientMessage::JoinRoom { room: "12".into() });
        assert!(is_error(&invalid, CAROL));
        let again = relay.handle(BOB, ClientMessage::JoinRoom { room: room.clone() });
        assert!(again.is_empty());

        assert_eq!(
            relay.disconnect(ALICE),
            vec![(BOB, ServerMessage::OpponentDisconnected)]
        );
        assert_eq!(relay.num_rooms(), 1);
        assert!(relay.disconnect(BOB).is_empty());
        assert_eq!(relay.num_rooms(), 0);
        assert!(relay.disconnect(BOB).is_empty());
    }

    #[test]
    fn free_side_is_taken_after_a_disconnect() {
        let mut relay = relay(TrustMode::Trusting);
        let room = start(&mut relay);
        relay.disconnect(ALICE);
        let outbox = relay.handle(CAROL, ClientMessage::JoinRoom { room: room.clone() });
        assert!(outbox.contains(&(
            CAROL,
            ServerMessage::StartGame {
                side: Side::Black,
                room
            }
        )));
    }

    #[test]
    fn room_codes_do_not_collide() {
        let mut relay = relay(TrustMode::Trusting);
        let mut codes = std::collections::HashSet::new();
        for conn in 0..200 {
            match &relay.handle(conn, ClientMessage::CreateRoom)[..] {
                [(_, ServerMessage::RoomCreated { room })] => assert!(codes.insert(room.clone())),
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(relay.num_rooms(), 200);
    }

    #[test]
    fn trusting_relay_forwards_verbatim() {
        let mut relay = relay(TrustMode::Trusting);
        let room = start(&mut relay);
        // Not even a legal move, but it is forwarded anyway.
        let mv = record([0, 0], [4, 4]);
        assert_eq!(
            relay.handle(ALICE, ClientMessage::Move { room: room.clone(), mv }),
            vec![(BOB, ServerMessage::OpponentMoved { mv })]
        );
        assert_eq!(
            relay.handle(BOB, ClientMessage::EndTurn { room: room.clone() }),
            vec![(ALICE, ServerMessage::OpponentEndedTurn)]
        );
        let outsider = relay.handle(CAROL, ClientMessage::EndTurn { room });
        assert!(is_error(&outsider, CAROL));
    }

    #[test]
    fn trusting_relay_checks_snapshots_white_first() {
        let mut relay = relay(TrustMode::Trusting);
        let room = start(&mut relay);
        let ongoing = BoardSnapshot::from(&Board::new());
        assert!(relay
            .handle(
                ALICE,
                ClientMessage::CheckGameState {
                    room: room.clone(),
                    board: ongoing
                }
            )
            .is_empty());

        // Nobody can move on an empty board; white is checked first and loses.
        let empty = BoardSnapshot::from(&Board::empty());
        assert_eq!(
            relay.handle(BOB, ClientMessage::CheckGameState { room, board: empty }),
            vec![
                (ALICE, ServerMessage::GameOver { winner: Side::Black }),
                (BOB, ServerMessage::GameOver { winner: Side::Black }),
            ]
        );
    }

    #[test]
    fn authoritative_relay_rejects_illegal_moves() {
        let mut relay = relay(TrustMode::Authoritative);
        let room = start(&mut relay);

        let wrong_turn = relay.handle(
            BOB,
            ClientMessage::Move {
                room: room.clone(),
                mv: record([1, 2], [2, 2]),
            },
        );
        assert!(is_error(&wrong_turn, BOB));
        let illegal = relay.handle(
            ALICE,
            ClientMessage::Move {
                room: room.clone(),
                mv: record([3, 2], [1, 2]),
            },
        );
        assert!(is_error(&illegal, ALICE));
        let no_chain = relay.handle(ALICE, ClientMessage::EndTurn { room: room.clone() });
        assert!(is_error(&no_chain, ALICE));

        let mv = MoveRecord::new(Square::at(3, 2), Square::at(2, 2));
        assert_eq!(
            relay.handle(ALICE, ClientMessage::Move { room: room.clone(), mv }),
            vec![(BOB, ServerMessage::OpponentMoved { mv })]
        );

        // A forged snapshot does not end the game.
        let empty = BoardSnapshot::from(&Board::empty());
        assert!(relay
            .handle(BOB, ClientMessage::CheckGameState { room, board: empty })
            .is_empty());
    }

    #[test]
    fn chat_is_echoed_to_the_sender() {
        let mut relay = relay(TrustMode::Trusting);
        let room = start(&mut relay);
        let outbox = relay.handle(
            ALICE,
            ClientMessage::Chat {
                room,
                message: "good luck".into(),
            },
        );
        assert_eq!(
            outbox,
            vec![
                (
                    BOB,
                    ServerMessage::Chat {
                        from_opponent: true,
                        message: "good luck".into()
                    }
                ),
                (
                    ALICE,
                    ServerMessage::Chat {
                        from_opponent: false,
                        message: "good luck".into()
                    }
                ),
            ]
        );
        let outsider = relay.handle(
            CAROL,
            ClientMessage::Chat {
                room: "ABCD".into(),
                message: "hi".into(),
            },
        );
        assert!(is_error(&outsider, CAROL));
    }

    #[test]
    fn trusting_relay_forwards_rematches() {
        let mut relay = relay(TrustMode::Trusting);
        let room = start(&mut relay);
        assert_eq!(
            relay.handle(ALICE, ClientMessage::RequestRematch { room: room.clone() }),
            vec![(BOB, ServerMessage::RematchRequested)]
        );
        assert_eq!(
            relay.handle(
                BOB,
                ClientMessage::RematchResponse {
                    room: room.clone(),
                    accepted: false
                }
            ),
            vec![(ALICE, ServerMessage::RematchResponse { accepted: false })]
        );
        assert_eq!(
            relay.handle(
                BOB,
                ClientMessage::RematchResponse {
                    room,
                    accepted: true
                }
            ),
            vec![
                (ALICE, ServerMessage::RematchResponse { accepted: true }),
                (ALICE, ServerMessage::ResetGame),
                (BOB, ServerMessage::ResetGame),
            ]
        );
    }

    #[test]
    fn authoritative_rematch_restarts_the_board() {
        let mut relay = relay(TrustMode::Authoritative);
        let room = start(&mut relay);
        let opening = MoveRecord::new(Square::at(3, 2), Square::at(2, 2));
        relay.handle(
            ALICE,
            ClientMessage::Move {
                room: room.clone(),
                mv: opening,
            },
        );
        // Black already moved, so a second black move is out of turn.
        let out_of_turn = relay.handle(
            ALICE,
            ClientMessage::Move {
                room: room.clone(),
                mv: record([3, 1], [2, 1]),
            },
        );
        assert!(is_error(&out_of_turn, ALICE));

        relay.handle(ALICE, ClientMessage::RequestRematch { room: room.clone() });
        let declined = relay.handle(
            BOB,
            ClientMessage::RematchResponse {
                room: room.clone(),
                accepted: false,
            },
        );
        assert!(!declined.contains(&(ALICE, ServerMessage::ResetGame)));
        let still_out_of_turn = relay.handle(
            ALICE,
            ClientMessage::Move {
                room: room.clone(),
                mv: record([3, 1], [2, 1]),
            },
        );
        assert!(is_error(&still_out_of_turn, ALICE));

        let accepted = relay.handle(
            BOB,
            ClientMessage::RematchResponse {
                room: room.clone(),
                accepted: true,
            },
        );
        assert!(accepted.contains(&(BOB, ServerMessage::ResetGame)));
        // The fresh game starts with black on the original board.
        assert_eq!(
            relay.handle(
                ALICE,
                ClientMessage::Move {
                    room,
                    mv: opening
                }
            ),
            vec![(BOB, ServerMessage::OpponentMoved { mv: opening })]
        );
    }

    #[test]
    fn authoritative_relay_needs_two_players() {
        let mut relay = relay(TrustMode::Authoritative);
        let room = match &relay.handle(ALICE, ClientMessage::CreateRoom)[..] {
            [(_, ServerMessage::RoomCreated { room })] => room.clone(),
            other => panic!("unexpected {:?}", other),
        };
        let early = relay.handle(
            ALICE,
            ClientMessage::Move {
                room,
                mv: record([3, 2], [2, 2]),
            },
        );
        assert!(is_error(&early, ALICE));
        let twice = relay.handle(ALICE, ClientMessage::CreateRoom);
        assert!(is_error(&twice, ALICE));
    }
}
