use std::fmt;
use std::str::FromStr;

use chili::{Square, SquareFromStrErr};

/// One line of user input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// `<r,c> <r,c>`
    Move { from: Square, to: Square },
    /// `moves <r,c>`: show where the piece can go.
    Moves(Square),
    /// `end`: stop a capture chain.
    End,
    /// `new`: start over from the initial position.
    New,
    Board,
    Help,
    Quit,
}

pub const HELP: &str = "Commands:
  <r,c> <r,c>   move the piece on the first square to the second, e.g. 3,2 2,2
  moves <r,c>   show where the piece on a square can go
  end           end your turn after a capture
  new           start a new game
  board         show the board
  help          show this text
  quit          leave the game";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandFromStrErr {
    Empty,
    UnknownCommand,
    BadSquare(SquareFromStrErr),
}

impl fmt::Display for CommandFromStrErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandFromStrErr::Empty => write!(f, "Enter a command, or 'help'"),
            CommandFromStrErr::UnknownCommand => write!(f, "Unknown command, try 'help'"),
            CommandFromStrErr::BadSquare(err) => write!(f, "Bad square: {}", err),
        }
    }
}

impl std::error::Error for CommandFromStrErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandFromStrErr::BadSquare(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SquareFromStrErr> for CommandFromStrErr {
    fn from(err: SquareFromStrErr) -> Self {
        CommandFromStrErr::BadSquare(err)
    }
}

impl FromStr for Command {
    type Err = CommandFromStrErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        match words[..] {
            [] => Err(CommandFromStrErr::Empty),
            ["end"] => Ok(Command::End),
            ["new"] => Ok(Command::New),
            ["board"] => Ok(Command::Board),
            ["help"] | ["?"] => Ok(Command::Help),
            ["quit"] | ["exit"] => Ok(Command::Quit),
            ["moves", sq] => Ok(Command::Moves(sq.parse()?)),
            [from, to] => Ok(Command::Move {
                from: from.parse()?,
                to: to.parse()?,
            }),
            _ => Err(CommandFromStrErr::UnknownCommand),
        }
    }
}
