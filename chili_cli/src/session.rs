use std::io::Write;
use std::thread;
use std::time::Duration;

use chili::{
    choose_move, visualize_board, Match, MoveReport, Outcome, SearchConfig, Side, Square, SquareSet,
};
use rand::rngs::StdRng;
use tracing::debug;

use crate::command::{Command, HELP};

/// Pauses that make the computer's play readable.
#[derive(Clone, Copy, Debug)]
pub struct Delays {
    /// Before the search starts.
    pub thinking: Duration,
    /// Before a chosen capture is played.
    pub capture: Duration,
    /// Before a chosen quiet move is played.
    pub quiet: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            thinking: Duration::from_millis(30),
            capture: Duration::from_millis(800),
            quiet: Duration::from_millis(1200),
        }
    }
}

#[cfg(test)]
impl Delays {
    pub const NONE: Delays = Delays {
        thinking: Duration::ZERO,
        capture: Duration::ZERO,
        quiet: Duration::ZERO,
    };
}

/// Whether to keep reading input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A human against the computer.
pub struct Session {
    game: Match,
    human: Side,
    search: SearchConfig,
    delays: Delays,
    rng: StdRng,
}

impl Session {
    pub fn new(human: Side, search: SearchConfig, delays: Delays, rng: StdRng) -> Self {
        Self {
            game: Match::new(),
            human,
            search,
            delays,
            rng,
        }
    }

    #[cfg(test)]
    pub fn game(&self) -> &Match {
        &self.game
    }

    /// Prints the board and lets the computer move if it is its turn.
    pub fn start(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        writeln!(out, "You play {} ({}). Black moves first.", self.human, self.human.symbol())?;
        writeln!(out, "{}", HELP)?;
        self.new_game(out)?;
        self.prompt(out)
    }

    fn new_game(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        self.game = Match::new();
        writeln!(out, "{}", self.game.board())?;
        self.computer_turn(out)
    }

    /// Runs one line of input.
    pub fn execute(&mut self, line: &str, out: &mut impl Write) -> anyhow::Result<Flow> {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                writeln!(out, "{}", err)?;
                self.prompt(out)?;
                return Ok(Flow::Continue);
            }
        };
        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::New => self.new_game(out)?,
            Command::Board => writeln!(out, "{}", self.game.board())?,
            Command::Moves(sq) => self.show_moves(sq, out)?,
            Command::Move { from, to } => self.human_move(from, to, out)?,
            Command::End => match self.game.end_turn() {
                Ok(()) => {
                    writeln!(out, "You end your turn.")?;
                    self.computer_turn(out)?;
                }
                Err(err) => writeln!(out, "{}", err)?,
            },
        }
        self.prompt(out)?;
        Ok(Flow::Continue)
    }

    fn prompt(&self, out: &mut impl Write) -> anyhow::Result<()> {
        if self.game.outcome().is_over() {
            write!(out, "Type 'new' to play again, or 'quit': ")?;
        } else {
            match self.game.chain() {
                Some(sq) => write!(out, "Capture again with {}, or 'end': ", sq)?,
                None => write!(out, "Your move: ")?,
            }
        }
        out.flush()?;
        Ok(())
    }

    fn show_moves(&self, sq: Square, out: &mut impl Write) -> anyhow::Result<()> {
        let destinations: SquareSet = self.game.moves_from(sq).iter().map(|mv| mv.to).collect();
        if destinations.is_empty() {
            writeln!(out, "No legal moves from {}.", sq)?;
        } else {
            writeln!(out, "{}", visualize_board(self.game.board(), destinations))?;
        }
        Ok(())
    }

    fn human_move(&mut self, from: Square, to: Square, out: &mut impl Write) -> anyhow::Result<()> {
        if self.game.to_move() != self.human {
            writeln!(out, "It is not your turn.")?;
            return Ok(());
        }
        match self.game.play(from, to) {
            Ok(report) => {
                self.report(&report, out)?;
                self.computer_turn(out)
            }
            Err(err) => {
                writeln!(out, "{}", err)?;
                Ok(())
            }
        }
    }

    /// Plays for the computer as long as it is its turn.
    fn computer_turn(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        let computer = self.human.opponent();
        while self.game.to_move() == computer && !self.game.outcome().is_over() {
            thread::sleep(self.delays.thinking);
            let outcome = choose_move(
                self.game.board(),
                computer,
                self.game.chain(),
                &self.search,
                &mut self.rng,
            );
            debug!(nodes = outcome.nodes, timed_out = outcome.timed_out, "Computer searched");
            let Some(mv) = outcome.best_move else {
                // Only possible with a pending chain; the game would be over otherwise.
                self.game.end_turn()?;
                writeln!(out, "The computer ends its turn.")?;
                break;
            };
            thread::sleep(if mv.is_capture {
                self.delays.capture
            } else {
                self.delays.quiet
            });
            let report = self.game.play(mv.from, mv.to)?;
            self.report(&report, out)?;
        }
        Ok(())
    }

    fn report(&self, report: &MoveReport, out: &mut impl Write) -> anyhow::Result<()> {
        let who = if report.side == self.human {
            String::from("You")
        } else {
            String::from("The computer")
        };
        write!(out, "{} moved {} to {}", who, report.mv.from, report.mv.to)?;
        if report.captured() {
            let converted: Vec<String> = report.converted.into_iter().map(|sq| sq.to_string()).collect();
            write!(out, ", converting {}", converted.join(" "))?;
        }
        writeln!(out, ".")?;
        writeln!(out, "{}", self.game.board())?;
        if let Outcome::Won(winner) = report.outcome {
            if winner == self.human {
                writeln!(out, "You win!")?;
            } else {
                writeln!(out, "The computer wins.")?;
            }
        }
        Ok(())
    }
}
