use std::io::{BufRead, Write};

use anyhow::Context;
use chili::{Action, Board, Okay, Request, Side, Square};
use tracing::trace;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// A trait to simplify writing bots.
pub trait Bot {
    fn new_game(&mut self, side: Side);

    /// Picks the next move of the bot's turn.
    ///
    /// With `chain` set, the bot captured earlier in this turn and may only
    /// capture again with the piece on that square, or return [`Action::EndTurn`].
    fn play_turn(&mut self, board: Board, chain: Option<Square>) -> Action;

    fn run(&mut self) -> anyhow::Result<()> {
        // Communication happens through stdin/stdout.
        // Stderr can be used for logging.
        let stdin = std::io::stdin().lock();
        let stdout = std::io::stdout().lock();
        self.serve(stdin, stdout)
    }

    /// Answers requests from `input` on `output` until [`Request::Bye`] or EOF.
    fn serve<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> anyhow::Result<()> {
        let mut buf = String::new();

        loop {
            // Read the next line into buf
            buf.clear(); // because read_line() appends to the buffer
            let num_bytes_read = input.read_line(&mut buf)?;
            if num_bytes_read == 0 {
                // 0 bytes read means EOF - the judge has exited.
                break Ok(());
            }
            trace!(request = buf.trim_end(), "Received");

            let req = serde_json::from_str::<Request>(buf.trim_end())
                .with_context(|| format!("Could not parse request {:?}", buf.trim_end()))?;

            match req {
                Request::NewGame { side } => {
                    self.new_game(side);
                    serde_json::to_writer(&mut output, &Okay())?;
                }
                Request::PlayTurn { board, chain } => {
                    let chain = chain.map(Square::try_from).transpose()?;
                    let action = self.play_turn(Board::from(&board), chain);
                    serde_json::to_writer(&mut output, &action)?
                }
                Request::Bye => break Ok(()),
            }
            writeln!(output)?;
            output.flush()?;
        }
    }
}

/// Installs a compact log formatter that writes to stderr, since stdout is
/// reserved for the protocol.
pub fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
