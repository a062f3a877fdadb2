mod command;
mod session;

use std::io::BufRead;
use std::time::Duration;

use chili::{SearchConfig, Side};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use session::{Delays, Flow, Session};
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Black,
    White,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Black => Side::Black,
            SideArg::White => Side::White,
        }
    }
}

#[derive(Parser)]
struct Args {
    /// The side you play. Black moves first.
    #[arg(short, long, value_enum, default_value_t = SideArg::Black)]
    side: SideArg,

    /// Search depth of the computer, in plies
    #[arg(short, long, default_value_t = 3)]
    depth: u8,

    /// Time budget of the computer per move, in milliseconds
    #[arg(short, long, default_value_t = 4000)]
    time_budget: u64,

    /// Pause before the computer starts thinking, in milliseconds
    #[arg(long, default_value_t = 30)]
    thinking_delay: u64,

    /// Pause before the computer plays a capture, in milliseconds
    #[arg(long, default_value_t = 800)]
    capture_delay: u64,

    /// Pause before the computer plays a quiet move, in milliseconds
    #[arg(long, default_value_t = 1200)]
    quiet_delay: u64,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "warn")]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed);

    let search = SearchConfig {
        depth: args.depth,
        time_budget: Duration::from_millis(args.time_budget),
        ..SearchConfig::default()
    };
    let delays = Delays {
        thinking: Duration::from_millis(args.thinking_delay),
        capture: Duration::from_millis(args.capture_delay),
        quiet: Duration::from_millis(args.quiet_delay),
    };
    let mut session = Session::new(args.side.into(), search, delays, StdRng::seed_from_u64(seed));

    let mut stdout = std::io::stdout().lock();
    session.start(&mut stdout)?;
    for line in std::io::stdin().lock().lines() {
        if session.execute(&line?, &mut stdout)? == Flow::Quit {
            break;
        }
    }
    Ok(())
}

fn initialize_logging(level: LevelFilter) {
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
