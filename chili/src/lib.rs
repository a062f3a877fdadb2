pub use board::*;
pub use errors::*;
pub use eval::*;
pub use game::*;
pub use movegen::*;
pub use outcome::*;
pub use protocol::*;
pub use search::*;
pub use visualization::*;

#[cfg(test)]
mod arbitrary;
mod bitset;
mod board;
mod errors;
mod eval;
mod game;
mod movegen;
mod outcome;
mod protocol;
mod search;
mod visualization;
