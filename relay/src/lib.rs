mod room_code;
mod rooms;
mod server;
pub use room_code::*;
pub use rooms::*;
pub use server::*;
