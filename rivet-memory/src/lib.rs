mod command;
mod session;

pub use command::*;
pub use session::*;
