//! Small helpers shared by the command line tools in this workspace: a
//! stderr logger and a line-at-a-time reader for piped input.
mod lines;
mod logger;

pub use lines::*;
pub use logger::*;
