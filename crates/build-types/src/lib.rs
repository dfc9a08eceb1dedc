pub mod command;
pub mod types;

pub use command::{LatexCommand, UnknownCommand};
pub use types::{BuildRequest, BuildResult, BuildStatus};
