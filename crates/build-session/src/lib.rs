//! Client side of the OverTeX build flow
//!
//! [`BuildSession`] tracks one view's build progress and outcome and makes
//! sure only one build is in flight at a time. It talks to the server through
//! a [`BuildClient`]; [`HttpBuildClient`] is the `reqwest` implementation.

pub mod client;
pub mod error;
pub mod session;

pub use build_types::{BuildRequest, BuildResult, BuildStatus, LatexCommand};
pub use client::{BuildClient, HttpBuildClient};
pub use error::ClientError;
pub use session::BuildSession;
