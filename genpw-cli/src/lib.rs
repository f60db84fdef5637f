//! Command-line front end for [`genpw`].
//!
//! The binary generates one batch and exits, or with `--interactive` keeps a
//! form [`Session`] alive and reads commands from stdin.

pub mod cli;
pub mod error;
pub mod session;

pub use cli::{Args, normalize_args, run};
pub use error::Error;
pub use session::{Field, Form, Session, run_interactive};
