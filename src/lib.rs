//! fwbuild - firmware build tool for Arduino-style projects
//!
//! Locates the toolchain for a board inside an SDK installation, composes
//! compiler and linker flags, works out which libraries a project uses and
//! in which order they must be linked, then hands compilation to `make`.

pub mod board;
pub mod build;
pub mod cli;
pub mod config;
pub mod deps;
pub mod driver;
pub mod error;
pub mod flags;
pub mod library;
pub mod toolchain;

pub use board::{BoardCatalog, BoardProfile};
pub use build::{BuildOrchestrator, BuildReport};
pub use config::BuildConfig;
pub use error::{BuildError, Result};
