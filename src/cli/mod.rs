pub mod options;
pub mod output;

pub use options::*;
pub use output::*;
