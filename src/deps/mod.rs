//! Library dependency closure: which libraries a project needs, in link order.

pub mod resolver;
pub mod scanner;
pub mod used;

pub use resolver::DependencyGraphResolver;
pub use scanner::{DependencyScanner, LibraryScan, ListingMatcher};
pub use used::UsedLibraries;
