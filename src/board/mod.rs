pub mod catalog;
pub mod profile;

pub use catalog::{parse_properties, BoardCatalog, PlatformSettings};
pub use profile::BoardProfile;
