//! Build tree layout and the end-to-end build pipeline.

pub mod layout;
pub mod orchestrator;

pub use layout::{archive_name, dependency_listing_name, object_name, translation_unit_name, unit_key, BuildLayout};
pub use orchestrator::{clean, list_boards, BuildContext, BuildOrchestrator, BuildReport, PROJECT_UNIT};
