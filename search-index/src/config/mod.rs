//! Configuration and dependency wiring.

mod dependencies;
mod mappings;
mod settings;

pub use dependencies::Dependencies;
pub use mappings::{parse_mapping_specs, MappingSpec};
pub use settings::Settings;
