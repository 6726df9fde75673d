//! Static catalogue of the databases a user can point the chat at.

mod presets;
mod registry;

pub use presets::preset_schemas;
pub use registry::{SchemaDescriptor, SchemaRegistry, SchemaSummary, TableBreakdown};
