//! Types command implementation

use crate::cli::output::{format_types_json, format_types_table, TypeView};
use crate::cli::TypesArgs;
use crate::registry::BackendRegistry;

/// Collect one view per registered backend type, sorted by tag.
pub fn type_views(registry: &BackendRegistry) -> Vec<TypeView> {
    registry
        .backend_types()
        .into_iter()
        .filter_map(|backend_type| {
            let descriptor = registry.resolve(&backend_type).ok()?;
            Some(TypeView {
                backend_type: backend_type.to_string(),
                description: descriptor.describe().to_string(),
            })
        })
        .collect()
}

/// Handle `dbfactory types` command
pub fn handle_types(args: &TypesArgs, registry: &BackendRegistry) -> serde_json::Result<String> {
    let views = type_views(registry);

    if args.json {
        format_types_json(&views)
    } else {
        Ok(format_types_table(&views))
    }
}
