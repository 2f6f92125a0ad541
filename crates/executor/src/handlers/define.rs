//! `define_entity` handler.

use protean_engine::{schema_from_json, Engine};
use serde_json::Value as JsonValue;

use crate::convert::convert_result;
use crate::{Output, Result};

/// Handle `define_entity`.
///
/// An already-defined entity is returned as is; its schema is not re-read.
pub fn define_entity(engine: &Engine, entity: &str, schema: Option<&JsonValue>) -> Result<Output> {
    let registry = engine.registry();
    let resolution = match registry.get_definition(entity) {
        Some(definition) => protean_engine::Resolution {
            definition,
            created: false,
        },
        None => {
            let name = registry.normalize(entity);
            let schema = convert_result(schema_from_json(&name, schema))?;
            convert_result(registry.define(entity, &schema))?
        }
    };
    let definition = resolution.definition;
    Ok(Output::Defined {
        entity: definition.name().to_string(),
        columns: definition.column_names().into_iter().map(str::to_string).collect(),
        created: resolution.created,
    })
}
