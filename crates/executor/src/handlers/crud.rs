//! CRUD handlers.
//!
//! Each handler checks the request shape, resolves the target Definition
//! (provisioning a loose one for unseen names) and delegates to the
//! engine's CRUD executor. A malformed request never provisions anything.

use std::sync::Arc;

use protean_core::{Action, Definition};
use protean_engine::{check_shape, Engine};

use crate::convert::convert_result;
use crate::{Command, Output, Result};

fn resolve(engine: &Engine, entity: &str, action: Action, cmd: &Command) -> Result<Arc<Definition>> {
    let registry = engine.registry();
    let name = registry.normalize(entity);
    convert_result(check_shape(
        name.as_str(),
        action,
        cmd.data.as_ref(),
        cmd.conditions.as_ref(),
    ))?;
    match registry.get_definition(entity) {
        Some(definition) => Ok(definition),
        None => convert_result(registry.ensure_loose_for(entity, action)),
    }
}

/// Handle `create`.
pub fn create(engine: &Engine, entity: &str, cmd: &Command) -> Result<Output> {
    let definition = resolve(engine, entity, Action::Create, cmd)?;
    let record = convert_result(engine.crud().create(&definition, cmd.data.as_ref()))?;
    Ok(Output::Record(record))
}

/// Handle `read`.
pub fn read(engine: &Engine, entity: &str, cmd: &Command) -> Result<Output> {
    let definition = resolve(engine, entity, Action::Read, cmd)?;
    let records = convert_result(engine.crud().read(
        &definition,
        cmd.conditions.as_ref(),
        cmd.options.as_ref(),
    ))?;
    Ok(Output::Records(records))
}

/// Handle `update`.
pub fn update(engine: &Engine, entity: &str, cmd: &Command) -> Result<Output> {
    let definition = resolve(engine, entity, Action::Update, cmd)?;
    let affected = convert_result(engine.crud().update(
        &definition,
        cmd.data.as_ref(),
        cmd.conditions.as_ref(),
    ))?;
    Ok(Output::Updated(affected))
}

/// Handle `delete`.
pub fn delete(engine: &Engine, entity: &str, cmd: &Command) -> Result<Output> {
    let definition = resolve(engine, entity, Action::Delete, cmd)?;
    let affected = convert_result(engine.crud().delete(&definition, cmd.conditions.as_ref()))?;
    Ok(Output::Deleted(affected))
}
