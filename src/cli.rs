use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Serialize;
use serde_json::{json, Map, Value as Json};
use thiserror::Error;
use tracing::debug;

use crate::analysis::resolve;
use crate::diagnostics;
use crate::execution_engine::{ComponentEngine, EngineConfig, EngineError};
use crate::template::overrides_from_json;

/// An engine error already rendered against its source file.
#[derive(Debug, Error)]
#[error("{rendered}")]
pub struct Diagnosed {
    rendered: String,
}

fn diagnose<'a>(path: &Path, source: &'a str) -> impl FnOnce(EngineError) -> anyhow::Error + 'a {
    let path = path.to_path_buf();
    move |err| {
        Diagnosed {
            rendered: diagnostics::from_engine_error(&path, source, &err),
        }
        .into()
    }
}

fn read_source(input: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))
}

fn read_json(path: &Path) -> anyhow::Result<Json> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn read_object(path: &Path) -> anyhow::Result<Map<String, Json>> {
    match read_json(path)? {
        Json::Object(map) => Ok(map),
        other => bail!("{} must hold a JSON object, found {}", path.display(), other),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// The engine for `config`, or the default one.
pub fn engine(config: Option<&Path>) -> anyhow::Result<ComponentEngine> {
    let config = match config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    debug!(?config, "engine configured");
    Ok(ComponentEngine::new(config))
}

pub fn parse(engine: &ComponentEngine, input: PathBuf) -> anyhow::Result<()> {
    let source = read_source(&input)?;
    let model = engine.parse(&source).map_err(diagnose(&input, &source))?;
    print_json(&model)
}

pub fn entrypoint(engine: &ComponentEngine, input: PathBuf, name: Option<String>) -> anyhow::Result<()> {
    let source = read_source(&input)?;
    let name = name.unwrap_or_else(|| engine.config().entrypoint_name.clone());
    let model = engine.parse(&source).map_err(diagnose(&input, &source))?;
    let signature = resolve(&model, &name, &engine.config().policy());
    print_json(&signature)
}

pub fn template(
    engine: &ComponentEngine,
    input: PathBuf,
    overrides: Option<PathBuf>,
    update_field: Option<String>,
    values: Option<PathBuf>,
    node: bool,
) -> anyhow::Result<()> {
    let source = read_source(&input)?;
    let mut spec = engine.spec(source.clone());
    if let Some(path) = overrides {
        spec = spec.with_overrides(overrides_from_json(&read_json(&path)?));
    }
    if let Some(path) = values {
        spec = spec.with_field_values(read_object(&path)?);
    }

    if node {
        let node = engine.build_frontend_node(&spec).map_err(diagnose(&input, &source))?;
        return print_json(&node);
    }
    let template = engine
        .build_template(&spec, update_field.as_deref())
        .map_err(diagnose(&input, &source))?;
    print_json(&template)
}

pub fn run(engine: &ComponentEngine, input: PathBuf, kwargs: Option<PathBuf>) -> anyhow::Result<()> {
    let source = read_source(&input)?;
    let kwargs = match kwargs {
        Some(path) => Json::Object(read_object(&path)?),
        None => Json::Object(Map::new()),
    };
    let name = engine.config().entrypoint_name.clone();
    let mut runnable = engine.get_runnable(&source, &name).map_err(diagnose(&input, &source))?;
    let result = runnable.call_json(&kwargs);
    let output = runnable.output();
    for line in &output {
        eprintln!("{}", line);
    }
    let result = result.map_err(diagnose(&input, &source))?;
    print_json(&json!({
        "result": result,
        "status": runnable.status(),
        "output": output,
    }))
}
