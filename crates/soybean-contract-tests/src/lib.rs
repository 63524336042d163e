#![warn(missing_docs)]
//! # soybean-contract-tests
//!
//! Fixture and schema loading for the API contract under `contracts/` at the
//! workspace root. The tests in this crate validate fixtures against their
//! schemas and against the `soybean-core` parsers.

use std::path::PathBuf;

use jsonschema::JSONSchema;
use serde_json::Value;

/// Absolute path of the workspace `contracts/` directory.
pub fn contracts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("contracts")
}

/// Reads a file under `contracts/` as text.
///
/// # Errors
/// Returns a description of the IO failure.
pub fn read_contract_file(relative: &str) -> Result<String, String> {
    let path = contracts_dir().join(relative);
    std::fs::read_to_string(&path)
        .map_err(|error| format!("cannot read '{}': {error}", path.display()))
}

/// Reads and parses a JSON file under `contracts/`.
///
/// # Errors
/// Returns a description of the IO or JSON failure.
pub fn load_json(relative: &str) -> Result<Value, String> {
    let raw = read_contract_file(relative)?;
    serde_json::from_str(&raw).map_err(|error| format!("invalid json in '{relative}': {error}"))
}

/// Compiles `contracts/<name>.schema.json`.
///
/// # Errors
/// Returns a description of the load or compile failure.
pub fn compile_validator(name: &str) -> Result<JSONSchema, String> {
    let schema = load_json(&format!("{name}.schema.json"))?;
    JSONSchema::compile(&schema)
        .map_err(|error| format!("schema '{name}' does not compile: {error}"))
}
