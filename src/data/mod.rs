mod generate;
mod run;

pub use generate::*;
pub use run::*;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;

/// Reads a JSON value from the reader.
///
/// # Errors
/// - If the input is not valid JSON for the requested type.
pub fn deserialize<T: DeserializeOwned>(reader: &mut impl Read) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(reader)?)
}

/// Writes the value as pretty JSON.
///
/// # Errors
/// - If the value cannot be serialized.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
