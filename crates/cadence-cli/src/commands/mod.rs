use anyhow::Result;
use serde::Serialize;

pub mod create;
pub mod dashboard;
pub mod estimate;
pub mod events;
pub mod expand;
pub mod list;
pub mod status;

/// Pretty-printed JSON on stdout, the shape used by every `--json` flag
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
