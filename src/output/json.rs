use crate::errors::Result;
use crate::output::DepsOutput;
use std::io::Write;

/// Write the dependency report as pretty-printed JSON.
pub fn write_deps_json<W: Write>(writer: &mut W, output: &DepsOutput) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, output)?;
    writeln!(writer)?;
    Ok(())
}
