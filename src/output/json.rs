use crate::definition::Definitions;
use crate::errors::Result;
use std::io::Write;

/// Write the definitions document as pretty-printed JSON.
pub fn write_definitions_json<W: Write>(writer: &mut W, definitions: &Definitions) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, definitions)?;
    writeln!(writer)?;
    Ok(())
}
