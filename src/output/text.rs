use crate::definition::Definitions;
use crate::errors::Result;
use std::io::Write;
use std::path::Path;

/// Write a human-readable summary of the extracted API.
pub fn write_definitions_text<W: Write>(
    writer: &mut W,
    definitions: &Definitions,
    root: &Path,
) -> Result<()> {
    let resources: usize = definitions
        .controllers
        .values()
        .map(|c| c.resources.len())
        .sum();

    writeln!(writer, "restc API Report")?;
    writeln!(writer, "================")?;
    writeln!(writer)?;
    writeln!(writer, "Root:        {}", root.display())?;
    writeln!(writer, "Controllers: {}", definitions.controllers.len())?;
    writeln!(writer, "Resources:   {}", resources)?;
    writeln!(writer, "Types:       {}", definitions.types.len())?;
    writeln!(writer, "Responders:  {}", definitions.responders.len())?;
    writeln!(writer)?;

    for controller in definitions.controllers.values() {
        let base = if controller.base.is_empty() {
            "/"
        } else {
            controller.base.as_str()
        };
        writeln!(writer, "{} ({})", controller.name, base)?;
        writeln!(writer, "{:-<60}", "")?;
        for resource in controller.resources.values() {
            writeln!(
                writer,
                "  {:<7} {:<30} {}",
                resource.method, resource.path, resource.name
            )?;
            if let Some(summary) = &resource.summary {
                writeln!(writer, "          {summary}")?;
            }
            for param in &resource.params {
                match &param.metadata {
                    Some(metadata) => writeln!(
                        writer,
                        "          {:<10} {} {} ({metadata})",
                        param.source, param.name, param.ty
                    )?,
                    None => writeln!(
                        writer,
                        "          {:<10} {} {}",
                        param.source, param.name, param.ty
                    )?,
                }
            }
        }
        writeln!(writer)?;
    }

    if !definitions.responders.is_empty() {
        writeln!(writer, "Responders")?;
        writeln!(writer, "{:-<60}", "")?;
        for (key, responder) in &definitions.responders {
            writeln!(writer, "  {key}")?;
            for response in &responder.responses {
                writeln!(writer, "    {} {}", response.status, response.name)?;
            }
        }
        writeln!(writer)?;
    }

    if !definitions.types.is_empty() {
        writeln!(writer, "Types")?;
        writeln!(writer, "{:-<60}", "")?;
        for (key, schema) in &definitions.types {
            writeln!(writer, "  {key} as {}", schema.alias)?;
        }
    }

    Ok(())
}
