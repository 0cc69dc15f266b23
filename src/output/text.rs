use crate::errors::Result;
use crate::output::{DepsOutput, Status};
use std::io::Write;

/// Write the dependency report as human-readable text.
pub fn write_deps_text<W: Write>(writer: &mut W, output: &DepsOutput) -> Result<()> {
    writeln!(writer, "Stylgraph Dependency Report")?;
    writeln!(writer, "===========================")?;
    writeln!(writer)?;
    writeln!(writer, "Root:         {}", output.root.display())?;
    writeln!(writer, "Files:        {}", output.summary.files)?;
    writeln!(writer, "Imports:      {}", output.summary.imports)?;
    writeln!(writer, "Unresolved:   {}", output.summary.unresolved)?;
    writeln!(writer, "Dependencies: {}", output.summary.dependencies)?;

    for entry in &output.files {
        writeln!(writer)?;
        writeln!(writer, "{}", entry.file.display())?;
        for import in &entry.imports {
            let at = format!("{}:{}", import.line, import.column);
            match import.status {
                Status::Failed => writeln!(
                    writer,
                    "  {at:<8} {:<24} FAILED {}",
                    import.request,
                    import.error.as_deref().unwrap_or("")
                )?,
                Status::Resolved | Status::ResolvedMany => {
                    let mut targets = import.targets.iter();
                    match targets.next() {
                        Some(first) => {
                            writeln!(
                                writer,
                                "  {at:<8} {:<24} -> {}",
                                import.request,
                                first.display()
                            )?;
                            for target in targets {
                                writeln!(writer, "  {:<8} {:<24} -> {}", "", "", target.display())?;
                            }
                        }
                        None => writeln!(writer, "  {at:<8} {:<24} -> (no files)", import.request)?,
                    }
                }
            }
        }
    }

    if !output.cycles.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Import Cycles")?;
        writeln!(writer, "{:-<60}", "")?;
        for cycle in &output.cycles {
            writeln!(
                writer,
                "Cycle #{} (size={}, internal_edges={})",
                cycle.id, cycle.size, cycle.internal_edges
            )?;
            for member in &cycle.members {
                writeln!(writer, "  - {member}")?;
            }
        }
    }

    for (label, messages) in [("Errors", &output.errors), ("Warnings", &output.warnings)] {
        if messages.is_empty() {
            continue;
        }
        writeln!(writer)?;
        writeln!(writer, "{label}")?;
        writeln!(writer, "{:-<60}", "")?;
        for message in messages {
            writeln!(writer, "{message}")?;
        }
    }
    Ok(())
}
