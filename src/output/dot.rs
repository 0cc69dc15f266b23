use crate::errors::Result;
use crate::output::{DepsOutput, Status};
use std::io::Write;

/// Write the import graph in Graphviz DOT format. Unresolved imports are
/// drawn as dashed red nodes named after the request.
pub fn write_dot<W: Write>(writer: &mut W, output: &DepsOutput) -> Result<()> {
    let graph = &output.graph;
    writeln!(writer, "digraph imports {{")?;
    writeln!(writer, "    rankdir=LR;")?;
    writeln!(
        writer,
        "    node [shape=box, style=filled, fillcolor=lightblue];"
    )?;
    writeln!(writer)?;

    for idx in graph.node_indices() {
        let name = escape(&graph[idx].name);
        writeln!(writer, "    \"{name}\";")?;
    }
    writeln!(writer)?;

    for edge in graph.edge_indices() {
        let Some((source, target)) = graph.edge_endpoints(edge) else {
            continue;
        };
        let from = escape(&graph[source].name);
        let to = escape(&graph[target].name);
        let refs = graph[edge].locations.len();
        if refs > 1 {
            writeln!(writer, "    \"{from}\" -> \"{to}\" [label=\"{refs} refs\"];")?;
        } else {
            writeln!(writer, "    \"{from}\" -> \"{to}\";")?;
        }
    }

    let failed: Vec<_> = output
        .files
        .iter()
        .flat_map(|entry| {
            entry
                .imports
                .iter()
                .filter(|import| matches!(import.status, Status::Failed))
                .map(move |import| (entry, import))
        })
        .collect();
    if !failed.is_empty() {
        writeln!(writer)?;
    }
    for (entry, import) in failed {
        let from = graph
            .node_weights()
            .find(|node| node.path == entry.file)
            .map_or_else(|| entry.file.display().to_string(), |node| node.name.clone());
        let missing = escape(&format!("? {}", import.request));
        writeln!(
            writer,
            "    \"{missing}\" [style=dashed, color=red, fillcolor=white];"
        )?;
        writeln!(writer, "    \"{}\" -> \"{missing}\" [style=dashed, color=red];", escape(&from))?;
    }

    writeln!(writer, "}}")?;
    Ok(())
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::cyclic_report;
    use std::path::Path;

    #[test]
    fn dot_output_basic() {
        let report = cyclic_report();
        let output = DepsOutput::new(Path::new("/p/a.styl"), &report);
        let mut buf = Vec::new();
        write_dot(&mut buf, &output).unwrap();
        let dot = String::from_utf8(buf).unwrap();
        assert!(dot.starts_with("digraph imports {"));
        assert!(dot.contains("\"a.styl\" -> \"b.styl\";"));
        assert!(dot.contains("\"c.styl\" -> \"b.styl\";"));
        assert!(dot.contains("\"a.styl\" -> \"? missing\" [style=dashed, color=red];"));
    }
}
