use crate::config::ResolvedConfig;
use std::io::Write;
use std::path::PathBuf;

/// Render `config show` output.
pub fn render_show<W: Write>(w: &mut W, config: &ResolvedConfig) -> std::io::Result<()> {
    if config.loaded_files.is_empty() {
        writeln!(w, "Loaded config files: (none)")?;
    } else {
        writeln!(w, "Loaded config files:")?;
        for (i, path) in config.loaded_files.iter().enumerate() {
            writeln!(w, "  {}. {}", i + 1, path.display())?;
        }
    }
    writeln!(w)?;

    writeln!(w, "Resolved settings:")?;
    for (key, source) in config.provenance.sorted_entries() {
        let value = get_value_for_key(config, key);
        writeln!(w, "  {}: {} <- {}", key, value, source)?;
    }

    Ok(())
}

fn list(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}

fn path_list(paths: &[PathBuf]) -> String {
    let shown: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    list(&shown)
}

fn get_value_for_key(config: &ResolvedConfig, key: &str) -> String {
    match key {
        "defaults.format" => config.format.to_string(),
        "stylus.paths" => path_list(&config.paths),
        "stylus.include_css" => config.include_css.to_string(),
        "stylus.import" => list(&config.imports),
        "stylus.define" => {
            let pairs: Vec<String> = config
                .define
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            format!("{{{}}}", pairs.join(", "))
        }
        "resolve.alias" => {
            let pairs: Vec<String> = config
                .resolve
                .alias
                .iter()
                .map(|(name, target)| format!("{name}={}", target.display()))
                .collect();
            format!("{{{}}}", pairs.join(", "))
        }
        "resolve.modules" => list(&config.resolve.modules),
        "resolve.condition_names" => list(&config.resolve.condition_names),
        "resolve.main_fields" => list(&config.resolve.main_fields),
        "resolve.main_files" => list(&config.resolve.main_files),
        "resolve.extensions" => list(&config.resolve.extensions),
        _ => "(unknown)".to_string(),
    }
}
