use crate::cli::{input_file, StylusArgs};
use crate::config::resolve::resolve_config;
use crate::errors::{Result, StylgraphError};
use crate::loader::Loader;
use clap::Args;
use futures::executor::block_on;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Stylesheet to compile
    pub file: PathBuf,

    #[command(flatten)]
    pub stylus: StylusArgs,

    /// Write CSS here instead of stdout
    #[arg(short, long, value_name = "OUT")]
    pub output: Option<PathBuf>,
}

pub fn run(args: &CompileArgs) -> Result<()> {
    let file = input_file(&args.file)?;
    let working_dir = file.parent().map(PathBuf::from).unwrap_or_default();
    let config = resolve_config(&working_dir, &args.stylus.to_cli_overrides())?;

    let code = std::fs::read_to_string(&file)?;
    let loader = Loader::with_filesystem(config.loader_options());
    let output = block_on(loader.compile(&file, &code))?;

    match &args.output {
        Some(path) => std::fs::write(path, &output.css)?,
        None => {
            let mut stdout = std::io::stdout();
            stdout.write_all(output.css.as_bytes())?;
            stdout.flush()?;
        }
    }

    tracing::info!(
        "compiled {} ({} dependencies)",
        file.display(),
        output.dependencies.len()
    );

    for warning in &output.warnings {
        eprintln!("warning: {warning}");
    }
    for error in &output.errors {
        eprintln!("error: {error}");
    }
    if output.has_errors() {
        return Err(StylgraphError::BuildFailed {
            errors: output.errors.len(),
        });
    }
    Ok(())
}
