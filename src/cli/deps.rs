use crate::cli::{input_file, StylusArgs};
use crate::config::resolve::resolve_config;
use crate::errors::Result;
use crate::loader::Loader;
use crate::output::{DepsOutput, OutputFormat};
use clap::Args;
use futures::executor::block_on;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DepsArgs {
    /// Root stylesheet
    pub file: PathBuf,

    #[command(flatten)]
    pub stylus: StylusArgs,

    /// Output format
    #[arg(long)]
    pub format: Option<OutputFormat>,
}

pub fn run(args: &DepsArgs) -> Result<()> {
    let file = input_file(&args.file)?;
    let working_dir = file.parent().map(PathBuf::from).unwrap_or_default();
    let mut overrides = args.stylus.to_cli_overrides();
    overrides.format = args.format;
    let config = resolve_config(&working_dir, &overrides)?;

    let code = std::fs::read_to_string(&file)?;
    let loader = Loader::with_filesystem(config.loader_options());
    let report = block_on(loader.dependency_index(&file, &code));
    let output = DepsOutput::new(&file, &report);

    let mut stdout = std::io::stdout();
    match config.format {
        OutputFormat::Json => crate::output::json::write_deps_json(&mut stdout, &output)?,
        OutputFormat::Text => crate::output::text::write_deps_text(&mut stdout, &output)?,
        OutputFormat::Dot => crate::output::dot::write_dot(&mut stdout, &output)?,
    }
    Ok(())
}
