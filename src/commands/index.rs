use clap::Args;
use sitekit::index::{self, IndexOptions, IndexOutput};
use sitekit::io::expand_path;
use std::path::PathBuf;

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct IndexArgs {
    /// Path to config.kibot.site.yml (project_name, artifacts)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override project name
    #[arg(long)]
    pub project: Option<String>,

    /// Comma-separated list of artifacts (takes precedence over --config)
    #[arg(long)]
    pub artifacts: Option<String>,

    /// Index page template
    #[arg(long, default_value = index::DEFAULT_TEMPLATE)]
    pub template: PathBuf,

    /// Rendered output file
    #[arg(long, default_value = index::DEFAULT_OUTPUT)]
    pub out_md: PathBuf,
}

pub fn run(args: IndexArgs, _global: &GlobalArgs) -> CmdResult<IndexOutput> {
    let options = IndexOptions {
        config: args.config.as_deref().map(expand_path),
        project: args.project,
        artifacts: args.artifacts,
        template: expand_path(&args.template),
        out_md: expand_path(&args.out_md),
    };

    let output = index::generate(&options)?;
    Ok((output, 0))
}
