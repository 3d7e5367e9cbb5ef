use clap::Args;
use sitekit::io::expand_path;
use sitekit::theme::{self, GitCloner, SyncConfig, SyncReport, ThreadSleeper};
use std::path::PathBuf;
use std::time::Duration;

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct ThemeArgs {
    /// Jekyll config holding `color_scheme`
    #[arg(long, default_value = theme::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Temporary clone directory
    #[arg(long, default_value = theme::DEFAULT_TEMP_DIR)]
    pub temp_dir: PathBuf,

    /// Theme repository to clone
    #[arg(long, default_value = theme::DEFAULT_REMOTE_URL)]
    pub remote: String,

    /// Directory receiving the asset folders
    #[arg(long, default_value = theme::DEFAULT_DEST_ROOT)]
    pub dest_root: PathBuf,

    /// Clone attempts before giving up
    #[arg(long, default_value_t = theme::DEFAULT_RETRIES)]
    pub retries: u32,

    /// Seconds to wait between clone attempts
    #[arg(long, default_value_t = theme::DEFAULT_DELAY_SECS)]
    pub delay: u64,
}

pub fn run(args: ThemeArgs, _global: &GlobalArgs) -> CmdResult<SyncReport> {
    if args.retries == 0 {
        return Err(sitekit::Error::validation_invalid_argument(
            "retries",
            "must be at least 1",
            Some(args.retries.to_string()),
        ));
    }

    let cfg = SyncConfig {
        config_path: expand_path(&args.config),
        temp_dir: expand_path(&args.temp_dir),
        remote_url: args.remote,
        dest_root: expand_path(&args.dest_root),
        retries: args.retries,
        delay: Duration::from_secs(args.delay),
        ..SyncConfig::default()
    };

    let report = theme::sync(&cfg, &GitCloner, &ThreadSleeper)?;
    let exit_code = report.exit_code();
    Ok((report, exit_code))
}
