use std::path::Path;

use crate::error::Result;
use crate::utils::command;

/// Shallow-clone (`--depth 1`) a git repository into a target directory.
pub fn clone_shallow(url: &str, target_dir: &Path) -> Result<()> {
    command::run(
        "git",
        &["clone", "--depth", "1", url, &target_dir.to_string_lossy()],
        "git clone",
    )?;
    Ok(())
}
