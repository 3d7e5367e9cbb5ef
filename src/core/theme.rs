//! Theme asset injection.
//!
//! When the site's `_config.yml` selects the wanted color scheme, the theme
//! repository is shallow-cloned into a temp directory and its asset folders
//! replace the local ones:
//!
//! clean stale temp -> clone (retrying) -> copy -> verify -> clean temp
//!
//! A failing step stops the sequence. Once the clone exists, temp cleanup is
//! always attempted and only ever produces a warning.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config;
use crate::error::{AssetDetails, Error, GitCloneFailedDetails, Result};
use crate::git;
use crate::utils::io;

pub const DEFAULT_CONFIG_PATH: &str = "docs/_config.yml";
pub const DEFAULT_TEMP_DIR: &str = "_feast_temp";
pub const DEFAULT_REMOTE_URL: &str = "https://github.com/FEASTorg/FEASTorg.github.io.git";
pub const DEFAULT_SCHEME: &str = "feast";
pub const DEFAULT_DEST_ROOT: &str = "docs";
pub const DEFAULT_FOLDERS: [&str; 2] = ["_sass", "_includes"];
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_DELAY_SECS: u64 = 5;

/// Everything the sync procedure needs to know about where things live.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub config_path: PathBuf,
    pub temp_dir: PathBuf,
    pub remote_url: String,
    pub wanted_scheme: String,
    pub dest_root: PathBuf,
    pub folders: Vec<String>,
    pub retries: u32,
    pub delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            wanted_scheme: DEFAULT_SCHEME.to_string(),
            dest_root: PathBuf::from(DEFAULT_DEST_ROOT),
            folders: DEFAULT_FOLDERS.iter().map(|f| f.to_string()).collect(),
            retries: DEFAULT_RETRIES,
            delay: Duration::from_secs(DEFAULT_DELAY_SECS),
        }
    }
}

impl SyncConfig {
    fn source(&self, folder: &str) -> PathBuf {
        self.temp_dir.join(folder)
    }

    fn destination(&self, folder: &str) -> PathBuf {
        self.dest_root.join(folder)
    }
}

/// Clones a remote repository into a local directory.
pub trait RepoCloner {
    fn shallow_clone(&self, url: &str, target: &Path) -> Result<()>;
}

/// `git clone --depth 1`.
pub struct GitCloner;

impl RepoCloner for GitCloner {
    fn shallow_clone(&self, url: &str, target: &Path) -> Result<()> {
        git::clone_shallow(url, target)
    }
}

/// Blocking wait between clone attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Skipped,
    Injected,
    VerificationFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderCheck {
    pub name: String,
    pub path: String,
    pub exists: bool,
    pub entries: usize,
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub command: String,
    pub status: SyncStatus,
    /// Scheme read from the config, `None` if the config could not be read.
    pub color_scheme: Option<String>,
    pub message: String,
    pub clone_attempts: u32,
    pub folders: Vec<FolderCheck>,
    pub temp_cleaned: bool,
}

impl SyncReport {
    fn skipped(color_scheme: Option<String>, message: String) -> Self {
        Self {
            command: "theme.sync".to_string(),
            status: SyncStatus::Skipped,
            color_scheme,
            message,
            clone_attempts: 0,
            folders: Vec::new(),
            temp_cleaned: false,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status != SyncStatus::VerificationFailed
    }

    pub fn exit_code(&self) -> i32 {
        if self.succeeded() {
            0
        } else {
            1
        }
    }
}

/// Run the whole injection procedure.
pub fn sync(
    cfg: &SyncConfig,
    cloner: &dyn RepoCloner,
    sleeper: &dyn Sleeper,
) -> Result<SyncReport> {
    let scheme = config::load_color_scheme(&cfg.config_path);
    let wanted = cfg.wanted_scheme.trim().to_lowercase();

    match scheme.as_deref() {
        Some(s) if s == wanted => {}
        Some(s) => {
            let message = format!("color_scheme is '{}', skipping injection", s);
            eprintln!("[theme] {}", message);
            return Ok(SyncReport::skipped(scheme, message));
        }
        None => {
            let message = format!(
                "{} not found or unreadable, skipping injection",
                cfg.config_path.display()
            );
            eprintln!("[theme] {}", message);
            return Ok(SyncReport::skipped(None, message));
        }
    }

    log_status!(
        "theme",
        "Detected color_scheme '{}', injecting theme assets",
        wanted
    );

    clean_stale_temp(&cfg.temp_dir)?;
    let attempts = clone_with_retry(cfg, cloner, sleeper)?;

    let copied = copy_assets(cfg);
    let folders = match &copied {
        Ok(()) => verify_assets(cfg),
        Err(_) => Vec::new(),
    };
    let temp_cleaned = remove_temp(&cfg.temp_dir);
    copied?;

    let verified = folders.iter().all(|f| f.ok);
    let names = cfg.folders.join(" and ");
    let (status, message) = if verified {
        (
            SyncStatus::Injected,
            format!("Theme assets injected: {} updated", names),
        )
    } else {
        let failed: Vec<&str> = folders
            .iter()
            .filter(|f| !f.ok)
            .map(|f| f.name.as_str())
            .collect();
        (
            SyncStatus::VerificationFailed,
            format!("Verification failed for {}", failed.join(", ")),
        )
    };
    eprintln!("[theme] {}", message);

    Ok(SyncReport {
        command: "theme.sync".to_string(),
        status,
        color_scheme: scheme,
        message,
        clone_attempts: attempts,
        folders,
        temp_cleaned,
    })
}

/// Remove a leftover temp directory. Failure aborts before any network activity.
pub fn clean_stale_temp(temp_dir: &Path) -> Result<()> {
    if !temp_dir.exists() {
        return Ok(());
    }

    log_status!("theme", "Removing stale {}", temp_dir.display());
    fs::remove_dir_all(temp_dir)
        .map_err(|e| Error::sync_stale_temp_dir(temp_dir.display().to_string(), e.to_string()))
}

/// Attempt the clone up to `cfg.retries` times, sleeping `cfg.delay` between
/// attempts. Returns the number of attempts used.
pub fn clone_with_retry(
    cfg: &SyncConfig,
    cloner: &dyn RepoCloner,
    sleeper: &dyn Sleeper,
) -> Result<u32> {
    let max_attempts = cfg.retries.max(1);
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        log_status!(
            "theme",
            "Cloning {} into {} (attempt {}/{})",
            cfg.remote_url,
            cfg.temp_dir.display(),
            attempt,
            max_attempts
        );

        match cloner.shallow_clone(&cfg.remote_url, &cfg.temp_dir) {
            Ok(()) => return Ok(attempt),
            Err(e) => {
                last_error = clone_error_text(&e);
                log_status!("theme", "Git clone failed: {}", last_error);
            }
        }

        if attempt < max_attempts {
            log_status!("theme", "Retrying in {}s...", cfg.delay.as_secs());
            sleeper.sleep(cfg.delay);
        }
    }

    Err(Error::git_clone_failed(GitCloneFailedDetails {
        url: cfg.remote_url.clone(),
        target: cfg.temp_dir.display().to_string(),
        attempts: max_attempts,
        last_error,
    }))
}

fn clone_error_text(err: &Error) -> String {
    err.details
        .get("error")
        .and_then(|v| v.as_str())
        .map(String::from)
        .unwrap_or_else(|| err.message.clone())
}

/// Replace each destination folder with the cloned source folder.
///
/// A missing source folder is reported before its destination is touched.
pub fn copy_assets(cfg: &SyncConfig) -> Result<()> {
    for folder in &cfg.folders {
        let src = cfg.source(folder);
        let dst = cfg.destination(folder);
        let details = |error: Option<String>| AssetDetails {
            folder: folder.clone(),
            source: src.display().to_string(),
            destination: dst.display().to_string(),
            error,
        };

        if !src.is_dir() {
            return Err(Error::asset_source_missing(details(None)));
        }

        if dst.exists() {
            fs::remove_dir_all(&dst)
                .map_err(|e| Error::asset_copy_failed(details(Some(e.to_string()))))?;
        }

        io::copy_dir_recursive(&src, &dst)
            .map_err(|e| Error::asset_copy_failed(details(Some(e.to_string()))))?;

        log_status!("theme", "Copied {} -> {}", src.display(), dst.display());
    }

    Ok(())
}

/// Check each destination folder exists and is non-empty.
pub fn verify_assets(cfg: &SyncConfig) -> Vec<FolderCheck> {
    cfg.folders
        .iter()
        .map(|folder| {
            let path = cfg.destination(folder);
            let exists = path.is_dir();
            let entries = if exists {
                io::count_entries(&path).unwrap_or(0)
            } else {
                0
            };
            let ok = exists && entries > 0;

            if ok {
                eprintln!("[theme] {}: {} entries", path.display(), entries);
            } else if exists {
                eprintln!("[theme] {} is empty", path.display());
            } else {
                eprintln!("[theme] {} is missing", path.display());
            }

            FolderCheck {
                name: folder.clone(),
                path: path.display().to_string(),
                exists,
                entries,
                ok,
            }
        })
        .collect()
}

/// Best-effort temp removal. Returns whether the directory is gone.
fn remove_temp(temp_dir: &Path) -> bool {
    if !temp_dir.exists() {
        return true;
    }

    match fs::remove_dir_all(temp_dir) {
        Ok(()) => true,
        Err(e) => {
            eprintln!(
                "[theme] Warning: could not delete '{}': {}",
                temp_dir.display(),
                e
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use tempfile::{tempdir, TempDir};

    /// Fails `failures` times, then creates the given folders (with one file each
    /// unless listed in `empty`).
    struct FakeCloner {
        failures: u32,
        calls: Cell<u32>,
        folders: Vec<&'static str>,
        empty: Vec<&'static str>,
    }

    impl FakeCloner {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: Cell::new(0),
                folders: vec!["_sass", "_includes"],
                empty: Vec::new(),
            }
        }
    }

    impl RepoCloner for FakeCloner {
        fn shallow_clone(&self, _url: &str, target: &Path) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            if self.calls.get() <= self.failures {
                return Err(Error::internal_io("network down", Some("git clone".into())));
            }
            for folder in &self.folders {
                let dir = target.join(folder);
                fs::create_dir_all(&dir).unwrap();
                if !self.empty.contains(folder) {
                    fs::write(dir.join("new.scss"), "new").unwrap();
                }
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        waits: RefCell<Vec<Duration>>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.waits.borrow_mut().push(duration);
        }
    }

    fn site(scheme: Option<&str>) -> (TempDir, SyncConfig) {
        let dir = tempdir().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        if let Some(scheme) = scheme {
            fs::write(
                docs.join("_config.yml"),
                format!("title: Docs\ncolor_scheme: {}\n", scheme),
            )
            .unwrap();
        }

        let cfg = SyncConfig {
            config_path: docs.join("_config.yml"),
            temp_dir: dir.path().join("_feast_temp"),
            remote_url: "file:///fixture".to_string(),
            dest_root: docs,
            delay: Duration::from_millis(1),
            ..SyncConfig::default()
        };
        (dir, cfg)
    }

    #[test]
    fn default_config_matches_site_layout() {
        let cfg = SyncConfig::default();
        assert_eq!(cfg.config_path, PathBuf::from("docs/_config.yml"));
        assert_eq!(cfg.temp_dir, PathBuf::from("_feast_temp"));
        assert_eq!(cfg.folders, vec!["_sass", "_includes"]);
        assert_eq!(cfg.retries, 3);
        assert_eq!(cfg.delay, Duration::from_secs(5));
    }

    #[test]
    fn other_scheme_is_skipped_without_side_effects() {
        let (_dir, cfg) = site(Some("minimal"));
        let cloner = FakeCloner::new(0);
        let sleeper = RecordingSleeper::default();

        let report = sync(&cfg, &cloner, &sleeper).unwrap();

        assert_eq!(report.status, SyncStatus::Skipped);
        assert_eq!(report.color_scheme.as_deref(), Some("minimal"));
        assert_eq!(report.exit_code(), 0);
        assert_eq!(cloner.calls.get(), 0);
        assert!(!cfg.temp_dir.exists());
        assert!(!cfg.dest_root.join("_sass").exists());
    }

    #[test]
    fn missing_config_is_skipped() {
        let (_dir, cfg) = site(None);
        let cloner = FakeCloner::new(0);

        let report = sync(&cfg, &cloner, &RecordingSleeper::default()).unwrap();

        assert_eq!(report.status, SyncStatus::Skipped);
        assert_eq!(report.color_scheme, None);
        assert_eq!(cloner.calls.get(), 0);
    }

    #[test]
    fn scheme_comparison_ignores_case_and_whitespace() {
        let (_dir, cfg) = site(Some("'  FEAST  '"));
        let cloner = FakeCloner::new(0);

        let report = sync(&cfg, &cloner, &RecordingSleeper::default()).unwrap();

        assert_eq!(report.status, SyncStatus::Injected);
        assert_eq!(cloner.calls.get(), 1);
    }

    #[test]
    fn clone_retries_then_succeeds() {
        let (_dir, cfg) = site(Some("feast"));
        let cloner = FakeCloner::new(2);
        let sleeper = RecordingSleeper::default();

        let report = sync(&cfg, &cloner, &sleeper).unwrap();

        assert_eq!(report.status, SyncStatus::Injected);
        assert_eq!(report.clone_attempts, 3);
        assert_eq!(cloner.calls.get(), 3);
        assert_eq!(sleeper.waits.borrow().len(), 2);
        assert!(sleeper.waits.borrow().iter().all(|d| *d == cfg.delay));
    }

    #[test]
    fn clone_exhaustion_leaves_destinations_alone() {
        let (_dir, cfg) = site(Some("feast"));
        let old = cfg.dest_root.join("_sass");
        fs::create_dir_all(&old).unwrap();
        fs::write(old.join("old.scss"), "old").unwrap();

        let cloner = FakeCloner::new(u32::MAX);
        let sleeper = RecordingSleeper::default();

        let err = sync(&cfg, &cloner, &sleeper).unwrap_err();

        assert_eq!(err.code.as_str(), "git.clone_failed");
        assert_eq!(err.details["attempts"], 3);
        assert_eq!(err.details["lastError"], "network down");
        assert_eq!(cloner.calls.get(), 3);
        assert_eq!(sleeper.waits.borrow().len(), 2);
        assert_eq!(fs::read_to_string(old.join("old.scss")).unwrap(), "old");
        assert!(!cfg.dest_root.join("_includes").exists());
    }

    #[test]
    fn zero_retries_still_attempts_once() {
        let (_dir, mut cfg) = site(Some("feast"));
        cfg.retries = 0;
        let cloner = FakeCloner::new(0);

        let attempts = clone_with_retry(&cfg, &cloner, &RecordingSleeper::default()).unwrap();

        assert_eq!(attempts, 1);
    }

    #[test]
    fn existing_destination_is_fully_replaced() {
        let (_dir, cfg) = site(Some("feast"));
        let old = cfg.dest_root.join("_includes");
        fs::create_dir_all(old.join("stale_dir")).unwrap();
        fs::write(old.join("stale.html"), "stale").unwrap();

        let report = sync(&cfg, &FakeCloner::new(0), &RecordingSleeper::default()).unwrap();

        assert_eq!(report.status, SyncStatus::Injected);
        assert!(!old.join("stale.html").exists());
        assert!(!old.join("stale_dir").exists());
        assert_eq!(fs::read_to_string(old.join("new.scss")).unwrap(), "new");
        assert!(report.temp_cleaned);
        assert!(!cfg.temp_dir.exists());
    }

    #[test]
    fn empty_destination_fails_verification_but_cleans_temp() {
        let (_dir, cfg) = site(Some("feast"));
        let mut cloner = FakeCloner::new(0);
        cloner.empty = vec!["_includes"];

        let report = sync(&cfg, &cloner, &RecordingSleeper::default()).unwrap();

        assert_eq!(report.status, SyncStatus::VerificationFailed);
        assert_eq!(report.exit_code(), 1);
        let failed: Vec<_> = report.folders.iter().filter(|f| !f.ok).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name, "_includes");
        assert!(failed[0].exists);
        assert_eq!(failed[0].entries, 0);
        assert!(report.temp_cleaned);
        assert!(!cfg.temp_dir.exists());
    }

    #[test]
    fn missing_source_folder_is_an_explicit_error() {
        let (_dir, cfg) = site(Some("feast"));
        let mut cloner = FakeCloner::new(0);
        cloner.folders = vec!["_sass"];

        let err = sync(&cfg, &cloner, &RecordingSleeper::default()).unwrap_err();

        assert_eq!(err.code.as_str(), "assets.source_missing");
        assert_eq!(err.details["folder"], "_includes");
        assert!(!cfg.temp_dir.exists());
    }

    #[test]
    fn stale_temp_dir_is_removed_before_clone() {
        let (_dir, cfg) = site(Some("feast"));
        fs::create_dir_all(cfg.temp_dir.join("_sass")).unwrap();
        fs::write(cfg.temp_dir.join("leftover.txt"), "x").unwrap();

        let report = sync(&cfg, &FakeCloner::new(0), &RecordingSleeper::default()).unwrap();

        assert_eq!(report.status, SyncStatus::Injected);
        assert!(!cfg.temp_dir.exists());
    }

    #[test]
    fn unremovable_stale_temp_aborts_before_clone() {
        let (_dir, cfg) = site(Some("feast"));
        fs::write(&cfg.temp_dir, "not a directory").unwrap();
        let cloner = FakeCloner::new(0);

        let err = sync(&cfg, &cloner, &RecordingSleeper::default()).unwrap_err();

        assert_eq!(err.code.as_str(), "sync.stale_temp_dir");
        assert!(!err.hints.is_empty());
        assert_eq!(cloner.calls.get(), 0);
        assert!(cfg.temp_dir.is_file());
        assert!(!cfg.dest_root.join("_sass").exists());
    }

    #[test]
    fn failed_temp_removal_is_only_a_warning() {
        let dir = tempdir().unwrap();
        let temp = dir.path().join("_feast_temp");
        fs::write(&temp, "not a directory").unwrap();

        assert!(!remove_temp(&temp));
        assert!(temp.exists());
        assert!(remove_temp(&dir.path().join("already_gone")));
    }

    #[test]
    fn verify_reports_missing_folder() {
        let (_dir, cfg) = site(Some("feast"));
        let checks = verify_assets(&cfg);

        assert_eq!(checks.len(), 2);
        assert!(checks.iter().all(|c| !c.exists && !c.ok && c.entries == 0));
    }
}
