//! Configuration file watcher for hot reload.
//!
//! The directories holding the configuration and its message files are
//! watched rather than the files themselves, so an editor that saves by
//! renaming a new file over the old one keeps triggering reloads.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::ConfigSource;
use crate::config::schema::GateConfig;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    source: ConfigSource,
    update_tx: mpsc::UnboundedSender<GateConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(source: ConfigSource) -> (Self, mpsc::UnboundedReceiver<GateConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (Self { source, update_tx }, update_rx)
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for updates to keep flowing.
    /// Returns `None` when the source has no file to watch. Message files
    /// added later in a directory that was not watched at startup are only
    /// picked up after a restart.
    pub fn run(self) -> Result<Option<RecommendedWatcher>, notify::Error> {
        if self.source.path.is_none() {
            return Ok(None);
        }
        let tx = self.update_tx;
        let source = self.source;

        let mut files = watch_keys(&source);
        let dirs: HashSet<PathBuf> = files
            .iter()
            .filter_map(|file| file.parent().map(Path::to_path_buf))
            .collect();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    if !event.paths.iter().any(|path| files.contains(path)) {
                        return;
                    }

                    tracing::info!(paths = ?event.paths, "Config change detected, reloading...");
                    match source.load() {
                        Ok(new_config) => {
                            let _ = tx.send(new_config);
                        }
                        Err(e) => {
                            tracing::error!(
                                "Failed to reload config: {}. Keeping current configuration.",
                                e
                            );
                        }
                    }
                    // The new file may name different message files.
                    files = watch_keys(&source);
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        for dir in &dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
        }

        tracing::info!(directories = ?dirs, "Config watcher started");
        Ok(Some(watcher))
    }
}

/// Watched files in the absolute form notify reports event paths in.
fn watch_keys(source: &ConfigSource) -> HashSet<PathBuf> {
    source
        .watched_files()
        .iter()
        .filter_map(|file| canonical_key(file))
        .collect()
}

/// Canonical parent joined with the file name; the file itself may not exist yet.
fn canonical_key(file: &Path) -> Option<PathBuf> {
    let name = file.file_name()?;
    let dir = match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    dir.canonicalize().ok().map(|dir| dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    async fn wait_for_message(
        rx: &mut mpsc::UnboundedReceiver<GateConfig>,
        expected: &str,
    ) -> bool {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        while let Ok(Some(config)) = tokio::time::timeout_at(deadline, rx.recv()).await {
            if config.policy.custom_message.as_deref() == Some(expected) {
                return true;
            }
        }
        false
    }

    #[tokio::test]
    async fn test_no_path_means_no_watcher() {
        let (watcher, _rx) = ConfigWatcher::new(ConfigSource::default());
        assert!(watcher.run().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_message_file_edit_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gate.toml");
        let message = dir.path().join("426.html");
        fs::write(&message, "first").unwrap();
        fs::write(&path, "[policy]\nlegacy_http_message_file = \"426.html\"\n").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(ConfigSource::new(Some(path), Vec::new()));
        let _watcher = watcher.run().unwrap().unwrap();

        fs::write(&message, "second").unwrap();
        assert!(wait_for_message(&mut rx, "second").await);
    }

    #[tokio::test]
    async fn test_reloads_survive_rename_over_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gate.toml");
        fs::write(&path, "[policy]\nlegacy_http_message = \"original\"\n").unwrap();

        let (watcher, mut rx) =
            ConfigWatcher::new(ConfigSource::new(Some(path.clone()), Vec::new()));
        let _watcher = watcher.run().unwrap().unwrap();

        let staged = dir.path().join("gate.toml.tmp");
        fs::write(&staged, "[policy]\nlegacy_http_message = \"renamed\"\n").unwrap();
        fs::rename(&staged, &path).unwrap();
        assert!(wait_for_message(&mut rx, "renamed").await);

        fs::write(&path, "[policy]\nlegacy_http_message = \"edited\"\n").unwrap();
        assert!(wait_for_message(&mut rx, "edited").await);
    }

    #[test]
    fn test_canonical_key_resolves_relative_paths() {
        let key = canonical_key(Path::new("gate.toml")).unwrap();
        assert!(key.is_absolute());
        assert!(key.ends_with("gate.toml"));
        assert!(canonical_key(Path::new("/definitely/missing/dir/gate.toml")).is_none());
    }
}
