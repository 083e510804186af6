use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use eyre::{Result, eyre};
use log::{info, warn};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Watches the config file and signals once per burst of modifications.
///
/// The watch sits on the containing directory so saves that rename a temp
/// file over the config, and a config created after startup, are both seen.
pub struct ConfigWatcher {
    // Dropping the watcher stops notifications.
    _watcher: RecommendedWatcher,
    rx: Receiver<()>,
}

fn touches(event: &Event, file_name: &OsString) -> bool {
    let kind = &event.kind;
    (kind.is_modify() || kind.is_create())
        && event.paths.iter().any(|p| p.file_name() == Some(file_name.as_os_str()))
}

impl ConfigWatcher {
    pub fn new(config_path: PathBuf) -> Result<Self> {
        let file_name = config_path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| eyre!("Config path has no file name: {}", config_path.display()))?;
        let dir = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                if touches(&event, &file_name) {
                    let _ = tx.send(());
                }
            }
        })
        .map_err(|e| eyre!("Failed to create file watcher: {}", e))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| eyre!("Cannot watch {}: {}", dir.display(), e))?;

        if config_path.exists() {
            info!("Watching config file: {}", config_path.display());
        } else {
            info!("Config file does not exist yet: {}", config_path.display());
        }
        Ok(Self { _watcher: watcher, rx })
    }

    /// Blocks until the file changes or `running` is cleared. Returns false
    /// once shutting down.
    pub fn wait(&self, running: &AtomicBool) -> bool {
        while running.load(Ordering::SeqCst) {
            match self.rx.recv_timeout(Duration::from_millis(200)) {
                Ok(()) => {
                    // Debounce multiple events
                    thread::sleep(Duration::from_millis(100));
                    self.drain();
                    return running.load(Ordering::SeqCst);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    warn!("Config watcher disconnected");
                    return false;
                }
            }
        }
        false
    }

    fn drain(&self) {
        while self.rx.try_recv().is_ok() {}
    }
}

/// Runs `reload` on every config change until Ctrl-C.
pub fn watch_config(config_path: &Path, mut reload: impl FnMut() -> Result<()>) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        info!("Received termination signal, shutting down...");
        r.store(false, Ordering::SeqCst);
    })?;

    let watcher = ConfigWatcher::new(config_path.to_path_buf())?;
    while watcher.wait(&running) {
        info!("Config file changed, reloading...");
        if let Err(e) = reload() {
            warn!("Failed to reload config: {}", e);
        }
    }
    Ok(())
}
