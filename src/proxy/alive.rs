//! Append-only record of alive proxies

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Appends one proxy per line to a file shared by concurrent probes.
///
/// Each line is written and flushed while holding the lock, so lines from
/// different probes never interleave. Entries are not deduplicated.
#[derive(Debug)]
pub struct AliveRecorder {
    path: PathBuf,
    file: Mutex<File>,
}

impl AliveRecorder {
    /// Open `path` for appending, creating it if missing
    pub async fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, proxy: &str) -> io::Result<()> {
        let line = format!("{}\n", proxy);
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}
