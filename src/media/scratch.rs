use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

const MAX_NAME_LEN: usize = 120;
const MAX_PUBLISH_ATTEMPTS: usize = 16;

static PART_SEQ: AtomicU64 = AtomicU64::new(0);

/// Shared directory for downloaded media awaiting upload.
///
/// Files become visible under their final name only once fully written
/// (written to a hidden `.part` file, then linked into place). The sweeper removes
/// anything older than the configured age.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("create scratch directory {}", root.display()))?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write `data` as `<unix millis>_<filename>` and return the final path.
    ///
    /// Publishing never replaces an existing file: if the name is taken the
    /// file gets a sequence number, `<unix millis>_<seq>_<filename>`.
    pub async fn write(&self, filename: &str, data: &[u8]) -> std::io::Result<PathBuf> {
        let millis = chrono::Utc::now().timestamp_millis();
        let name = sanitize_filename(filename);
        let seq = PART_SEQ.fetch_add(1, Ordering::Relaxed);
        let part = self.root.join(format!(".{millis}-{seq}.part"));

        tokio::fs::write(&part, data).await?;

        let published = self.publish(&part, millis, &name).await;
        let _ = tokio::fs::remove_file(&part).await;
        published
    }

    /// Hard-link `part` under a free final name. `hard_link` fails with
    /// `AlreadyExists` instead of overwriting, so concurrent writers cannot
    /// clobber each other.
    async fn publish(&self, part: &Path, millis: i64, name: &str) -> std::io::Result<PathBuf> {
        let mut target = self.root.join(format!("{millis}_{name}"));
        for _ in 0..MAX_PUBLISH_ATTEMPTS {
            match tokio::fs::hard_link(part, &target).await {
                Ok(()) => return Ok(target),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let seq = PART_SEQ.fetch_add(1, Ordering::Relaxed);
                    target = self.root.join(format!("{millis}_{seq}_{name}"));
                }
                Err(e) => return Err(e),
            }
        }
        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free scratch name for {name}"),
        ))
    }

    /// Delete regular files last modified more than `max_age` ago.
    ///
    /// Entries that disappear mid-sweep or fail to delete are skipped.
    pub async fn sweep(&self, max_age: Duration) -> Result<usize> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .with_context(|| format!("read scratch directory {}", self.root.display()))?;
        let now = SystemTime::now();
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let metadata = match entry.metadata().await {
                Ok(m) => m,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "scratch stat failed");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            let expired = metadata
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age > max_age);
            if !expired {
                continue;
            }

            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "scratch delete failed");
                }
            }
        }

        Ok(removed)
    }
}

/// Restrict to a portable character set and bounded length.
fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        return "file".into();
    }

    if cleaned.len() <= MAX_NAME_LEN {
        return cleaned.to_string();
    }
    // Keep the extension when shortening.
    match cleaned.rsplit_once('.') {
        Some((_, ext)) if ext.len() < 16 => {
            let stem_len = MAX_NAME_LEN - ext.len() - 1;
            format!("{}.{ext}", &cleaned[..stem_len])
        }
        _ => cleaned[..MAX_NAME_LEN].to_string(),
    }
}
