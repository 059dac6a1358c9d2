use crate::{Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::fs;
use std::path::{Path, PathBuf};

/// Chrome records its last shutdown here; a stale value makes the next run
/// open with a crash-restore prompt.
const SHUTDOWN_MARKER: &str = "chrome_shutdown_ms.text";
const CLEAN_SHUTDOWN_MS: &str = "187";

/// A persistent Chrome user-data directory, reused across runs so the
/// authenticated session and remembered-device state survive.
pub struct ProfileDir {
    path: PathBuf,
}

impl ProfileDir {
    /// Where the profile lives unless overridden: `~/.xerofill/profile`.
    pub fn default_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".xerofill").join("profile"))
            .ok_or_else(|| Error::Browser("Could not determine home directory".to_string()))
    }

    /// Use the profile at `path`, bootstrapping it on first run by seeding
    /// it from a throwaway headless Chrome launch.
    pub async fn ensure(path: PathBuf, chrome_path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("Creating browser profile at {}", path.display());
            bootstrap(&path, chrome_path).await?;
        }

        Ok(Self { path })
    }

    /// Use an existing directory without bootstrapping.
    pub fn existing(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Launch a headless Chrome against a temp dir, let it write a fresh
/// profile, then copy that tree into place.
async fn bootstrap(target: &Path, chrome_path: &Path) -> Result<()> {
    let seed = tempfile::tempdir().map_err(Error::Io)?;

    let config = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .user_data_dir(seed.path())
        .build()
        .map_err(Error::Browser)?;

    let (mut browser, mut handler) = Browser::launch(config).await?;
    let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

    browser.close().await?;
    let _ = browser.wait().await;
    handler_task.abort();

    seed_profile(seed.path(), target)
}

/// Copy a seeded profile tree into place and mark it as cleanly shut down.
fn seed_profile(seed: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    copy_dir_all(seed, target)?;

    let marker = target.join(SHUTDOWN_MARKER);
    if marker.exists() {
        fs::write(&marker, CLEAN_SHUTDOWN_MS)?;
    }

    Ok(())
}

fn copy_dir_all(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to)?;

    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_seed(root: &Path) -> PathBuf {
        let seed = root.join("seed");
        fs::create_dir_all(seed.join("Default")).unwrap();
        fs::write(seed.join("Default").join("Preferences"), "{}").unwrap();
        fs::write(seed.join("Local State"), "{}").unwrap();
        seed
    }

    #[test]
    fn test_copy_dir_all_copies_nested_tree() {
        let temp = tempfile::tempdir().unwrap();
        let seed = fake_seed(temp.path());
        let target = temp.path().join("copy");

        copy_dir_all(&seed, &target).unwrap();

        assert!(target.join("Default").join("Preferences").exists());
        assert_eq!(fs::read_to_string(target.join("Local State")).unwrap(), "{}");
    }

    #[test]
    fn test_seed_profile_rewrites_shutdown_marker() {
        let temp = tempfile::tempdir().unwrap();
        let seed = fake_seed(temp.path());
        fs::write(seed.join(SHUTDOWN_MARKER), "999999").unwrap();
        let target = temp.path().join("profiles").join("profile");

        seed_profile(&seed, &target).unwrap();

        assert_eq!(
            fs::read_to_string(target.join(SHUTDOWN_MARKER)).unwrap(),
            CLEAN_SHUTDOWN_MS
        );
    }

    #[test]
    fn test_seed_profile_without_marker() {
        let temp = tempfile::tempdir().unwrap();
        let seed = fake_seed(temp.path());
        let target = temp.path().join("profile");

        seed_profile(&seed, &target).unwrap();

        assert!(target.exists());
        assert!(!target.join(SHUTDOWN_MARKER).exists());
    }
}
