//! Small filesystem helpers

use std::path::{Path, PathBuf};

use tokio::fs;

/// Write `contents` to `path` through a sibling temp file and rename.
///
/// The rename stays within one directory, so concurrent readers see
/// either the old file or the new one, never a torn write.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp = sibling_tmp_path(path);
    fs::write(&tmp, contents).await?;
    fs::rename(&tmp, path).await
}

fn sibling_tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_atomic_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.conf");

        write_atomic(&path, b"hello").await.unwrap();

        assert_eq!(fs::read(&path).await.unwrap(), b"hello");
        assert!(!sibling_tmp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_write_atomic_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.conf");
        fs::write(&path, b"old").await.unwrap();

        write_atomic(&path, b"new").await.unwrap();

        assert_eq!(fs::read(&path).await.unwrap(), b"new");
    }

    #[test]
    fn test_sibling_tmp_path_keeps_directory() {
        let tmp = sibling_tmp_path(Path::new("/etc/wpa_supplicant/wpa_supplicant.conf"));
        assert_eq!(
            tmp,
            PathBuf::from("/etc/wpa_supplicant/wpa_supplicant.conf.tmp")
        );
    }
}
