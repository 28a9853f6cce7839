//! Filesystem access used by the cache store.
//!
//! The store never touches `std::fs` directly; it goes through
//! [`Filesystem`] so tests and embedders can substitute their own.

use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One node found while walking a directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// The filesystem primitives the cache is built on.
pub trait Filesystem: Send + Sync {
    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is a regular file. Directories never count as entries.
    fn is_file(&self, path: &Path) -> bool;

    /// When the file at `path` was last written.
    fn modified_time(&self, path: &Path) -> io::Result<DateTime<Utc>>;

    /// Read the whole file.
    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Create or truncate the file and write `contents`.
    fn write_all(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Remove the file at `path`.
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Create `path` and any missing parents, with `mode` when given.
    fn make_dirs(&self, path: &Path, mode: Option<u32>) -> io::Result<()>;

    /// Set permission bits on a single file or directory.
    fn set_permissions(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Every directory and regular file below `root`, parents before children.
    fn list_tree(&self, root: &Path) -> io::Result<Vec<TreeNode>>;
}

/// [`Filesystem`] backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        fs::metadata(path).is_ok_and(|m| m.is_file())
    }

    fn modified_time(&self, path: &Path) -> io::Result<DateTime<Utc>> {
        let modified = fs::metadata(path)?.modified()?;
        Ok(DateTime::<Utc>::from(modified))
    }

    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write_all(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn make_dirs(&self, path: &Path, mode: Option<u32>) -> io::Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            if let Some(mode) = mode {
                builder.mode(mode);
            }
        }
        #[cfg(not(unix))]
        let _ = mode;

        builder.create(path)
    }

    #[cfg(unix)]
    fn set_permissions(&self, path: &Path, mode: u32) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
    }

    #[cfg(not(unix))]
    fn set_permissions(&self, _path: &Path, _mode: u32) -> io::Result<()> {
        Ok(())
    }

    fn list_tree(&self, root: &Path) -> io::Result<Vec<TreeNode>> {
        let mut nodes = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                // Symlinks are skipped, chmod would follow them out of the tree.
                let file_type = entry.file_type()?;
                if file_type.is_dir() {
                    nodes.push(TreeNode {
                        path: entry.path(),
                        is_dir: true,
                    });
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    nodes.push(TreeNode {
                        path: entry.path(),
                        is_dir: false,
                    });
                }
            }
        }

        Ok(nodes)
    }
}
