//! File discovery for finding JPEG images in directories.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::DiscoveryConfig;

/// Discovers image files in directories.
pub struct FileDiscovery {
    config: DiscoveryConfig,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Discover all matching image files at a path.
    ///
    /// If path is a file, returns it if its extension matches.
    /// If path is a directory, recursively finds all matching files.
    /// A path that does not exist yields nothing.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            if self.is_supported(path) {
                if let Ok(meta) = std::fs::metadata(path) {
                    return vec![DiscoveredFile {
                        path: path.to_path_buf(),
                        size: meta.len(),
                    }];
                }
            }
            return vec![];
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(path)
            .follow_links(self.config.follow_links)
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::debug!("Skipping unreadable entry: {err}");
                    None
                }
            })
        {
            let entry_path = entry.path();
            if entry_path.is_file() && self.is_supported(entry_path) {
                if let Ok(meta) = entry.metadata() {
                    files.push(DiscoveredFile {
                        path: entry_path.to_path_buf(),
                        size: meta.len(),
                    });
                }
            }
        }

        // Sort by path for deterministic ordering
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Check if a file has one of the configured extensions.
    ///
    /// The comparison is exact: `photo.JPG` does not match `jpg`.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.config.extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovery() -> FileDiscovery {
        FileDiscovery::new(DiscoveryConfig::default())
    }

    #[test]
    fn test_is_supported() {
        let discovery = discovery();

        assert!(discovery.is_supported(Path::new("test.jpg")));
        assert!(discovery.is_supported(Path::new("dir/nested/test.jpg")));
        assert!(!discovery.is_supported(Path::new("test.JPG")));
        assert!(!discovery.is_supported(Path::new("test.jpeg")));
        assert!(!discovery.is_supported(Path::new("test.png")));
        assert!(!discovery.is_supported(Path::new("jpg")));
    }

    #[test]
    fn test_extra_extensions() {
        let discovery = FileDiscovery::new(DiscoveryConfig {
            extensions: vec!["jpg".into(), "jpeg".into(), "JPG".into()],
            follow_links: true,
        });
        assert!(discovery.is_supported(Path::new("a.JPG")));
        assert!(discovery.is_supported(Path::new("a.jpeg")));
    }

    #[test]
    fn test_discover_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("b").join("c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("z.jpg"), b"zz").unwrap();
        std::fs::write(nested.join("a.jpg"), b"a").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"skip").unwrap();
        std::fs::write(dir.path().join("upper.JPG"), b"skip").unwrap();

        let files = discovery().discover(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("b/c/a.jpg"), PathBuf::from("z.jpg")]
        );
        assert_eq!(FileDiscovery::total_size(&files), 3);
    }

    #[test]
    fn test_discover_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discovery().discover(dir.path()).is_empty());
    }

    #[test]
    fn test_discover_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discovery().discover(&dir.path().join("gone")).is_empty());
    }

    #[test]
    fn test_discover_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("one.jpg");
        std::fs::write(&file, b"1234").unwrap();

        let files = discovery().discover(&file);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size, 4);
    }

    #[test]
    fn test_total_size() {
        let files = vec![
            DiscoveredFile {
                path: PathBuf::from("a.jpg"),
                size: 100,
            },
            DiscoveredFile {
                path: PathBuf::from("b.jpg"),
                size: 200,
            },
        ];

        assert_eq!(FileDiscovery::total_size(&files), 300);
    }
}
