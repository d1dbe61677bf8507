//! Path resolution
//!
//!     WML refers to files in three ways:
//!
//!         `./maps/01.map`     relative to the file being processed
//!         `~add-ons/Pack`     relative to the user data directory
//!         `units/elf.cfg`     relative to the game data directory
//!
//!     Bare paths to images, music and sounds are looked up in the asset bucket of
//!     every registered binary path before falling back to the core bucket under the
//!     data directory. Resolution only decides where a path points; callers check
//!     whether something exists there. Results are normalized lexically, so they
//!     carry no `.` or `..` segments (a `..` at the root of a relative path is kept).

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Asset bucket a bare path is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetBucket {
    Images,
    Music,
    Sounds,
}

impl AssetBucket {
    pub fn from_path(path: &str) -> Option<Self> {
        let extension = Path::new(path)
            .extension()
            .and_then(OsStr::to_str)?
            .to_ascii_lowercase();
        match extension.as_str() {
            "png" | "jpg" | "webp" => Some(AssetBucket::Images),
            "ogg" => Some(AssetBucket::Music),
            "wav" => Some(AssetBucket::Sounds),
            _ => None,
        }
    }

    pub fn dir_name(&self) -> &'static str {
        match self {
            AssetBucket::Images => "images",
            AssetBucket::Music => "music",
            AssetBucket::Sounds => "sounds",
        }
    }
}

/// Removes `.` segments and folds `..` into the preceding segment.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = normalized.components().next_back();
                match last {
                    Some(Component::Normal(_)) => {
                        normalized.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => normalized.push(".."),
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Resolves a WML path string to a filesystem location.
///
/// `current` is the file or directory being processed; for a file, relative paths
/// start at its parent directory.
pub fn resolve(
    path: &str,
    binary_paths: &[PathBuf],
    current: &Path,
    data_dir: &Path,
    user_data_dir: &Path,
) -> PathBuf {
    if path.starts_with('.') {
        let base = if current.is_dir() {
            current
        } else {
            current.parent().unwrap_or(current)
        };
        return normalize(&base.join(path));
    }

    if let Some(rest) = path.strip_prefix('~') {
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        return normalize(&user_data_dir.join(rest));
    }

    match AssetBucket::from_path(path) {
        Some(bucket) => {
            let bucketed = Path::new(bucket.dir_name()).join(path);
            let bucketed = &bucketed;
            let bases = [user_data_dir.join(".."), data_dir.join("..")];
            binary_paths
                .iter()
                .flat_map(|root| bases.iter().map(move |base| base.join(root).join(bucketed)))
                .map(|candidate| normalize(&candidate))
                .find(|candidate| candidate.exists())
                .unwrap_or_else(|| normalize(&data_dir.join("core").join(bucketed)))
        }
        None => normalize(&data_dir.join(path)),
    }
}

/// The data directories a preprocessing run resolves paths against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    data_dir: PathBuf,
    user_data_dir: PathBuf,
}

impl PathResolver {
    pub fn new(data_dir: impl Into<PathBuf>, user_data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            user_data_dir: user_data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn user_data_dir(&self) -> &Path {
        &self.user_data_dir
    }

    pub fn resolve(&self, path: &str, binary_paths: &[PathBuf], current: &Path) -> PathBuf {
        resolve(path, binary_paths, current, &self.data_dir, &self.user_data_dir)
    }

    pub fn exists(&self, path: &str, binary_paths: &[PathBuf], current: &Path) -> bool {
        self.resolve(path, binary_paths, current).exists()
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(".", ".")
    }
}
