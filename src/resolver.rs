//! Collision-free destination paths.
//!
//! A destination is `Organized/<group key>/<file name>`, relative to the scan
//! root. When that name is already taken, either by a file on disk or by an
//! earlier assignment in the same planning run, the file is renamed to
//! `<stem>_<n><ext>` using the smallest `n >= 1` still free for that
//! (group key, stem, extension) triple.

use std::collections::{HashMap, HashSet};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the output directory created directly under the scan root.
pub const OUTPUT_DIR_NAME: &str = "Organized";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CollisionKey {
    group_key: String,
    stem: OsString,
    extension: Option<OsString>,
}

/// Assigns destinations for one planning run.
///
/// State lives only as long as the resolver; a fresh one must be used for
/// every plan.
#[derive(Debug)]
pub struct DestinationResolver<'a> {
    root: &'a Path,
    assigned: HashSet<PathBuf>,
    counters: HashMap<CollisionKey, u32>,
}

impl<'a> DestinationResolver<'a> {
    /// Creates a resolver for a scan root.
    pub fn new(root: &'a Path) -> Self {
        Self {
            root,
            assigned: HashSet::new(),
            counters: HashMap::new(),
        }
    }

    /// Returns a destination for `file_name` under `group_key`, relative to
    /// the root, and reserves it for the rest of the run.
    ///
    /// The name is used byte for byte, so names that are not valid UTF-8
    /// keep their exact bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use sortwise::resolver::DestinationResolver;
    /// use std::ffi::OsStr;
    /// use std::path::{Path, PathBuf};
    ///
    /// let mut resolver = DestinationResolver::new(Path::new("/nonexistent/root"));
    /// assert_eq!(
    ///     resolver.resolve("Images", OsStr::new("a.jpg")),
    ///     PathBuf::from("Organized/Images/a.jpg")
    /// );
    /// assert_eq!(
    ///     resolver.resolve("Images", OsStr::new("a.jpg")),
    ///     PathBuf::from("Organized/Images/a_1.jpg")
    /// );
    /// ```
    pub fn resolve(&mut self, group_key: &str, file_name: &OsStr) -> PathBuf {
        let directory = Path::new(OUTPUT_DIR_NAME).join(group_key);
        let candidate = directory.join(file_name);

        if !is_taken(self.root, &self.assigned, &candidate) {
            self.assigned.insert(candidate.clone());
            return candidate;
        }

        let (stem, extension) = split_file_name(file_name);
        let key = CollisionKey {
            group_key: group_key.to_string(),
            stem: stem.to_os_string(),
            extension: extension.map(OsStr::to_os_string),
        };
        let counter = self.counters.entry(key).or_insert(1);

        loop {
            let candidate = directory.join(suffixed_name(stem, extension, *counter));
            *counter += 1;

            if !is_taken(self.root, &self.assigned, &candidate) {
                tracing::debug!(
                    file_name = %file_name.to_string_lossy(),
                    destination = %candidate.display(),
                    "renamed to avoid collision"
                );
                self.assigned.insert(candidate.clone());
                return candidate;
            }
        }
    }
}

/// A name is taken if this run already assigned it or anything, including a
/// dangling symlink, occupies it on disk.
fn is_taken(root: &Path, assigned: &HashSet<PathBuf>, relative: &Path) -> bool {
    assigned.contains(relative) || fs::symlink_metadata(root.join(relative)).is_ok()
}

/// Splits a file name into stem and extension: `a.tar.gz` is (`a.tar`, `gz`).
/// Leading-dot and trailing-dot names have no extension.
fn split_file_name(file_name: &OsStr) -> (&OsStr, Option<&OsStr>) {
    let path = Path::new(file_name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) if !ext.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    }
}

fn suffixed_name(stem: &OsStr, extension: Option<&OsStr>, counter: u32) -> OsString {
    let mut name = stem.to_os_string();
    name.push(format!("_{}", counter));
    if let Some(ext) = extension {
        name.push(".");
        name.push(ext);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_without_collision() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut resolver = DestinationResolver::new(temp_dir.path());

        assert_eq!(
            resolver.resolve("Documents", OsStr::new("notes.txt")),
            PathBuf::from("Organized/Documents/notes.txt")
        );
    }

    #[test]
    fn test_resolve_in_run_collisions_count_up() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut resolver = DestinationResolver::new(temp_dir.path());

        let first = resolver.resolve("Images", OsStr::new("photo.jpg"));
        let second = resolver.resolve("Images", OsStr::new("photo.jpg"));
        let third = resolver.resolve("Images", OsStr::new("photo.jpg"));

        assert_eq!(first, PathBuf::from("Organized/Images/photo.jpg"));
        assert_eq!(second, PathBuf::from("Organized/Images/photo_1.jpg"));
        assert_eq!(third, PathBuf::from("Organized/Images/photo_2.jpg"));
    }

    #[test]
    fn test_resolve_skips_names_on_disk() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let images = temp_dir.path().join(OUTPUT_DIR_NAME).join("Images");
        fs::create_dir_all(&images).expect("Failed to create directory");
        fs::write(images.join("a.jpg"), "old").expect("Failed to write file");
        fs::write(images.join("a_1.jpg"), "older").expect("Failed to write file");

        let mut resolver = DestinationResolver::new(temp_dir.path());
        assert_eq!(
            resolver.resolve("Images", OsStr::new("a.jpg")),
            PathBuf::from("Organized/Images/a_2.jpg")
        );
    }

    #[test]
    fn test_resolve_groups_are_independent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut resolver = DestinationResolver::new(temp_dir.path());

        resolver.resolve("jpg", OsStr::new("a.jpg"));
        assert_eq!(
            resolver.resolve("Images", OsStr::new("a.jpg")),
            PathBuf::from("Organized/Images/a.jpg")
        );
    }

    #[test]
    fn test_suffix_does_not_clash_with_real_file_of_same_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut resolver = DestinationResolver::new(temp_dir.path());

        // A file literally called a_1.jpg is planned first.
        resolver.resolve("Images", OsStr::new("a_1.jpg"));
        resolver.resolve("Images", OsStr::new("a.jpg"));
        assert_eq!(
            resolver.resolve("Images", OsStr::new("a.jpg")),
            PathBuf::from("Organized/Images/a_2.jpg")
        );
    }

    #[test]
    fn test_resolve_without_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut resolver = DestinationResolver::new(temp_dir.path());

        resolver.resolve("Others", OsStr::new("Makefile"));
        assert_eq!(
            resolver.resolve("Others", OsStr::new("Makefile")),
            PathBuf::from("Organized/Others/Makefile_1")
        );
    }

    #[test]
    fn test_split_file_name() {
        let split = |name: &'static str| split_file_name(OsStr::new(name));
        assert_eq!(split("a.tar.gz"), (OsStr::new("a.tar"), Some(OsStr::new("gz"))));
        assert_eq!(split(".env"), (OsStr::new(".env"), None));
        assert_eq!(split("README"), (OsStr::new("README"), None));
        assert_eq!(split("file."), (OsStr::new("file."), None));
        assert_eq!(split("Photo.JPG"), (OsStr::new("Photo"), Some(OsStr::new("JPG"))));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_keep_their_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut resolver = DestinationResolver::new(temp_dir.path());
        // Both names decode lossily to "caf\u{FFFD}.txt".
        let latin1 = OsStr::from_bytes(b"caf\xe9.txt");
        let other = OsStr::from_bytes(b"caf\xff.txt");

        assert_eq!(
            resolver.resolve("Documents", latin1),
            Path::new("Organized/Documents").join(latin1)
        );
        assert_eq!(
            resolver.resolve("Documents", other),
            Path::new("Organized/Documents").join(other)
        );
        assert_eq!(
            resolver.resolve("Documents", latin1),
            Path::new("Organized/Documents").join(OsStr::from_bytes(b"caf\xe9_1.txt"))
        );
    }
}
