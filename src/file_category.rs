/// File categorization by extension.
///
/// This module maps a file name to one of a fixed set of categories
/// (e.g. "Images", "Documents"). The lookup is driven purely by the text
/// after the final `.` of the name, compared case-insensitively.
///
/// # Examples
///
/// ```
/// use sortwise::file_category::{Category, classify};
///
/// assert_eq!(classify("holiday.JPG"), Category::Images);
/// assert_eq!(classify("notes.txt"), Category::Documents);
/// assert_eq!(classify("Makefile"), Category::Others);
/// ```
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

/// Folder a file lands in under the file-type rule.
///
/// The variant order matches the lookup table order and is the order in which
/// categories are listed in summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Image files (JPG, PNG, HEIC, etc.)
    Images,
    /// Video files (MP4, MOV, MKV, etc.)
    Videos,
    /// Document files (PDF, DOCX, TXT, CSV, etc.)
    Documents,
    /// mp3, wav, aac, flac
    Audio,
    /// zip, rar, tar, 7z
    Archives,
    /// Installers and executables (EXE, DMG, APK)
    Executables,
    /// Anything the table does not know, including files without an extension.
    Others,
}

/// Fixed category table. Extensions are lowercase and carry no leading dot.
const CATEGORY_TABLE: &[(Category, &[&str])] = &[
    (
        Category::Images,
        &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "heic"],
    ),
    (Category::Videos, &["mp4", "mov", "avi", "mkv", "flv", "wmv"]),
    (
        Category::Documents,
        &["pdf", "docx", "pptx", "xlsx", "txt", "csv"],
    ),
    (Category::Audio, &["mp3", "wav", "aac", "flac"]),
    (Category::Archives, &["zip", "rar", "tar", "7z"]),
    (Category::Executables, &["exe", "dmg", "apk"]),
];

static DEFAULT_MAPPER: LazyLock<FileMapper> = LazyLock::new(FileMapper::new);

impl Category {
    /// Returns the directory name used as the grouping key for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use sortwise::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "Images");
    /// assert_eq!(Category::Others.dir_name(), "Others");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Videos => "Videos",
            Category::Documents => "Documents",
            Category::Audio => "Audio",
            Category::Archives => "Archives",
            Category::Executables => "Executables",
            Category::Others => "Others",
        }
    }

    /// Returns the lowercase extensions that map to this category.
    pub fn extensions(&self) -> &'static [&'static str] {
        CATEGORY_TABLE
            .iter()
            .find(|(category, _)| category == self)
            .map(|(_, extensions)| *extensions)
            .unwrap_or(&[])
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Maps file extensions to categories.
///
/// Built once from the fixed category table; there is no way to add mappings
/// at runtime.
#[derive(Debug, Clone)]
pub struct FileMapper {
    extension_map: HashMap<&'static str, Category>,
}

impl FileMapper {
    /// Creates a new `FileMapper` holding the standard table.
    pub fn new() -> Self {
        let extension_map = CATEGORY_TABLE
            .iter()
            .flat_map(|(category, extensions)| extensions.iter().map(|ext| (*ext, *category)))
            .collect();
        Self { extension_map }
    }

    /// Maps a file extension (without the dot) to a category.
    ///
    /// # Examples
    ///
    /// ```
    /// use sortwise::file_category::{Category, FileMapper};
    ///
    /// let mapper = FileMapper::default();
    /// assert_eq!(mapper.extension_to_category("pdf"), Some(Category::Documents));
    /// assert_eq!(mapper.extension_to_category("PNG"), Some(Category::Images));
    /// assert_eq!(mapper.extension_to_category("rs"), None);
    /// ```
    pub fn extension_to_category(&self, ext: &str) -> Option<Category> {
        self.extension_map.get(ext.to_lowercase().as_str()).copied()
    }

    /// Determines the category for an optional extension, defaulting to `Others`.
    pub fn categorize(&self, ext: Option<&str>) -> Category {
        ext.and_then(|extension| self.extension_to_category(extension))
            .unwrap_or(Category::Others)
    }

    /// Classifies a file by name.
    pub fn classify(&self, file_name: &str) -> Category {
        self.categorize(extension_of(file_name).as_deref())
    }
}

impl Default for FileMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifies a file name using the standard table.
///
/// Total function: names with no extension, or an unknown one, yield
/// [`Category::Others`].
pub fn classify(file_name: &str) -> Category {
    DEFAULT_MAPPER.classify(file_name)
}

/// Returns the lowercased text after the final `.` of a file name.
///
/// Leading-dot names such as `.bashrc` and trailing-dot names such as `file.`
/// have no extension.
pub fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
}
