//! Path-based file classification: language tags and include/exclude decisions.
//!
//! Everything here is a pure function of the path string.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Language tag attached to changes and embedded files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Go,
    Rust,
    Cpp,
    C,
    Ruby,
    Php,
    CSharp,
    Swift,
    Unknown,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::CSharp => "csharp",
            Language::Swift => "swift",
            Language::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered extension table; the first match wins.
const LANGUAGE_TABLE: &[(&str, Language)] = &[
    ("py", Language::Python),
    ("js", Language::JavaScript),
    ("jsx", Language::JavaScript),
    ("ts", Language::TypeScript),
    ("tsx", Language::TypeScript),
    ("java", Language::Java),
    ("go", Language::Go),
    ("rs", Language::Rust),
    ("cpp", Language::Cpp),
    ("c", Language::C),
    ("rb", Language::Ruby),
    ("php", Language::Php),
    ("cs", Language::CSharp),
    ("swift", Language::Swift),
];

/// Source extensions worth indexing in the vector store.
const EMBED_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "java", "go", "rs", "cpp", "c", "rb", "php", "cs", "swift",
];

/// Directory names never indexed (vendored, generated, VCS).
const EMBED_DENY_SEGMENTS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "__pycache__",
    "venv",
];

/// Extensions excluded from review: images, docs, data, lockfiles, logs.
const REVIEW_SKIP_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "ico", "md", "txt", "json", "yaml", "yml", "lock", "log",
];

/// Lowercased extension of the last path segment, if any.
fn extension(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() && !name[1..].contains('.') {
        // dotfiles like `.gitignore` have no extension
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// True iff the path has a source extension and no vendored/generated directory segment.
pub fn classify_for_embedding(path: &str) -> bool {
    let denied = path
        .split('/')
        .any(|segment| EMBED_DENY_SEGMENTS.contains(&segment));
    if denied {
        return false;
    }
    extension(path).is_some_and(|ext| EMBED_EXTENSIONS.contains(&ext.as_str()))
}

/// True unless the file extension is in the review skip list.
pub fn classify_for_review(filename: &str) -> bool {
    match extension(filename) {
        Some(ext) => !REVIEW_SKIP_EXTENSIONS.contains(&ext.as_str()),
        None => true,
    }
}

/// Language from the file extension, `Unknown` when nothing matches.
pub fn detect_language(path: &str) -> Language {
    let Some(ext) = extension(path) else {
        return Language::Unknown;
    };
    LANGUAGE_TABLE
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
        .unwrap_or(Language::Unknown)
}
