//! Generated project files keyed by relative filename.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Complete named collection of generated files for one request.
///
/// Filenames are opaque keys: `"static/app.js"` and `"app.py"` are
/// independent entries, there is no directory entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileSet {
    files: BTreeMap<String, String>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file, returning the previous content
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) -> Option<String> {
        self.files.insert(name.into(), content.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Content length in characters per filename
    pub fn sizes(&self) -> BTreeMap<String, usize> {
        self.files
            .iter()
            .map(|(k, v)| (k.clone(), v.chars().count()))
            .collect()
    }

    /// Extension used as the stored file type, `txt` when there is none
    pub fn file_type(name: &str) -> &str {
        match name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() && !ext.contains('/') => ext,
            _ => "txt",
        }
    }
}

impl FromIterator<(String, String)> for FileSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FileSet {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_by_name() {
        let mut files = FileSet::new();
        assert!(files.insert("app.py", "v1").is_none());
        assert_eq!(files.insert("app.py", "v2").as_deref(), Some("v1"));
        assert_eq!(files.len(), 1);
        assert_eq!(files.get("app.py"), Some("v2"));
    }

    #[test]
    fn test_sizes_count_chars() {
        let files: FileSet = [("a.txt".to_string(), "héllo".to_string())].into_iter().collect();
        assert_eq!(files.sizes()["a.txt"], 5);
    }

    #[test]
    fn test_file_type() {
        assert_eq!(FileSet::file_type("app.py"), "py");
        assert_eq!(FileSet::file_type(".env.example"), "example");
        assert_eq!(FileSet::file_type("Procfile"), "txt");
        assert_eq!(FileSet::file_type("dir.d/Makefile"), "txt");
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut files = FileSet::new();
        files.insert("README.md", "# hi");
        let json = serde_json::to_string(&files).unwrap();
        assert_eq!(json, r##"{"README.md":"# hi"}"##);
    }
}
