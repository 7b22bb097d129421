use std::collections::BTreeMap;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::descriptor::PackageDescriptor;
use crate::error::{KegError, Result};

/// A package as defined in the flat registry file.
///
/// Registry-sourced packages carry no install steps; they are plain
/// download-verify-extract installs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// The URL of the source archive.
    pub url: String,
    /// Expected SHA-256 of the archive, if published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// Short human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Upstream homepage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

/// The local package registry: one JSON object mapping package name to
/// its entry, replaced wholesale by `update`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    packages: BTreeMap<String, RegistryEntry>,
}

impl Registry {
    /// Loads the registry file at `path`.
    ///
    /// # Errors
    ///
    /// [`KegError::RegistryMissing`] if the file does not exist (the user
    /// has not run `keg update` yet), [`KegError::RegistryParse`] if it
    /// is not a valid registry document.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Registry> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(KegError::RegistryMissing(path.to_path_buf()));
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| KegError::filesystem(path, e))?;
        let registry = serde_json::from_str(&content)?;
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.packages.get(name)
    }

    /// Builds the descriptor for a registry-sourced package.
    pub fn descriptor(&self, name: &str) -> Option<PackageDescriptor> {
        self.get(name).map(|entry| {
            let mut desc = PackageDescriptor::new(name, &entry.url);
            desc.sha256 = entry.sha256.clone();
            desc.description = entry.desc.clone();
            desc.homepage = entry.homepage.clone();
            desc
        })
    }

    /// Package names containing `term`, in sorted order.
    pub fn search(&self, term: &str) -> Vec<&str> {
        self.packages
            .keys()
            .filter(|name| name.contains(term))
            .map(|name| name.as_str())
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(|name| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Fetches the remote registry document and replaces the local file.
///
/// The document is written to a temporary file in the registry's own
/// directory and renamed into place, so a crashed update never leaves a
/// truncated registry behind.
pub fn update_registry(url: &str, path: &Path) -> Result<()> {
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| KegError::network(url, e))?;
    let body = response.text().map_err(|e| KegError::network(url, e))?;

    // Fail on garbage before touching the local file.
    let _: Registry = serde_json::from_str(&body)?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| KegError::filesystem(dir, e))?;
    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| KegError::filesystem(dir, e))?;
    std::fs::write(tmp.path(), &body).map_err(|e| KegError::filesystem(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| KegError::filesystem(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
        "foo": {
            "url": "https://x/foo-1.0.tar.gz",
            "sha256": "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae",
            "desc": "A demo package",
            "homepage": "https://foo.example"
        },
        "foobar": {"url": "https://x/foobar-2.1.tar.xz"},
        "wget": {"url": "https://x/wget-1.25.0.tgz"}
    }"#;

    fn sample_registry(dir: &Path) -> Registry {
        let path = dir.join("registry.json");
        std::fs::write(&path, SAMPLE).unwrap();
        Registry::load(&path).unwrap()
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = Registry::load(dir.path().join("registry.json")).unwrap_err();
        assert!(matches!(err, KegError::RegistryMissing(_)));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = Registry::load(&path).unwrap_err();
        assert!(matches!(err, KegError::RegistryParse(_)));
    }

    #[test]
    fn test_descriptor_fields() {
        let dir = tempdir().unwrap();
        let registry = sample_registry(dir.path());
        let desc = registry.descriptor("foo").unwrap();
        assert_eq!(desc.source_url, "https://x/foo-1.0.tar.gz");
        assert_eq!(desc.description.as_deref(), Some("A demo package"));
        assert!(desc.install.is_none());

        let bare = registry.descriptor("foobar").unwrap();
        assert!(bare.sha256.is_none());
        assert!(registry.descriptor("missing").is_none());
    }

    #[test]
    fn test_search_is_substring_and_sorted() {
        let dir = tempdir().unwrap();
        let registry = sample_registry(dir.path());
        assert_eq!(registry.search("foo"), vec!["foo", "foobar"]);
        assert_eq!(registry.search("zzz"), Vec::<&str>::new());
        assert_eq!(registry.len(), 3);
    }
}
