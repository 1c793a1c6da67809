//! Resource bundles that ship archives alongside the application

use async_trait::async_trait;
use pyembed_errors::{Error, InstallError};
use std::path::{Path, PathBuf};

/// A named collection of binary resources
#[async_trait]
pub trait ResourceBundle: Send + Sync {
    /// Bundle name used in diagnostics
    fn name(&self) -> &str;

    /// Identifiers of every resource, `/`-separated
    async fn resource_names(&self) -> Result<Vec<String>, Error>;

    /// Read a resource by its exact identifier
    async fn read(&self, name: &str) -> Result<Vec<u8>, Error>;

    /// Resolve `resource` to an exact identifier.
    ///
    /// An exact match wins; otherwise the resource must be the unique entry
    /// ending in `/<resource>`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::ResourceNotFound`] when nothing or more than
    /// one entry matches.
    async fn resolve(&self, resource: &str) -> Result<String, Error> {
        let names = self.resource_names().await?;
        resolve_name(&names, resource).ok_or_else(|| {
            InstallError::ResourceNotFound {
                resource: resource.to_string(),
                bundle: self.name().to_string(),
            }
            .into()
        })
    }
}

fn resolve_name(names: &[String], resource: &str) -> Option<String> {
    let resource = resource.replace('\\', "/");
    let resource = resource.trim_start_matches('/');
    if resource.is_empty() {
        return None;
    }
    if let Some(exact) = names.iter().find(|n| n.as_str() == resource) {
        return Some(exact.clone());
    }
    let suffix = format!("/{resource}");
    let mut matches = names.iter().filter(|n| n.ends_with(&suffix));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(only.clone()),
        _ => None,
    }
}

/// Resources compiled into the binary, usually with `include_bytes!`
#[derive(Debug, Clone, Default)]
pub struct EmbeddedBundle {
    name: String,
    resources: Vec<(&'static str, &'static [u8])>,
}

impl EmbeddedBundle {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_resource(mut self, name: &'static str, bytes: &'static [u8]) -> Self {
        self.resources.push((name, bytes));
        self
    }
}

#[async_trait]
impl ResourceBundle for EmbeddedBundle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resource_names(&self) -> Result<Vec<String>, Error> {
        Ok(self
            .resources
            .iter()
            .map(|(name, _)| (*name).to_string())
            .collect())
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, Error> {
        self.resources
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, bytes)| bytes.to_vec())
            .ok_or_else(|| {
                InstallError::ResourceNotFound {
                    resource: name.to_string(),
                    bundle: self.name.clone(),
                }
                .into()
            })
    }
}

/// Resources served from a directory tree on disk
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    root: PathBuf,
}

impl DirectoryBundle {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ResourceBundle for DirectoryBundle {
    fn name(&self) -> &str {
        self.root.to_str().unwrap_or("<directory bundle>")
    }

    async fn resource_names(&self) -> Result<Vec<String>, Error> {
        let mut names = Vec::new();
        let mut pending = vec![(self.root.clone(), String::new())];

        while let Some((dir, prefix)) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                // A missing bundle directory simply has no resources
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(Error::io_with_path(&e, &dir)),
            };
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| Error::io_with_path(&e, &dir))?
            {
                let file_name = entry.file_name().to_string_lossy().into_owned();
                let name = if prefix.is_empty() {
                    file_name
                } else {
                    format!("{prefix}/{file_name}")
                };
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| Error::io_with_path(&e, entry.path()))?;
                if file_type.is_dir() {
                    pending.push((entry.path(), name));
                } else {
                    names.push(name);
                }
            }
        }

        names.sort();
        Ok(names)
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, Error> {
        let path = name
            .split('/')
            .fold(self.root.clone(), |path, part| path.join(part));
        tokio::fs::read(&path)
            .await
            .map_err(|e| Error::io_with_path(&e, &path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_exact_match_wins() {
        let all = names(&["python.zip", "resources/python.zip"]);
        assert_eq!(resolve_name(&all, "python.zip").as_deref(), Some("python.zip"));
    }

    #[test]
    fn test_suffix_match_on_boundary() {
        let all = names(&["resources/python.zip", "resources/mypython.zip"]);
        assert_eq!(
            resolve_name(&all, "python.zip").as_deref(),
            Some("resources/python.zip")
        );
        assert_eq!(resolve_name(&all, "thon.zip"), None);
    }

    #[test]
    fn test_ambiguous_suffix_is_not_found() {
        let all = names(&["a/python.zip", "b/python.zip"]);
        assert_eq!(resolve_name(&all, "python.zip"), None);
        assert_eq!(resolve_name(&all, "b\\python.zip").as_deref(), Some("b/python.zip"));
    }

    #[tokio::test]
    async fn test_embedded_bundle() {
        let bundle = EmbeddedBundle::new("app").with_resource("assets/numpy.whl", b"wheel");
        let resolved = bundle.resolve("numpy.whl").await.unwrap();
        assert_eq!(bundle.read(&resolved).await.unwrap(), b"wheel");

        let err = bundle.resolve("scipy.whl").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Install(InstallError::ResourceNotFound { ref bundle, .. }) if bundle == "app"
        ));
    }

    #[tokio::test]
    async fn test_directory_bundle_walks_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("dist/win")).unwrap();
        std::fs::write(dir.path().join("dist/win/python.zip"), b"zip").unwrap();
        std::fs::write(dir.path().join("README"), b"hi").unwrap();

        let bundle = DirectoryBundle::new(dir.path());
        assert_eq!(
            bundle.resource_names().await.unwrap(),
            names(&["README", "dist/win/python.zip"])
        );
        let resolved = bundle.resolve("python.zip").await.unwrap();
        assert_eq!(bundle.read(&resolved).await.unwrap(), b"zip");
    }
}
