use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use url::Url;
use zarrs::{filesystem::FilesystemStore, storage::ReadableStorage};

use crate::storage::{
    LocalSource, MetadataSource,
    http::{HttpSource, HttpStore},
};

/// One path or a list of paths, as handed over by a host application.
///
/// Only the first entry of a list is ever used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathLike {
    Single(String),
    Many(Vec<String>),
}

impl PathLike {
    /// The path which will actually be read.
    pub fn first(&self) -> crate::Result<&str> {
        match self {
            PathLike::Single(s) => Ok(s),
            PathLike::Many(v) => v
                .first()
                .map(String::as_str)
                .ok_or_else(|| crate::Error::general("empty path list")),
        }
    }
}

impl From<&str> for PathLike {
    fn from(value: &str) -> Self {
        Self::Single(value.to_owned())
    }
}

impl From<String> for PathLike {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<&Path> for PathLike {
    fn from(value: &Path) -> Self {
        Self::Single(value.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for PathLike {
    fn from(value: PathBuf) -> Self {
        value.as_path().into()
    }
}

impl From<&PathBuf> for PathLike {
    fn from(value: &PathBuf) -> Self {
        value.as_path().into()
    }
}

impl From<Vec<String>> for PathLike {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

impl From<&[&str]> for PathLike {
    fn from(value: &[&str]) -> Self {
        Self::Many(value.iter().map(|s| (*s).to_owned()).collect())
    }
}

/// Where a store's root lives.
///
/// The root always ends with a `/`, so that documents and arrays are addressed
/// by plain concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Local(String),
    Remote(String),
}

impl StoreLocation {
    /// Decide between local filesystem and remote HTTP access.
    ///
    /// Anything without a URL scheme, with the `file` scheme, or with a
    /// one-letter scheme (a Windows drive) is local; everything else is remote.
    pub fn classify(path: &str) -> Self {
        match Url::parse(path) {
            Err(_) => Self::local(path),
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(p) => Self::local(&p.to_string_lossy()),
                Err(()) => Self::local(url.path()),
            },
            Ok(url) if url.scheme().len() == 1 => Self::local(path),
            Ok(_) => Self::Remote(with_trailing_slash(path)),
        }
    }

    fn local(path: &str) -> Self {
        Self::Local(with_trailing_slash(path))
    }

    /// The normalized root, ending with `/`.
    pub fn root(&self) -> &str {
        match self {
            StoreLocation::Local(r) | StoreLocation::Remote(r) => r,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, StoreLocation::Remote(_))
    }

    /// Location of a document or array relative to the root.
    pub fn join(&self, relative: &str) -> String {
        format!("{}{}", self.root(), relative.trim_start_matches('/'))
    }

    /// Build the accessor used for JSON documents.
    pub fn metadata_source(&self) -> crate::Result<Box<dyn MetadataSource>> {
        Ok(match self {
            StoreLocation::Local(root) => Box::new(LocalSource::new(root)),
            StoreLocation::Remote(root) => Box::new(HttpSource::new(root)?),
        })
    }

    /// Build the `zarrs` storage used to open arrays lazily.
    pub fn array_storage(&self) -> crate::Result<ReadableStorage> {
        match self {
            StoreLocation::Local(root) => {
                let store = FilesystemStore::new(root).map_err(crate::Error::wrap)?;
                Ok(Arc::new(store))
            }
            StoreLocation::Remote(root) => Ok(Arc::new(HttpStore::new(root)?)),
        }
    }
}

fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_owned()
    } else {
        format!("{path}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_path_is_local() {
        let loc = StoreLocation::classify("/data/image.zarr");
        assert_eq!(loc, StoreLocation::Local("/data/image.zarr/".into()));
    }

    #[test]
    fn relative_path_is_local() {
        let loc = StoreLocation::classify("image.zarr/");
        assert_eq!(loc, StoreLocation::Local("image.zarr/".into()));
    }

    #[cfg(unix)]
    #[test]
    fn file_scheme_is_stripped() {
        let loc = StoreLocation::classify("file:///data/image.zarr");
        assert_eq!(loc, StoreLocation::Local("/data/image.zarr/".into()));
    }

    #[test]
    fn drive_letter_is_local() {
        let loc = StoreLocation::classify("C:\\data\\image.zarr");
        assert!(!loc.is_remote());
    }

    #[test]
    fn http_is_remote() {
        let loc = StoreLocation::classify("https://s3.embassy.ebi.ac.uk/idr/zarr/v0.1/6001240.zarr");
        assert_eq!(
            loc,
            StoreLocation::Remote("https://s3.embassy.ebi.ac.uk/idr/zarr/v0.1/6001240.zarr/".into())
        );
        assert_eq!(
            loc.join(".zattrs"),
            "https://s3.embassy.ebi.ac.uk/idr/zarr/v0.1/6001240.zarr/.zattrs"
        );
    }

    #[test]
    fn first_of_many() {
        let p = PathLike::from(vec!["a.zarr".to_owned(), "b.zarr".to_owned()]);
        assert_eq!(p.first().unwrap(), "a.zarr");
        assert!(PathLike::Many(vec![]).first().is_err());
    }
}
