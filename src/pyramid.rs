use std::fmt;

use zarrs::{
    array::Array,
    storage::{ReadableStorage, ReadableStorageTraits},
};

use crate::{location::StoreLocation, metadata::RootAttributes};

/// Resolution used when the root attributes carry no `multiscales`.
pub const DEFAULT_RESOLUTION: &str = "0";

/// Axis of the channel dimension in the conventional `(t, c, z, y, x)` layout.
pub const CHANNEL_AXIS: usize = 1;

/// Resolution paths, highest resolution first.
///
/// Falls back to [`DEFAULT_RESOLUTION`] only when `multiscales` is absent;
/// a malformed `multiscales` entry is an error.
pub fn resolution_paths(attributes: &RootAttributes) -> crate::Result<Vec<String>> {
    let Some(first) = attributes.first_multiscale()? else {
        return Ok(vec![DEFAULT_RESOLUTION.to_owned()]);
    };
    if first.datasets.is_empty() {
        return Err(crate::Error::multiscales("multiscale has no datasets"));
    }
    if let Some(version) = &first.version {
        log::debug!("multiscales version {version}");
    }
    Ok(first.datasets.into_iter().map(|d| d.path).collect())
}

/// One lazily loaded resolution level.
pub struct PyramidLevel {
    path: String,
    location: String,
    array: Array<dyn ReadableStorageTraits>,
}

impl PyramidLevel {
    /// Path relative to the store root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The store root joined with [`Self::path`].
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn array(&self) -> &Array<dyn ReadableStorageTraits> {
        &self.array
    }

    pub fn shape(&self) -> &[u64] {
        self.array.shape()
    }
}

impl fmt::Debug for PyramidLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PyramidLevel")
            .field("path", &self.path)
            .field("location", &self.location)
            .field("shape", &self.array.shape())
            .finish_non_exhaustive()
    }
}

/// Resolution levels, highest resolution first.
#[derive(Debug, Default)]
pub struct Pyramid {
    levels: Vec<PyramidLevel>,
}

impl Pyramid {
    /// Open one array per resolution path. No chunk data is read.
    pub fn open(
        location: &StoreLocation,
        storage: ReadableStorage,
        paths: &[String],
        summary_level: log::Level,
    ) -> crate::Result<Self> {
        let mut levels = Vec::with_capacity(paths.len());
        for path in paths {
            let node_path = format!("/{}", path.trim_matches('/'));
            let array = Array::open(storage.clone(), &node_path)?;
            let first_chunk = vec![0; array.dimensionality()];
            log::log!(
                summary_level,
                "resolution {path} shape (t, c, z, y, x) {:?} chunks {:?} dtype {:?}",
                array.shape(),
                array.chunk_shape(&first_chunk).ok(),
                array.data_type(),
            );
            levels.push(PyramidLevel {
                path: path.clone(),
                location: location.join(path),
                array,
            });
        }
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[PyramidLevel] {
        &self.levels
    }

    pub fn paths(&self) -> Vec<&str> {
        self.levels.iter().map(PyramidLevel::path).collect()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of channels in the full-resolution level, if it has a channel axis.
    pub fn channel_count(&self) -> Option<u64> {
        self.levels
            .first()
            .and_then(|l| l.shape().get(CHANNEL_AXIS).copied())
    }
}

impl IntoIterator for Pyramid {
    type Item = PyramidLevel;
    type IntoIter = std::vec::IntoIter<PyramidLevel>;

    fn into_iter(self) -> Self::IntoIter {
        self.levels.into_iter()
    }
}
