use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    display::DisplayMetadata,
    location::{PathLike, StoreLocation},
    metadata::RootAttributes,
    pyramid::{CHANNEL_AXIS, Pyramid, resolution_paths},
    storage::{Document, MetadataSource},
};

const ZARRAY: &str = ".zarray";
const ZGROUP: &str = ".zgroup";
const ZATTRS: &str = ".zattrs";
const OMERO: &str = "omero.json";

/// Logging behaviour chosen by the caller.
///
/// The crate only emits through the `log` facade and never touches global
/// logger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Level of the per-document fetch trace.
    pub fetch_log_level: log::Level,
    /// Level of the root attribute and per-resolution summaries.
    pub summary_log_level: log::Level,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fetch_log_level: log::Level::Debug,
            summary_log_level: log::Level::Info,
        }
    }
}

/// Display metadata for one layer, with the axis it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerMetadata {
    pub channel_axis: usize,
    #[serde(flatten)]
    pub display: DisplayMetadata,
}

/// One image layer: the pyramid and how to display it.
#[derive(Debug)]
pub struct LayerData {
    pub pyramid: Pyramid,
    pub metadata: LayerMetadata,
}

impl From<LayerData> for (Pyramid, LayerMetadata) {
    fn from(value: LayerData) -> Self {
        (value.pyramid, value.metadata)
    }
}

/// Optional documents loaded once a store has been detected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreMetadata {
    pub root_attributes: RootAttributes,
    pub omero: Map<String, Value>,
}

/// A chunked-array store, local or remote.
pub struct Store {
    location: StoreLocation,
    source: Box<dyn MetadataSource>,
    config: ReaderConfig,
}

impl Store {
    pub fn new(location: StoreLocation) -> crate::Result<Self> {
        Self::with_config(location, ReaderConfig::default())
    }

    pub fn with_config(location: StoreLocation, config: ReaderConfig) -> crate::Result<Self> {
        let source = location.metadata_source()?;
        Ok(Self {
            location,
            source,
            config,
        })
    }

    /// Use an arbitrary document source for the given location.
    pub fn with_source(
        location: StoreLocation,
        source: Box<dyn MetadataSource>,
        config: ReaderConfig,
    ) -> Self {
        Self {
            location,
            source,
            config,
        }
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    fn fetch(&self, name: &str) -> crate::Result<Document> {
        let doc = self.source.fetch(name)?;
        let outcome = match &doc {
            Document::Found(_) => "found",
            Document::Missing => "missing",
            Document::Malformed(_) => "malformed",
        };
        log::log!(
            self.config.fetch_log_level,
            "fetched {}: {outcome}",
            self.location.join(name)
        );
        Ok(doc)
    }

    /// Whether the root holds a non-empty array or group descriptor.
    ///
    /// Fetches nothing else.
    pub fn detect(&self) -> crate::Result<bool> {
        let mut valid = false;
        for name in [ZARRAY, ZGROUP] {
            match self.fetch(name)? {
                Document::Malformed(reason) => log::warn!("ignoring malformed {name}: {reason}"),
                doc => valid |= doc.is_present(),
            }
        }
        Ok(valid)
    }

    /// Fetch the root attributes and channel settings of a detected store.
    pub fn load(&self) -> crate::Result<StoreMetadata> {
        if !self.detect()? {
            return Err(crate::Error::NotAStore(self.location.root().to_owned()));
        }
        self.load_unchecked()
    }

    fn load_unchecked(&self) -> crate::Result<StoreMetadata> {
        let omero = self.fetch(OMERO)?.into_map_or_empty(OMERO);
        let root_attributes = RootAttributes::new(self.fetch(ZATTRS)?.into_map_or_empty(ZATTRS));
        log::log!(
            self.config.summary_log_level,
            "root attributes {}",
            Value::Object(root_attributes.attributes().clone())
        );
        Ok(StoreMetadata {
            root_attributes,
            omero,
        })
    }

    /// Detect, then load; `None` if this is not a store.
    pub fn into_reader(self) -> crate::Result<Option<Reader>> {
        if !self.detect()? {
            log::debug!("{} is not a zarr store", self.location.root());
            return Ok(None);
        }
        let metadata = self.load_unchecked()?;
        Ok(Some(Reader {
            store: self,
            metadata,
        }))
    }
}

/// A reader bound to one valid store.
pub struct Reader {
    store: Store,
    metadata: StoreMetadata,
}

impl Reader {
    pub fn location(&self) -> &StoreLocation {
        self.store.location()
    }

    pub fn metadata(&self) -> &StoreMetadata {
        &self.metadata
    }

    /// Open the pyramid and derive its display metadata.
    ///
    /// `path` is accepted for symmetry with [`get_reader`]; the bound store is
    /// always the one read.
    pub fn read(&self, path: impl Into<PathLike>) -> crate::Result<Vec<LayerData>> {
        let path = path.into();
        log::trace!("reading {:?} from {}", path.first()?, self.location().root());
        Ok(vec![self.layer()?])
    }

    fn layer(&self) -> crate::Result<LayerData> {
        let paths = resolution_paths(&self.metadata.root_attributes)?;
        log::log!(
            self.store.config.summary_log_level,
            "resolutions {paths:?}"
        );
        let storage = self.location().array_storage()?;
        let pyramid = Pyramid::open(
            self.location(),
            storage,
            &paths,
            self.store.config.summary_log_level,
        )?;
        let display = DisplayMetadata::from_document(&self.metadata.omero);
        Ok(LayerData {
            pyramid,
            metadata: LayerMetadata {
                channel_axis: CHANNEL_AXIS,
                display,
            },
        })
    }
}

/// A reader for `path`, or `None` if it does not point at a zarr store.
pub fn get_reader(path: impl Into<PathLike>) -> crate::Result<Option<Reader>> {
    get_reader_with_config(path, ReaderConfig::default())
}

pub fn get_reader_with_config(
    path: impl Into<PathLike>,
    config: ReaderConfig,
) -> crate::Result<Option<Reader>> {
    let path = path.into();
    let location = StoreLocation::classify(path.first()?);
    Store::with_config(location, config)?.into_reader()
}

/// Whether `path` points at a zarr store, fetching only the descriptors.
pub fn is_zarr(path: impl Into<PathLike>) -> crate::Result<bool> {
    let path = path.into();
    Store::new(StoreLocation::classify(path.first()?))?.detect()
}
