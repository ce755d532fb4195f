//! Read OME-Zarr image pyramids, local or over HTTP, together with the OMERO
//! channel settings needed to display them.
//!
//! ```no_run
//! let reader = ome_zarr_reader::get_reader("https://example.org/image.zarr")?
//!     .expect("not a zarr store");
//! for layer in reader.read("https://example.org/image.zarr")? {
//!     println!("{:?} {:?}", layer.pyramid.paths(), layer.metadata);
//! }
//! # Ok::<_, ome_zarr_reader::Error>(())
//! ```

pub mod display;
mod error;
pub mod location;
pub mod metadata;
pub mod pyramid;
pub mod reader;
pub mod storage;

pub use zarrs;

pub use error::{Error, Result};
pub use location::{PathLike, StoreLocation};
pub use reader::{
    LayerData, LayerMetadata, Reader, ReaderConfig, Store, StoreMetadata, get_reader,
    get_reader_with_config, is_zarr,
};
