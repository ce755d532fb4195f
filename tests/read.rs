use std::path::Path;

use ome_zarr_reader::{Error, LayerData, display::Colormap, get_reader, is_zarr};
use serde_json::{Value, json};
use tempfile::TempDir;

fn store_dir() -> TempDir {
    env_logger::try_init().ok();
    tempfile::tempdir().expect("create temp dir")
}

fn write_json(root: &Path, relative: &str, value: &Value) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_vec(value).unwrap()).unwrap();
}

/// Zarr v2 array metadata for a `(t, c, z, y, x)` uint8 array.
fn zarray(shape: [u64; 5]) -> Value {
    json!({
        "zarr_format": 2,
        "shape": shape,
        "chunks": [1, 1, 1, 4, 4],
        "dtype": "|u1",
        "compressor": null,
        "fill_value": 0,
        "order": "C",
        "filters": null
    })
}

/// A group with two resolution levels.
fn pyramid_store(root: &Path) {
    write_json(root, ".zgroup", &json!({"zarr_format": 2}));
    write_json(
        root,
        ".zattrs",
        &json!({"multiscales": [{
            "version": "0.1",
            "datasets": [{"path": "0"}, {"path": "1"}]
        }]}),
    );
    write_json(root, "0/.zarray", &zarray([1, 2, 1, 8, 8]));
    write_json(root, "1/.zarray", &zarray([1, 2, 1, 4, 4]));
}

fn omero(model: &str) -> Value {
    json!({
        "channels": [{
            "color": "FF0000",
            "window": {"start": 0, "end": 255},
            "label": "R",
            "active": true
        }],
        "rdefs": {"model": model}
    })
}

fn root_str(dir: &TempDir) -> String {
    dir.path().to_str().unwrap().to_owned()
}

fn read_one(path: &str) -> LayerData {
    let reader = get_reader(path).unwrap().expect("should be a store");
    let mut layers = reader.read(path).unwrap();
    assert_eq!(layers.len(), 1);
    layers.pop().unwrap()
}

#[test]
fn not_a_store() {
    let dir = store_dir();
    std::fs::write(dir.path().join("readme.txt"), "hello").unwrap();
    assert!(get_reader(root_str(&dir)).unwrap().is_none());
    assert!(!is_zarr(root_str(&dir)).unwrap());
}

#[test]
fn empty_descriptors_are_not_a_store() {
    let dir = store_dir();
    write_json(dir.path(), ".zgroup", &json!({}));
    write_json(dir.path(), ".zarray", &json!({}));
    assert!(get_reader(root_str(&dir)).unwrap().is_none());
}

#[test]
fn group_or_array_is_a_store() {
    let group = store_dir();
    write_json(group.path(), ".zgroup", &json!({"zarr_format": 2}));
    assert!(get_reader(root_str(&group)).unwrap().is_some());

    let array = store_dir();
    write_json(array.path(), ".zarray", &zarray([1, 1, 1, 4, 4]));
    assert!(get_reader(root_str(&array)).unwrap().is_some());
}

#[test]
fn multiscale_levels_in_order() {
    let dir = store_dir();
    pyramid_store(dir.path());
    let root = format!("{}/", root_str(&dir));

    let layer = read_one(&root_str(&dir));
    assert_eq!(layer.pyramid.paths(), ["0", "1"]);
    let levels = layer.pyramid.levels();
    assert_eq!(levels[0].location(), format!("{root}0"));
    assert_eq!(levels[1].location(), format!("{root}1"));
    assert_eq!(levels[0].shape(), [1, 2, 1, 8, 8]);
    assert_eq!(levels[1].shape(), [1, 2, 1, 4, 4]);
    assert_eq!(layer.pyramid.channel_count(), Some(2));
    assert_eq!(layer.metadata.channel_axis, 1);
}

#[test]
fn unwritten_chunks_read_as_fill_value() {
    let dir = store_dir();
    pyramid_store(dir.path());
    let layer = read_one(&root_str(&dir));
    let array = layer.pyramid.levels()[1].array();
    let data: Vec<u8> = array
        .retrieve_array_subset(&array.subset_all())
        .expect("retrieve all data");
    assert_eq!(data, vec![0; 2 * 4 * 4]);
}

#[test]
fn default_single_level() {
    let dir = store_dir();
    write_json(dir.path(), ".zgroup", &json!({"zarr_format": 2}));
    write_json(dir.path(), "0/.zarray", &zarray([1, 1, 1, 4, 4]));

    let layer = read_one(&root_str(&dir));
    assert_eq!(layer.pyramid.paths(), ["0"]);
    assert_eq!(
        layer.pyramid.levels()[0].location(),
        format!("{}/0", root_str(&dir))
    );
}

#[test]
fn malformed_multiscales_is_fatal() {
    let dir = store_dir();
    write_json(dir.path(), ".zgroup", &json!({"zarr_format": 2}));
    write_json(
        dir.path(),
        ".zattrs",
        &json!({"multiscales": [{"datasets": [{"name": "0"}]}]}),
    );
    let reader = get_reader(root_str(&dir)).unwrap().unwrap();
    assert!(matches!(
        reader.read(root_str(&dir)),
        Err(Error::InvalidMultiscales(_))
    ));
}

#[test]
fn missing_resolution_array_is_fatal() {
    let dir = store_dir();
    write_json(dir.path(), ".zgroup", &json!({"zarr_format": 2}));
    let reader = get_reader(root_str(&dir)).unwrap().unwrap();
    assert!(reader.read(root_str(&dir)).is_err());
}

#[test]
fn color_channels() {
    let dir = store_dir();
    pyramid_store(dir.path());
    write_json(dir.path(), "omero.json", &omero("color"));

    let meta = read_one(&root_str(&dir)).metadata;
    assert_eq!(
        meta.display.colormap,
        Some(vec![Colormap::ramp([1.0, 0.0, 0.0])])
    );
    assert_eq!(meta.display.contrast_limits, Some(vec![[0.0, 255.0]]));
    assert_eq!(meta.display.name, Some(vec!["R".to_owned()]));
    assert_eq!(meta.display.visible, Some(vec![true]));
}

#[test]
fn greyscale_channels() {
    let dir = store_dir();
    pyramid_store(dir.path());
    write_json(dir.path(), "omero.json", &omero("greyscale"));

    let meta = read_one(&root_str(&dir)).metadata;
    assert_eq!(
        meta.display.colormap,
        Some(vec![Colormap::ramp([1.0, 1.0, 1.0])])
    );
}

#[test]
fn absent_omero_gives_channel_axis_only() {
    let dir = store_dir();
    pyramid_store(dir.path());
    let meta = read_one(&root_str(&dir)).metadata;
    assert_eq!(serde_json::to_value(&meta).unwrap(), json!({"channel_axis": 1}));
}

#[test]
fn malformed_local_documents_degrade() {
    let dir = store_dir();
    pyramid_store(dir.path());
    std::fs::write(dir.path().join("omero.json"), "{not json").unwrap();

    let meta = read_one(&root_str(&dir)).metadata;
    assert!(meta.display.is_empty());
}

#[test]
fn reading_twice_is_identical() {
    let dir = store_dir();
    pyramid_store(dir.path());
    write_json(dir.path(), "omero.json", &omero("color"));
    let path = root_str(&dir);

    let reader = get_reader(path.as_str()).unwrap().unwrap();
    let first = reader.read(path.as_str()).unwrap().pop().unwrap();
    let second = reader.read(path.as_str()).unwrap().pop().unwrap();
    assert_eq!(first.pyramid.paths(), second.pyramid.paths());
    assert_eq!(first.metadata, second.metadata);
}

#[test]
fn only_first_path_is_used() {
    let dir = store_dir();
    pyramid_store(dir.path());
    let paths = vec![root_str(&dir), "/does/not/exist".to_owned()];
    let reader = get_reader(paths.clone()).unwrap().unwrap();
    assert_eq!(reader.read(paths).unwrap().len(), 1);
}

#[cfg(unix)]
#[test]
fn file_url() {
    let dir = store_dir();
    pyramid_store(dir.path());
    let url = format!("file://{}/", root_str(&dir));
    let layer = read_one(&url);
    assert_eq!(layer.pyramid.len(), 2);
}
