use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One multiscale image described in the root `.zattrs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Multiscale {
    /// OME-NGFF version, if declared. Writers disagree on its JSON type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    /// Resolution levels, highest resolution first.
    pub datasets: Vec<Dataset>,
}

/// One resolution level of a [`Multiscale`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dataset {
    /// Array path relative to the store root.
    pub path: String,
}

/// The root attributes document (`.zattrs`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootAttributes {
    attributes: Map<String, Value>,
}

impl RootAttributes {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// The first entry of `multiscales`, the only one which is read.
    ///
    /// `Ok(None)` if the key is absent; an error if it is present but is not
    /// a non-empty list whose first record names its datasets.
    pub fn first_multiscale(&self) -> crate::Result<Option<Multiscale>> {
        let Some(value) = self.attributes.get("multiscales") else {
            return Ok(None);
        };
        let first = value
            .as_array()
            .ok_or_else(|| crate::Error::multiscales("expected a list"))?
            .first()
            .ok_or_else(|| crate::Error::multiscales("empty multiscales list"))?;
        Multiscale::deserialize(first)
            .map(Some)
            .map_err(|e| crate::Error::multiscales(e.to_string()))
    }
}

/// The rendering window of a channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Window {
    pub start: f64,
    pub end: f64,
}

/// One entry of the OMERO `channels` list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Channel {
    /// Hex color, `RRGGBB`.
    pub color: String,
    pub window: Window,
    pub label: String,
    pub active: bool,
}

/// OMERO rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RenderingDefs {
    /// `"greyscale"` or `"color"`.
    #[serde(default)]
    pub model: Option<String>,
}

/// The channel display document (`omero.json`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Omero {
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub rdefs: Option<RenderingDefs>,
}

impl Omero {
    pub fn from_map(map: Map<String, Value>) -> crate::Result<Self> {
        serde_json::from_value(Value::Object(map)).map_err(|e| crate::Error::channel(e.to_string()))
    }

    /// The rendering model; required as soon as there is a channel to render.
    pub fn model(&self) -> crate::Result<&str> {
        self.rdefs
            .as_ref()
            .and_then(|r| r.model.as_deref())
            .ok_or_else(|| crate::Error::channel("missing rdefs.model"))
    }

    pub fn is_greyscale(&self) -> crate::Result<bool> {
        Ok(self.model()? == "greyscale")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn attrs(value: Value) -> RootAttributes {
        let Value::Object(map) = value else {
            panic!("not an object")
        };
        RootAttributes::new(map)
    }

    #[test]
    fn absent_multiscales() {
        let a = attrs(json!({"other": 1}));
        assert!(a.first_multiscale().unwrap().is_none());
    }

    #[test]
    fn multiscales_paths() {
        let a = attrs(json!({
            "multiscales": [{
                "version": "0.1",
                "datasets": [{"path": "0"}, {"path": "1"}, {"path": "2"}]
            }]
        }));
        let ms = a.first_multiscale().unwrap().unwrap();
        assert_eq!(ms.version, Some(json!("0.1")));
        let paths: Vec<_> = ms.datasets.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, ["0", "1", "2"]);
    }

    #[test]
    fn numeric_version() {
        let a = attrs(json!({
            "multiscales": [{"version": 0.1, "name": 7, "datasets": [{"path": "0"}]}]
        }));
        let ms = a.first_multiscale().unwrap().unwrap();
        assert_eq!(ms.version, Some(json!(0.1)));
        assert_eq!(ms.datasets, [Dataset { path: "0".into() }]);
    }

    #[test]
    fn later_multiscales_are_not_validated() {
        let a = attrs(json!({"multiscales": [
            {"datasets": [{"path": "0"}, {"path": "1"}]},
            {"label": "no datasets here"}
        ]}));
        let ms = a.first_multiscale().unwrap().unwrap();
        assert_eq!(ms.datasets.len(), 2);
    }

    #[test]
    fn malformed_multiscales() {
        for bad in [
            json!({"multiscales": {"datasets": []}}),
            json!({"multiscales": []}),
            json!({"multiscales": [{"no_datasets": true}, {"datasets": [{"path": "0"}]}]}),
            json!({"multiscales": [{"datasets": [{"path": 0}]}]}),
        ] {
            assert!(matches!(
                attrs(bad).first_multiscale(),
                Err(crate::Error::InvalidMultiscales(_))
            ));
        }
    }

    #[test]
    fn omero_model() {
        let Value::Object(map) = json!({
            "channels": [],
            "rdefs": {"model": "greyscale"}
        }) else {
            unreachable!()
        };
        let omero = Omero::from_map(map).unwrap();
        assert!(omero.is_greyscale().unwrap());
    }

    #[test]
    fn omero_missing_channels() {
        assert!(Omero::from_map(Map::new()).is_err());
    }
}
