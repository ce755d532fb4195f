//! Translation of OMERO channel settings into generic display parameters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::metadata::{Channel, Omero};

/// An RGB triple with components in `[0, 1]`.
pub type Rgb = [f32; 3];

pub const BLACK: Rgb = [0.0, 0.0, 0.0];
pub const WHITE: Rgb = [1.0, 1.0, 1.0];

/// Parse the first six characters of an OMERO color string (`"FF0000"`).
pub fn parse_color(color: &str) -> crate::Result<Rgb> {
    let hex = color
        .get(..6)
        .filter(|h| h.is_ascii())
        .ok_or_else(|| crate::Error::channel(format!("color {color:?} is not RRGGBB")))?;
    let mut out = BLACK;
    for (i, component) in out.iter_mut().enumerate() {
        let pair = &hex[i * 2..i * 2 + 2];
        let byte = u8::from_str_radix(pair, 16)
            .map_err(|e| crate::Error::channel(format!("color {color:?}: {e}")))?;
        *component = f32::from(byte) / 255.0;
    }
    Ok(out)
}

/// A color lookup with control points evenly spaced on `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Colormap {
    pub colors: Vec<Rgb>,
}

impl Colormap {
    /// Two-point gradient from black to `color`.
    pub fn ramp(color: Rgb) -> Self {
        Self {
            colors: vec![BLACK, color],
        }
    }

    /// Color at `t`, clamped to `[0, 1]` and linearly interpolated.
    pub fn map(&self, t: f32) -> Rgb {
        match self.colors.as_slice() {
            [] => BLACK,
            [only] => *only,
            colors => {
                let scaled = t.clamp(0.0, 1.0) * (colors.len() - 1) as f32;
                let lo = (scaled.floor() as usize).min(colors.len() - 2);
                let frac = scaled - lo as f32;
                let (a, b) = (colors[lo], colors[lo + 1]);
                [
                    a[0] + (b[0] - a[0]) * frac,
                    a[1] + (b[1] - a[1]) * frac,
                    a[2] + (b[2] - a[2]) * frac,
                ]
            }
        }
    }
}

/// Per-channel display parameters, index-aligned with the channel axis.
///
/// All fields are absent together when no usable channel metadata exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DisplayMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colormap: Option<Vec<Colormap>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast_limits: Option<Vec<[f64; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<Vec<bool>>,
}

impl DisplayMetadata {
    pub fn is_empty(&self) -> bool {
        self.colormap.is_none()
            && self.contrast_limits.is_none()
            && self.name.is_none()
            && self.visible.is_none()
    }

    /// Translate parsed OMERO settings, failing on the first unusable channel.
    pub fn try_from_omero(omero: &Omero) -> crate::Result<Self> {
        let colormap = omero
            .channels
            .iter()
            .map(|ch| channel_colormap(omero, ch))
            .collect::<crate::Result<Vec<_>>>()?;
        let contrast_limits = omero
            .channels
            .iter()
            .map(|ch| [ch.window.start, ch.window.end])
            .collect();
        let name = omero.channels.iter().map(|ch| ch.label.clone()).collect();
        let visible = omero.channels.iter().map(|ch| ch.active).collect();
        Ok(Self {
            colormap: Some(colormap),
            contrast_limits: Some(contrast_limits),
            name: Some(name),
            visible: Some(visible),
        })
    }

    /// Translate a raw `omero.json` mapping.
    ///
    /// Never fails: an absent document gives empty metadata, and so does a
    /// malformed one, after a warning.
    pub fn from_document(document: &Map<String, Value>) -> Self {
        if document.is_empty() {
            log::debug!("no channel metadata");
            return Self::default();
        }
        match Omero::from_map(document.clone()).and_then(|o| Self::try_from_omero(&o)) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("discarding channel metadata: {e}");
                Self::default()
            }
        }
    }
}

fn channel_colormap(omero: &Omero, channel: &Channel) -> crate::Result<Colormap> {
    let rgb = parse_color(&channel.color)?;
    // Greyscale rendering ignores the channel color.
    let rgb = if omero.is_greyscale()? { WHITE } else { rgb };
    Ok(Colormap::ramp(rgb))
}
