//! Caller-supplied per-layer substitutions.
//!
//! Overrides are plain data keyed by sprite image key. They persist across frames and across
//! layer rebuilds until [`DynamicOverrideStore::clear_all`] is called.

use std::collections::BTreeMap;

use crate::foundation::{
    core::Vec2,
    error::{PlayerError, PlayerResult},
};

/// Font size used when a text override does not set one.
pub const DEFAULT_TEXT_SIZE: &str = "14px";
/// Text colour used when a text override does not set one.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Image reference substituted into a layer (URL, path or `data:` URI).
pub struct ImageSource(pub String);

impl From<&str> for ImageSource {
    fn from(v: &str) -> Self {
        Self(v.to_owned())
    }
}

impl From<String> for ImageSource {
    fn from(v: String) -> Self {
        Self(v)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Fully-resolved text override.
pub struct TextStyle {
    /// Text content.
    pub text: String,
    /// CSS-like size, e.g. `"14px"`.
    pub size: String,
    /// Font family; empty means host default.
    pub family: String,
    /// CSS-like colour, e.g. `"#000000"`.
    pub color: String,
    /// Offset from the layer origin.
    pub offset: Vec2,
}

impl TextStyle {
    /// Font shorthand `"{size} {family}"`, trimmed when the family is empty.
    pub fn font(&self) -> String {
        format!("{} {}", self.size, self.family).trim_end().to_owned()
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Partially specified text override. Empty or missing fields take defaults.
pub struct TextStyleInput {
    /// Text content.
    #[serde(default)]
    pub text: String,
    /// Font size.
    #[serde(default)]
    pub size: Option<String>,
    /// Font family.
    #[serde(default)]
    pub family: Option<String>,
    /// Colour.
    #[serde(default)]
    pub color: Option<String>,
    /// Offset from the layer origin.
    #[serde(default)]
    pub offset: Option<Vec2>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
/// Either a bare string or a style record.
pub enum TextInput {
    /// Bare text; every style field takes its default.
    Plain(String),
    /// Styled text.
    Styled(TextStyleInput),
}

impl From<&str> for TextInput {
    fn from(v: &str) -> Self {
        Self::Plain(v.to_owned())
    }
}

impl From<String> for TextInput {
    fn from(v: String) -> Self {
        Self::Plain(v)
    }
}

impl From<TextStyleInput> for TextInput {
    fn from(v: TextStyleInput) -> Self {
        Self::Styled(v)
    }
}

impl TextInput {
    /// Resolve defaults.
    pub fn normalize(self) -> TextStyle {
        fn or_default(v: Option<String>, default: &str) -> String {
            v.filter(|s| !s.is_empty())
                .unwrap_or_else(|| default.to_owned())
        }

        match self {
            Self::Plain(text) => TextStyle {
                text,
                size: DEFAULT_TEXT_SIZE.to_owned(),
                family: String::new(),
                color: DEFAULT_TEXT_COLOR.to_owned(),
                offset: Vec2::ZERO,
            },
            Self::Styled(s) => TextStyle {
                text: s.text,
                size: or_default(s.size, DEFAULT_TEXT_SIZE),
                family: s.family.unwrap_or_default(),
                color: or_default(s.color, DEFAULT_TEXT_COLOR),
                offset: s.offset.unwrap_or(Vec2::ZERO),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
/// Overrides that apply to one layer, borrowed from the store.
pub struct LayerOverrides<'a> {
    /// Replacement image.
    pub image: Option<&'a ImageSource>,
    /// Affine `[a, b, c, d, tx, ty]` applied to the replacement image.
    pub image_transform: Option<&'a [f64; 6]>,
    /// Replacement text.
    pub text: Option<&'a TextStyle>,
}

impl LayerOverrides<'_> {
    /// Whether no override applies.
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.image_transform.is_none() && self.text.is_none()
    }
}

/// Per-layer image and text substitutions.
#[derive(Clone, Debug, Default)]
pub struct DynamicOverrideStore {
    images: BTreeMap<String, ImageSource>,
    image_transforms: BTreeMap<String, [f64; 6]>,
    texts: BTreeMap<String, TextStyle>,
}

impl DynamicOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an image for `key`.
    ///
    /// The image is always stored. A transform is only stored when it has exactly six
    /// components; anything else is dropped and reported as
    /// [`PlayerError::InvalidOverrideTransform`]. Without a valid transform a previously stored
    /// one for the key is kept.
    pub fn set_image(
        &mut self,
        key: impl Into<String>,
        image: impl Into<ImageSource>,
        transform: Option<&[f64]>,
    ) -> PlayerResult<()> {
        let key = key.into();
        self.images.insert(key.clone(), image.into());
        let Some(transform) = transform else {
            return Ok(());
        };
        let t = <[f64; 6]>::try_from(transform)
            .map_err(|_| PlayerError::InvalidOverrideTransform(transform.len()))?;
        self.image_transforms.insert(key, t);
        Ok(())
    }

    /// Store a text override for `key`, resolving style defaults.
    pub fn set_text(&mut self, key: impl Into<String>, input: impl Into<TextInput>) {
        self.texts.insert(key.into(), input.into().normalize());
    }

    /// Remove every image, transform and text override.
    pub fn clear_all(&mut self) {
        self.images.clear();
        self.image_transforms.clear();
        self.texts.clear();
    }

    pub fn image(&self, key: &str) -> Option<&ImageSource> {
        self.images.get(key)
    }

    pub fn image_transform(&self, key: &str) -> Option<&[f64; 6]> {
        self.image_transforms.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&TextStyle> {
        self.texts.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.image_transforms.is_empty() && self.texts.is_empty()
    }

    /// Everything that applies to the layer named `key`.
    pub fn for_layer(&self, key: &str) -> LayerOverrides<'_> {
        LayerOverrides {
            image: self.images.get(key),
            image_transform: self.image_transforms.get(key),
            text: self.texts.get(key),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overrides/store.rs"]
mod tests;
