//! Typed content blocks attached to an event report.
//!
//! The wire form is a flat object tagged by `type`. Decoding goes through
//! [`RawBlock`] so the per-type mandatory fields are checked once, at the
//! boundary, and the engine only ever sees well-formed variants.

use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Reference to one uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl ImageRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageLayout {
    #[default]
    Single,
    Grid,
    Carousel,
}

impl ImageLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageLayout::Single => "single",
            ImageLayout::Grid => "grid",
            ImageLayout::Carousel => "carousel",
        }
    }
}

/// Block type as named by a caller. Unknown names are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Text,
    Image,
    Quote,
    Achievement,
    Other(String),
}

impl BlockKind {
    pub fn as_str(&self) -> &str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::Quote => "quote",
            BlockKind::Achievement => "achievement",
            BlockKind::Other(name) => name,
        }
    }

    /// Case-insensitive lookup; anything unrecognised becomes `Other`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "text" => BlockKind::Text,
            "image" => BlockKind::Image,
            "quote" => BlockKind::Quote,
            "achievement" => BlockKind::Achievement,
            _ => BlockKind::Other(name.trim().to_string()),
        }
    }
}

impl FromStr for BlockKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(BlockKind::from_name(s))
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBlock", into = "RawBlock")]
pub enum ContentBlock {
    Text {
        id: String,
        title: String,
        content: String,
    },
    Image {
        id: String,
        images: Vec<ImageRef>,
        layout: ImageLayout,
        caption: Option<String>,
    },
    Quote {
        id: String,
        title: String,
        content: String,
        author: Option<String>,
    },
    Achievement {
        id: String,
        title: String,
        content: String,
    },
    /// Any block whose type tag is not one of the known kinds.
    Custom {
        id: String,
        kind: String,
        title: String,
        content: String,
    },
}

impl ContentBlock {
    pub fn text(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        ContentBlock::Text {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn quote(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        ContentBlock::Quote {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            author: None,
        }
    }

    pub fn achievement(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        ContentBlock::Achievement {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn image(id: impl Into<String>, images: Vec<ImageRef>) -> Self {
        ContentBlock::Image {
            id: id.into(),
            images,
            layout: ImageLayout::default(),
            caption: None,
        }
    }

    pub fn custom(
        id: impl Into<String>,
        kind: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        ContentBlock::Custom {
            id: id.into(),
            kind: kind.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ContentBlock::Text { id, .. }
            | ContentBlock::Image { id, .. }
            | ContentBlock::Quote { id, .. }
            | ContentBlock::Achievement { id, .. }
            | ContentBlock::Custom { id, .. } => id,
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            ContentBlock::Text { .. } => BlockKind::Text,
            ContentBlock::Image { .. } => BlockKind::Image,
            ContentBlock::Quote { .. } => BlockKind::Quote,
            ContentBlock::Achievement { .. } => BlockKind::Achievement,
            ContentBlock::Custom { kind, .. } => BlockKind::Other(kind.clone()),
        }
    }
}

/// Flat wire representation shared by every block type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    images: Vec<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    layout: Option<ImageLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
}

fn required(
    value: Option<String>,
    kind: &str,
    id: &str,
    field: &'static str,
) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::BlockField {
            kind: kind.to_string(),
            id: id.to_string(),
            field,
        }),
    }
}

impl TryFrom<RawBlock> for ContentBlock {
    type Error = ValidationError;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        let RawBlock {
            kind,
            id,
            title,
            content,
            author,
            images,
            layout,
            caption,
        } = raw;

        match BlockKind::from_name(&kind) {
            BlockKind::Text => Ok(ContentBlock::Text {
                title: required(title, &kind, &id, "title")?,
                content: required(content, &kind, &id, "content")?,
                id,
            }),
            BlockKind::Quote => Ok(ContentBlock::Quote {
                title: required(title, &kind, &id, "title")?,
                content: required(content, &kind, &id, "content")?,
                author,
                id,
            }),
            BlockKind::Achievement => Ok(ContentBlock::Achievement {
                title: required(title, &kind, &id, "title")?,
                content: required(content, &kind, &id, "content")?,
                id,
            }),
            BlockKind::Image => Ok(ContentBlock::Image {
                id,
                images,
                layout: layout.unwrap_or_default(),
                caption,
            }),
            BlockKind::Other(name) => Ok(ContentBlock::Custom {
                id,
                kind: name,
                title: title.unwrap_or_default(),
                content: content.unwrap_or_default(),
            }),
        }
    }
}

impl From<ContentBlock> for RawBlock {
    fn from(block: ContentBlock) -> Self {
        let empty = |kind: &str, id: String| RawBlock {
            kind: kind.to_string(),
            id,
            title: None,
            content: None,
            author: None,
            images: Vec::new(),
            layout: None,
            caption: None,
        };

        match block {
            ContentBlock::Text { id, title, content } => RawBlock {
                title: Some(title),
                content: Some(content),
                ..empty("text", id)
            },
            ContentBlock::Image {
                id,
                images,
                layout,
                caption,
            } => RawBlock {
                images,
                layout: Some(layout),
                caption,
                ..empty("image", id)
            },
            ContentBlock::Quote {
                id,
                title,
                content,
                author,
            } => RawBlock {
                title: Some(title),
                content: Some(content),
                author,
                ..empty("quote", id)
            },
            ContentBlock::Achievement { id, title, content } => RawBlock {
                title: Some(title),
                content: Some(content),
                ..empty("achievement", id)
            },
            ContentBlock::Custom {
                id,
                kind,
                title,
                content,
            } => RawBlock {
                title: Some(title),
                content: Some(content),
                ..empty(&kind, id)
            },
        }
    }
}
