use serde::{Deserialize, Serialize};

/// What kind of asset a generation produced. Serialized form matches the
/// HTTP contract (`"svg"` / `"image"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Svg,
    Image,
}

/// A successful generation: raw SVG markup for [`AssetKind::Svg`], a
/// resolvable result URL for [`AssetKind::Image`]. Exactly one kind per
/// success; nothing is persisted between requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedAsset {
    pub kind: AssetKind,
    pub content: String,
}

impl GeneratedAsset {
    pub fn svg(content: impl Into<String>) -> Self {
        Self {
            kind: AssetKind::Svg,
            content: content.into(),
        }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self {
            kind: AssetKind::Image,
            content: url.into(),
        }
    }
}

/// Inbound body of `POST /api/generate`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerateBody {
    pub prompt: String,
    #[serde(rename = "modelId")]
    pub model_id: String,
}

/// Outbound success body: `{ "content": ..., "type": "svg" | "image" }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerateReply {
    pub content: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
}

impl From<GeneratedAsset> for GenerateReply {
    fn from(asset: GeneratedAsset) -> Self {
        Self {
            content: asset.content,
            kind: asset.kind,
        }
    }
}

/// Outbound failure body: `{ "error": ... }`, paired with a non-2xx status.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}
