//! Render token codec.
//!
//! The mermaid.ink / mermaid.live services accept a `pako:` token: the JSON
//! editor state (`{"code": ..., "mermaid": "{\"theme\":...}"}`) compressed
//! with zlib and encoded as URL-safe base64 without padding.

use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use serde::{Deserialize, Serialize};

use crate::error::{MermaidLiveError, Result};

/// Theme used when none is configured.
pub const DEFAULT_THEME: &str = "default";

/// Prefix the remote services expect in front of a token.
pub const TOKEN_PREFIX: &str = "pako";

pub const DEFAULT_IMAGE_BASE_URL: &str = "https://mermaid.ink";
pub const DEFAULT_EDITOR_BASE_URL: &str = "https://mermaid.live";

/// Editor state document understood by the remote services.
#[derive(Debug, Serialize, Deserialize)]
struct EditorState {
    code: String,
    /// Mermaid config, itself serialized as a JSON string.
    mermaid: String,
}

#[derive(Debug, Serialize)]
struct MermaidConfig<'a> {
    theme: &'a str,
}

/// Encodes a diagram description with the default theme.
pub fn encode(description: &str) -> Result<String> {
    encode_with_theme(description, DEFAULT_THEME)
}

/// Encodes a diagram description into a URL-safe render token.
///
/// Deterministic: the same description and theme always yield the same token.
pub fn encode_with_theme(description: &str, theme: &str) -> Result<String> {
    let mermaid = serde_json::to_string(&MermaidConfig { theme })
        .map_err(|e| MermaidLiveError::codec(format!("Failed to serialize config: {}", e)))?;
    let state = EditorState {
        code: description.to_string(),
        mermaid,
    };
    let json = serde_json::to_vec(&state)
        .map_err(|e| MermaidLiveError::codec(format!("Failed to serialize state: {}", e)))?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| MermaidLiveError::codec(format!("Failed to compress: {}", e)))?;
    let compressed = encoder
        .finish()
        .map_err(|e| MermaidLiveError::codec(format!("Failed to compress: {}", e)))?;

    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// Recovers the diagram description from a render token.
///
/// Accepts the token with or without the `pako:` prefix.
pub fn decode(token: &str) -> Result<String> {
    let token = token
        .strip_prefix(TOKEN_PREFIX)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(token);

    let compressed = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|e| MermaidLiveError::codec(format!("Invalid base64 token: {}", e)))?;

    let mut json = String::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_string(&mut json)
        .map_err(|e| MermaidLiveError::codec(format!("Failed to decompress token: {}", e)))?;

    let state: EditorState = serde_json::from_str(&json)
        .map_err(|e| MermaidLiveError::codec(format!("Invalid editor state: {}", e)))?;
    Ok(state.code)
}

/// Composes image and editor URLs around a render token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderUrls {
    image_base: String,
    editor_base: String,
}

impl Default for RenderUrls {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_BASE_URL, DEFAULT_EDITOR_BASE_URL)
    }
}

impl RenderUrls {
    pub fn new(image_base: impl Into<String>, editor_base: impl Into<String>) -> Self {
        Self {
            image_base: image_base.into().trim_end_matches('/').to_string(),
            editor_base: editor_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// `{image_base}/img/pako:{token}`
    pub fn image_url(&self, token: &str) -> String {
        format!("{}/img/{}:{}", self.image_base, TOKEN_PREFIX, token)
    }

    /// `{editor_base}/edit#pako:{token}`
    pub fn editor_url(&self, token: &str) -> String {
        format!("{}/edit#{}:{}", self.editor_base, TOKEN_PREFIX, token)
    }
}
