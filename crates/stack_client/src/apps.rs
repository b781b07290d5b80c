//! Typed views over the app registry, disk usage and icon documents.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StackError;

/// Quota assumed when the stack reports none.
pub const DEFAULT_QUOTA: u64 = 100_000_000_000;

const FALLBACK_ICON_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Links published with an app document.
pub struct AppLinks {
    /// Public URL of the app.
    #[serde(default)]
    pub related: Option<String>,
    /// Stack path of the app icon.
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Snapshot of one installed app.
pub struct AppRecord {
    /// Document id.
    pub id: String,
    /// App slug (`drive`, `settings`, ...).
    pub slug: String,
    /// Raw document attributes.
    pub attributes: Map<String, Value>,
    /// Published links.
    pub links: AppLinks,
}

impl AppRecord {
    /// Reads an app from a JSON:API resource object.
    ///
    /// The slug falls back to `attributes.slug` when the resource has no top-level slug.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Decode`] when `json` is not an object.
    pub fn from_json(json: &Value) -> Result<Self, StackError> {
        let object = json
            .as_object()
            .ok_or_else(|| StackError::Decode("app document is not an object".to_string()))?;
        let attributes = object
            .get("attributes")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let slug = object
            .get("slug")
            .and_then(Value::as_str)
            .or_else(|| attributes.get("slug").and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();
        let links = match object.get("links") {
            Some(links) => serde_json::from_value(links.clone())
                .map_err(|err| StackError::Decode(err.to_string()))?,
            None => AppLinks::default(),
        };
        let id = string_field(object, "id")
            .or_else(|| string_field(object, "_id"))
            .unwrap_or_default();
        Ok(Self {
            id,
            slug,
            attributes,
            links,
        })
    }

    /// Reads every app of a JSON:API collection.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Decode`] when `json` is not an array of objects.
    pub fn list_from_json(json: &Value) -> Result<Vec<Self>, StackError> {
        json.as_array()
            .ok_or_else(|| StackError::Decode("app collection is not an array".to_string()))?
            .iter()
            .map(Self::from_json)
            .collect()
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Disk usage of the instance, in bytes.
pub struct StorageUsage {
    /// Bytes used.
    pub usage: u64,
    /// Bytes allowed.
    pub quota: u64,
    /// Whether the quota is enforced.
    pub is_limited: bool,
}

impl StorageUsage {
    /// Reads the `io.cozy.settings.disk-usage` document.
    ///
    /// `used` and `quota` may be numbers or numeric strings. A missing, unparsable or zero quota
    /// falls back to [`DEFAULT_QUOTA`].
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Decode`] when `used` is missing or not numeric.
    pub fn from_disk_usage(json: &Value) -> Result<Self, StackError> {
        let attributes = json
            .pointer("/data/attributes")
            .ok_or_else(|| StackError::Decode("disk usage has no attributes".to_string()))?;
        let usage = attributes
            .get("used")
            .and_then(leading_integer)
            .ok_or_else(|| StackError::Decode("disk usage has no `used` value".to_string()))?;
        let quota = attributes
            .get("quota")
            .and_then(leading_integer)
            .filter(|quota| *quota != 0)
            .unwrap_or(DEFAULT_QUOTA);
        let is_limited = attributes
            .get("is_limited")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Ok(Self {
            usage,
            quota,
            is_limited,
        })
    }
}

/// Parses the leading decimal digits of a number or string, ignoring any trailing text.
fn leading_integer(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|n| *n >= 0.0).map(|n| n.trunc() as u64)),
        Value::String(text) => {
            let text = text.trim_start();
            let digits = text
                .char_indices()
                .find(|(_, ch)| !ch.is_ascii_digit())
                .map_or(text, |(end, _)| &text[..end]);
            digits.parse().ok()
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// How app icons are rendered on the current target.
pub enum IconProps {
    /// The page can load icons from the stack directly.
    Web {
        /// Stack host without protocol.
        domain: String,
        /// Whether icons are served over HTTPS.
        secure: bool,
    },
    /// Icons must be downloaded with the session token, see [`crate::StackGetters::fetch_icon`].
    Mobile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Downloaded icon bytes.
pub struct AppIcon {
    /// Media type reported by the stack.
    pub mime_type: String,
    /// Raw icon payload.
    pub bytes: Vec<u8>,
}

impl AppIcon {
    /// Wraps `bytes`, defaulting the media type when the stack sent none.
    pub fn new(mime_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let mime_type = mime_type
            .and_then(|value| value.split(';').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(FALLBACK_ICON_MIME)
            .to_string();
        Self { mime_type, bytes }
    }

    /// Renders the icon as a `data:` URL usable as an image source.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            BASE64_STANDARD.encode(&self.bytes)
        )
    }
}
