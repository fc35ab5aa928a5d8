//! Item metadata as returned by `GET /Items/{id}`.
//!
//! Decoding is lenient at the leaves: a field with an unexpected JSON type
//! decodes as absent instead of failing the whole item, and malformed
//! entries in a list are dropped. Only a body that is not a JSON object at
//! all is a decode error.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata for one library item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemMetadata {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub path: Option<String>,
    /// Always a list after decoding; absent or null becomes empty.
    #[serde(default, deserialize_with = "lenient_list")]
    pub media_sources: Vec<MediaSource>,
}

/// One physical representation of an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaSource {
    #[serde(default, deserialize_with = "lenient")]
    pub container: Option<String>,
    /// Size in bytes.
    #[serde(default, deserialize_with = "lenient")]
    pub size: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub media_streams: Vec<MediaStream>,
}

/// Kind of a stream within a media source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamType {
    Video,
    Audio,
    Subtitle,
    #[serde(other)]
    Other,
}

/// A single audio/video/subtitle track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaStream {
    #[serde(rename = "Type")]
    pub stream_type: StreamType,
    #[serde(default, deserialize_with = "lenient")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub height: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub color_transfer: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub profile: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub video_range: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub video_range_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub language: Option<String>,
}

impl MediaStream {
    pub fn new(stream_type: StreamType) -> Self {
        Self {
            stream_type,
            width: None,
            height: None,
            color_transfer: None,
            profile: None,
            video_range: None,
            video_range_type: None,
            language: None,
        }
    }

    pub fn is_video(&self) -> bool {
        self.stream_type == StreamType::Video
    }

    pub fn is_audio(&self) -> bool {
        self.stream_type == StreamType::Audio
    }
}

impl ItemMetadata {
    /// Parse a response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// First media source, where size, container and streams are read from.
    pub fn primary_source(&self) -> Option<&MediaSource> {
        self.media_sources.first()
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_media_sources_becomes_empty() {
        let item = ItemMetadata::from_slice(br#"{"Path": "/m/a.mkv"}"#).unwrap();
        assert!(item.media_sources.is_empty());

        let item = ItemMetadata::from_slice(br#"{"MediaSources": null}"#).unwrap();
        assert!(item.media_sources.is_empty());
    }

    #[test]
    fn test_decode_full_item() {
        let body = br#"{
            "Id": "abc",
            "Path": "/media/title.mkv",
            "MediaSources": [{
                "Container": "mkv",
                "Size": 1024,
                "MediaStreams": [
                    {"Type": "Video", "Width": 1920, "Height": 1080, "ColorTransfer": "smpte2084"},
                    {"Type": "Audio", "Language": "eng"},
                    {"Type": "EmbeddedImage"}
                ]
            }]
        }"#;
        let item = ItemMetadata::from_slice(body).unwrap();
        let source = item.primary_source().unwrap();
        assert_eq!(source.size, Some(1024.0));
        assert_eq!(source.media_streams.len(), 3);
        assert_eq!(source.media_streams[2].stream_type, StreamType::Other);
        assert_eq!(source.media_streams[1].language.as_deref(), Some("eng"));
    }

    #[test]
    fn test_malformed_leaves_are_dropped() {
        let body = br#"{
            "Path": 42,
            "MediaSources": [
                {"Size": "big", "MediaStreams": [null, {"Width": 1}, {"Type": "Video", "Height": "tall"}]},
                "garbage"
            ]
        }"#;
        let item = ItemMetadata::from_slice(body).unwrap();
        assert_eq!(item.path, None);
        assert_eq!(item.media_sources.len(), 1);
        let source = &item.media_sources[0];
        assert_eq!(source.size, None);
        assert_eq!(source.media_streams.len(), 1);
        assert_eq!(source.media_streams[0].height, None);
    }

    #[test]
    fn test_non_object_body_is_an_error() {
        assert!(ItemMetadata::from_slice(b"<html>").is_err());
        assert!(ItemMetadata::from_slice(br#""just a string""#).is_err());
    }
}
