//! Metadata to display attributes.
//!
//! Pure and total: missing or malformed fields are skipped, never reported.
//! The output order is fixed:
//! 1. file size
//! 2. filename
//! 3. container
//! 4. resolution
//! 5. HDR/SDR
//! 6. audio language

use crate::attributes::category::{Attribute, AttributeCategory};
use crate::attributes::format::{format_file_size, language_name};
use crate::metadata::model::{ItemMetadata, MediaStream};
use crate::settings::DisplayOptions;

/// Build the ordered attribute list for an item.
pub fn derive_attributes(item: &ItemMetadata, options: &DisplayOptions) -> Vec<Attribute> {
    let mut attrs = Vec::new();
    let source = item.primary_source();
    let streams: &[MediaStream] = source.map(|s| s.media_streams.as_slice()).unwrap_or(&[]);

    // [1] FILE SIZE
    if options.show_file_size {
        if let Some(size) = source.and_then(|s| s.size).filter(|size| *size > 0.0) {
            let formatted = format_file_size(size);
            if !formatted.is_empty() {
                attrs.push(Attribute::new(AttributeCategory::FileSize, formatted));
            }
        }
    }

    // [2] FILENAME
    if options.show_file_name {
        if let Some(name) = item.path.as_deref().and_then(file_name) {
            attrs.push(Attribute::new(AttributeCategory::FileName, name));
        }
    }

    // [3] CONTAINER
    if options.show_container {
        if let Some(container) = source
            .and_then(|s| s.container.as_deref())
            .filter(|c| !c.is_empty())
        {
            attrs.push(Attribute::new(
                AttributeCategory::Container,
                container.to_uppercase(),
            ));
        }
    }

    // [4] RESOLUTION
    if options.show_resolution {
        let dimensions = streams.iter().filter(|s| s.is_video()).find_map(|s| {
            match (s.width, s.height) {
                (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
                _ => None,
            }
        });
        if let Some((width, height)) = dimensions {
            attrs.push(Attribute::new(
                AttributeCategory::Resolution,
                format!("{}×{}", width, height),
            ));
        }
    }

    // [5] HDR/SDR
    if options.show_hdr {
        if let Some(video) = streams.iter().find(|s| s.is_video()) {
            attrs.push(Attribute::new(
                AttributeCategory::DynamicRange,
                dynamic_range(video),
            ));
        }
    }

    // [6] AUDIO LANGUAGE
    if options.show_audio_language {
        let language = streams
            .iter()
            .filter(|s| s.is_audio())
            .find_map(|s| s.language.as_deref().filter(|l| !l.is_empty()));
        if let Some(code) = language {
            attrs.push(Attribute::new(
                AttributeCategory::AudioLanguage,
                language_name(code),
            ));
        }
    }

    attrs
}

/// Last segment of a `/` or `\` separated path.
fn file_name(path: &str) -> Option<String> {
    path.rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Classify a video stream's dynamic range.
///
/// Precedence: PQ transfer, HLG transfer, Dolby Vision profile, any other
/// HDR signal, then SDR.
pub fn dynamic_range(stream: &MediaStream) -> &'static str {
    let transfer = stream.color_transfer.as_deref();
    match transfer {
        Some("smpte2084") => return "HDR10",
        Some("arib-std-b67") => return "HLG",
        _ => {}
    }
    let dolby_vision = stream
        .profile
        .as_deref()
        .map(|p| p.to_lowercase().contains("dv"))
        .unwrap_or(false);
    if dolby_vision {
        return "Dolby Vision";
    }
    let hdr_range = stream.video_range.as_deref() == Some("HDR");
    let hdr_range_type = stream
        .video_range_type
        .as_deref()
        .map(|t| t != "SDR")
        .unwrap_or(false);
    if hdr_range || hdr_range_type {
        "HDR"
    } else {
        "SDR"
    }
}
