//! Attribute categories.
//!
//! Every derived string carries its category from the moment it is built,
//! so the renderer groups by tag. `Attribute::infer` exists for strings
//! that arrive without one; it is the only place shape rules live.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Dynamic-range tokens the deriver can emit.
pub const DYNAMIC_RANGE_TOKENS: [&str; 5] = ["SDR", "HDR", "HDR10", "HLG", "Dolby Vision"];

lazy_static! {
    static ref RESOLUTION_PATTERN: Regex = Regex::new(r"^\d{3,5}×\d{3,5}$").unwrap();
    static ref SIZE_PATTERN: Regex = Regex::new(r"^\d+(\.\d)? (B|KB|MB|GB|TB|PB)$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeCategory {
    FileSize,
    FileName,
    Container,
    Resolution,
    DynamicRange,
    AudioLanguage,
}

/// Line of the injected block an attribute belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineGroup {
    FileName,
    Details,
    Resolution,
}

impl AttributeCategory {
    pub fn line(self) -> LineGroup {
        match self {
            AttributeCategory::FileName => LineGroup::FileName,
            AttributeCategory::Resolution | AttributeCategory::DynamicRange => {
                LineGroup::Resolution
            }
            AttributeCategory::FileSize
            | AttributeCategory::Container
            | AttributeCategory::AudioLanguage => LineGroup::Details,
        }
    }
}

/// One display string and what it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub category: AttributeCategory,
    pub text: String,
}

impl Attribute {
    pub fn new(category: AttributeCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }

    pub fn line(&self) -> LineGroup {
        self.category.line()
    }

    /// Categorize an untagged string by its shape.
    ///
    /// Size-shaped strings are checked before the filename rule since
    /// `"1.5 GB"` also contains a dot. Anything unrecognised is a
    /// container-class detail.
    pub fn infer(text: &str) -> Self {
        let category = if SIZE_PATTERN.is_match(text) {
            AttributeCategory::FileSize
        } else if text.contains('.') && !text.contains(' ') {
            AttributeCategory::FileName
        } else if RESOLUTION_PATTERN.is_match(text) {
            AttributeCategory::Resolution
        } else if DYNAMIC_RANGE_TOKENS.contains(&text) {
            AttributeCategory::DynamicRange
        } else {
            AttributeCategory::Container
        };
        Self::new(category, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_shapes() {
        assert_eq!(Attribute::infer("title.mkv").category, AttributeCategory::FileName);
        assert_eq!(Attribute::infer("1920×1080").category, AttributeCategory::Resolution);
        assert_eq!(Attribute::infer("Dolby Vision").category, AttributeCategory::DynamicRange);
        assert_eq!(Attribute::infer("SDR").category, AttributeCategory::DynamicRange);
        assert_eq!(Attribute::infer("1.5 GB").category, AttributeCategory::FileSize);
        assert_eq!(Attribute::infer("512 B").category, AttributeCategory::FileSize);
        assert_eq!(Attribute::infer("MKV").category, AttributeCategory::Container);
        assert_eq!(Attribute::infer("English").line(), LineGroup::Details);
    }

    #[test]
    fn test_ascii_x_is_not_a_resolution() {
        assert_eq!(Attribute::infer("1920x1080").line(), LineGroup::Details);
        assert_eq!(Attribute::infer("12×10").line(), LineGroup::Details);
    }

    #[test]
    fn test_line_groups() {
        assert_eq!(AttributeCategory::FileName.line(), LineGroup::FileName);
        assert_eq!(AttributeCategory::DynamicRange.line(), LineGroup::Resolution);
        assert_eq!(AttributeCategory::FileSize.line(), LineGroup::Details);
    }
}
