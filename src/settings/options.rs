//! Display toggles.

use serde::{Deserialize, Serialize};

/// One independent toggle per optional attribute and per action button.
///
/// Serialized with the camelCase keys of the stored settings blob; keys
/// missing from a blob take their default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayOptions {
    pub show_file_size: bool,
    pub show_file_name: bool,
    pub show_container: bool,
    pub show_resolution: bool,
    #[serde(rename = "showHDR")]
    pub show_hdr: bool,
    pub show_audio_language: bool,
    pub show_delete_button: bool,
    pub show_identify_button: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_file_size: true,
            show_file_name: true,
            show_container: true,
            show_resolution: true,
            show_hdr: true,
            show_audio_language: true,
            show_delete_button: false,
            show_identify_button: false,
        }
    }
}

impl DisplayOptions {
    /// Everything off.
    pub fn none() -> Self {
        Self {
            show_file_size: false,
            show_file_name: false,
            show_container: false,
            show_resolution: false,
            show_hdr: false,
            show_audio_language: false,
            show_delete_button: false,
            show_identify_button: false,
        }
    }

    pub fn any_button(&self) -> bool {
        self.show_delete_button || self.show_identify_button
    }
}
