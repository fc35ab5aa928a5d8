//! Display formatting for sizes and language codes.

const SIZE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Human-readable size in binary units (1 KB = 1024 B).
///
/// Bytes are printed as a whole number; every larger unit gets exactly one
/// decimal.
/// Negative, NaN and infinite inputs give an empty string.
pub fn format_file_size(bytes: f64) -> String {
    if !bytes.is_finite() || bytes < 0.0 {
        return String::new();
    }
    if bytes == 0.0 {
        return "0 B".to_string();
    }
    if bytes < 1024.0 {
        return format!("{} B", bytes.trunc() as u64);
    }
    // Dividing by a power of two is exact, so unit boundaries land cleanly
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, SIZE_UNITS[unit])
}

/// Display name for an audio language code.
///
/// Unknown codes come back upper-cased.
pub fn language_name(code: &str) -> String {
    let name = match code.to_lowercase().as_str() {
        "eng" => "English",
        "jpn" => "Japanese",
        "kor" => "Korean",
        "fra" => "French",
        "deu" => "German",
        "spa" => "Spanish",
        "ita" => "Italian",
        "rus" => "Russian",
        "chi" => "Chinese",
        "por" => "Portuguese",
        "hin" => "Hindi",
        "ara" => "Arabic",
        _ => return code.to_uppercase(),
    };
    name.to_string()
}
