//! Utility functions for file naming

/// Extract the filename from a Content-Disposition header value
///
/// Handles both `filename="clip.wav"` and the RFC 5987 form `filename*=UTF-8''clip%20a.wav`,
/// preferring the encoded form when both are present. The result is reduced to its final path
/// component so a server cannot direct writes outside the destination directory.
///
/// # Examples
///
/// ```
/// use labbcat::utils::filename_from_content_disposition;
///
/// assert_eq!(
///     filename_from_content_disposition("attachment; filename=\"clip.wav\""),
///     Some("clip.wav".to_string())
/// );
/// assert_eq!(filename_from_content_disposition("inline"), None);
/// ```
pub fn filename_from_content_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    for part in value.split(';') {
        let part = part.trim();
        if let Some(encoded) = part.strip_prefix("filename*=") {
            // Format is: charset'lang'encoded-filename
            let encoded = match encoded.rfind('\'') {
                Some(idx) => &encoded[idx + 1..],
                None => encoded,
            };
            if let Ok(decoded) = urlencoding::decode(encoded.trim_matches('"'))
                && let Some(name) = sanitize_filename(&decoded)
            {
                return Some(name);
            }
        } else if let Some(name) = part.strip_prefix("filename=") {
            plain = sanitize_filename(name.trim_matches('"'));
        }
    }
    plain
}

/// Reduce a server-supplied name to a safe single path component
///
/// Returns `None` when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let last = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = last
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        None
    } else {
        Some(cleaned)
    }
}

/// File extension for a fragment MIME type
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/mpeg" => "mp3",
        "text/praat-textgrid" => "TextGrid",
        "text/plain" => "txt",
        "application/json" => "json",
        "text/x-eaf+xml" => "eaf",
        "text/x-transcriber" => "trs",
        "text/csv" => "csv",
        _ => "bin",
    }
}

/// Name for a fragment file when the server suggests none
///
/// `<transcript-stem>__<start>-<end>.<ext>` with offsets to millisecond precision.
///
/// ```
/// use labbcat::utils::fragment_file_name;
///
/// assert_eq!(
///     fragment_file_name("AgnesShacklock-01.trs", 60.897, 67.922, "wav"),
///     "AgnesShacklock-01__60.897-67.922.wav"
/// );
/// ```
pub fn fragment_file_name(resource_id: &str, start: f64, end: f64, extension: &str) -> String {
    let stem = std::path::Path::new(resource_id)
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(sanitize_filename)
        .unwrap_or_else(|| "fragment".to_string());
    format!("{}__{:.3}-{:.3}.{}", stem, start, end, extension)
}
