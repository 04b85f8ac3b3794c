//! File extension to MIME type lookup

/// Type used when a file name has no extension or an unknown one
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Extension table, keyed by leading-dot extension. Keys are matched exactly,
/// so `.JPG` does not hit `.jpg`.
pub const MIME_TYPES: &[(&str, &str)] = &[
    // Text
    (".txt", "text/plain"),
    (".text", "text/plain"),
    (".log", "text/plain"),
    (".md", "text/markdown"),
    (".csv", "text/csv"),
    (".tsv", "text/tab-separated-values"),
    (".htm", "text/html"),
    (".html", "text/html"),
    (".css", "text/css"),
    (".js", "text/javascript"),
    (".mjs", "text/javascript"),
    (".xml", "text/xml"),
    (".ics", "text/calendar"),
    (".vcf", "text/vcard"),
    // Application
    (".json", "application/json"),
    (".pdf", "application/pdf"),
    (".zip", "application/zip"),
    (".gz", "application/gzip"),
    (".tar", "application/x-tar"),
    (".7z", "application/x-7z-compressed"),
    (".rar", "application/vnd.rar"),
    (".wasm", "application/wasm"),
    (".rtf", "application/rtf"),
    (".doc", "application/msword"),
    (".docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    (".xls", "application/vnd.ms-excel"),
    (".xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    (".ppt", "application/vnd.ms-powerpoint"),
    (".pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    (".apk", "application/vnd.android.package-archive"),
    // Images
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".jpe", "image/jpeg"),
    (".gif", "image/gif"),
    (".bmp", "image/bmp"),
    (".webp", "image/webp"),
    (".svg", "image/svg+xml"),
    (".ico", "image/x-icon"),
    (".tif", "image/tiff"),
    (".tiff", "image/tiff"),
    (".heic", "image/heic"),
    (".avif", "image/avif"),
    // Audio
    (".mp3", "audio/mpeg"),
    (".wav", "audio/wav"),
    (".ogg", "audio/ogg"),
    (".m4a", "audio/mp4"),
    (".aac", "audio/aac"),
    (".flac", "audio/flac"),
    (".amr", "audio/amr"),
    (".silk", "audio/silk"),
    // Video
    (".mp4", "video/mp4"),
    (".m4v", "video/mp4"),
    (".mov", "video/quicktime"),
    (".avi", "video/x-msvideo"),
    (".webm", "video/webm"),
    (".mkv", "video/x-matroska"),
    (".3gp", "video/3gpp"),
    (".flv", "video/x-flv"),
    // Fonts
    (".woff", "font/woff"),
    (".woff2", "font/woff2"),
    (".ttf", "font/ttf"),
    (".otf", "font/otf"),
];

/// Look up a leading-dot extension such as `.png`
pub fn lookup(extension: &str) -> Option<&'static str> {
    MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|&(_, mime)| mime)
}

/// The extension of a file name: everything from the last `.` to the end
pub fn extension_of(file_name: &str) -> Option<&str> {
    file_name.rfind('.').map(|idx| &file_name[idx..])
}

/// Resolve the MIME type for a file name, falling back to
/// [`DEFAULT_MIME_TYPE`]
pub fn mime_for_file_name(file_name: &str) -> &'static str {
    extension_of(file_name)
        .and_then(lookup)
        .unwrap_or(DEFAULT_MIME_TYPE)
}
