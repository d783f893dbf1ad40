/// File extension → coarse content category.
///
/// Only consulted for files that none of the path-based rules matched.
use super::Category;

/// Categorise a file extension (without the dot).
///
/// Zero-heap-allocation hot path: extensions are lowercased into a fixed-size
/// stack buffer rather than allocating a `String`. Extensions longer than
/// 16 bytes are never recognised.
pub fn category_for_extension(ext: &str) -> Option<Category> {
    let bytes = ext.as_bytes();
    if bytes.is_empty() || bytes.len() > 16 {
        return None;
    }

    let mut lower = [0u8; 16];
    for (dest, &src) in lower.iter_mut().zip(bytes.iter()) {
        *dest = src.to_ascii_lowercase();
    }
    let lower_str = std::str::from_utf8(&lower[..bytes.len()]).ok()?;

    let category = match lower_str {
        "exe" | "msi" | "dll" | "sys" | "bat" | "cmd" => Category::Executable,
        "txt" | "log" | "ini" | "cfg" | "xml" | "json" => Category::TextConfig,
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "ico" | "svg" => Category::Image,
        "mp4" | "avi" | "mov" | "mkv" | "mp3" | "wav" | "flac" => Category::Media,
        "zip" | "rar" | "7z" | "tar" | "gz" => Category::Archive,
        "py" | "js" | "html" | "css" | "java" | "cpp" | "c" | "h" => Category::SourceCode,
        _ => return None,
    };
    Some(category)
}

/// Extension of a file name: the text after the last dot, if the dot is not
/// the first character (`.bashrc` has no extension).
pub fn extension_of(name: &str) -> Option<&str> {
    let dot = name.rfind('.')?;
    (dot > 0).then(|| &name[dot + 1..])
}
