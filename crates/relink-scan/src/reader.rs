//! Tolerant text reading.

use std::path::Path;

use tracing::debug;

/// Bytes inspected when sniffing for binary content.
const BINARY_SNIFF_LEN: usize = 8192;

/// Read a file as text, returning an empty string on any failure.
///
/// Invalid UTF-8 sequences are replaced rather than rejected. Files that
/// look binary (a NUL byte near the start) read as empty, the same as a
/// missing or unreadable file.
pub fn read_text(path: &Path) -> String {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "unreadable file treated as empty");
            return String::new();
        }
    };

    if looks_binary(&bytes) {
        debug!(path = %path.display(), "binary file treated as empty");
        return String::new();
    }

    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

fn looks_binary(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(BINARY_SNIFF_LEN)].contains(&0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_reads_utf8() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.js");
        fs::write(&path, "const é = 1;").unwrap();
        assert_eq!(read_text(&path), "const é = 1;");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("latin1.css");
        fs::write(&path, b"a { content: \"\xe9\"; }").unwrap();

        let text = read_text(&path);
        assert!(text.starts_with("a { content: \""));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        assert_eq!(read_text(&temp.path().join("gone.vue")), "");
    }

    #[test]
    fn test_binary_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logo.vue");
        fs::write(&path, [0x89, b'P', b'N', b'G', 0x00, 0x01]).unwrap();
        assert_eq!(read_text(&path), "");
    }

    #[test]
    fn test_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        assert_eq!(read_text(temp.path()), "");
    }
}
