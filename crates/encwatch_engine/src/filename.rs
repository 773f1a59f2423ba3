use sha2::{Digest, Sha256};

/// Local filename for a downloaded item.
///
/// Names that are already safe are kept as-is. Anything that had to be
/// rewritten gets a short hash of the original name appended to the stem so
/// two distinct items never map to the same file.
pub fn download_filename(item_name: &str) -> String {
    let sanitized = sanitize(item_name);
    if sanitized == item_name {
        return sanitized;
    }
    let hash = short_hash(item_name);
    match sanitized.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            format!("{stem}--{hash}.{ext}")
        }
        _ => format!("{sanitized}--{hash}"),
    }
}

fn sanitize(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);
    if cleaned.is_empty() {
        return "download".to_string();
    }
    // Collapse multiple underscores
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    if compacted.len() > 120 {
        let mut cut = 120;
        while !compacted.is_char_boundary(cut) {
            cut -= 1;
        }
        compacted.truncate(cut);
    }
    let stem_len = compacted.find('.').unwrap_or(compacted.len());
    if is_reserved_windows_name(&compacted[..stem_len]) {
        compacted.insert(stem_len, '_');
    }
    compacted
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_names_pass_through() {
        assert_eq!(download_filename("a.mp4"), "a.mp4");
        assert_eq!(
            download_filename("Lobster Jumpscare.mp4"),
            "Lobster Jumpscare.mp4"
        );
    }

    #[test]
    fn unsafe_names_are_rewritten_with_a_hash() {
        let first = download_filename("a:b.mp4");
        let second = download_filename("a?b.mp4");
        assert!(first.starts_with("a_b--"), "{first}");
        assert!(first.ends_with(".mp4"));
        assert_ne!(first, second);
        assert_eq!(first, download_filename("a:b.mp4"));
    }

    #[test]
    fn traversal_and_reserved_names_are_neutralised() {
        let name = download_filename("../../etc/passwd");
        assert!(!name.contains('/'));
        assert!(!name.starts_with('.'));

        let reserved = download_filename("CON.mp4");
        assert!(reserved.starts_with("CON_"), "{reserved}");
        assert_eq!(download_filename("..."), format!("download--{}", short_hash("...")));
    }
}
