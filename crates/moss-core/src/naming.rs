//! Filesystem-safe and unique name policies.

use std::path::{Path, PathBuf};

/// Characters that are reserved on at least one supported OS.
const RESERVED_CHARACTERS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Replaces OS-reserved characters in a filename with underscores.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if RESERVED_CHARACTERS.contains(&c) || c.is_control() { '_' } else { c })
        .collect()
}

/// Returns a path under `folder` for `stem.extension` that does not
/// collide with an existing file, appending ` (n)` to the stem if needed.
pub fn unique_path(folder: &Path, stem: &str, extension: &str) -> PathBuf {
    let candidate = folder.join(format!("{stem}.{extension}"));
    if !candidate.exists() {
        return candidate;
    }
    for n in 1.. {
        let candidate = folder.join(format!("{stem} ({n}).{extension}"));
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!()
}

/// The longest common prefix of two names with trailing `_`, `-` and
/// whitespace stripped. Used to name combined split-stereo zones.
pub fn common_prefix(a: &str, b: &str) -> String {
    let prefix: String = a
        .chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect();
    prefix
        .trim_end_matches(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_reserved_characters() {
        assert_eq!(sanitize_filename("a/b\\c:d*e?f\"g<h>i|j"), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_filename("Grand Piano"), "Grand Piano");
    }

    #[test]
    fn test_common_prefix_strips_separators() {
        assert_eq!(common_prefix("Piano_L", "Piano_R"), "Piano");
        assert_eq!(common_prefix("Pad-Left", "Pad-Right"), "Pad");
        assert_eq!(common_prefix("abc", "xyz"), "");
    }

    #[test]
    fn test_unique_path_appends_counter() {
        let dir = std::env::temp_dir().join("moss-naming-test");
        std::fs::create_dir_all(&dir).unwrap();
        let first = unique_path(&dir, "take", "wav");
        assert_eq!(first.file_name().unwrap(), "take.wav");
        std::fs::write(&first, b"x").unwrap();
        let second = unique_path(&dir, "take", "wav");
        assert_eq!(second.file_name().unwrap(), "take (1).wav");
        std::fs::remove_file(&first).unwrap();
    }
}
