//! Deck-state persistence: the `rouen.ini` file.
//!
//! One section holds the ordered URI list:
//!
//! ```text
//! [rouen]
//! cards=menu;git;weather:Paris,fr
//! ```
//!
//! Saving rewrites only the `cards=` line inside `[rouen]`; every other byte
//! of the file is preserved, and the section is appended when missing. The
//! rewrite is line-oriented on purpose: INI crates reformat files, which
//! would break the byte-exact preservation of foreign sections.

use std::path::Path;

use crate::error::{RouenError, RouenResult};

pub const SECTION: &str = "[rouen]";
pub const KEY: &str = "cards=";

/// Read the persisted URI list. A missing file or an empty `cards=` value
/// yields an empty list; the caller decides the default deck.
pub fn load_uris(path: &Path) -> RouenResult<Vec<String>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(RouenError::persist(format!(
                "read '{}': {e}",
                path.display()
            )));
        }
    };

    let mut in_section = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            in_section = trimmed == SECTION;
            continue;
        }
        if in_section && let Some(value) = trimmed.strip_prefix(KEY) {
            return Ok(value
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect());
        }
    }
    Ok(Vec::new())
}

/// Write the URI list, preserving every other line of the file byte-exactly.
pub fn save_uris(path: &Path, uris: &[String]) -> RouenResult<()> {
    let existing = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(RouenError::persist(format!(
                "read '{}': {e}",
                path.display()
            )));
        }
    };

    let cards_line = format!("{KEY}{}", uris.join(";"));
    let mut out = String::with_capacity(existing.len() + cards_line.len() + 16);
    let mut in_section = false;
    let mut wrote_cards = false;

    for line in existing.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']).trim();
        if trimmed.starts_with('[') {
            if in_section && !wrote_cards {
                // Section ended without a cards line; add one before leaving.
                out.push_str(&cards_line);
                out.push('\n');
                wrote_cards = true;
            }
            in_section = trimmed == SECTION;
            out.push_str(line);
            continue;
        }
        if in_section && !wrote_cards && trimmed.starts_with(KEY) {
            out.push_str(&cards_line);
            if line.ends_with('\n') {
                out.push('\n');
            }
            wrote_cards = true;
            continue;
        }
        out.push_str(line);
    }

    if !wrote_cards {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        if !in_section {
            out.push_str(SECTION);
            out.push('\n');
        }
        out.push_str(&cards_line);
        out.push('\n');
    }

    std::fs::write(path, out)
        .map_err(|e| RouenError::persist(format!("write '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = PathBuf::from("target").join("persist_tests");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn uris(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_file_loads_empty() {
        let path = scratch("never_written.ini");
        let _ = std::fs::remove_file(&path);
        assert!(load_uris(&path).unwrap().is_empty());
    }

    #[test]
    fn save_then_load_preserves_order() {
        let path = scratch("round_trip.ini");
        let _ = std::fs::remove_file(&path);
        let list = uris(&["git", "weather:Paris,fr", "menu"]);
        save_uris(&path, &list).unwrap();
        assert_eq!(load_uris(&path).unwrap(), list);
    }

    #[test]
    fn foreign_sections_survive_byte_exact() {
        let path = scratch("foreign.ini");
        std::fs::write(
            &path,
            "[other]\nkey = value  \n; comment\n[rouen]\ncards=old\n[tail]\nx=1\n",
        )
        .unwrap();
        save_uris(&path, &uris(&["menu", "git"])).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "[other]\nkey = value  \n; comment\n[rouen]\ncards=menu;git\n[tail]\nx=1\n"
        );
    }

    #[test]
    fn section_is_appended_when_missing() {
        let path = scratch("appended.ini");
        std::fs::write(&path, "[other]\nkey=value\n").unwrap();
        save_uris(&path, &uris(&["menu"])).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "[other]\nkey=value\n[rouen]\ncards=menu\n");
        assert_eq!(load_uris(&path).unwrap(), uris(&["menu"]));
    }

    #[test]
    fn cards_line_is_added_to_existing_section() {
        let path = scratch("existing_section.ini");
        std::fs::write(&path, "[rouen]\nother=1\n[next]\ny=2\n").unwrap();
        save_uris(&path, &uris(&["git"])).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "[rouen]\nother=1\ncards=git\n[next]\ny=2\n");
    }

    #[test]
    fn empty_cards_value_loads_empty() {
        let path = scratch("empty_value.ini");
        std::fs::write(&path, "[rouen]\ncards=\n").unwrap();
        assert!(load_uris(&path).unwrap().is_empty());
    }
}
