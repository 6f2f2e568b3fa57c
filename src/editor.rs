//! The editor slot: the one external collaborator the deck lays out around.
//!
//! At most one document is active. While the slot is empty, cards get the
//! full viewport height; once a document opens, cards shrink to the top band
//! and the editor fills the rest.

use std::sync::Mutex;

use crate::error::{RouenError, RouenResult};

#[derive(Default)]
pub struct EditorSlot {
    active: Mutex<Option<Document>>,
}

struct Document {
    uri: String,
    text: String,
    dirty: bool,
}

impl EditorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `uri` as a text document. A missing or unreadable file opens an
    /// empty buffer that will be created on save.
    pub fn open(&self, uri: &str) {
        let text = std::fs::read_to_string(uri).unwrap_or_default();
        *self.active.lock().unwrap() = Some(Document {
            uri: uri.to_string(),
            text,
            dirty: false,
        });
    }

    pub fn close(&self) {
        *self.active.lock().unwrap() = None;
    }

    pub fn is_empty(&self) -> bool {
        self.active.lock().unwrap().is_none()
    }

    pub fn active_uri(&self) -> Option<String> {
        self.active.lock().unwrap().as_ref().map(|d| d.uri.clone())
    }

    pub fn save(&self) -> RouenResult<()> {
        let mut active = self.active.lock().unwrap();
        let Some(doc) = active.as_mut() else {
            return Ok(());
        };
        std::fs::write(&doc.uri, &doc.text)
            .map_err(|e| RouenError::persist(format!("write '{}': {e}", doc.uri)))?;
        doc.dirty = false;
        Ok(())
    }

    /// Emit the bottom-band UI. No-op while empty.
    pub fn ui(&self, ui: &mut egui::Ui) {
        let mut close = false;
        let mut save = false;
        {
            let mut active = self.active.lock().unwrap();
            let Some(doc) = active.as_mut() else { return };

            ui.horizontal(|ui| {
                let title = if doc.dirty {
                    format!("{} *", doc.uri)
                } else {
                    doc.uri.clone()
                };
                ui.label(title);
                save = ui.button("Save").clicked();
                close = ui.button("Close").clicked();
            });
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    let edit = egui::TextEdit::multiline(&mut doc.text)
                        .code_editor()
                        .desired_width(f32::INFINITY)
                        .desired_rows(12);
                    if ui.add(edit).changed() {
                        doc.dirty = true;
                    }
                });
        }
        if save {
            if let Err(e) = self.save() {
                tracing::error!(component = "editor", error = %e, "save failed");
            }
        }
        if close {
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_starts_empty() {
        let slot = EditorSlot::new();
        assert!(slot.is_empty());
        assert_eq!(slot.active_uri(), None);
    }

    #[test]
    fn open_missing_file_yields_empty_buffer() {
        let slot = EditorSlot::new();
        slot.open("target/does-not-exist-rouen.txt");
        assert!(!slot.is_empty());
        assert_eq!(
            slot.active_uri().as_deref(),
            Some("target/does-not-exist-rouen.txt")
        );
    }

    #[test]
    fn close_empties_the_slot() {
        let slot = EditorSlot::new();
        slot.open("target/whatever.txt");
        slot.close();
        assert!(slot.is_empty());
    }

    #[test]
    fn save_writes_the_buffer() {
        let dir = std::path::PathBuf::from("target").join("editor_slot_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("doc.txt");
        std::fs::write(&path, "before").unwrap();

        let slot = EditorSlot::new();
        slot.open(path.to_str().unwrap());
        {
            let mut active = slot.active.lock().unwrap();
            active.as_mut().unwrap().text = "after".to_string();
        }
        slot.save().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "after");
    }
}
