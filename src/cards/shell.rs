//! Shell card: a prompt that streams command output through `run_command`.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    bus,
    card::{Card, CardFlags},
    services::Services,
    shell,
};

pub struct ShellCard {
    uri: String,
    input: String,
    flags: CardFlags,
    services: Arc<Services>,
    output: Arc<Mutex<String>>,
    running: Arc<AtomicBool>,
}

impl ShellCard {
    pub fn new(suffix: &str, services: Arc<Services>) -> Self {
        let uri = if suffix.is_empty() {
            "shell".to_string()
        } else {
            format!("shell:{suffix}")
        };
        Self {
            uri,
            input: suffix.to_string(),
            flags: CardFlags::default(),
            services,
            output: Arc::new(Mutex::new(String::new())),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    fn submit(&self) {
        let cmd = self.input.trim();
        if cmd.is_empty() || self.running.load(Ordering::SeqCst) {
            return;
        }
        self.output.lock().unwrap().clear();
        self.running.store(true, Ordering::SeqCst);

        let output = self.output.clone();
        let running = self.running.clone();
        let sink: shell::OutputSink = Arc::new(move |chunk: String| {
            if let Some(head) = chunk.strip_suffix(shell::PROCESS_COMPLETED) {
                output.lock().unwrap().push_str(head.trim_end());
                running.store(false, Ordering::SeqCst);
                return;
            }
            output.lock().unwrap().push_str(&chunk);
        });

        if let Err(e) = self
            .services
            .call::<(String, shell::OutputSink), ()>(bus::RUN_COMMAND, (cmd.to_string(), sink))
        {
            tracing::warn!(component = "shell-card", error = %e, "run_command unavailable");
            self.running.store(false, Ordering::SeqCst);
        }
    }
}

impl Card for ShellCard {
    fn render(&mut self, ui: &mut egui::Ui) -> bool {
        let mut alive = true;
        ui.horizontal(|ui| {
            let edit = ui.add(
                egui::TextEdit::singleline(&mut self.input)
                    .hint_text("command")
                    .desired_width(ui.available_width() - 90.0),
            );
            let submitted =
                edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Run").clicked() || submitted {
                self.submit();
            }
            if ui.button("✕").clicked() {
                alive = false;
            }
        });
        ui.separator();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                let output = self.output.lock().unwrap();
                ui.add(egui::Label::new(egui::RichText::new(output.as_str()).monospace()).wrap());
            });
        alive
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    fn display_name(&self) -> String {
        "Shell".to_string()
    }

    fn width(&self) -> f32 {
        420.0
    }

    fn requested_fps(&self) -> u32 {
        if self.running.load(Ordering::SeqCst) { 4 } else { 1 }
    }

    fn set_grab_focus(&mut self) {
        self.flags.set_grab_focus();
    }

    fn take_grab_focus(&mut self) -> bool {
        self.flags.take_grab_focus()
    }

    fn set_focused(&mut self, focused: bool) {
        self.flags.set_focused(focused);
    }

    fn is_focused(&self) -> bool {
        self.flags.is_focused()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_not_submitted() {
        let card = ShellCard::new("", Services::new());
        card.submit();
        assert!(!card.running.load(Ordering::SeqCst));
    }

    #[test]
    fn suffix_prefills_the_prompt() {
        let card = ShellCard::new("ls -la", Services::new());
        assert_eq!(card.uri(), "shell:ls -la");
        assert_eq!(card.input, "ls -la");
    }
}
