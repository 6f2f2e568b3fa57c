//! Git repository browser card: streams `git status` for one directory.

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

pub struct GitCard {
    uri: String,
    dir: String,
    flags: CardFlags,
    services: Arc<Services>,
    output: Arc<Mutex<String>>,
    running: Arc<AtomicBool>,
    started: bool,
}

impl GitCard {
    pub fn new(suffix: &str, services: Arc<Services>) -> Self {
        let dir = if suffix.is_empty() { "." } else { suffix };
        let uri = if suffix.is_empty() {
            "git".to_string()
        } else {
            format!("git:{suffix}")
        };
        Self {
            uri,
            dir: dir.to_string(),
            flags: CardFlags::default(),
            services,
            output: Arc::new(Mutex::new(String::new())),
            running: Arc::new(AtomicBool::new(false)),
            started: false,
        }
    }

    fn refresh(&self) {
        self.output.lock().unwrap().clear();
        self.running.store(true, Ordering::SeqCst);

        let output = self.output.clone();
        let running = self.running.clone();
        let sink: shell::OutputSink = Arc::new(move |chunk: String| {
            if chunk.contains(shell::PROCESS_COMPLETED) {
                running.store(false, Ordering::SeqCst);
                return;
            }
            output.lock().unwrap().push_str(&chunk);
        });

        let cmd = format!("git -C \"{}\" status --short --branch", self.dir);
        if let Err(e) = self
            .services
            .call::<(String, shell::OutputSink), ()>(bus::RUN_COMMAND, (cmd, sink))
        {
            tracing::warn!(component = "git", error = %e, "run_command unavailable");
            self.running.store(false, Ordering::SeqCst);
        }
    }
}

impl Card for GitCard {
    fn render(&mut self, ui: &mut egui::Ui) -> bool {
        if !self.started {
            self.started = true;
            self.refresh();
        }

        let mut alive = true;
        ui.horizontal(|ui| {
            ui.colored_label(self.palette(0), &self.dir);
            if ui.button("Refresh").clicked() {
                self.refresh();
            }
            if ui.button("✕").clicked() {
                alive = false;
            }
        });
        ui.separator();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let output = self.output.lock().unwrap();
                let text = if output.is_empty() && self.running.load(Ordering::SeqCst) {
                    "…"
                } else {
                    output.as_str()
                };
                ui.add(egui::Label::new(egui::RichText::new(text).monospace()).wrap());
            });
        alive
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    fn display_name(&self) -> String {
        format!("Git {}", self.dir)
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
