//! Main-loop orchestration as an `eframe` application.
//!
//! Per frame: refill the keystroke buffer, handle the global shortcuts, let
//! the deck render, then drain the deferred-operation queue outside the UI
//! pass. When the queue ran anything the next frame is requested
//! immediately; otherwise the loop sleeps up to `1000 / requested_fps` ms.

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crate::{
    bus,
    capture::Capture,
    deck::{self, Deck},
    deferred::DeferredQueue,
    editor::EditorSlot,
    error::RouenResult,
    factory::Factory,
    services::Services,
    theme,
};

pub struct RouenApp {
    services: Arc<Services>,
    deck: Deck,
    done: Arc<AtomicBool>,
    keystrokes: Arc<Mutex<String>>,
}

impl RouenApp {
    /// Composition root: theme, services, command bus, deck. Any error here
    /// is fatal; the binary exits non-zero.
    pub fn new(cc: &eframe::CreationContext<'_>) -> RouenResult<Self> {
        theme::install(&cc.egui_ctx);

        let services = Services::new();
        services.add(bus::RENDERER, Arc::new(cc.egui_ctx.clone()));
        services.add(bus::CAPTURE, Arc::new(Capture::new()));
        services.add(bus::DEFERRED, Arc::new(DeferredQueue::new()));
        services.add(bus::EDITOR, Arc::new(EditorSlot::new()));
        services.add(bus::FACTORY, Arc::new(Factory::with_builtin_cards()));

        let done = Arc::new(AtomicBool::new(false));
        let keystrokes = Arc::new(Mutex::new(String::new()));
        bus::install_command_bus(&services, done.clone(), keystrokes.clone());

        let deck = Deck::new(services.clone(), PathBuf::from(deck::DEFAULT_STATE_FILE));
        deck.load()?;

        Ok(Self {
            services,
            deck,
            done,
            keystrokes,
        })
    }

    fn collect_keystrokes(&self, ctx: &egui::Context) {
        let mut buf = self.keystrokes.lock().unwrap();
        buf.clear();
        ctx.input(|input| {
            for event in &input.events {
                if let egui::Event::Text(text) = event {
                    buf.push_str(text);
                }
            }
        });
    }

    fn handle_global_shortcuts(&self, ctx: &egui::Context) {
        let (toggle_fullscreen, quit) = ctx.input(|input| {
            (
                input.key_pressed(egui::Key::F11),
                input.modifiers.ctrl
                    && input.modifiers.shift
                    && input.key_pressed(egui::Key::Q),
            )
        });
        if toggle_fullscreen {
            let fullscreen = ctx.input(|input| input.viewport().fullscreen.unwrap_or(false));
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(!fullscreen));
        }
        if quit {
            self.done.store(true, Ordering::SeqCst);
        }
    }
}

impl eframe::App for RouenApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.collect_keystrokes(ctx);
        self.handle_global_shortcuts(ctx);

        let fps = match catch_unwind(AssertUnwindSafe(|| self.deck.render(ctx))) {
            Ok(fps) => fps,
            Err(_) => {
                tracing::error!(component = "app", "deck render panicked; frame dropped");
                1
            }
        };

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::from_rgb(40, 40, 40)))
            .show(ctx, |_| {});

        // Outside the UI pass: run whatever the frame scheduled.
        match self.services.get::<DeferredQueue>(bus::DEFERRED) {
            Ok(queue) if queue.drain() > 0 => ctx.request_repaint(),
            _ => {
                let wait = Duration::from_millis(1000 / u64::from(fps.max(1)));
                ctx.request_repaint_after(wait);
            }
        }

        if self.done.load(Ordering::SeqCst) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}
