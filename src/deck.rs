//! The deck: ordered collection of live cards, per-frame layout, global
//! shortcuts, snapshotting, and URI-list persistence.
//!
//! Iteration order of the card list is the visual left-to-right,
//! top-to-bottom order. Card creation is request-only: the `create_card`
//! endpoint enqueues a deferred operation, so new cards appear between
//! frames, never inside one.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    bus,
    capture::Capture,
    card::Card,
    deferred::DeferredQueue,
    editor::EditorSlot,
    error::RouenResult,
    factory::Factory,
    persist,
    services::Services,
};

/// Card height when the editor slot is empty.
const CARD_HEIGHT: f32 = 450.0;
/// Card height when a document is open in the editor band.
const BAND_HEIGHT: f32 = 250.0;
/// Snapshot height is fixed regardless of the current layout.
const SNAPSHOT_HEIGHT: u32 = 450;
/// Window chrome (title bar + margins) taken out of the card's slot.
const CHROME: egui::Vec2 = egui::vec2(22.0, 48.0);

pub const DEFAULT_STATE_FILE: &str = "rouen.ini";

struct DeckState {
    cards: Vec<Box<dyn Card>>,
    focused: Option<String>,
    start_x: f32,
    last_count: usize,
    path: PathBuf,
}

pub struct Deck {
    state: Arc<Mutex<DeckState>>,
    services: Arc<Services>,
}

/// Card renders run under this guard, so a panicking card poisons the lock
/// on its way out to the main loop's catch. The state is still consistent
/// at that point; recover it instead of propagating the poison.
fn lock_state(state: &Mutex<DeckState>) -> MutexGuard<'_, DeckState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Deck {
    /// Build the deck and install its `create_card` endpoint on the registry.
    pub fn new(services: Arc<Services>, path: PathBuf) -> Self {
        let state = Arc::new(Mutex::new(DeckState {
            cards: Vec::new(),
            focused: None,
            start_x: 0.0,
            last_count: 0,
            path,
        }));

        let ep_state = state.clone();
        let ep_services = services.clone();
        services.add_endpoint(bus::CREATE_CARD, move |uri: String| {
            let state = ep_state.clone();
            let services = ep_services.clone();
            match services.get::<DeferredQueue>(bus::DEFERRED) {
                Ok(queue) => queue.enqueue(move || {
                    create_in(&mut lock_state(&state), &services, &uri, false);
                }),
                Err(e) => tracing::warn!(component = "deck", error = %e, "no deferred queue"),
            }
        });

        Self { state, services }
    }

    /// Load the persisted URI list, or fall back to a single menu card.
    /// Runs before the first frame, so cards are created directly.
    pub fn load(&self) -> RouenResult<()> {
        let mut st = lock_state(&self.state);
        let uris = persist::load_uris(&st.path)?;
        if uris.is_empty() {
            create_in(&mut st, &self.services, "menu", false);
            let listed = list_uris(&st);
            persist::save_uris(&st.path, &listed)?;
        } else {
            for uri in &uris {
                create_in(&mut st, &self.services, uri, false);
            }
        }
        st.last_count = st.cards.len();
        Ok(())
    }

    /// Immediate create-or-focus. Duplicate URIs never add a card; the
    /// existing one gains the one-shot grab flag instead.
    pub fn create_or_focus(&self, uri: &str, front: bool) {
        create_in(&mut lock_state(&self.state), &self.services, uri, front);
    }

    pub fn insert_card(&self, card: Box<dyn Card>, front: bool) {
        let mut st = lock_state(&self.state);
        if front {
            st.cards.insert(0, card);
        } else {
            st.cards.push(card);
        }
    }

    pub fn uris(&self) -> Vec<String> {
        list_uris(&lock_state(&self.state))
    }

    pub fn card_count(&self) -> usize {
        lock_state(&self.state).cards.len()
    }

    /// Max `requested_fps` over live cards, floor 1.
    pub fn requested_fps(&self) -> u32 {
        lock_state(&self.state)
            .cards
            .iter()
            .map(|c| c.requested_fps())
            .max()
            .unwrap_or(0)
            .max(1)
    }

    /// Drive one frame: shortcuts, editor band, card layout, persistence.
    /// Returns the deck's requested fps.
    pub fn render(&mut self, ctx: &egui::Context) -> u32 {
        self.handle_shortcuts(ctx);

        let editor = self.services.get::<EditorSlot>(bus::EDITOR).ok();
        let editor_empty = editor.as_ref().is_none_or(|e| e.is_empty());

        if let Some(editor) = editor.filter(|_| !editor_empty) {
            let band = (ctx.screen_rect().height() - BAND_HEIGHT).max(120.0);
            egui::TopBottomPanel::bottom("editor-band")
                .exact_height(band)
                .show(ctx, |ui| editor.ui(ui));
        }

        let viewport = ctx.available_rect();
        let mut st = lock_state(&self.state);
        let st = &mut *st;
        let card_height = if editor_empty { CARD_HEIGHT } else { BAND_HEIGHT };
        let positions = layout_positions(st, viewport, editor_empty, card_height);

        let mut fps = 0u32;
        let mut dead = Vec::new();
        let mut newly_focused = None;
        for (i, card) in st.cards.iter_mut().enumerate() {
            let uri = card.uri().to_string();
            let grab = card.take_grab_focus();
            if grab {
                newly_focused = Some(uri.clone());
            }
            let focused = newly_focused.as_deref() == Some(uri.as_str())
                || st.focused.as_deref() == Some(uri.as_str());
            card.set_focused(focused);
            fps = fps.max(card.requested_fps());

            let content = egui::vec2(card.width() - CHROME.x, card_height - CHROME.y);
            let response = egui::Window::new(card.display_name())
                .id(egui::Id::new(("card", uri.as_str())))
                .fixed_pos(positions[i])
                .fixed_size(content)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| card.render(ui));

            if let Some(response) = response {
                if grab {
                    ctx.move_to_top(response.response.layer_id);
                }
                if response.response.contains_pointer()
                    && ctx.input(|input| input.pointer.any_pressed())
                {
                    newly_focused = Some(uri.clone());
                }
                if !response.inner.unwrap_or(true) {
                    dead.push(i);
                }
            }
        }

        if let Some(uri) = newly_focused {
            st.focused = Some(uri);
        }
        for i in dead.into_iter().rev() {
            st.cards.remove(i);
        }

        if st.cards.len() != st.last_count {
            st.last_count = st.cards.len();
            let listed = list_uris(&st);
            if let Err(e) = persist::save_uris(&st.path, &listed) {
                tracing::error!(component = "deck", error = %e, "state save failed");
            }
        }

        fps.max(1)
    }

    fn handle_shortcuts(&self, ctx: &egui::Context) {
        let (menu_combo, snapshot_combo) = ctx.input(|i| {
            let chord = i.modifiers.ctrl && i.modifiers.shift;
            (
                chord && i.key_pressed(egui::Key::P),
                chord && i.key_pressed(egui::Key::S),
            )
        });

        if menu_combo {
            let mut st = lock_state(&self.state);
            if let Some(card) = st
                .cards
                .iter_mut()
                .find(|c| c.display_name().contains("Menu"))
            {
                card.set_grab_focus();
            } else {
                create_in(&mut st, &self.services, "menu", true);
            }
        }

        if snapshot_combo {
            self.request_snapshot();
        }
    }

    /// Snapshot the first focused card to `card_YYYYMMDD_HHMMSS.png` in the
    /// working directory. The capture runs on the deferred queue, outside
    /// the current frame.
    fn request_snapshot(&self) {
        let Ok(queue) = self.services.get::<DeferredQueue>(bus::DEFERRED) else {
            return;
        };
        let state = self.state.clone();
        let services = self.services.clone();
        queue.enqueue(move || {
            let mut st = lock_state(&state);
            let Some(card) = st.cards.iter_mut().find(|c| c.is_focused()) else {
                tracing::info!(component = "deck", "no focused card to snapshot");
                return;
            };
            let capture = match services.get::<Capture>(bus::CAPTURE) {
                Ok(capture) => capture,
                Err(e) => {
                    tracing::error!(component = "deck", error = %e, "capture unavailable");
                    return;
                }
            };
            let width = card.width().round() as u32;
            let frame = match capture.capture(width, SNAPSHOT_HEIGHT, &mut |ui| {
                card.render(ui);
            }) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!(component = "deck", error = %e, "snapshot capture failed");
                    return;
                }
            };
            let name = chrono::Local::now()
                .format("card_%Y%m%d_%H%M%S.png")
                .to_string();
            match frame.save_png(Path::new(&name)) {
                Ok(()) => tracing::info!(component = "deck", file = %name, "snapshot written"),
                Err(e) => tracing::error!(component = "deck", error = %e, "snapshot write failed"),
            }
        });
    }
}

fn list_uris(st: &DeckState) -> Vec<String> {
    st.cards.iter().map(|c| c.uri().to_string()).collect()
}

fn create_in(st: &mut DeckState, services: &Arc<Services>, uri: &str, front: bool) {
    if let Some(card) = st.cards.iter_mut().find(|c| c.uri() == uri) {
        card.set_grab_focus();
        return;
    }
    let factory = match services.get::<Factory>(bus::FACTORY) {
        Ok(factory) => factory,
        Err(e) => {
            tracing::warn!(component = "deck", error = %e, "no card factory");
            return;
        }
    };
    match factory.create(uri, services) {
        Ok(card) => {
            if front {
                st.cards.insert(0, card);
            } else {
                st.cards.push(card);
            }
        }
        Err(e) => tracing::warn!(component = "deck", %uri, error = %e, "card creation failed"),
    }
}

/// Card origins for this frame. Wrap layout while the editor is empty, one
/// anchored row while a document is open.
fn layout_positions(
    st: &mut DeckState,
    viewport: egui::Rect,
    editor_empty: bool,
    card_height: f32,
) -> Vec<egui::Pos2> {
    let widths: Vec<f32> = st.cards.iter().map(|c| c.width()).collect();
    let mut positions = Vec::with_capacity(widths.len());

    if editor_empty {
        st.start_x = 0.0;
        let mut x = 0.0;
        let mut y = 0.0;
        for w in &widths {
            if x > 0.0 && x + w > viewport.width() {
                x = 0.0;
                y += card_height;
            }
            positions.push(viewport.min + egui::vec2(x, y));
            x += w;
        }
        return positions;
    }

    let total: f32 = widths.iter().sum();
    if let Some(focus_idx) = st.focused.as_deref().and_then(|uri| {
        st.cards.iter().position(|c| c.uri() == uri)
    }) {
        let left: f32 = widths[..focus_idx].iter().sum();
        let right = left + widths[focus_idx];
        // Keep the focused card fully in view.
        if right - st.start_x > viewport.width() {
            st.start_x = right - viewport.width();
        }
        if left < st.start_x {
            st.start_x = left;
        }
    }
    // Never scroll past the last card's right edge.
    st.start_x = st.start_x.clamp(0.0, (total - viewport.width()).max(0.0));

    let mut x = -st.start_x;
    for w in &widths {
        positions.push(viewport.min + egui::vec2(x, 0.0));
        x += w;
    }
    positions
}
