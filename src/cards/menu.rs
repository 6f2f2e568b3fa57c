//! The menu card: entry point for creating every other card.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{
    bus,
    card::{Card, CardFlags},
    factory::Factory,
    services::Services,
    transition::{Axis, SlideTransition},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Page {
    Schemes,
    About,
}

pub struct MenuCard {
    uri: String,
    flags: CardFlags,
    services: Arc<Services>,
    page: Arc<Mutex<Page>>,
    transition: Option<SlideTransition>,
}

const PAGE_SIZE: egui::Vec2 = egui::vec2(180.0, 360.0);
const FLIP_MS: u64 = 400;

impl MenuCard {
    pub fn new(suffix: &str, services: Arc<Services>) -> Self {
        let uri = if suffix.is_empty() {
            "menu".to_string()
        } else {
            format!("menu:{suffix}")
        };
        Self {
            uri,
            flags: CardFlags::default(),
            services,
            page: Arc::new(Mutex::new(Page::Schemes)),
            transition: None,
        }
    }

    fn schemes(&self) -> Vec<String> {
        self.services
            .get::<Factory>(bus::FACTORY)
            .map(|f| f.schemes())
            .unwrap_or_default()
    }

    fn flip_to(&mut self, target: Page) {
        let page = self.page.clone();
        let schemes = self.schemes();
        let frame_page = self.page.clone();
        let transition = SlideTransition::new(
            &self.services,
            PAGE_SIZE,
            Axis::Horizontal,
            Duration::from_millis(FLIP_MS),
            move |ui| draw_page(ui, *frame_page.lock().unwrap(), &schemes),
            move || *page.lock().unwrap() = target,
        );
        match transition {
            Ok(t) => self.transition = Some(t),
            // Degrade to an instant flip when capture services are absent.
            Err(e) => {
                tracing::warn!(component = "menu", error = %e, "transition unavailable");
                *self.page.lock().unwrap() = target;
            }
        }
    }
}

/// Static view of a page, shared by the live render and the capture callback.
fn draw_page(ui: &mut egui::Ui, page: Page, schemes: &[String]) {
    match page {
        Page::Schemes => {
            ui.heading("Cards");
            for scheme in schemes {
                let _ = ui.button(scheme);
            }
        }
        Page::About => {
            ui.heading("Rouen");
            ui.label(concat!("version ", env!("CARGO_PKG_VERSION")));
            ui.label("A deck of cards, side by side.");
        }
    }
}

impl Card for MenuCard {
    fn render(&mut self, ui: &mut egui::Ui) -> bool {
        if let Some(t) = &mut self.transition {
            if t.render(ui) {
                return true;
            }
            self.transition = None;
        }

        let page = *self.page.lock().unwrap();
        match page {
            Page::Schemes => {
                ui.heading("Cards");
                for scheme in self.schemes() {
                    if ui.button(&scheme).clicked()
                        && let Err(e) = self
                            .services
                            .call::<String, ()>(bus::CREATE_CARD, scheme.clone())
                    {
                        tracing::warn!(component = "menu", error = %e, "create_card failed");
                    }
                }
                ui.separator();
                if ui.button("About").clicked() {
                    self.flip_to(Page::About);
                }
            }
            Page::About => {
                ui.heading("Rouen");
                ui.label(concat!("version ", env!("CARGO_PKG_VERSION")));
                ui.label("A deck of cards, side by side.");
                ui.separator();
                if ui.button("Back").clicked() {
                    self.flip_to(Page::Schemes);
                }
            }
        }
        true
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    fn display_name(&self) -> String {
        "Menu".to_string()
    }

    fn width(&self) -> f32 {
        220.0
    }

    fn requested_fps(&self) -> u32 {
        // Keep the flip animation smooth while it runs.
        if self.transition.is_some() { 30 } else { 1 }
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
    fn uri_carries_the_suffix() {
        let services = Services::new();
        assert_eq!(MenuCard::new("", services.clone()).uri(), "menu");
        assert_eq!(MenuCard::new("x", services).uri(), "menu:x");
    }

    #[test]
    fn display_name_marks_it_as_menu() {
        let services = Services::new();
        let card = MenuCard::new("", services);
        assert!(card.display_name().contains("Menu"));
    }

    #[test]
    fn flip_without_services_degrades_to_instant() {
        let services = Services::new();
        let mut card = MenuCard::new("", services);
        card.flip_to(Page::About);
        assert!(card.transition.is_none());
        assert_eq!(*card.page.lock().unwrap(), Page::About);
    }
}
