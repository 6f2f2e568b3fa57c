//! The card contract.
//!
//! A card is a self-contained mini-application with a URI identity, a fixed
//! width, and a per-frame `render` that reports whether the card is still
//! alive. Everything a card needs from the host (renderer, queue, command
//! bus) comes through the service registry handed to its constructor.

use egui::Color32;

/// Default accent palette handed to cards that do not override theirs.
pub const DEFAULT_PALETTE: [Color32; 4] = [
    Color32::from_rgb(94, 135, 181),
    Color32::from_rgb(120, 170, 210),
    Color32::from_rgb(230, 230, 235),
    Color32::from_rgb(180, 120, 90),
];

pub trait Card: Send {
    /// Emit one frame of UI. Return `false` to request removal from the deck.
    fn render(&mut self, ui: &mut egui::Ui) -> bool;

    /// Stable identity, `scheme` or `scheme:suffix`.
    fn uri(&self) -> &str;

    fn display_name(&self) -> String;

    fn width(&self) -> f32 {
        300.0
    }

    /// Refresh-rate hint; the deck reports the max across cards.
    fn requested_fps(&self) -> u32 {
        1
    }

    /// One-shot: set by the deck when a duplicate create targets this card.
    fn set_grab_focus(&mut self);

    /// Consume the one-shot flag.
    fn take_grab_focus(&mut self) -> bool;

    /// Externally observed focus state, written by the deck each frame.
    fn set_focused(&mut self, focused: bool);

    fn is_focused(&self) -> bool;

    fn palette(&self, index: usize) -> Color32 {
        DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()]
    }
}

/// Focus bookkeeping shared by every card implementation.
#[derive(Default)]
pub struct CardFlags {
    grab_focus: bool,
    focused: bool,
}

impl CardFlags {
    pub fn set_grab_focus(&mut self) {
        self.grab_focus = true;
    }

    pub fn take_grab_focus(&mut self) -> bool {
        std::mem::take(&mut self.grab_focus)
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grab_focus_is_one_shot() {
        let mut flags = CardFlags::default();
        assert!(!flags.take_grab_focus());
        flags.set_grab_focus();
        assert!(flags.take_grab_focus());
        assert!(!flags.take_grab_focus());
    }

    #[test]
    fn palette_wraps() {
        struct Probe(CardFlags);
        impl Card for Probe {
            fn render(&mut self, _: &mut egui::Ui) -> bool {
                true
            }
            fn uri(&self) -> &str {
                "probe"
            }
            fn display_name(&self) -> String {
                "Probe".to_string()
            }
            fn set_grab_focus(&mut self) {
                self.0.set_grab_focus();
            }
            fn take_grab_focus(&mut self) -> bool {
                self.0.take_grab_focus()
            }
            fn set_focused(&mut self, focused: bool) {
                self.0.set_focused(focused);
            }
            fn is_focused(&self) -> bool {
                self.0.is_focused()
            }
        }

        let card = Probe(CardFlags::default());
        assert_eq!(card.palette(0), card.palette(DEFAULT_PALETTE.len()));
        assert_eq!(card.width(), 300.0);
        assert_eq!(card.requested_fps(), 1);
    }
}
