//! Weather card shell. The forecast client is an external collaborator; this
//! card only owns the identity and frame the deck needs.

use crate::card::{Card, CardFlags};

pub struct WeatherCard {
    uri: String,
    location: String,
    flags: CardFlags,
}

impl WeatherCard {
    pub fn new(suffix: &str) -> Self {
        let uri = if suffix.is_empty() {
            "weather".to_string()
        } else {
            format!("weather:{suffix}")
        };
        Self {
            uri,
            location: suffix.to_string(),
            flags: CardFlags::default(),
        }
    }
}

impl Card for WeatherCard {
    fn render(&mut self, ui: &mut egui::Ui) -> bool {
        let mut alive = true;
        ui.horizontal(|ui| {
            if self.location.is_empty() {
                ui.colored_label(self.palette(3), "no location set");
            } else {
                ui.colored_label(self.palette(0), &self.location);
            }
            if ui.button("✕").clicked() {
                alive = false;
            }
        });
        ui.separator();
        ui.label("Forecast service not configured.");
        ui.small("Set the weather API key to enable this card.");
        alive
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    fn display_name(&self) -> String {
        if self.location.is_empty() {
            "Weather".to_string()
        } else {
            format!("Weather {}", self.location)
        }
    }

    fn width(&self) -> f32 {
        260.0
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
    fn uri_round_trips_the_location() {
        let card = WeatherCard::new("Paris,fr");
        assert_eq!(card.uri(), "weather:Paris,fr");
        assert_eq!(card.display_name(), "Weather Paris,fr");
    }

    #[test]
    fn empty_suffix_is_a_bare_scheme() {
        let card = WeatherCard::new("");
        assert_eq!(card.uri(), "weather");
        assert_eq!(card.requested_fps(), 1);
    }
}
