//! Builtin cards, one module per scheme.
//!
//! To add a card: create `src/cards/mycard.rs` implementing [`crate::Card`],
//! declare it below, and register its scheme in [`register_builtin`]. The
//! factory is assembled at the composition root; nothing registers itself
//! from static initializers.

pub mod git;
pub mod menu;
pub mod shell;
pub mod weather;

use crate::factory::Factory;

pub fn register_builtin(factory: &mut Factory) {
    factory.register("menu", |suffix, services| {
        Ok(Box::new(menu::MenuCard::new(suffix, services.clone())))
    });
    factory.register("git", |suffix, services| {
        Ok(Box::new(git::GitCard::new(suffix, services.clone())))
    });
    factory.register("weather", |suffix, _services| {
        Ok(Box::new(weather::WeatherCard::new(suffix)))
    });
    factory.register("shell", |suffix, services| {
        Ok(Box::new(shell::ShellCard::new(suffix, services.clone())))
    });
}
