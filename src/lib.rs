#![forbid(unsafe_code)]

pub mod app;
pub mod bus;
pub mod capture;
pub mod card;
pub mod cards;
pub mod deck;
pub mod deferred;
pub mod ease;
pub mod editor;
pub mod error;
pub mod factory;
pub mod persist;
mod raster;
pub mod services;
pub mod shell;
pub mod theme;
pub mod transition;

pub use capture::{Capture, CapturedFrame};
pub use card::Card;
pub use deck::Deck;
pub use deferred::DeferredQueue;
pub use ease::Ease;
pub use error::{RouenError, RouenResult};
pub use factory::Factory;
pub use services::{Endpoint, Services};
pub use transition::{Axis, SlideTransition};
