//! Command-bus endpoint names and installation.
//!
//! The bus is the subset of the service registry holding named callables.
//! Endpoints that need other services resolve them through a weak registry
//! handle at call time, so the registry never owns itself.

use std::sync::{
    Arc, Mutex, Weak,
    atomic::{AtomicBool, Ordering},
};

use crate::{editor::EditorSlot, services::Services, shell};

// Endpoint names.
pub const CREATE_CARD: &str = "create_card";
pub const EDIT: &str = "edit";
pub const NOTIFY: &str = "notify";
pub const RUN_COMMAND: &str = "run_command";
pub const EXIT: &str = "exit";
pub const QUITTING: &str = "quitting";
pub const KEYSTROKES: &str = "keystrokes";

// Well-known service names.
pub const RENDERER: &str = "renderer";
pub const CAPTURE: &str = "capture";
pub const DEFERRED: &str = "deferred";
pub const EDITOR: &str = "editor";
pub const FACTORY: &str = "factory";

/// Install every endpoint except `create_card`, which the deck owns.
pub fn install_command_bus(
    services: &Arc<Services>,
    done: Arc<AtomicBool>,
    keystrokes: Arc<Mutex<String>>,
) {
    services.add_endpoint(NOTIFY, |msg: String| {
        tracing::info!(component = "notify", "{msg}");
    });

    services.add_endpoint(
        RUN_COMMAND,
        |(cmd, sink): (String, shell::OutputSink)| {
            shell::run_command(&cmd, sink);
        },
    );

    let exit_flag = done.clone();
    services.add_endpoint(EXIT, move |(): ()| -> bool {
        exit_flag.swap(true, Ordering::SeqCst)
    });

    let quitting_flag = done;
    services.add_endpoint(QUITTING, move |(): ()| -> bool {
        quitting_flag.load(Ordering::SeqCst)
    });

    services.add_endpoint(KEYSTROKES, move |(): ()| -> String {
        std::mem::take(&mut keystrokes.lock().unwrap())
    });

    let registry: Weak<Services> = Arc::downgrade(services);
    services.add_endpoint(EDIT, move |uri: String| {
        let Some(services) = registry.upgrade() else {
            return;
        };
        match services.get::<EditorSlot>(EDITOR) {
            Ok(slot) => slot.open(&uri),
            Err(e) => tracing::warn!(component = "bus", error = %e, "edit unavailable"),
        }
    });
}
