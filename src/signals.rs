use hp_engine::InterruptHandle;

/// Turns Ctrl+C into an interrupt request for the running solve.
pub(crate) fn ctrlc_protection(handle: InterruptHandle) {
    if let Err(err) = ctrlc::set_handler(move || {
        if handle.request_interrupt() {
            log::info!("Ctrl+C received, stopping at the next safe point");
        }
    }) {
        log::warn!("could not install Ctrl+C handler: {err}");
    }
}
