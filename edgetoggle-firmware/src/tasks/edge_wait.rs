//! Edge waiter tasks
//!
//! Each waiter picks up one interrupt registration at a time and sleeps on
//! the GPIO edge interrupt of its line. The controller's handler runs from
//! here for every rising edge on the button outside the debounce window.

use defmt::*;

use edgetoggle_hal_rp2040::{EdgeDispatcher, MAX_BINDINGS};

/// One waiter per possible registration
pub const WAITERS: usize = MAX_BINDINGS;

#[embassy_executor::task(pool_size = WAITERS)]
pub async fn edge_wait_task(dispatcher: &'static EdgeDispatcher) {
    info!("Edge wait task started");

    dispatcher.serve().await;
}
