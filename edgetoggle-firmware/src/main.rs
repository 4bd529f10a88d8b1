//! edgetoggle - Button-to-LED Edge Toggle Firmware
//!
//! Main firmware binary for RP2040 boards. Every rising edge on the button
//! line flips the LED and is counted; the count and LED state are logged
//! over RTT.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::{Duration, Ticker};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use edgetoggle_core::{Controller, EdgeHandler};
use edgetoggle_hal_rp2040::{take_lines, EdgeDispatcher, Rp2040Gpio};

use crate::diagnostics::DefmtSink;

mod board;
mod diagnostics;
mod tasks;

type Handler = EdgeHandler<'static, Rp2040Gpio, DefmtSink>;

// Everything the interrupt registration refers to must live forever
static GPIO: StaticCell<Rp2040Gpio> = StaticCell::new();
static DISPATCHER: StaticCell<EdgeDispatcher> = StaticCell::new();
static SINK: StaticCell<DefmtSink> = StaticCell::new();
static HANDLER: StaticCell<Handler> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("edgetoggle firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let gpio: &'static Rp2040Gpio = GPIO.init(Rp2040Gpio::new(board::INPUT_PULL));
    if let Err(e) = take_lines!(gpio, p, { 25 => PIN_25, 15 => PIN_15 }) {
        error!("Failed to set up board lines: {}", e);
        return idle().await;
    }

    let dispatcher: &'static EdgeDispatcher = DISPATCHER.init(EdgeDispatcher::new(gpio));
    let sink: &'static DefmtSink = SINK.init(DefmtSink);

    let config = board::controller_config();
    info!(
        "Config: led=GPIO{} button=GPIO{} debounce={}ms",
        config.led_line, config.button_line, config.debounce_ms
    );
    let handler: &'static Handler = HANDLER.init(EdgeHandler::new(gpio, sink, config));

    let controller = match Controller::load(handler, dispatcher) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Load failed: {} (code {})", e, e.code());
            return idle().await;
        }
    };
    info!("Controller loaded on IRQ {}", controller.irq());

    for _ in 0..tasks::WAITERS {
        spawner.spawn(unwrap!(tasks::edge_wait_task(dispatcher)));
    }
    info!("All tasks spawned, firmware running");

    let mut heartbeat = Ticker::every(Duration::from_secs(board::HEARTBEAT_SECS));
    loop {
        heartbeat.next().await;
        info!(
            "Status: led={} presses={}",
            controller.led_level(),
            controller.presses()
        );
    }
}

/// Park the main task after a fatal setup error
async fn idle() {
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Idle heartbeat");
    }
}
