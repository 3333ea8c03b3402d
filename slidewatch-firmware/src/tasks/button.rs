//! Page button task

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;

/// Set when the page button was pressed; taken by the end node loop
pub static PAGE_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Debounce interval after a press (ms)
const DEBOUNCE_MS: u64 = 50;

#[embassy_executor::task]
pub async fn button_task(mut button: Input<'static>) {
    info!("Page button task started");

    loop {
        button.wait_for_falling_edge().await;
        debug!("Page button pressed");
        PAGE_REQUEST.signal(());
        Timer::after_millis(DEBOUNCE_MS).await;
        button.wait_for_high().await;
    }
}
