//! Link diagnostics over defmt
//!
//! Raw module output goes out at trace level; link events at info or
//! warn depending on whether they need attention.

use defmt::*;

use slidewatch_core::traits::{DiagnosticSink, LinkNote};

/// Diagnostic sink that logs through defmt-rtt
pub struct DefmtSink;

impl DiagnosticSink for DefmtSink {
    fn mirror(&mut self, bytes: &[u8]) {
        trace!("E5 < {=[u8]:a}", bytes);
    }

    fn note(&mut self, note: LinkNote) {
        match note {
            LinkNote::CommandSent(name) => debug!("E5 > {}", name),
            LinkNote::AckMissed(name) => warn!("{}: no acknowledgement", name),
            LinkNote::ModuleAbsent => error!("No E5 module found, radio disabled"),
            LinkNote::Configured => info!("E5 configured in test mode"),
            LinkNote::Skipped => debug!("Radio disabled, skipping"),
            LinkNote::PacketReceived {
                fields,
                truncated,
                quality,
            } => info!(
                "Packet: {} fields (truncated={}), RSSI {}, SNR {}",
                fields, truncated, quality.rssi, quality.snr
            ),
            LinkNote::ReceiveTimeout => info!("No packet in window"),
            LinkNote::MalformedPayload(e) => warn!("Malformed payload: {}", e),
            LinkNote::BufferOverflow => warn!("Response buffer full, bytes dropped"),
            LinkNote::Sent => info!("Sent successfully!"),
            LinkNote::SendFailed => warn!("Send failed!"),
        }
    }
}
