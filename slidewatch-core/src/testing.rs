//! Scripted radio and virtual time for host tests
//!
//! `MockRadio` answers command lines by prefix after a configurable
//! latency, measured on a virtual clock that only advances when the code
//! under test delays. Packets from other nodes are injected the same way.

use core::cell::Cell;
use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use heapless::{Deque, String, Vec};
use slidewatch_hal::{Clock, SerialChannel};
use slidewatch_protocol::hex;
use slidewatch_protocol::{GatewayReading, LinkQuality, RelayReading, SensorReading, MAX_COMMAND_LEN};

use crate::sample::{GatewaySample, SensorSample};
use crate::traits::{
    DiagnosticSink, GatewaySource, LinkNote, ReadingDisplay, RelayPage, SensorSource,
};

/// Shared virtual time source
pub struct VirtualTime {
    ns: Cell<u64>,
}

impl VirtualTime {
    pub const fn new() -> Self {
        Self { ns: Cell::new(0) }
    }

    pub fn now_ms(&self) -> u64 {
        self.ns.get() / 1_000_000
    }

    pub fn advance_ms(&self, ms: u64) {
        self.ns.set(self.ns.get() + ms * 1_000_000);
    }

    pub fn clock(&self) -> VirtualClock<'_> {
        VirtualClock(self)
    }

    pub fn delay(&self) -> VirtualDelay<'_> {
        VirtualDelay(self)
    }
}

pub struct VirtualClock<'a>(&'a VirtualTime);

impl Clock for VirtualClock<'_> {
    fn now_ms(&self) -> u64 {
        self.0.now_ms()
    }
}

pub struct VirtualDelay<'a>(&'a VirtualTime);

impl DelayNs for VirtualDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.0.ns.set(self.0.ns.get() + u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.0.ns.set(self.0.ns.get() + u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.advance_ms(u64::from(ms));
    }
}

struct Rule {
    prefix: &'static str,
    reply: &'static str,
    latency_ms: u64,
}

struct Pending {
    due_ms: u64,
    bytes: Vec<u8, 640>,
}

#[derive(Debug)]
pub struct MockError;

/// Scripted Wio-E5 stand-in
pub struct MockRadio<'a> {
    time: &'a VirtualTime,
    rules: Vec<Rule, 8>,
    pending: Vec<Pending, 8>,
    rx: Deque<u8, 2048>,
    writes: Vec<String<MAX_COMMAND_LEN>, 32>,
}

impl<'a> MockRadio<'a> {
    /// A module that never answers
    pub fn silent(time: &'a VirtualTime) -> Self {
        Self {
            time,
            rules: Vec::new(),
            pending: Vec::new(),
            rx: Deque::new(),
            writes: Vec::new(),
        }
    }

    /// A module that answers every command the way the Wio-E5 does
    pub fn wio_e5(time: &'a VirtualTime) -> Self {
        let mut radio = Self::silent(time);
        radio
            .on("AT\r\n", "+AT: OK\r\n", 10)
            .on("AT+MODE=TEST", "+MODE: TEST\r\n", 20)
            .on(
                "AT+TEST=RFCFG",
                "+TEST: RFCFG F:866000000, SF12, BW125K, TXPR:12, RXPR:15, POW:14dBm, CRC:ON, IQ:OFF, NET:OFF\r\n",
                20,
            )
            .on("AT+TEST=RXLRPKT", "+TEST: RXLRPKT\r\n", 20)
            .on("AT+TEST=TXLRSTR", "+TEST: TXLRSTR\r\n+TEST: TX DONE\r\n", 1_500)
            .on("AT+TEST=TXLRPKT", "+TEST: TXLRPKT\r\n+TEST: TX DONE\r\n", 1_500);
        radio
    }

    /// Answer lines starting with `prefix` with `reply` after `latency_ms`
    pub fn on(&mut self, prefix: &'static str, reply: &'static str, latency_ms: u64) -> &mut Self {
        let _ = self.rules.push(Rule {
            prefix,
            reply,
            latency_ms,
        });
        self
    }

    /// Drop the rule for `prefix`
    pub fn ignore(&mut self, prefix: &str) -> &mut Self {
        self.rules.retain(|rule| rule.prefix != prefix);
        self
    }

    /// Deliver `bytes` `after_ms` from now
    pub fn inject(&mut self, after_ms: u64, bytes: &[u8]) {
        let mut pending = Pending {
            due_ms: self.time.now_ms() + after_ms,
            bytes: Vec::new(),
        };
        let _ = pending.bytes.extend_from_slice(bytes);
        let _ = self.pending.push(pending);
    }

    /// Every line written so far
    pub fn writes(&self) -> &[String<MAX_COMMAND_LEN>] {
        &self.writes
    }

    /// Frame text of the most recent `TXLRSTR` command
    pub fn last_transmit_text(&self) -> Option<&str> {
        let line = self
            .writes
            .iter()
            .rev()
            .find(|line| line.starts_with("AT+TEST=TXLRSTR,\""))?;
        let inner = &line["AT+TEST=TXLRSTR,\"".len()..];
        inner.rfind('"').map(|end| &inner[..end])
    }

    fn release_due(&mut self) {
        let now = self.time.now_ms();
        while let Some(index) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= now)
            .min_by_key(|(_, p)| p.due_ms)
            .map(|(i, _)| i)
        {
            let pending = self.pending.remove(index);
            for &b in pending.bytes.iter() {
                let _ = self.rx.push_back(b);
            }
        }
    }
}

impl SerialChannel for MockRadio<'_> {
    type Error = MockError;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let text = core::str::from_utf8(data).map_err(|_| MockError)?;
        let mut line = String::new();
        line.push_str(text).map_err(|_| MockError)?;
        self.writes.push(line).map_err(|_| MockError)?;

        let reply = self
            .rules
            .iter()
            .find(|rule| text.starts_with(rule.prefix))
            .map(|rule| (rule.reply, rule.latency_ms));
        if let Some((reply, latency)) = reply {
            self.inject(latency, reply.as_bytes());
        }
        Ok(())
    }

    fn available(&mut self) -> Result<usize, Self::Error> {
        self.release_due();
        Ok(self.rx.len())
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        self.rx.pop_front().ok_or(MockError)
    }
}

/// Module output for a packet received over the air
pub fn air_packet(text: &str, rssi: i16, snr: i16) -> String<640> {
    let mut out = String::new();
    let _ = write!(
        out,
        "+TEST: LEN:{}, RSSI:{}, SNR:{}\r\n+TEST: RX \"",
        text.len(),
        rssi,
        snr
    );
    let _ = hex::encode_into(text.as_bytes(), &mut out);
    let _ = out.push_str("\"\r\n");
    out
}

/// Sink that records everything it is given
#[derive(Default)]
pub struct RecordingSink {
    pub notes: Vec<LinkNote, 64>,
    pub mirrored: Vec<u8, 4096>,
}

impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&LinkNote) -> bool) -> usize {
        self.notes.iter().filter(|n| pred(n)).count()
    }
}

impl DiagnosticSink for RecordingSink {
    fn mirror(&mut self, bytes: &[u8]) {
        let _ = self.mirrored.extend_from_slice(bytes);
    }

    fn note(&mut self, note: LinkNote) {
        let _ = self.notes.push(note);
    }
}

/// Sensor source returning the same sample every time
pub struct FixedSensors(pub SensorSample);

impl SensorSource for FixedSensors {
    fn sample(&mut self) -> SensorSample {
        self.0
    }
}

/// Gateway source returning the same sample every time
pub struct FixedGateway(pub GatewaySample);

impl GatewaySource for FixedGateway {
    fn sample(&mut self) -> GatewaySample {
        self.0
    }
}

/// One rendered page
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shown {
    Sensor(SensorReading),
    Gateway(GatewayReading, LinkQuality, bool),
    Relay(RelayReading, RelayPage),
}

/// Display that records every page it is asked to draw
#[derive(Default)]
pub struct RecordingDisplay {
    pub pages: Vec<Shown, 16>,
    pub fail: bool,
}

impl RecordingDisplay {
    pub fn last(&self) -> Option<&Shown> {
        self.pages.last()
    }

    fn push(&mut self, page: Shown) -> Result<(), MockError> {
        if self.fail {
            return Err(MockError);
        }
        let _ = self.pages.push(page);
        Ok(())
    }
}

impl ReadingDisplay for RecordingDisplay {
    type Error = MockError;

    fn show_sensor(&mut self, reading: &SensorReading) -> Result<(), Self::Error> {
        self.push(Shown::Sensor(*reading))
    }

    fn show_gateway(
        &mut self,
        reading: &GatewayReading,
        quality: LinkQuality,
        upstream_alert: bool,
    ) -> Result<(), Self::Error> {
        self.push(Shown::Gateway(*reading, quality, upstream_alert))
    }

    fn show_relay(&mut self, relay: &RelayReading, page: RelayPage) -> Result<(), Self::Error> {
        self.push(Shown::Relay(*relay, page))
    }
}
