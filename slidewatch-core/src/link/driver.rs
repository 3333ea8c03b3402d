//! Link driver
//!
//! Owns everything one node needs to talk to its radio module: the
//! command channel, the receive parser, the link state and the
//! diagnostic sink. Operations are blocking and every wait is bounded by
//! a configured budget.

use embedded_hal::delay::DelayNs;
use slidewatch_hal::{Clock, SerialChannel};
use slidewatch_protocol::{Command, LinkQuality, Record, WireFrame};

use super::channel::CommandChannel;
use super::error::LinkError;
use super::receiver::{ReceiveParser, Received};
use super::state::{LinkEvent, LinkState};
use crate::config::LinkConfig;
use crate::traits::{DiagnosticSink, LinkNote};

/// Radio link driver
pub struct LinkDriver<S, C, D, K> {
    channel: CommandChannel<S, C, D>,
    parser: ReceiveParser,
    config: LinkConfig,
    state: LinkState,
    sink: K,
}

impl<S, C, D, K> LinkDriver<S, C, D, K>
where
    S: SerialChannel,
    C: Clock,
    D: DelayNs,
    K: DiagnosticSink,
{
    /// Create an unconfigured driver
    pub fn new(serial: S, clock: C, delay: D, sink: K, config: LinkConfig) -> Self {
        Self {
            channel: CommandChannel::new(serial, clock, delay, config.timing),
            parser: ReceiveParser::new(config.rx_tag, config.max_payload_hex, config.hex_policy),
            config,
            state: LinkState::Unconfigured,
            sink,
        }
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Check if the module was found absent
    pub fn is_disabled(&self) -> bool {
        self.state.is_disabled()
    }

    /// Link configuration
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Last known signal quality
    pub fn link_quality(&self) -> LinkQuality {
        self.parser.quality()
    }

    /// Diagnostic sink
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Diagnostic sink, mutably
    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    /// Command channel, for inspecting the serial port and buffer
    pub fn channel(&self) -> &CommandChannel<S, C, D> {
        &self.channel
    }

    /// Current time (ms)
    pub fn now_ms(&self) -> u64 {
        self.channel.now_ms()
    }

    /// Block for `ms` milliseconds without touching the module
    pub fn pause(&mut self, ms: u32) {
        self.channel.pause(ms);
    }

    /// Release the owned resources
    pub fn release(self) -> (S, C, D, K) {
        let (serial, clock, delay) = self.channel.release();
        (serial, clock, delay, self.sink)
    }

    /// Probe and configure the module
    ///
    /// Runs once. If the liveness probe goes unanswered the link is
    /// disabled for good and nothing else is ever sent. Missed
    /// acknowledgements for the mode and radio commands are noted but do
    /// not stop configuration.
    pub fn configure(&mut self) -> Result<(), LinkError> {
        match self.state {
            LinkState::Unconfigured => {}
            LinkState::Disabled => return Err(LinkError::Disabled),
            _ => return Ok(()),
        }
        self.state = self.state.transition(LinkEvent::Configure);

        let probe = self.exchange(Command::Probe, self.config.timeouts.probe_ms);
        if !matches!(probe, Ok(true)) {
            self.state = self.state.transition(LinkEvent::ProbeFailed);
            self.sink.note(LinkNote::ModuleAbsent);
            return Err(LinkError::LinkAbsent);
        }

        let rf = self.config.rf;
        let result = self
            .exchange(Command::EnterTestMode, self.config.timeouts.test_mode_ms)
            .and_then(|_| self.exchange(Command::ConfigureRf(&rf), self.config.timeouts.rf_config_ms));

        self.state = self.state.transition(LinkEvent::ProbeAnswered);
        result?;
        self.sink.note(LinkNote::Configured);
        Ok(())
    }

    /// Arm receive mode and wait up to `window_ms` for a packet
    ///
    /// Returns `Ok(None)` when the window closes without a packet. The
    /// window starts once the arm command has been acknowledged (or its
    /// budget has run out).
    pub fn receive<R: Record>(&mut self, window_ms: u32) -> Result<Option<Received<R>>, LinkError> {
        self.ensure_ready()?;
        self.state = self.state.transition(LinkEvent::ArmReceive);
        let result = self.receive_window(window_ms);
        self.state = self.state.transition(LinkEvent::ReceiveEnded);
        result
    }

    /// Encode `record` and transmit it with the configured tag
    pub fn transmit<R: Record>(&mut self, record: &R) -> Result<(), LinkError> {
        self.ensure_ready()?;
        let frame = WireFrame::encode(record, self.config.tx_tag)?;

        self.state = self.state.transition(LinkEvent::Transmit);
        let command = Command::Transmit {
            frame: &frame,
            encoding: self.config.encoding,
        };
        let result = self.exchange(command, self.config.timeouts.transmit_ms);
        self.state = self.state.transition(LinkEvent::TransmitEnded);

        match result {
            Ok(true) => {
                self.sink.note(LinkNote::Sent);
                Ok(())
            }
            Ok(false) => {
                self.sink.note(LinkNote::SendFailed);
                Err(LinkError::AckTimeout)
            }
            Err(e) => {
                self.sink.note(LinkNote::SendFailed);
                Err(e)
            }
        }
    }

    fn receive_window<R: Record>(&mut self, window_ms: u32) -> Result<Option<Received<R>>, LinkError> {
        self.parser.reset();
        self.exchange(Command::ArmReceive, self.config.timeouts.arm_receive_ms)?;

        // A packet may already have arrived with the arm acknowledgement
        if let Some(received) = self.parser.scan(&mut self.channel, &mut self.sink)? {
            return Ok(Some(received));
        }

        let start = self.channel.now_ms();
        loop {
            if let Some(received) = self.parser.try_receive(&mut self.channel, &mut self.sink)? {
                return Ok(Some(received));
            }
            if self.channel.elapsed_since(start) >= u64::from(window_ms) {
                self.sink.note(LinkNote::ReceiveTimeout);
                return Ok(None);
            }
            self.channel.poll_delay();
        }
    }

    fn ensure_ready(&mut self) -> Result<(), LinkError> {
        match self.state {
            LinkState::Idle => Ok(()),
            LinkState::Disabled => {
                self.sink.note(LinkNote::Skipped);
                Err(LinkError::Disabled)
            }
            _ => Err(LinkError::NotConfigured),
        }
    }

    /// Send one command and wait for its acknowledgement
    fn exchange(&mut self, command: Command<'_>, timeout_ms: u32) -> Result<bool, LinkError> {
        let line = command.to_line()?;
        let name = command.name();

        self.sink.note(LinkNote::CommandSent(name));
        let acked = self.channel.send_and_await(
            line.as_bytes(),
            Some(command.ack().as_bytes()),
            timeout_ms,
            &mut self.sink,
        )?;
        if !acked {
            self.sink.note(LinkNote::AckMissed(name));
        }
        Ok(acked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{air_packet, MockRadio, RecordingSink, VirtualTime};
    use slidewatch_protocol::{RoleTag, SensorReading, TxEncoding};

    fn gateway_config() -> LinkConfig {
        LinkConfig::with_tags(RoleTag::EN, RoleTag::GW)
    }

    #[test]
    fn test_configure_sequence() {
        let time = VirtualTime::new();
        let radio = MockRadio::wio_e5(&time);
        let mut link = LinkDriver::new(
            radio,
            time.clock(),
            time.delay(),
            RecordingSink::default(),
            gateway_config(),
        );

        link.configure().unwrap();
        assert_eq!(link.state(), LinkState::Idle);

        let writes = link.channel().serial().writes();
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[0].as_str(), "AT\r\n");
        assert_eq!(writes[1].as_str(), "AT+MODE=TEST\r\n");
        assert_eq!(
            writes[2].as_str(),
            "AT+TEST=RFCFG,866,SF12,125,12,15,14,ON,OFF,OFF\r\n"
        );
        assert_eq!(link.sink().count(|n| *n == LinkNote::Configured), 1);

        // Second call is a no-op
        link.configure().unwrap();
        assert_eq!(link.channel().serial().writes().len(), 3);
    }

    #[test]
    fn test_missed_config_ack_is_tolerated() {
        let time = VirtualTime::new();
        let mut radio = MockRadio::wio_e5(&time);
        radio.ignore("AT+MODE=TEST");
        let mut link = LinkDriver::new(
            radio,
            time.clock(),
            time.delay(),
            RecordingSink::default(),
            gateway_config(),
        );

        link.configure().unwrap();
        assert_eq!(link.state(), LinkState::Idle);
        assert_eq!(link.sink().count(|n| *n == LinkNote::AckMissed("MODE")), 1);
        assert_eq!(link.channel().serial().writes().len(), 3);
    }

    #[test]
    fn test_absent_module_disables_link() {
        let time = VirtualTime::new();
        let radio = MockRadio::silent(&time);
        let mut link = LinkDriver::new(
            radio,
            time.clock(),
            time.delay(),
            RecordingSink::default(),
            gateway_config(),
        );

        assert_eq!(link.configure(), Err(LinkError::LinkAbsent));
        assert!(link.is_disabled());
        assert_eq!(link.sink().count(|n| *n == LinkNote::ModuleAbsent), 1);

        // Nothing but the probe is ever written
        assert_eq!(link.configure(), Err(LinkError::Disabled));
        let got: Result<Option<Received<SensorReading>>, _> = link.receive(5_000);
        assert_eq!(got, Err(LinkError::Disabled));
        assert_eq!(
            link.transmit(&SensorReading::default()),
            Err(LinkError::Disabled)
        );
        assert_eq!(link.channel().serial().writes().len(), 1);
        assert_eq!(link.sink().count(|n| *n == LinkNote::Skipped), 2);
    }

    #[test]
    fn test_operations_before_configure() {
        let time = VirtualTime::new();
        let radio = MockRadio::wio_e5(&time);
        let mut link = LinkDriver::new(
            radio,
            time.clock(),
            time.delay(),
            RecordingSink::default(),
            gateway_config(),
        );

        let got: Result<Option<Received<SensorReading>>, _> = link.receive(100);
        assert_eq!(got, Err(LinkError::NotConfigured));
        assert!(link.channel().serial().writes().is_empty());
    }

    #[test]
    fn test_receive_window_timeout_is_bounded() {
        let time = VirtualTime::new();
        let radio = MockRadio::wio_e5(&time);
        let mut link = LinkDriver::new(
            radio,
            time.clock(),
            time.delay(),
            RecordingSink::default(),
            gateway_config(),
        );
        link.configure().unwrap();

        let start = time.now_ms();
        let got: Option<Received<SensorReading>> = link.receive(5_000).unwrap();
        assert!(got.is_none());
        assert_eq!(link.state(), LinkState::Idle);

        // Settle and arm ack, then the window plus at most one poll
        let elapsed = time.now_ms() - start;
        assert!(elapsed >= 5_000);
        assert!(elapsed <= 200 + 20 + 5_000 + 2);
        assert_eq!(link.sink().count(|n| *n == LinkNote::ReceiveTimeout), 1);
        assert_eq!(
            link.channel().serial().writes().last().map(|l| l.as_str()),
            Some("AT+TEST=RXLRPKT\r\n")
        );
    }

    #[test]
    fn test_receive_packet_in_window() {
        let time = VirtualTime::new();
        let radio = MockRadio::wio_e5(&time);
        let mut link = LinkDriver::new(
            radio,
            time.clock(),
            time.delay(),
            RecordingSink::default(),
            gateway_config(),
        );
        link.configure().unwrap();

        let packet = air_packet("GW,45,60,10,70,22,0.30,0,0", -41, 13);
        link.channel
            .serial_mut()
            .inject(1_000, packet.as_bytes());

        let got: Received<SensorReading> = link.receive(5_000).unwrap().unwrap();
        assert_eq!(got.record.rain, 10);
        assert_eq!(got.record.temperature, 22);
        assert_eq!(link.link_quality().rssi, Some(-41));
        assert_eq!(link.state(), LinkState::Idle);
    }

    #[test]
    fn test_packet_arriving_with_arm_ack() {
        let time = VirtualTime::new();
        let radio = MockRadio::wio_e5(&time);
        let mut link = LinkDriver::new(
            radio,
            time.clock(),
            time.delay(),
            RecordingSink::default(),
            gateway_config(),
        );
        link.configure().unwrap();

        let packet = air_packet("GW,1,2,3,4,5,1.50,1,1", -60, 7);
        link.channel.serial_mut().inject(100, packet.as_bytes());

        let got: Received<SensorReading> = link.receive(5_000).unwrap().unwrap();
        assert!(got.record.vibration);
        assert!(time.now_ms() < 5_000);
    }

    #[test]
    fn test_window_survives_buffer_filling_mid_packet() {
        let time = VirtualTime::new();
        let mut radio = MockRadio::wio_e5(&time);
        radio.inject(1_500, &[b'.'; 430]);
        radio.inject(1_600, air_packet("GW,45,60,10,70,22,0.30,0,0", -41, 13).as_bytes());
        radio.inject(3_000, air_packet("GW,12,34,5,6,7,0.10,0,0", -58, 6).as_bytes());
        let mut link = LinkDriver::new(
            radio,
            time.clock(),
            time.delay(),
            RecordingSink::default(),
            gateway_config(),
        );
        link.configure().unwrap();

        let got: Received<SensorReading> = link.receive(5_000).unwrap().unwrap();
        assert_eq!(got.record.soil_m1, 12);
        assert_eq!(got.quality.rssi, Some(-58));
        assert_eq!(link.sink().count(|n| *n == LinkNote::BufferOverflow), 1);
    }

    #[test]
    fn test_transmit_line() {
        let time = VirtualTime::new();
        let radio = MockRadio::wio_e5(&time);
        let mut link = LinkDriver::new(
            radio,
            time.clock(),
            time.delay(),
            RecordingSink::default(),
            LinkConfig::with_tags(RoleTag::GW, RoleTag::GW),
        );
        link.configure().unwrap();

        let reading = SensorReading {
            soil_m1: 45,
            soil_m2: 60,
            rain: 10,
            humidity: 70,
            temperature: 22,
            displacement: 0.3,
            vibration: false,
            alert: false,
        };
        link.transmit(&reading).unwrap();

        assert_eq!(
            link.channel().serial().writes().last().map(|l| l.as_str()),
            Some("AT+TEST=TXLRSTR,\"GW,45,60,10,70,22,0.30,0,0\"\r\n")
        );
        assert_eq!(link.sink().count(|n| *n == LinkNote::Sent), 1);
        assert_eq!(link.state(), LinkState::Idle);
    }

    #[test]
    fn test_transmit_hex_encoding() {
        let time = VirtualTime::new();
        let radio = MockRadio::wio_e5(&time);
        let mut config = gateway_config();
        config.encoding = TxEncoding::Hex;
        let mut link = LinkDriver::new(radio, time.clock(), time.delay(), RecordingSink::default(), config);
        link.configure().unwrap();

        link.transmit(&slidewatch_protocol::GatewayReading {
            rain: 5,
            humidity: 80,
            temperature: 18,
        })
        .unwrap();

        // "EN,5,80,18"
        assert_eq!(
            link.channel().serial().writes().last().map(|l| l.as_str()),
            Some("AT+TEST=TXLRPKT,\"454E2C352C38302C3138\"\r\n")
        );
    }

    #[test]
    fn test_transmit_unconfirmed() {
        let time = VirtualTime::new();
        let mut radio = MockRadio::wio_e5(&time);
        radio.ignore("AT+TEST=TXLRSTR");
        let mut link = LinkDriver::new(
            radio,
            time.clock(),
            time.delay(),
            RecordingSink::default(),
            gateway_config(),
        );
        link.configure().unwrap();

        let start = time.now_ms();
        assert_eq!(
            link.transmit(&SensorReading::default()),
            Err(LinkError::AckTimeout)
        );
        assert!(time.now_ms() - start <= 200 + 6_000 + 2);
        assert_eq!(link.sink().count(|n| *n == LinkNote::SendFailed), 1);
        assert_eq!(link.state(), LinkState::Idle);
    }
}
