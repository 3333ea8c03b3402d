//! Receive parser
//!
//! Recognizes packets from one expected role tag in the module's output.
//! Output accumulates across attempts, so a packet split over several
//! polls is picked up once its closing quote arrives.

use embedded_hal::delay::DelayNs;
use slidewatch_hal::{Clock, SerialChannel};
use slidewatch_protocol::{decode, find_packet, HexPolicy, LinkQuality, Marker, Record, RoleTag};

use super::channel::CommandChannel;
use super::error::LinkError;
use crate::traits::{DiagnosticSink, LinkNote};

/// A decoded packet
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Received<R> {
    /// The decoded record; absent fields are zero
    pub record: R,
    /// Field tokens present in the payload
    pub fields: usize,
    /// Hex payload was cut short
    pub truncated: bool,
    /// Signal quality reported with the packet
    pub quality: LinkQuality,
}

impl<R: Record> Received<R> {
    /// Check whether every field of the record was present
    pub fn is_complete(&self) -> bool {
        self.fields >= R::FIELD_COUNT && !self.truncated
    }
}

/// Packet recognizer for one role tag
#[derive(Debug, Clone)]
pub struct ReceiveParser {
    marker: Marker,
    max_hex: usize,
    policy: HexPolicy,
    /// Last known quality, kept across packets
    quality: LinkQuality,
    /// Quality seen ahead of a packet start that was moved to the buffer front
    carried: LinkQuality,
}

impl ReceiveParser {
    /// Create a parser for packets tagged `tag`
    ///
    /// At most `max_hex` payload digits are taken after the marker.
    pub fn new(tag: RoleTag, max_hex: usize, policy: HexPolicy) -> Self {
        Self {
            marker: Marker::for_tag(tag),
            max_hex,
            policy,
            quality: LinkQuality::default(),
            carried: LinkQuality::default(),
        }
    }

    /// The marker this parser searches for
    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    /// Last known signal quality
    pub fn quality(&self) -> LinkQuality {
        self.quality
    }

    /// Forget anything held over from a partly buffered packet
    pub fn reset(&mut self) {
        self.carried = LinkQuality::default();
    }

    /// Make one non-blocking receive attempt
    ///
    /// Drains the channel; returns `Ok(None)` right away if nothing new
    /// arrived or no complete packet is buffered yet.
    pub fn try_receive<R, S, C, D, K>(
        &mut self,
        channel: &mut CommandChannel<S, C, D>,
        sink: &mut K,
    ) -> Result<Option<Received<R>>, LinkError>
    where
        R: Record,
        S: SerialChannel,
        C: Clock,
        D: DelayNs,
        K: DiagnosticSink,
    {
        if channel.drain(sink)? == 0 {
            return Ok(None);
        }
        self.scan(channel, sink)
    }

    /// Look for a packet in what is already buffered
    ///
    /// Signal quality fields are picked up whether or not a packet is
    /// found. A decoded packet (or an undecodable one) is consumed from
    /// the buffer, and its quality is only what was buffered with it.
    ///
    /// A full buffer is never left as is. If it holds the start of a
    /// packet whose remaining bytes were not dropped, everything before
    /// that packet is discarded; otherwise the buffer is cleared.
    pub fn scan<R, S, C, D, K>(
        &mut self,
        channel: &mut CommandChannel<S, C, D>,
        sink: &mut K,
    ) -> Result<Option<Received<R>>, LinkError>
    where
        R: Record,
        S: SerialChannel,
        C: Clock,
        D: DelayNs,
        K: DiagnosticSink,
    {
        let buf = channel.buffer().as_bytes();
        let seen = LinkQuality::parse(buf);
        self.quality = self.quality.merge(seen);

        let Some(found) = find_packet(buf, &self.marker, self.max_hex) else {
            // Nothing recognizable and no room left to ever complete one
            if channel.buffer().is_full() {
                self.discard(channel);
            }
            return Ok(None);
        };
        if !found.complete {
            if channel.buffer().is_full() {
                let marker_at = found.end - found.payload_hex.len() - self.marker.len();
                if channel.buffer().overflowed() || marker_at == 0 {
                    // The packet's tail was dropped, it can never complete
                    self.discard(channel);
                } else {
                    self.carried = self.carried.merge(seen);
                    channel.discard_before(marker_at);
                }
            }
            return Ok(None);
        }

        let quality = self.carried.merge(seen);
        let decoded = decode::<R>(found.payload_hex, self.policy);
        self.discard(channel);

        match decoded {
            Ok(decoded) => {
                let received = Received {
                    record: decoded.record,
                    fields: decoded.fields,
                    truncated: decoded.truncated,
                    quality,
                };
                sink.note(LinkNote::PacketReceived {
                    fields: received.fields,
                    truncated: received.truncated,
                    quality: received.quality,
                });
                Ok(Some(received))
            }
            Err(e) => {
                sink.note(LinkNote::MalformedPayload(e));
                Err(LinkError::MalformedPayload(e))
            }
        }
    }

    fn discard<S, C, D>(&mut self, channel: &mut CommandChannel<S, C, D>)
    where
        S: SerialChannel,
        C: Clock,
        D: DelayNs,
    {
        channel.clear();
        self.carried = LinkQuality::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::channel::ChannelTiming;
    use crate::testing::{air_packet, MockRadio, RecordingSink, VirtualTime};
    use slidewatch_protocol::{RelayReading, SensorReading, MAX_PAYLOAD_HEX};

    fn parser(tag: RoleTag) -> ReceiveParser {
        ReceiveParser::new(tag, MAX_PAYLOAD_HEX, HexPolicy::Truncate)
    }

    #[test]
    fn test_nothing_available() {
        let time = VirtualTime::new();
        let radio = MockRadio::silent(&time);
        let mut channel =
            CommandChannel::new(radio, time.clock(), time.delay(), ChannelTiming::default());
        let mut sink = RecordingSink::default();

        let got: Option<Received<SensorReading>> =
            parser(RoleTag::GW).try_receive(&mut channel, &mut sink).unwrap();
        assert!(got.is_none());
        assert!(sink.notes.is_empty());
    }

    #[test]
    fn test_packet_after_noise() {
        let time = VirtualTime::new();
        let mut radio = MockRadio::silent(&time);
        radio.inject(0, b"AT\r\nOK\r\n");
        radio.inject(0, air_packet("GW,45,60,10,70,22,0.30,0,0", -41, 13).as_bytes());
        let mut channel =
            CommandChannel::new(radio, time.clock(), time.delay(), ChannelTiming::default());
        let mut sink = RecordingSink::default();
        let mut parser = parser(RoleTag::GW);

        let got: Received<SensorReading> =
            parser.try_receive(&mut channel, &mut sink).unwrap().unwrap();
        assert!(got.is_complete());
        assert_eq!(got.record.soil_m1, 45);
        assert_eq!(got.record.soil_m2, 60);
        assert_eq!(got.record.displacement, 0.3);
        assert_eq!(got.quality.rssi, Some(-41));
        assert_eq!(got.quality.snr, Some(13));
        assert!(channel.buffer().is_empty());
        assert_eq!(sink.count(|n| matches!(n, LinkNote::PacketReceived { .. })), 1);
    }

    #[test]
    fn test_packet_split_across_attempts() {
        let time = VirtualTime::new();
        let mut radio = MockRadio::silent(&time);
        let packet = air_packet("EN,1,2,3,4,5,0.50,1,1,6,7,8", -70, 4);
        let (head, tail) = packet.as_bytes().split_at(packet.len() - 10);
        radio.inject(0, head);
        radio.inject(5, tail);
        let mut channel =
            CommandChannel::new(radio, time.clock(), time.delay(), ChannelTiming::default());
        let mut parser = parser(RoleTag::EN);
        let mut sink = RecordingSink::default();

        let first: Option<Received<RelayReading>> =
            parser.try_receive(&mut channel, &mut sink).unwrap();
        assert!(first.is_none());

        time.advance_ms(5);
        let got: Received<RelayReading> =
            parser.try_receive(&mut channel, &mut sink).unwrap().unwrap();
        assert_eq!(got.fields, 11);
        assert!(got.record.sensor.alert);
        assert_eq!(got.record.gateway.temperature, 8);
    }

    #[test]
    fn test_other_tag_ignored() {
        let time = VirtualTime::new();
        let mut radio = MockRadio::silent(&time);
        radio.inject(0, air_packet("EN,1,2,3", -50, 8).as_bytes());
        let mut channel =
            CommandChannel::new(radio, time.clock(), time.delay(), ChannelTiming::default());
        let mut parser = parser(RoleTag::GW);

        let got: Option<Received<SensorReading>> =
            parser.try_receive(&mut channel, &mut RecordingSink::default()).unwrap();
        assert!(got.is_none());
        // Signal quality is still picked up
        assert_eq!(parser.quality().rssi, Some(-50));
    }

    #[test]
    fn test_odd_hex_truncated() {
        let time = VirtualTime::new();
        let mut radio = MockRadio::silent(&time);
        radio.inject(0, b"+TEST: RX \"47572C34352C3630F\"\r\n");
        let mut channel =
            CommandChannel::new(radio, time.clock(), time.delay(), ChannelTiming::default());

        let got: Received<SensorReading> = parser(RoleTag::GW)
            .try_receive(&mut channel, &mut RecordingSink::default())
            .unwrap()
            .unwrap();
        assert!(got.truncated);
        assert_eq!(got.fields, 2);
        assert_eq!(got.record.soil_m2, 60);
        assert!(!got.is_complete());
    }

    #[test]
    fn test_odd_hex_rejected() {
        let time = VirtualTime::new();
        let mut radio = MockRadio::silent(&time);
        radio.inject(0, b"+TEST: RX \"47572C3435F\"\r\n");
        let mut channel =
            CommandChannel::new(radio, time.clock(), time.delay(), ChannelTiming::default());
        let mut parser = ReceiveParser::new(RoleTag::GW, MAX_PAYLOAD_HEX, HexPolicy::Reject);
        let mut sink = RecordingSink::default();

        let result: Result<Option<Received<SensorReading>>, _> =
            parser.try_receive(&mut channel, &mut sink);
        assert_eq!(
            result,
            Err(LinkError::MalformedPayload(
                slidewatch_protocol::FrameError::MalformedLength
            ))
        );
        assert!(channel.buffer().is_empty());
        assert_eq!(sink.count(|n| matches!(n, LinkNote::MalformedPayload(_))), 1);
    }

    #[test]
    fn test_full_buffer_without_marker_is_cleared() {
        let time = VirtualTime::new();
        let mut radio = MockRadio::silent(&time);
        radio.inject(0, &[b'.'; 600]);
        let mut channel =
            CommandChannel::new(radio, time.clock(), time.delay(), ChannelTiming::default());

        let got: Option<Received<SensorReading>> = parser(RoleTag::GW)
            .try_receive(&mut channel, &mut RecordingSink::default())
            .unwrap();
        assert!(got.is_none());
        assert!(channel.buffer().is_empty());
    }

    #[test]
    fn test_full_buffer_mid_packet_is_cleared() {
        let time = VirtualTime::new();
        let mut radio = MockRadio::silent(&time);
        // The buffer fills inside the first packet's payload
        radio.inject(0, &[b'.'; 420]);
        radio.inject(0, air_packet("GW,45,60,10,70,22,0.30,0,0", -41, 13).as_bytes());
        radio.inject(5, air_packet("GW,12,34,5,6,7,0.10,0,0", -58, 6).as_bytes());
        let mut channel =
            CommandChannel::new(radio, time.clock(), time.delay(), ChannelTiming::default());
        let mut parser = parser(RoleTag::GW);
        let mut sink = RecordingSink::default();

        let first: Option<Received<SensorReading>> =
            parser.try_receive(&mut channel, &mut sink).unwrap();
        assert!(first.is_none());
        assert!(channel.buffer().is_empty());

        time.advance_ms(5);
        let got: Received<SensorReading> =
            parser.try_receive(&mut channel, &mut sink).unwrap().unwrap();
        assert!(got.is_complete());
        assert_eq!(got.record.soil_m1, 12);
        assert_eq!(got.quality.rssi, Some(-58));
    }

    #[test]
    fn test_exactly_full_buffer_keeps_packet_start() {
        let time = VirtualTime::new();
        let mut radio = MockRadio::silent(&time);
        let packet = air_packet("GW,45,60,10,70,22,0.30,0,0", -41, 13);
        let (head, tail) = packet.as_bytes().split_at(packet.len() - 10);
        radio.inject(0, &[b'.'; 512][..512 - head.len()]);
        radio.inject(0, head);
        radio.inject(5, tail);
        let mut channel =
            CommandChannel::new(radio, time.clock(), time.delay(), ChannelTiming::default());
        let mut parser = parser(RoleTag::GW);
        let mut sink = RecordingSink::default();

        let first: Option<Received<SensorReading>> =
            parser.try_receive(&mut channel, &mut sink).unwrap();
        assert!(first.is_none());
        assert!(channel.buffer().as_bytes().starts_with(b"+TEST: RX \""));

        time.advance_ms(5);
        let got: Received<SensorReading> =
            parser.try_receive(&mut channel, &mut sink).unwrap().unwrap();
        assert!(got.is_complete());
        assert_eq!(got.record.humidity, 70);
        // The quality line sat ahead of the discarded prefix
        assert_eq!(got.quality.rssi, Some(-41));
        assert_eq!(got.quality.snr, Some(13));
    }

    #[test]
    fn test_quality_belongs_to_its_packet() {
        let time = VirtualTime::new();
        let mut radio = MockRadio::silent(&time);
        radio.inject(0, air_packet("GW,1,2,3,4,5,0.10,0,0", -41, 13).as_bytes());
        let bare = air_packet("GW,9,8,7,6,5,0.20,0,0", 0, 0);
        let rx_at = bare.find("+TEST: RX").unwrap();
        radio.inject(5, bare[rx_at..].as_bytes());
        let mut channel =
            CommandChannel::new(radio, time.clock(), time.delay(), ChannelTiming::default());
        let mut parser = parser(RoleTag::GW);
        let mut sink = RecordingSink::default();

        let first: Received<SensorReading> =
            parser.try_receive(&mut channel, &mut sink).unwrap().unwrap();
        assert_eq!(first.quality.rssi, Some(-41));

        time.advance_ms(5);
        let second: Received<SensorReading> =
            parser.try_receive(&mut channel, &mut sink).unwrap().unwrap();
        assert_eq!(second.record.soil_m1, 9);
        assert!(second.quality.is_empty());
        // The last known values stay available for display
        assert_eq!(parser.quality().rssi, Some(-41));
    }
}
