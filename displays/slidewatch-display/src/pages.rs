//! Page layouts
//!
//! Builds the screen for each node page. Values that do not fit are cut
//! at the screen edge rather than wrapped.

use core::fmt::Write;

use slidewatch_core::alert::AlertLevel;
use slidewatch_core::traits::{ReadingDisplay, RelayPage};
use slidewatch_protocol::{GatewayReading, LinkQuality, RelayReading, SensorReading};

use crate::backend::{DisplayBackend, DisplayError};
use crate::screen::{Line, Screen};

/// Screen renderer for node pages
pub struct PageRenderer {
    screen: Screen,
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRenderer {
    /// Create a renderer with a blank screen
    pub fn new() -> Self {
        Self {
            screen: Screen::new(),
        }
    }

    /// Get the current screen buffer
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Get the screen buffer mutably
    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    /// Render the startup screen
    ///
    /// `role` is the node role name, `radio` a short radio status.
    pub fn render_boot(&mut self, role: &str, radio: &str) {
        self.screen.clear();
        self.screen.set_line(1, "     SLIDEWATCH");
        self.screen.set_line(3, " Landslide Monitor");

        let mut line = Line::new();
        let _ = write!(line, " Node: {}", role);
        self.screen.set_line(5, &line);

        let mut line = Line::new();
        let _ = write!(line, " Radio: {}", radio);
        self.screen.set_line(6, &line);
    }

    /// Render the sensor node's own page
    pub fn render_sensor(&mut self, reading: &SensorReading) {
        self.screen.clear();
        self.screen.set_line(0, "--- SENSOR NODE ---");
        self.sensor_body(reading);
    }

    /// Render the gateway's own page
    pub fn render_gateway(&mut self, reading: &GatewayReading, quality: LinkQuality, upstream_alert: bool) {
        self.screen.clear();
        self.screen.set_line(0, "--- GATEWAY NODE ---");
        self.gateway_body(reading);

        let mut line = Line::new();
        match quality.rssi {
            Some(rssi) => write!(line, "RSSI: {} dBm", rssi),
            None => line.write_str("RSSI: --"),
        }
        .ok();
        self.screen.set_line(4, &line);

        let mut line = Line::new();
        match quality.snr {
            Some(snr) => write!(line, "SNR: {} dB", snr),
            None => line.write_str("SNR: --"),
        }
        .ok();
        self.screen.set_line(5, &line);

        self.status_row("Sensor: ", AlertLevel::from(upstream_alert));
    }

    /// Render one page of a relayed reading
    pub fn render_relay(&mut self, relay: &RelayReading, page: RelayPage) {
        self.screen.clear();
        match page {
            RelayPage::Sensor => {
                self.screen.set_line(0, "--- REMOTE SENSOR ---");
                self.sensor_body(&relay.sensor);
            }
            RelayPage::Gateway => {
                self.screen.set_line(0, "-- REMOTE GATEWAY --");
                self.gateway_body(&relay.gateway);
                self.status_row("Sensor: ", AlertLevel::from(relay.sensor.alert));
            }
        }
    }

    fn sensor_body(&mut self, reading: &SensorReading) {
        let mut line = Line::new();
        let _ = write!(line, "M1: {}%  M2: {}%", reading.soil_m1, reading.soil_m2);
        self.screen.set_line(1, &line);

        let mut line = Line::new();
        let _ = write!(line, "Rain: {}%", reading.rain);
        self.screen.set_line(2, &line);

        let mut line = Line::new();
        let _ = write!(line, "Humidity: {}%", reading.humidity);
        self.screen.set_line(3, &line);

        let mut line = Line::new();
        let _ = write!(line, "Temp: {}C", reading.temperature);
        self.screen.set_line(4, &line);

        let mut line = Line::new();
        let _ = write!(line, "Disp: {:.2} m/s2", reading.displacement);
        self.screen.set_line(5, &line);

        let vibration = if reading.vibration {
            "Vib: Detected"
        } else {
            "Vib: Not Det"
        };
        self.screen.set_line(6, vibration);

        self.status_row("Status: ", AlertLevel::from(reading.alert));
    }

    fn gateway_body(&mut self, reading: &GatewayReading) {
        let mut line = Line::new();
        let _ = write!(line, "Rain: {}%", reading.rain);
        self.screen.set_line(1, &line);

        let mut line = Line::new();
        let _ = write!(line, "Humidity: {}%", reading.humidity);
        self.screen.set_line(2, &line);

        let mut line = Line::new();
        let _ = write!(line, "Temp: {}C", reading.temperature);
        self.screen.set_line(3, &line);
    }

    /// Status on the bottom row; an alert is inverted
    fn status_row(&mut self, label: &str, level: AlertLevel) {
        let mut line = Line::new();
        let _ = line.push_str(label);
        let _ = line.push_str(level.label());
        self.screen.set_line(7, &line);

        if level.is_alert() {
            self.screen
                .set_highlight(7, label.len() as u8, line.len() as u8);
        }
    }
}

/// Reading pages drawn on a display backend
pub struct PageDisplay<B> {
    backend: B,
    renderer: PageRenderer,
}

impl<B: DisplayBackend> PageDisplay<B> {
    /// Create a page display drawing on `backend`
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            renderer: PageRenderer::new(),
        }
    }

    /// Page renderer holding the last drawn screen
    pub fn renderer(&self) -> &PageRenderer {
        &self.renderer
    }

    /// Display backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Display backend, mutably
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Show the startup screen
    pub fn show_boot(&mut self, role: &str, radio: &str) -> Result<(), DisplayError> {
        self.renderer.render_boot(role, radio);
        self.redraw()
    }

    fn redraw(&mut self) -> Result<(), DisplayError> {
        self.renderer.screen_mut().draw(&mut self.backend)
    }
}

impl<B: DisplayBackend> ReadingDisplay for PageDisplay<B> {
    type Error = DisplayError;

    fn show_sensor(&mut self, reading: &SensorReading) -> Result<(), Self::Error> {
        self.renderer.render_sensor(reading);
        self.redraw()
    }

    fn show_gateway(
        &mut self,
        reading: &GatewayReading,
        quality: LinkQuality,
        upstream_alert: bool,
    ) -> Result<(), Self::Error> {
        self.renderer.render_gateway(reading, quality, upstream_alert);
        self.redraw()
    }

    fn show_relay(&mut self, relay: &RelayReading, page: RelayPage) -> Result<(), Self::Error> {
        self.renderer.render_relay(relay, page);
        self.redraw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TextBackend;

    fn reading() -> SensorReading {
        SensorReading {
            soil_m1: 45,
            soil_m2: 60,
            rain: 10,
            humidity: 70,
            temperature: 22,
            displacement: 0.3,
            vibration: false,
            alert: false,
        }
    }

    #[test]
    fn test_render_boot() {
        let mut renderer = PageRenderer::new();
        renderer.render_boot("gateway", "Not found");
        assert!(renderer.screen().get_line(1).unwrap().contains("SLIDEWATCH"));
        assert_eq!(renderer.screen().get_line(5), Some(" Node: gateway"));
        assert_eq!(renderer.screen().get_line(6), Some(" Radio: Not found"));
    }

    #[test]
    fn test_render_sensor() {
        let mut renderer = PageRenderer::new();
        renderer.render_sensor(&reading());

        let screen = renderer.screen();
        assert_eq!(screen.get_line(1), Some("M1: 45%  M2: 60%"));
        assert_eq!(screen.get_line(4), Some("Temp: 22C"));
        assert_eq!(screen.get_line(5), Some("Disp: 0.30 m/s2"));
        assert_eq!(screen.get_line(6), Some("Vib: Not Det"));
        assert_eq!(screen.get_line(7), Some("Status: OK"));
        assert_eq!(screen.get_highlight(7), None);
    }

    #[test]
    fn test_alert_is_highlighted() {
        let mut renderer = PageRenderer::new();
        renderer.render_sensor(&SensorReading {
            vibration: true,
            alert: true,
            ..reading()
        });

        let screen = renderer.screen();
        assert_eq!(screen.get_line(6), Some("Vib: Detected"));
        assert_eq!(screen.get_line(7), Some("Status: Alert!"));
        assert_eq!(screen.get_highlight(7), Some((8, 14)));
    }

    #[test]
    fn test_render_gateway_quality() {
        let mut renderer = PageRenderer::new();
        let gateway = GatewayReading {
            rain: 5,
            humidity: 80,
            temperature: -3,
        };

        renderer.render_gateway(&gateway, LinkQuality::default(), false);
        assert_eq!(renderer.screen().get_line(3), Some("Temp: -3C"));
        assert_eq!(renderer.screen().get_line(4), Some("RSSI: --"));
        assert_eq!(renderer.screen().get_line(7), Some("Sensor: OK"));

        let quality = LinkQuality {
            rssi: Some(-41),
            snr: Some(13),
        };
        renderer.render_gateway(&gateway, quality, true);
        assert_eq!(renderer.screen().get_line(4), Some("RSSI: -41 dBm"));
        assert_eq!(renderer.screen().get_line(5), Some("SNR: 13 dB"));
        assert_eq!(renderer.screen().get_line(7), Some("Sensor: Alert!"));
    }

    #[test]
    fn test_render_relay_pages() {
        let relay = RelayReading {
            sensor: SensorReading {
                alert: true,
                ..reading()
            },
            gateway: GatewayReading {
                rain: 5,
                humidity: 80,
                temperature: 18,
            },
        };
        let mut renderer = PageRenderer::new();

        renderer.render_relay(&relay, RelayPage::Sensor);
        assert_eq!(renderer.screen().get_line(0), Some("--- REMOTE SENSOR ---"));
        assert_eq!(renderer.screen().get_line(2), Some("Rain: 10%"));

        renderer.render_relay(&relay, RelayPage::Gateway);
        assert_eq!(renderer.screen().get_line(1), Some("Rain: 5%"));
        assert_eq!(renderer.screen().get_line(7), Some("Sensor: Alert!"));
        assert_eq!(renderer.screen().get_line(5), Some(""));
    }

    #[test]
    fn test_page_display_draws() {
        let mut display = PageDisplay::new(TextBackend::new());
        display.show_sensor(&reading()).unwrap();
        assert_eq!(display.backend().row(0), "--- SENSOR NODE ---");
        assert_eq!(display.backend().row(7), "Status: OK");

        display.backend_mut().fail = true;
        assert_eq!(
            display.show_sensor(&reading()),
            Err(DisplayError::Communication)
        );
    }
}
