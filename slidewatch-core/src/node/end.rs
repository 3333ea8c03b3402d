//! End node cycle
//!
//! Listens for relayed readings and shows them. The page shown is chosen
//! by the caller (a button on the board).

use embedded_hal::delay::DelayNs;
use slidewatch_hal::{Clock, SerialChannel};
use slidewatch_protocol::RelayReading;

use super::CycleReport;
use crate::config::NodeConfig;
use crate::link::{LinkDriver, Received};
use crate::traits::{DiagnosticSink, ReadingDisplay, RelayPage};

/// End node state
#[derive(Debug, Clone)]
pub struct EndNode {
    receive_window_ms: u32,
    page: RelayPage,
    latest: Option<Received<RelayReading>>,
}

impl EndNode {
    /// Create an end node showing the sensor page
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            receive_window_ms: config.receive_window_ms,
            page: RelayPage::default(),
            latest: None,
        }
    }

    /// Most recent relayed reading
    pub fn latest(&self) -> Option<&RelayReading> {
        self.latest.as_ref().map(|r| &r.record)
    }

    /// Number of fields in the most recent relayed packet
    pub fn fields_received(&self) -> Option<usize> {
        self.latest.as_ref().map(|r| r.fields)
    }

    /// Page currently shown
    pub fn page(&self) -> RelayPage {
        self.page
    }

    /// Select the page for the next render
    pub fn set_page(&mut self, page: RelayPage) {
        self.page = page;
    }

    /// Draw the current page from the latest reading
    ///
    /// Before anything has been received the page shows zeroes.
    pub fn render<Disp: ReadingDisplay>(&self, display: &mut Disp) -> Result<(), Disp::Error> {
        let relay = self.latest().copied().unwrap_or_default();
        display.show_relay(&relay, self.page)
    }

    /// Receive one relayed reading and redraw
    pub fn cycle<S, C, D, K, Disp>(
        &mut self,
        link: &mut LinkDriver<S, C, D, K>,
        display: &mut Disp,
    ) -> CycleReport
    where
        S: SerialChannel,
        C: Clock,
        D: DelayNs,
        K: DiagnosticSink,
        Disp: ReadingDisplay,
    {
        let mut report = CycleReport::default();

        match link.receive::<RelayReading>(self.receive_window_ms) {
            Ok(Some(received)) => {
                report.received = true;
                self.latest = Some(received);
            }
            Ok(None) => {}
            Err(e) => report.link_failed(e),
        }

        report.display_result(self.render(display));
        report
    }
}
