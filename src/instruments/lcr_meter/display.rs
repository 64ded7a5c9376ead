use serde::{Deserialize, Serialize};

use crate::error::ScpiError;
use crate::protocol::{Protocol, Token};
use crate::transport::TransportHandle;

/// Characters that fit the comment line
pub const MAX_LINE_LENGTH: usize = 30;

/// Front panel page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayPage {
    Measurement,
    BinNumber,
    BinCount,
    List,
    MeasurementSetup,
    CorrectionSetup,
    LimitTable,
    ListSetup,
    Catalog,
    System,
}

impl Token for DisplayPage {
    const FIELD: &'static str = "display page";

    fn token(self) -> &'static str {
        match self {
            DisplayPage::Measurement => "MEAS",
            DisplayPage::BinNumber => "BNUM",
            DisplayPage::BinCount => "BCO",
            DisplayPage::List => "LIST",
            DisplayPage::MeasurementSetup => "MSET",
            DisplayPage::CorrectionSetup => "CSET",
            DisplayPage::LimitTable => "LTAB",
            DisplayPage::ListSetup => "LSET",
            DisplayPage::Catalog => "CAT",
            DisplayPage::System => "SYST",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "MEAS" | "MEASUREMENT" => Some(DisplayPage::Measurement),
            "BNUM" | "BNUMBER" => Some(DisplayPage::BinNumber),
            "BCO" | "BCOUNT" => Some(DisplayPage::BinCount),
            "LIST" => Some(DisplayPage::List),
            "MSET" | "MSETUP" => Some(DisplayPage::MeasurementSetup),
            "CSET" | "CSETUP" => Some(DisplayPage::CorrectionSetup),
            "LTAB" | "LTABLE" => Some(DisplayPage::LimitTable),
            "LSET" | "LSETUP" => Some(DisplayPage::ListSetup),
            "CAT" | "CATALOG" => Some(DisplayPage::Catalog),
            "SYST" | "SYSTEM" => Some(DisplayPage::System),
            _ => None,
        }
    }
}

/// Front panel display (`:DISPlay` subsystem)
#[derive(Debug, Clone)]
pub struct Display {
    transport: TransportHandle,
}

impl Display {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    /// Turning the display off speeds up remote measurements
    pub fn set_enabled(&self, enabled: bool) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":DISP:ENAB {}", Protocol::on_off(enabled)))
    }

    pub fn enabled(&self) -> Result<bool, ScpiError> {
        self.transport.query_with(":DISP:ENAB?", Protocol::bool_reply)
    }

    pub fn set_page(&self, page: DisplayPage) -> Result<(), ScpiError> {
        self.transport.send(&format!(":DISP:PAGE {}", page.token()))
    }

    pub fn page(&self) -> Result<DisplayPage, ScpiError> {
        self.transport.query_with(":DISP:PAGE?", Protocol::token_reply)
    }

    /// Show `text` on the comment line, at most [`MAX_LINE_LENGTH`] characters
    pub fn set_line(&self, text: &str) -> Result<(), ScpiError> {
        let length = text.chars().count();
        if length > MAX_LINE_LENGTH {
            return Err(ScpiError::InvalidParameter(format!(
                "display line holds {MAX_LINE_LENGTH} characters, got {length}"
            )));
        }
        self.transport
            .send(&format!(":DISP:LINE {}", Protocol::quoted(text)))
    }

    pub fn line(&self) -> Result<String, ScpiError> {
        let reply = self.transport.query(":DISP:LINE?")?;
        Ok(Protocol::unquoted(&reply))
    }

    /// Clear the error or warning message
    pub fn clear_message(&self) -> Result<(), ScpiError> {
        self.transport.send(":DISP:CCL")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_display_commands() {
        let mock = MockTransport::new();
        let display = Display::new(TransportHandle::new(mock.clone()));
        display.set_enabled(false).unwrap();
        display.set_page(DisplayPage::MeasurementSetup).unwrap();
        display.set_line("DUT 42").unwrap();
        display.clear_message().unwrap();
        assert_eq!(
            mock.sent(),
            vec![
                ":DISP:ENAB OFF",
                ":DISP:PAGE MSET",
                ":DISP:LINE \"DUT 42\"",
                ":DISP:CCL"
            ]
        );
    }

    #[test]
    fn test_line_too_long_is_rejected() {
        let mock = MockTransport::new();
        let display = Display::new(TransportHandle::new(mock.clone()));
        let text = "x".repeat(MAX_LINE_LENGTH + 1);
        assert!(matches!(
            display.set_line(&text),
            Err(ScpiError::InvalidParameter(_))
        ));
        assert!(display.set_line(&"x".repeat(MAX_LINE_LENGTH)).is_ok());
        assert_eq!(mock.sent().len(), 1);
    }

    #[test]
    fn test_display_queries() {
        let mock = MockTransport::new()
            .with_reply(":DISP:PAGE?", "MEAS")
            .with_reply(":DISP:LINE?", "\"DUT 42\"")
            .with_reply(":DISP:ENAB?", "1");
        let display = Display::new(TransportHandle::new(mock));
        assert_eq!(display.page().unwrap(), DisplayPage::Measurement);
        assert_eq!(display.line().unwrap(), "DUT 42");
        assert!(display.enabled().unwrap());
    }
}
