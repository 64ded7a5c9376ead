use serde::{Deserialize, Serialize};

use crate::error::ScpiError;
use crate::protocol::{Ordinal, Protocol};
use crate::transport::TransportHandle;

/// Test cable length used for cable compensation, in metres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CableLength {
    Zero,
    One,
    Two,
    Four,
}

impl Ordinal for CableLength {
    const FIELD: &'static str = "cable length";

    fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            0 => Some(CableLength::Zero),
            1 => Some(CableLength::One),
            2 => Some(CableLength::Two),
            4 => Some(CableLength::Four),
            _ => None,
        }
    }

    fn ordinal(self) -> i64 {
        match self {
            CableLength::Zero => 0,
            CableLength::One => 1,
            CableLength::Two => 2,
            CableLength::Four => 4,
        }
    }
}

/// Fixture compensation (`:CORRection` subsystem)
#[derive(Debug, Clone)]
pub struct Correction {
    transport: TransportHandle,
}

impl Correction {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    pub fn set_cable_length(&self, length: CableLength) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":CORR:LENG {}", length.ordinal()))
    }

    pub fn cable_length(&self) -> Result<CableLength, ScpiError> {
        self.transport
            .query_with(":CORR:LENG?", |reply| Protocol::split_fields(reply, 1)?.ordinal(0))
    }

    /// Start an open correction sweep. Completion is signalled through `*OPC?`.
    pub fn measure_open(&self) -> Result<(), ScpiError> {
        self.transport.send(":CORR:OPEN")
    }

    /// Start a short correction sweep. Completion is signalled through `*OPC?`.
    pub fn measure_short(&self) -> Result<(), ScpiError> {
        self.transport.send(":CORR:SHOR")
    }

    pub fn set_open_enabled(&self, enabled: bool) -> Result<(), ScpiError> {
        self.set_state("OPEN", enabled)
    }

    pub fn open_enabled(&self) -> Result<bool, ScpiError> {
        self.state("OPEN")
    }

    pub fn set_short_enabled(&self, enabled: bool) -> Result<(), ScpiError> {
        self.set_state("SHOR", enabled)
    }

    pub fn short_enabled(&self) -> Result<bool, ScpiError> {
        self.state("SHOR")
    }

    pub fn set_load_enabled(&self, enabled: bool) -> Result<(), ScpiError> {
        self.set_state("LOAD", enabled)
    }

    pub fn load_enabled(&self) -> Result<bool, ScpiError> {
        self.state("LOAD")
    }

    fn set_state(&self, kind: &str, enabled: bool) -> Result<(), ScpiError> {
        self.transport.send(&format!(
            ":CORR:{kind}:STAT {}",
            Protocol::on_off(enabled)
        ))
    }

    fn state(&self, kind: &str) -> Result<bool, ScpiError> {
        self.transport
            .query_with(&format!(":CORR:{kind}:STAT?"), Protocol::bool_reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::transport::MockTransport;

    #[test]
    fn test_correction_commands() {
        let mock = MockTransport::new();
        let correction = Correction::new(TransportHandle::new(mock.clone()));
        correction.set_cable_length(CableLength::Four).unwrap();
        correction.measure_open().unwrap();
        correction.measure_short().unwrap();
        correction.set_open_enabled(true).unwrap();
        correction.set_short_enabled(true).unwrap();
        correction.set_load_enabled(false).unwrap();
        assert_eq!(
            mock.sent(),
            vec![
                ":CORR:LENG 4",
                ":CORR:OPEN",
                ":CORR:SHOR",
                ":CORR:OPEN:STAT ON",
                ":CORR:SHOR:STAT ON",
                ":CORR:LOAD:STAT OFF"
            ]
        );
    }

    #[test]
    fn test_cable_length_query() {
        let mock = MockTransport::new()
            .with_reply(":CORR:LENG?", "+1")
            .with_reply(":CORR:LENG?", "3");
        let correction = Correction::new(TransportHandle::new(mock));
        assert_eq!(correction.cable_length().unwrap(), CableLength::One);
        assert!(matches!(
            correction.cable_length(),
            Err(ScpiError::Parse(ParseError::UnknownEnumValue {
                field: "cable length",
                ..
            }))
        ));
    }

    #[test]
    fn test_state_queries() {
        let mock = MockTransport::new()
            .with_reply(":CORR:OPEN:STAT?", "1")
            .with_reply(":CORR:SHOR:STAT?", "0")
            .with_reply(":CORR:LOAD:STAT?", "0");
        let correction = Correction::new(TransportHandle::new(mock));
        assert!(correction.open_enabled().unwrap());
        assert!(!correction.short_enabled().unwrap());
        assert!(!correction.load_enabled().unwrap());
    }
}
