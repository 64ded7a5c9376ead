use log::warn;

use crate::error::ScpiError;
use crate::protocol::Protocol;
use crate::status::{StandardEventStatus, StatusByte};
use crate::transport::TransportHandle;
use crate::types::{Identification, SystemError};

/// IEEE 488.2 common commands and the SCPI error queue.
///
/// Every facade carries one of these as its `common` field.
#[derive(Debug, Clone)]
pub struct Common {
    transport: TransportHandle,
}

impl Common {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    /// Manufacturer, model, serial number and firmware revision (`*IDN?`)
    pub fn identify(&self) -> Result<Identification, ScpiError> {
        self.transport.query_as("*IDN?")
    }

    /// Restore the power-on defaults (`*RST`)
    pub fn reset(&self) -> Result<(), ScpiError> {
        self.transport.send("*RST")
    }

    /// Clear event registers and the error queue (`*CLS`)
    pub fn clear_status(&self) -> Result<(), ScpiError> {
        self.transport.send("*CLS")
    }

    /// Block until pending operations finished (`*OPC?`)
    pub fn operation_complete(&self) -> Result<bool, ScpiError> {
        self.transport.query_with("*OPC?", Protocol::bool_reply)
    }

    pub fn wait(&self) -> Result<(), ScpiError> {
        self.transport.send("*WAI")
    }

    /// Run the internal self test; 0 means passed
    pub fn self_test(&self) -> Result<i32, ScpiError> {
        self.transport.query_with("*TST?", Protocol::int_reply)
    }

    /// Read and clear the standard event status register (`*ESR?`)
    pub fn event_status(&self) -> Result<StandardEventStatus, ScpiError> {
        self.transport.query_as("*ESR?")
    }

    pub fn set_event_status_enable(&self, mask: StandardEventStatus) -> Result<(), ScpiError> {
        self.transport.send(&format!("*ESE {}", mask.bits()))
    }

    pub fn event_status_enable(&self) -> Result<StandardEventStatus, ScpiError> {
        self.transport.query_as("*ESE?")
    }

    pub fn status_byte(&self) -> Result<StatusByte, ScpiError> {
        self.transport.query_as("*STB?")
    }

    pub fn set_service_request_enable(&self, mask: StatusByte) -> Result<(), ScpiError> {
        self.transport.send(&format!("*SRE {}", mask.bits()))
    }

    pub fn service_request_enable(&self) -> Result<StatusByte, ScpiError> {
        self.transport.query_as("*SRE?")
    }

    /// Pop the oldest entry of the error queue. Code 0 means the queue is empty.
    pub fn next_error(&self) -> Result<SystemError, ScpiError> {
        self.transport.query_as(":SYST:ERR?")
    }

    /// Read the error queue until it reports no error, at most `max` entries.
    pub fn drain_errors(&self, max: usize) -> Result<Vec<SystemError>, ScpiError> {
        let mut errors = Vec::new();
        for _ in 0..max {
            let error = self.next_error()?;
            if error.is_no_error() {
                return Ok(errors);
            }
            errors.push(error);
        }
        warn!("Error queue still not empty after {max} reads");
        Ok(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{StandardEventBit, StatusByteBit};
    use crate::transport::MockTransport;

    fn common(mock: &MockTransport) -> Common {
        Common::new(TransportHandle::new(mock.clone()))
    }

    #[test]
    fn test_identify() {
        let mock = MockTransport::new().with_reply(
            "*IDN?",
            "Keysight Technologies,E4980A,MY46101234,A.02.20",
        );
        let idn = common(&mock).identify().unwrap();
        assert_eq!(idn.model, "E4980A");
        assert_eq!(idn.serial, "MY46101234");
    }

    #[test]
    fn test_plain_commands() {
        let mock = MockTransport::new();
        let common = common(&mock);
        common.reset().unwrap();
        common.clear_status().unwrap();
        common.wait().unwrap();
        common
            .set_event_status_enable(StandardEventStatus::from_flags([
                StandardEventBit::ExecutionError,
                StandardEventBit::CommandError,
            ]))
            .unwrap();
        common
            .set_service_request_enable(StatusByte::from_flags([StatusByteBit::EventStatus]))
            .unwrap();
        assert_eq!(mock.sent(), vec!["*RST", "*CLS", "*WAI", "*ESE 48", "*SRE 32"]);
    }

    #[test]
    fn test_status_queries() {
        let mock = MockTransport::new()
            .with_reply("*ESR?", "+33")
            .with_reply("*STB?", "4")
            .with_reply("*TST?", "+0");
        let common = common(&mock);

        let esr = common.event_status().unwrap();
        assert!(esr.contains(StandardEventBit::OperationComplete));
        assert!(esr.contains(StandardEventBit::CommandError));
        assert!(common.status_byte().unwrap().contains(StatusByteBit::ErrorQueue));
        assert_eq!(common.self_test().unwrap(), 0);
    }

    #[test]
    fn test_drain_errors_stops_at_no_error() {
        let mock = MockTransport::new()
            .with_reply(":SYST:ERR?", "-113,\"Undefined header\"")
            .with_reply(":SYST:ERR?", "-222,\"Data out of range\"")
            .with_reply(":SYST:ERR?", "0,\"No error\"");

        let errors = common(&mock).drain_errors(10).unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].code, -113);
        assert_eq!(errors[1].message, "Data out of range");
        assert!(mock.is_exhausted());
    }

    #[test]
    fn test_drain_errors_is_bounded() {
        let mock = MockTransport::new()
            .with_reply(":SYST:ERR?", "-350,\"Queue overflow\"")
            .with_reply(":SYST:ERR?", "-350,\"Queue overflow\"");

        let errors = common(&mock).drain_errors(2).unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(mock.sent().len(), 2);
    }
}
