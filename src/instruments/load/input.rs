use crate::error::ScpiError;
use crate::protocol::Protocol;
use crate::transport::TransportHandle;

/// Load input switch
#[derive(Debug, Clone)]
pub struct Input {
    transport: TransportHandle,
}

impl Input {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":SOUR:INP:STAT {}", Protocol::on_off(enabled)))
    }

    pub fn enabled(&self) -> Result<bool, ScpiError> {
        self.transport
            .query_with(":SOUR:INP:STAT?", Protocol::bool_reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_input_state() {
        let mock = MockTransport::new().with_reply(":SOUR:INP:STAT?", "1");
        let input = Input::new(TransportHandle::new(mock.clone()));
        input.set_enabled(true).unwrap();
        assert!(input.enabled().unwrap());
        assert_eq!(mock.sent(), vec![":SOUR:INP:STAT ON", ":SOUR:INP:STAT?"]);
    }
}
