use crate::error::ScpiError;
use crate::protocol::{Protocol, Token};
use crate::transport::TransportHandle;
use crate::types::{OutputChannel, OutputReading};

/// Output readback
#[derive(Debug, Clone)]
pub struct Measure {
    transport: TransportHandle,
}

impl Measure {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    /// Voltage, current and power in one exchange
    pub fn all(&self, channel: OutputChannel) -> Result<OutputReading, ScpiError> {
        self.transport
            .query_as(&format!(":MEAS:ALL? {}", channel.token()))
    }

    pub fn voltage(&self, channel: OutputChannel) -> Result<f64, ScpiError> {
        self.float("VOLT", channel)
    }

    pub fn current(&self, channel: OutputChannel) -> Result<f64, ScpiError> {
        self.float("CURR", channel)
    }

    pub fn power(&self, channel: OutputChannel) -> Result<f64, ScpiError> {
        self.float("POWE", channel)
    }

    fn float(&self, quantity: &str, channel: OutputChannel) -> Result<f64, ScpiError> {
        self.transport.query_with(
            &format!(":MEAS:{quantity}? {}", channel.token()),
            Protocol::float_reply,
        )
    }
}
