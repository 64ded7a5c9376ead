use crate::error::ScpiError;
use crate::protocol::Protocol;
use crate::transport::TransportHandle;

/// Main horizontal timebase
#[derive(Debug, Clone)]
pub struct Timebase {
    transport: TransportHandle,
}

impl Timebase {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    /// Horizontal scale in s/div
    pub fn set_scale(&self, seconds_per_div: f64) -> Result<(), ScpiError> {
        if !(seconds_per_div.is_finite() && seconds_per_div > 0.0) {
            return Err(ScpiError::InvalidParameter(format!(
                "timebase scale must be positive, got {seconds_per_div}"
            )));
        }
        self.transport
            .send(&format!(":TIM:MAIN:SCAL {seconds_per_div:e}"))
    }

    pub fn scale(&self) -> Result<f64, ScpiError> {
        self.transport
            .query_with(":TIM:MAIN:SCAL?", Protocol::float_reply)
    }

    /// Trigger position relative to the screen centre, in seconds
    pub fn set_offset(&self, seconds: f64) -> Result<(), ScpiError> {
        if !seconds.is_finite() {
            return Err(ScpiError::InvalidParameter(format!(
                "timebase offset must be finite, got {seconds}"
            )));
        }
        self.transport
            .send(&format!(":TIM:MAIN:OFFS {seconds:e}"))
    }

    pub fn offset(&self) -> Result<f64, ScpiError> {
        self.transport
            .query_with(":TIM:MAIN:OFFS?", Protocol::float_reply)
    }
}
