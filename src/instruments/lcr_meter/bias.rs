use crate::error::ScpiError;
use crate::instruments::check_range;
use crate::protocol::Protocol;
use crate::transport::TransportHandle;

/// Largest DC bias voltage magnitude (option 001)
pub const MAX_BIAS_VOLTAGE: f64 = 40.0;
/// Largest DC bias current magnitude (option 001)
pub const MAX_BIAS_CURRENT: f64 = 0.1;

/// DC bias source of the E4980A (`:BIAS` subsystem)
#[derive(Debug, Clone)]
pub struct Bias {
    transport: TransportHandle,
}

impl Bias {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    /// Switch the DC bias output on or off.
    ///
    /// Sends `:BIAS:STAT ON|OFF`. The level must be configured before enabling.
    ///
    /// # Examples
    /// ```
    /// use rusty_scpi::instruments::E4980a;
    /// use rusty_scpi::transport::{MockTransport, TransportHandle};
    ///
    /// let mock = MockTransport::new();
    /// let lcr = E4980a::new(TransportHandle::new(mock.clone()));
    ///
    /// lcr.bias.set_voltage(1.5)?;
    /// lcr.bias.set_enabled(true)?;
    /// assert_eq!(mock.sent(), vec![":BIAS:VOLT:LEV +1.500", ":BIAS:STAT ON"]);
    /// # Ok::<(), rusty_scpi::ScpiError>(())
    /// ```
    pub fn set_enabled(&self, enabled: bool) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":BIAS:STAT {}", Protocol::on_off(enabled)))
    }

    /// Whether the DC bias output is on
    pub fn enabled(&self) -> Result<bool, ScpiError> {
        self.transport.query_with(":BIAS:STAT?", Protocol::bool_reply)
    }

    /// Set the DC bias voltage level.
    ///
    /// # Arguments
    /// * `volts` - Bias voltage, signed, at most [`MAX_BIAS_VOLTAGE`] in magnitude
    ///
    /// # Errors
    /// Returns `ScpiError::InvalidParameter` for a level the instrument cannot source,
    /// nothing is sent in that case.
    pub fn set_voltage(&self, volts: f64) -> Result<(), ScpiError> {
        check_range("bias voltage", volts, -MAX_BIAS_VOLTAGE, MAX_BIAS_VOLTAGE)?;
        self.transport.send(&format!(
            ":BIAS:VOLT:LEV {}",
            Protocol::signed_fixed(volts, 3)
        ))
    }

    pub fn voltage(&self) -> Result<f64, ScpiError> {
        self.transport
            .query_with(":BIAS:VOLT:LEV?", Protocol::float_reply)
    }

    /// Set the DC bias current level in amperes, at most [`MAX_BIAS_CURRENT`] in magnitude.
    pub fn set_current(&self, amps: f64) -> Result<(), ScpiError> {
        check_range("bias current", amps, -MAX_BIAS_CURRENT, MAX_BIAS_CURRENT)?;
        self.transport.send(&format!(
            ":BIAS:CURR:LEV {}",
            Protocol::signed_fixed(amps, 6)
        ))
    }

    pub fn current(&self) -> Result<f64, ScpiError> {
        self.transport
            .query_with(":BIAS:CURR:LEV?", Protocol::float_reply)
    }
}
