use crate::error::ScpiError;
use crate::instruments::check_non_negative;
use crate::protocol::{Protocol, Token};
use crate::transport::TransportHandle;
use crate::types::{ChannelRatings, ChannelSettings, OutputChannel};

/// Output programming (`:APPLy` and `:SOURce<n>`)
#[derive(Debug, Clone)]
pub struct Source {
    transport: TransportHandle,
}

impl Source {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    /// Program voltage and current limit of a channel in one command.
    ///
    /// Sends `:APPL CH<n>,<volts>,<amps>` with three decimals. The output state is
    /// not changed.
    ///
    /// # Arguments
    /// * `channel` - Output to program
    /// * `volts` - Voltage setpoint
    /// * `amps` - Current limit
    ///
    /// # Errors
    /// Returns `ScpiError::InvalidParameter` for negative or non-finite values,
    /// nothing is sent in that case.
    ///
    /// # Examples
    /// ```
    /// use rusty_scpi::instruments::Dp800;
    /// use rusty_scpi::transport::{MockTransport, TransportHandle};
    /// use rusty_scpi::OutputChannel;
    ///
    /// let mock = MockTransport::new();
    /// let psu = Dp800::new(TransportHandle::new(mock.clone()));
    ///
    /// psu.source.apply(OutputChannel::Ch2, 3.3, 0.25)?;
    /// assert_eq!(mock.last_sent().as_deref(), Some(":APPL CH2,3.300,0.250"));
    /// # Ok::<(), rusty_scpi::ScpiError>(())
    /// ```
    pub fn apply(&self, channel: OutputChannel, volts: f64, amps: f64) -> Result<(), ScpiError> {
        check_non_negative("voltage", volts)?;
        check_non_negative("current", amps)?;
        self.transport.send(&format!(
            ":APPL {},{},{}",
            channel.token(),
            Protocol::fixed(volts, 3),
            Protocol::fixed(amps, 3)
        ))
    }

    /// Programmed setpoints together with the channel ratings
    pub fn settings(&self, channel: OutputChannel) -> Result<ChannelSettings, ScpiError> {
        self.transport
            .query_as(&format!(":APPL? {}", channel.token()))
    }

    /// Maximum voltage and current of a channel
    pub fn ratings(&self, channel: OutputChannel) -> Result<ChannelRatings, ScpiError> {
        Ok(self.settings(channel)?.ratings())
    }

    /// Voltage setpoint only, leaves the current limit untouched
    pub fn set_voltage(&self, channel: OutputChannel, volts: f64) -> Result<(), ScpiError> {
        check_non_negative("voltage", volts)?;
        self.transport.send(&format!(
            ":SOUR{}:VOLT {}",
            channel_number(channel),
            Protocol::fixed(volts, 3)
        ))
    }

    /// Current limit only, leaves the voltage setpoint untouched
    pub fn set_current(&self, channel: OutputChannel, amps: f64) -> Result<(), ScpiError> {
        check_non_negative("current", amps)?;
        self.transport.send(&format!(
            ":SOUR{}:CURR {}",
            channel_number(channel),
            Protocol::fixed(amps, 3)
        ))
    }
}

fn channel_number(channel: OutputChannel) -> u8 {
    match channel {
        OutputChannel::Ch1 => 1,
        OutputChannel::Ch2 => 2,
        OutputChannel::Ch3 => 3,
    }
}
