use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScpiError;
use crate::protocol::{Protocol, Token};
use crate::transport::TransportHandle;

/// Probe attenuation ratios accepted by the instrument
pub const PROBE_RATIOS: [f64; 16] = [
    0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0,
    1000.0,
];

/// Analog input channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeChannel {
    Ch1,
    Ch2,
    Ch3,
    Ch4,
}

impl ScopeChannel {
    pub const ALL: [ScopeChannel; 4] = [
        ScopeChannel::Ch1,
        ScopeChannel::Ch2,
        ScopeChannel::Ch3,
        ScopeChannel::Ch4,
    ];

    pub fn number(self) -> u8 {
        match self {
            ScopeChannel::Ch1 => 1,
            ScopeChannel::Ch2 => 2,
            ScopeChannel::Ch3 => 3,
            ScopeChannel::Ch4 => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|ch| ch.number() == number)
    }
}

impl Token for ScopeChannel {
    const FIELD: &'static str = "scope channel";

    fn token(self) -> &'static str {
        match self {
            ScopeChannel::Ch1 => "CHAN1",
            ScopeChannel::Ch2 => "CHAN2",
            ScopeChannel::Ch3 => "CHAN3",
            ScopeChannel::Ch4 => "CHAN4",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        let number = token
            .strip_prefix("CHANNEL")
            .or_else(|| token.strip_prefix("CHAN"))?;
        number.parse().ok().and_then(Self::from_number)
    }
}

impl fmt::Display for ScopeChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CH{}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Coupling {
    Ac,
    Dc,
    Ground,
}

impl Token for Coupling {
    const FIELD: &'static str = "coupling";

    fn token(self) -> &'static str {
        match self {
            Coupling::Ac => "AC",
            Coupling::Dc => "DC",
            Coupling::Ground => "GND",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "AC" => Some(Coupling::Ac),
            "DC" => Some(Coupling::Dc),
            "GND" => Some(Coupling::Ground),
            _ => None,
        }
    }
}

/// Vertical settings of the analog channels (`:CHANnel<n>` subsystem)
#[derive(Debug, Clone)]
pub struct Channel {
    transport: TransportHandle,
}

impl Channel {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    pub fn set_display(&self, channel: ScopeChannel, shown: bool) -> Result<(), ScpiError> {
        self.send(channel, "DISP", Protocol::on_off(shown))
    }

    pub fn display(&self, channel: ScopeChannel) -> Result<bool, ScpiError> {
        self.transport
            .query_with(&self.header(channel, "DISP?"), Protocol::bool_reply)
    }

    /// Vertical scale in V/div
    pub fn set_scale(&self, channel: ScopeChannel, volts_per_div: f64) -> Result<(), ScpiError> {
        if !(volts_per_div.is_finite() && volts_per_div > 0.0) {
            return Err(ScpiError::InvalidParameter(format!(
                "vertical scale must be positive, got {volts_per_div}"
            )));
        }
        self.send(channel, "SCAL", &volts_per_div.to_string())
    }

    pub fn scale(&self, channel: ScopeChannel) -> Result<f64, ScpiError> {
        self.float(channel, "SCAL?")
    }

    pub fn set_offset(&self, channel: ScopeChannel, volts: f64) -> Result<(), ScpiError> {
        if !volts.is_finite() {
            return Err(ScpiError::InvalidParameter(format!(
                "vertical offset must be finite, got {volts}"
            )));
        }
        self.send(channel, "OFFS", &volts.to_string())
    }

    pub fn offset(&self, channel: ScopeChannel) -> Result<f64, ScpiError> {
        self.float(channel, "OFFS?")
    }

    pub fn set_coupling(&self, channel: ScopeChannel, coupling: Coupling) -> Result<(), ScpiError> {
        self.send(channel, "COUP", coupling.token())
    }

    pub fn coupling(&self, channel: ScopeChannel) -> Result<Coupling, ScpiError> {
        self.transport
            .query_with(&self.header(channel, "COUP?"), Protocol::token_reply)
    }

    /// Probe attenuation, one of [`PROBE_RATIOS`]
    pub fn set_probe(&self, channel: ScopeChannel, ratio: f64) -> Result<(), ScpiError> {
        if !PROBE_RATIOS.contains(&ratio) {
            return Err(ScpiError::InvalidParameter(format!(
                "unsupported probe ratio {ratio}"
            )));
        }
        self.send(channel, "PROB", &ratio.to_string())
    }

    pub fn probe(&self, channel: ScopeChannel) -> Result<f64, ScpiError> {
        self.float(channel, "PROB?")
    }

    fn header(&self, channel: ScopeChannel, command: &str) -> String {
        format!(":{}:{command}", channel.token())
    }

    fn send(&self, channel: ScopeChannel, command: &str, value: &str) -> Result<(), ScpiError> {
        self.transport
            .send(&format!("{} {value}", self.header(channel, command)))
    }

    fn float(&self, channel: ScopeChannel, query: &str) -> Result<f64, ScpiError> {
        self.transport
            .query_with(&self.header(channel, query), Protocol::float_reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_channel_tokens() {
        assert_eq!(ScopeChannel::Ch3.token(), "CHAN3");
        assert_eq!(ScopeChannel::from_token("CHAN2"), Some(ScopeChannel::Ch2));
        assert_eq!(ScopeChannel::from_token("CHANNEL4"), Some(ScopeChannel::Ch4));
        assert_eq!(ScopeChannel::from_token("CHAN5"), None);
        assert_eq!(ScopeChannel::from_token("MATH"), None);
    }

    #[test]
    fn test_channel_commands() {
        let mock = MockTransport::new();
        let channel = Channel::new(TransportHandle::new(mock.clone()));
        channel.set_display(ScopeChannel::Ch2, true).unwrap();
        channel.set_scale(ScopeChannel::Ch2, 0.5).unwrap();
        channel.set_offset(ScopeChannel::Ch2, -1.25).unwrap();
        channel.set_coupling(ScopeChannel::Ch2, Coupling::Ac).unwrap();
        channel.set_probe(ScopeChannel::Ch2, 10.0).unwrap();
        assert_eq!(
            mock.sent(),
            vec![
                ":CHAN2:DISP ON",
                ":CHAN2:SCAL 0.5",
                ":CHAN2:OFFS -1.25",
                ":CHAN2:COUP AC",
                ":CHAN2:PROB 10"
            ]
        );
    }

    #[test]
    fn test_invalid_settings_send_nothing() {
        let mock = MockTransport::new();
        let channel = Channel::new(TransportHandle::new(mock.clone()));
        assert!(channel.set_probe(ScopeChannel::Ch1, 3.0).is_err());
        assert!(channel.set_scale(ScopeChannel::Ch1, 0.0).is_err());
        assert!(channel.set_offset(ScopeChannel::Ch1, f64::NAN).is_err());
        assert!(mock.sent().is_empty());
    }

    #[test]
    fn test_channel_queries() {
        let mock = MockTransport::new()
            .with_reply(":CHAN1:SCAL?", "1.000000e+00")
            .with_reply(":CHAN1:COUP?", "DC")
            .with_reply(":CHAN1:DISP?", "0")
            .with_reply(":CHAN1:PROB?", "1.000000e+01");
        let channel = Channel::new(TransportHandle::new(mock));
        assert_eq!(channel.scale(ScopeChannel::Ch1).unwrap(), 1.0);
        assert_eq!(channel.coupling(ScopeChannel::Ch1).unwrap(), Coupling::Dc);
        assert!(!channel.display(ScopeChannel::Ch1).unwrap());
        assert_eq!(channel.probe(ScopeChannel::Ch1).unwrap(), 10.0);
    }
}
