use serde::{Deserialize, Serialize};

use crate::error::ScpiError;
use crate::instruments::check_non_negative;
use crate::protocol::{Protocol, Token};
use crate::transport::TransportHandle;
use crate::types::OutputChannel;

/// Regulation state reported for an enabled output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputMode {
    ConstantVoltage,
    ConstantCurrent,
    Unregulated,
}

impl Token for OutputMode {
    const FIELD: &'static str = "output mode";

    fn token(self) -> &'static str {
        match self {
            OutputMode::ConstantVoltage => "CV",
            OutputMode::ConstantCurrent => "CC",
            OutputMode::Unregulated => "UR",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "CV" => Some(OutputMode::ConstantVoltage),
            "CC" => Some(OutputMode::ConstantCurrent),
            "UR" => Some(OutputMode::Unregulated),
            _ => None,
        }
    }
}

/// Output protection circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protection {
    Overvoltage,
    Overcurrent,
}

impl Protection {
    fn mnemonic(self) -> &'static str {
        match self {
            Protection::Overvoltage => "OVP",
            Protection::Overcurrent => "OCP",
        }
    }
}

/// Output switches and protection (`:OUTPut` subsystem)
#[derive(Debug, Clone)]
pub struct Output {
    transport: TransportHandle,
}

impl Output {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    pub fn set_enabled(&self, channel: OutputChannel, enabled: bool) -> Result<(), ScpiError> {
        self.transport.send(&format!(
            ":OUTP:STAT {},{}",
            channel.token(),
            Protocol::on_off(enabled)
        ))
    }

    pub fn enabled(&self, channel: OutputChannel) -> Result<bool, ScpiError> {
        self.transport
            .query_with(&format!(":OUTP:STAT? {}", channel.token()), Protocol::bool_reply)
    }

    pub fn mode(&self, channel: OutputChannel) -> Result<OutputMode, ScpiError> {
        self.transport
            .query_with(&format!(":OUTP:MODE? {}", channel.token()), Protocol::token_reply)
    }

    /// Trip level in volts (OVP) or amperes (OCP)
    pub fn set_protection_level(
        &self,
        channel: OutputChannel,
        protection: Protection,
        level: f64,
    ) -> Result<(), ScpiError> {
        check_non_negative("protection level", level)?;
        self.transport.send(&format!(
            ":OUTP:{}:VAL {},{}",
            protection.mnemonic(),
            channel.token(),
            Protocol::fixed(level, 3)
        ))
    }

    pub fn protection_level(
        &self,
        channel: OutputChannel,
        protection: Protection,
    ) -> Result<f64, ScpiError> {
        self.transport.query_with(
            &format!(":OUTP:{}:VAL? {}", protection.mnemonic(), channel.token()),
            Protocol::float_reply,
        )
    }

    pub fn set_protection_enabled(
        &self,
        channel: OutputChannel,
        protection: Protection,
        enabled: bool,
    ) -> Result<(), ScpiError> {
        self.transport.send(&format!(
            ":OUTP:{}:STAT {},{}",
            protection.mnemonic(),
            channel.token(),
            Protocol::on_off(enabled)
        ))
    }

    pub fn protection_enabled(
        &self,
        channel: OutputChannel,
        protection: Protection,
    ) -> Result<bool, ScpiError> {
        self.transport.query_with(
            &format!(":OUTP:{}:STAT? {}", protection.mnemonic(), channel.token()),
            Protocol::bool_reply,
        )
    }

    /// Whether the protection has tripped and switched the output off
    pub fn protection_tripped(
        &self,
        channel: OutputChannel,
        protection: Protection,
    ) -> Result<bool, ScpiError> {
        self.transport.query_with(
            &format!(":OUTP:{}:QUES? {}", protection.mnemonic(), channel.token()),
            Protocol::bool_reply,
        )
    }

    /// Clear a tripped protection. The output stays off.
    pub fn clear_protection(
        &self,
        channel: OutputChannel,
        protection: Protection,
    ) -> Result<(), ScpiError> {
        self.transport.send(&format!(
            ":OUTP:{}:CLEAR {}",
            protection.mnemonic(),
            channel.token()
        ))
    }
}
