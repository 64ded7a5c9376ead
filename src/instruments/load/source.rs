use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ScpiError};
use crate::instruments::check_non_negative;
use crate::protocol::{Protocol, Token};
use crate::transport::TransportHandle;

/// Regulation mode of the load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFunction {
    Current,
    Voltage,
    Resistance,
    Power,
}

impl Token for SourceFunction {
    const FIELD: &'static str = "source function";

    fn token(self) -> &'static str {
        match self {
            SourceFunction::Current => "CURR",
            SourceFunction::Voltage => "VOLT",
            SourceFunction::Resistance => "RES",
            SourceFunction::Power => "POW",
        }
    }

    /// The query answers with the front panel names `CC`, `CV`, `CR` and `CP`
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "CC" | "CURR" | "CURRENT" => Some(SourceFunction::Current),
            "CV" | "VOLT" | "VOLTAGE" => Some(SourceFunction::Voltage),
            "CR" | "RES" | "RESISTANCE" => Some(SourceFunction::Resistance),
            "CP" | "POW" | "POWER" => Some(SourceFunction::Power),
            _ => None,
        }
    }
}

/// How the selected function is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionMode {
    Fixed,
    List,
    Waveform,
    Battery,
}

impl Token for FunctionMode {
    const FIELD: &'static str = "function mode";

    fn token(self) -> &'static str {
        match self {
            FunctionMode::Fixed => "FIX",
            FunctionMode::List => "LIST",
            FunctionMode::Waveform => "WAV",
            FunctionMode::Battery => "BATT",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "FIX" | "FIXED" => Some(FunctionMode::Fixed),
            "LIST" => Some(FunctionMode::List),
            "WAV" | "WAVE" => Some(FunctionMode::Waveform),
            "BATT" | "BATTERY" => Some(FunctionMode::Battery),
            _ => None,
        }
    }
}

/// Current transient behaviour between level A and level B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransientMode {
    Continuous,
    Pulse,
    Toggle,
}

impl Token for TransientMode {
    const FIELD: &'static str = "transient mode";

    fn token(self) -> &'static str {
        match self {
            TransientMode::Continuous => "CONT",
            TransientMode::Pulse => "PULS",
            TransientMode::Toggle => "TOGG",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "CONT" | "CONTINUOUS" => Some(TransientMode::Continuous),
            "PULS" | "PULSE" => Some(TransientMode::Pulse),
            "TOGG" | "TOGGLE" => Some(TransientMode::Toggle),
            _ => None,
        }
    }
}

/// Current and voltage ranges of the DL3021
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dl3000Range {
    Low,
    High,
}

impl Dl3000Range {
    pub fn current_limit(self) -> f64 {
        match self {
            Dl3000Range::Low => 4.0,
            Dl3000Range::High => 40.0,
        }
    }

    pub fn voltage_limit(self) -> f64 {
        match self {
            Dl3000Range::Low => 15.0,
            Dl3000Range::High => 150.0,
        }
    }

    fn from_limit(raw: &str, limit: fn(Dl3000Range) -> f64) -> Result<Self, ParseError> {
        let value = Protocol::float_reply(raw)?;
        [Dl3000Range::Low, Dl3000Range::High]
            .into_iter()
            .find(|range| (limit(*range) - value).abs() < 1e-6)
            .ok_or_else(|| ParseError::UnknownEnumValue {
                field: "load range",
                raw: raw.trim().to_string(),
            })
    }
}

/// Load settings (`:SOURce` subsystem)
#[derive(Debug, Clone)]
pub struct Source {
    transport: TransportHandle,
}

impl Source {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    pub fn set_function(&self, function: SourceFunction) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":SOUR:FUNC {}", function.token()))
    }

    pub fn function(&self) -> Result<SourceFunction, ScpiError> {
        self.transport.query_with(":SOUR:FUNC?", Protocol::token_reply)
    }

    pub fn set_mode(&self, mode: FunctionMode) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":SOUR:FUNC:MODE {}", mode.token()))
    }

    pub fn mode(&self) -> Result<FunctionMode, ScpiError> {
        self.transport
            .query_with(":SOUR:FUNC:MODE?", Protocol::token_reply)
    }

    /// Constant current level in amperes
    pub fn set_current(&self, amps: f64) -> Result<(), ScpiError> {
        self.set_level("CURR", "current", amps)
    }

    pub fn current(&self) -> Result<f64, ScpiError> {
        self.level("CURR")
    }

    /// Constant voltage level in volts
    pub fn set_voltage(&self, volts: f64) -> Result<(), ScpiError> {
        self.set_level("VOLT", "voltage", volts)
    }

    pub fn voltage(&self) -> Result<f64, ScpiError> {
        self.level("VOLT")
    }

    /// Constant resistance level in ohms
    pub fn set_resistance(&self, ohms: f64) -> Result<(), ScpiError> {
        self.set_level("RES", "resistance", ohms)
    }

    pub fn resistance(&self) -> Result<f64, ScpiError> {
        self.level("RES")
    }

    /// Constant power level in watts
    pub fn set_power(&self, watts: f64) -> Result<(), ScpiError> {
        self.set_level("POW", "power", watts)
    }

    pub fn power(&self) -> Result<f64, ScpiError> {
        self.level("POW")
    }

    pub fn set_current_range(&self, range: Dl3000Range) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":SOUR:CURR:RANG {}", range.current_limit()))
    }

    /// Replies with the range limit in amperes
    pub fn current_range(&self) -> Result<Dl3000Range, ScpiError> {
        self.transport.query_with(":SOUR:CURR:RANG?", |reply| {
            Dl3000Range::from_limit(reply, Dl3000Range::current_limit)
        })
    }

    pub fn set_voltage_range(&self, range: Dl3000Range) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":SOUR:VOLT:RANG {}", range.voltage_limit()))
    }

    pub fn voltage_range(&self) -> Result<Dl3000Range, ScpiError> {
        self.transport.query_with(":SOUR:VOLT:RANG?", |reply| {
            Dl3000Range::from_limit(reply, Dl3000Range::voltage_limit)
        })
    }

    pub fn set_transient_mode(&self, mode: TransientMode) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":SOUR:CURR:TRAN:MODE {}", mode.token()))
    }

    pub fn transient_mode(&self) -> Result<TransientMode, ScpiError> {
        self.transport
            .query_with(":SOUR:CURR:TRAN:MODE?", Protocol::token_reply)
    }

    /// Current of transient level A and level B, in that order
    pub fn set_transient_levels(&self, level_a: f64, level_b: f64) -> Result<(), ScpiError> {
        check_non_negative("transient level A", level_a)?;
        check_non_negative("transient level B", level_b)?;
        self.transport.send(&format!(
            ":SOUR:CURR:TRAN:ALEV {}",
            Protocol::fixed(level_a, 4)
        ))?;
        self.transport.send(&format!(
            ":SOUR:CURR:TRAN:BLEV {}",
            Protocol::fixed(level_b, 4)
        ))
    }

    pub fn transient_levels(&self) -> Result<(f64, f64), ScpiError> {
        let level_a = self
            .transport
            .query_with(":SOUR:CURR:TRAN:ALEV?", Protocol::float_reply)?;
        let level_b = self
            .transport
            .query_with(":SOUR:CURR:TRAN:BLEV?", Protocol::float_reply)?;
        Ok((level_a, level_b))
    }

    /// Duration of level A and level B in milliseconds
    pub fn set_transient_widths(&self, width_a_ms: f64, width_b_ms: f64) -> Result<(), ScpiError> {
        check_non_negative("transient width A", width_a_ms)?;
        check_non_negative("transient width B", width_b_ms)?;
        self.transport.send(&format!(
            ":SOUR:CURR:TRAN:AWID {}",
            Protocol::fixed(width_a_ms, 3)
        ))?;
        self.transport.send(&format!(
            ":SOUR:CURR:TRAN:BWID {}",
            Protocol::fixed(width_b_ms, 3)
        ))
    }

    pub fn transient_widths(&self) -> Result<(f64, f64), ScpiError> {
        let width_a = self
            .transport
            .query_with(":SOUR:CURR:TRAN:AWID?", Protocol::float_reply)?;
        let width_b = self
            .transport
            .query_with(":SOUR:CURR:TRAN:BWID?", Protocol::float_reply)?;
        Ok((width_a, width_b))
    }

    /// Current slew rate in A/us
    pub fn set_slew(&self, amps_per_us: f64) -> Result<(), ScpiError> {
        check_non_negative("slew rate", amps_per_us)?;
        self.transport.send(&format!(
            ":SOUR:CURR:SLEW {}",
            Protocol::fixed(amps_per_us, 3)
        ))
    }

    pub fn slew(&self) -> Result<f64, ScpiError> {
        self.transport
            .query_with(":SOUR:CURR:SLEW?", Protocol::float_reply)
    }

    fn set_level(&self, header: &str, name: &str, value: f64) -> Result<(), ScpiError> {
        check_non_negative(name, value)?;
        self.transport.send(&format!(
            ":SOUR:{header}:LEV:IMM {}",
            Protocol::fixed(value, 4)
        ))
    }

    fn level(&self, header: &str) -> Result<f64, ScpiError> {
        self.transport
            .query_with(&format!(":SOUR:{header}:LEV:IMM?"), Protocol::float_reply)
    }
}
