//! Oscilloscope waveform records.
//!
//! `:WAVeform:PREamble?` describes how the samples of `:WAVeform:DATA?` map to time and
//! voltage. In ASCII format the samples already are volts; BYTE samples need
//! [`WaveformPreamble::byte_to_voltage`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::protocol::{Ordinal, Protocol, Token};

/// Number of fields in a preamble reply
pub const PREAMBLE_FIELDS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveformFormat {
    Byte,
    Word,
    Ascii,
}

impl Ordinal for WaveformFormat {
    const FIELD: &'static str = "waveform format";

    fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            0 => Some(WaveformFormat::Byte),
            1 => Some(WaveformFormat::Word),
            2 => Some(WaveformFormat::Ascii),
            _ => None,
        }
    }

    fn ordinal(self) -> i64 {
        match self {
            WaveformFormat::Byte => 0,
            WaveformFormat::Word => 1,
            WaveformFormat::Ascii => 2,
        }
    }
}

impl Token for WaveformFormat {
    const FIELD: &'static str = "waveform format";

    fn token(self) -> &'static str {
        match self {
            WaveformFormat::Byte => "BYTE",
            WaveformFormat::Word => "WORD",
            WaveformFormat::Ascii => "ASC",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "BYTE" => Some(WaveformFormat::Byte),
            "WORD" => Some(WaveformFormat::Word),
            "ASC" | "ASCII" => Some(WaveformFormat::Ascii),
            _ => None,
        }
    }
}

/// Which record `:WAVeform:DATA?` reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveformMode {
    /// Displayed waveform
    Normal,
    /// Displayed waveform while running, full memory when stopped
    Maximum,
    /// Full acquisition memory, only when stopped
    Raw,
}

impl Ordinal for WaveformMode {
    const FIELD: &'static str = "waveform mode";

    fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            0 => Some(WaveformMode::Normal),
            1 => Some(WaveformMode::Maximum),
            2 => Some(WaveformMode::Raw),
            _ => None,
        }
    }

    fn ordinal(self) -> i64 {
        match self {
            WaveformMode::Normal => 0,
            WaveformMode::Maximum => 1,
            WaveformMode::Raw => 2,
        }
    }
}

impl Token for WaveformMode {
    const FIELD: &'static str = "waveform mode";

    fn token(self) -> &'static str {
        match self {
            WaveformMode::Normal => "NORM",
            WaveformMode::Maximum => "MAX",
            WaveformMode::Raw => "RAW",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "NORM" | "NORMAL" => Some(WaveformMode::Normal),
            "MAX" | "MAXIMUM" => Some(WaveformMode::Maximum),
            "RAW" => Some(WaveformMode::Raw),
            _ => None,
        }
    }
}

/// Scaling information for a waveform record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveformPreamble {
    pub format: WaveformFormat,
    pub mode: WaveformMode,
    pub points: u32,
    pub averages: u32,
    /// Seconds between two samples
    pub x_increment: f64,
    /// Time of the sample at `x_reference`
    pub x_origin: f64,
    pub x_reference: i32,
    /// Volts per ADC code
    pub y_increment: f64,
    pub y_origin: i32,
    pub y_reference: i32,
}

impl WaveformPreamble {
    /// Time of sample `index` relative to the trigger
    pub fn time_at(&self, index: usize) -> f64 {
        (index as f64 - f64::from(self.x_reference)) * self.x_increment + self.x_origin
    }

    /// Voltage of a BYTE format sample
    pub fn byte_to_voltage(&self, raw: u8) -> f64 {
        (f64::from(raw) - f64::from(self.y_origin) - f64::from(self.y_reference))
            * self.y_increment
    }

    /// Pair each sample (in volts) with its time
    pub fn data_points(&self, samples: &[f64]) -> Vec<WaveformDataPoint> {
        samples
            .iter()
            .enumerate()
            .map(|(i, &voltage)| WaveformDataPoint {
                time: self.time_at(i),
                voltage,
            })
            .collect()
    }
}

impl FromStr for WaveformPreamble {
    type Err = ParseError;

    fn from_str(reply: &str) -> Result<Self, Self::Err> {
        let fields = Protocol::split_fields(reply, PREAMBLE_FIELDS)?;
        Ok(Self {
            format: fields.ordinal(0)?,
            mode: fields.ordinal(1)?,
            points: fields.int(2)?,
            averages: fields.int(3)?,
            x_increment: fields.float(4)?,
            x_origin: fields.float(5)?,
            x_reference: fields.int(6)?,
            y_increment: fields.float(7)?,
            y_origin: fields.int(8)?,
            y_reference: fields.int(9)?,
        })
    }
}

impl fmt::Display for WaveformPreamble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}/{:?}, {} points, {} averages, dt {:e} s from {:e} s (ref {}), dv {} V (origin {}, ref {})",
            self.format,
            self.mode,
            self.points,
            self.averages,
            self.x_increment,
            self.x_origin,
            self.x_reference,
            self.y_increment,
            self.y_origin,
            self.y_reference
        )
    }
}

/// One sample of a captured waveform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveformDataPoint {
    /// Seconds relative to the trigger
    pub time: f64,
    /// Volts
    pub voltage: f64,
}

impl fmt::Display for WaveformDataPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:e} s: {} V", self.time, self.voltage)
    }
}

/// Parse an ASCII `:WAVeform:DATA?` reply into volts.
///
/// The block header is optional and a single trailing comma is tolerated.
pub fn parse_ascii_samples(reply: &str) -> Result<Vec<f64>, ParseError> {
    let body = Protocol::strip_block_header(reply)?.trim();
    let body = body.strip_suffix(',').unwrap_or(body);
    if body.is_empty() {
        return Err(ParseError::EmptyReply);
    }

    body.split(',')
        .enumerate()
        .map(|(index, raw)| Protocol::parse_float(raw, index))
        .collect()
}
