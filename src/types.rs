use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::protocol::{Ordinal, Protocol, Token};

/// Instrument classes with a facade in this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentType {
    LcrMeter,
    Load,
    Oscilloscope,
    PowerSupply,
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstrumentType::LcrMeter => "LCR meter",
            InstrumentType::Load => "electronic load",
            InstrumentType::Oscilloscope => "oscilloscope",
            InstrumentType::PowerSupply => "power supply",
        };
        write!(f, "{name}")
    }
}

// ==================== Common ====================

/// `*IDN?` reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    pub manufacturer: String,
    pub model: String,
    pub serial: String,
    pub firmware: String,
}

impl FromStr for Identification {
    type Err = ParseError;

    fn from_str(reply: &str) -> Result<Self, Self::Err> {
        let fields = Protocol::split_fields(reply, 4)?;
        Ok(Self {
            manufacturer: fields.raw(0)?.to_string(),
            model: fields.raw(1)?.to_string(),
            serial: fields.raw(2)?.to_string(),
            firmware: fields.raw(3)?.to_string(),
        })
    }
}

impl fmt::Display for Identification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (serial {}, firmware {})",
            self.manufacturer, self.model, self.serial, self.firmware
        )
    }
}

/// Entry of the instrument error queue (`:SYSTem:ERRor?`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemError {
    pub code: i32,
    pub message: String,
}

impl SystemError {
    /// Code 0 means the queue is empty
    pub fn is_no_error(&self) -> bool {
        self.code == 0
    }
}

impl FromStr for SystemError {
    type Err = ParseError;

    fn from_str(reply: &str) -> Result<Self, Self::Err> {
        // The message may itself contain commas
        let payload = Protocol::payload(reply)?;
        let Some((code, message)) = payload.split_once(',') else {
            return Err(ParseError::FieldCountMismatch {
                expected: 2,
                actual: 1,
            });
        };
        let code = Protocol::parse_int(code, 0)?;
        let code = i32::try_from(code).map_err(|_| ParseError::FieldParse {
            index: 0,
            raw: code.to_string(),
            expected: "integer in range",
        })?;
        Ok(Self {
            code,
            message: Protocol::unquoted(message),
        })
    }
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error {}: {}", self.code, self.message)
    }
}

// ==================== Power supply ====================

/// Output channel of a multi-channel power supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputChannel {
    Ch1,
    Ch2,
    Ch3,
}

impl Token for OutputChannel {
    const FIELD: &'static str = "output channel";

    fn token(self) -> &'static str {
        match self {
            OutputChannel::Ch1 => "CH1",
            OutputChannel::Ch2 => "CH2",
            OutputChannel::Ch3 => "CH3",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "CH1" => Some(OutputChannel::Ch1),
            "CH2" => Some(OutputChannel::Ch2),
            "CH3" => Some(OutputChannel::Ch3),
            _ => None,
        }
    }
}

impl fmt::Display for OutputChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Voltage and current ceiling of one output, `CH1:30V/3A` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelRatings {
    pub channel: OutputChannel,
    pub max_voltage: f64,
    pub max_current: f64,
}

impl ChannelRatings {
    pub(crate) fn parse_field(raw: &str, index: usize) -> Result<Self, ParseError> {
        let malformed = || ParseError::FieldParse {
            index,
            raw: raw.to_string(),
            expected: "channel rating",
        };

        let (channel, rating) = raw.split_once(':').ok_or_else(malformed)?;
        let (voltage, current) = rating.split_once('/').ok_or_else(malformed)?;
        let voltage = voltage.trim().strip_suffix('V').ok_or_else(malformed)?;
        let current = current.trim().strip_suffix('A').ok_or_else(malformed)?;

        Ok(Self {
            channel: Protocol::parse_token(channel)?,
            max_voltage: Protocol::parse_float(voltage, index)?,
            max_current: Protocol::parse_float(current, index)?,
        })
    }
}

impl FromStr for ChannelRatings {
    type Err = ParseError;

    fn from_str(reply: &str) -> Result<Self, Self::Err> {
        let fields = Protocol::split_fields(reply, 1)?;
        Self::parse_field(fields.raw(0)?, 0)
    }
}

impl fmt::Display for ChannelRatings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}V/{}A",
            self.channel, self.max_voltage, self.max_current
        )
    }
}

/// Programmed setpoints of one output together with its ratings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelSettings {
    pub channel: OutputChannel,
    pub voltage: f64,
    pub current: f64,
    pub max_voltage: f64,
    pub max_current: f64,
}

impl ChannelSettings {
    pub fn new(
        channel: OutputChannel,
        voltage: f64,
        current: f64,
        max_voltage: f64,
        max_current: f64,
    ) -> Self {
        Self {
            channel,
            voltage,
            current,
            max_voltage,
            max_current,
        }
    }

    pub fn ratings(&self) -> ChannelRatings {
        ChannelRatings {
            channel: self.channel,
            max_voltage: self.max_voltage,
            max_current: self.max_current,
        }
    }
}

impl FromStr for ChannelSettings {
    type Err = ParseError;

    /// Parses `CH1:30V/3A,5.000,1.000`
    fn from_str(reply: &str) -> Result<Self, Self::Err> {
        let fields = Protocol::split_fields(reply, 3)?;
        let ratings = ChannelRatings::parse_field(fields.raw(0)?, 0)?;
        Ok(Self {
            channel: ratings.channel,
            voltage: fields.float(1)?,
            current: fields.float(2)?,
            max_voltage: ratings.max_voltage,
            max_current: ratings.max_current,
        })
    }
}

impl fmt::Display for ChannelSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}V [{}V MAX] {}A [{}A MAX]",
            self.channel, self.voltage, self.max_voltage, self.current, self.max_current
        )
    }
}

/// Measured voltage, current and power at an output or load input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputReading {
    pub voltage: f64,
    pub current: f64,
    pub power: f64,
}

impl FromStr for OutputReading {
    type Err = ParseError;

    fn from_str(reply: &str) -> Result<Self, Self::Err> {
        let fields = Protocol::split_fields(reply, 3)?;
        Ok(Self {
            voltage: fields.float(0)?,
            current: fields.float(1)?,
            power: fields.float(2)?,
        })
    }
}

impl fmt::Display for OutputReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}V {}A {}W", self.voltage, self.current, self.power)
    }
}

// ==================== LCR meter ====================

/// Status code attached to every impedance measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasurementStatus {
    NoData,
    Normal,
    Overload,
    SignalSourceOverload,
    AlcUnregulated,
}

impl Ordinal for MeasurementStatus {
    const FIELD: &'static str = "measurement status";

    fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            -1 => Some(MeasurementStatus::NoData),
            0 => Some(MeasurementStatus::Normal),
            1 => Some(MeasurementStatus::Overload),
            3 => Some(MeasurementStatus::SignalSourceOverload),
            4 => Some(MeasurementStatus::AlcUnregulated),
            _ => None,
        }
    }

    fn ordinal(self) -> i64 {
        match self {
            MeasurementStatus::NoData => -1,
            MeasurementStatus::Normal => 0,
            MeasurementStatus::Overload => 1,
            MeasurementStatus::SignalSourceOverload => 3,
            MeasurementStatus::AlcUnregulated => 4,
        }
    }
}

/// Primary and secondary parameter of the selected impedance function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpedanceReading {
    pub primary: f64,
    pub secondary: f64,
    pub status: MeasurementStatus,
}

impl ImpedanceReading {
    pub fn is_valid(&self) -> bool {
        self.status == MeasurementStatus::Normal
    }
}

impl FromStr for ImpedanceReading {
    type Err = ParseError;

    fn from_str(reply: &str) -> Result<Self, Self::Err> {
        let fields = Protocol::split_fields(reply, 3)?;
        Ok(Self {
            primary: fields.float(0)?,
            secondary: fields.float(1)?,
            status: fields.ordinal(2)?,
        })
    }
}

impl fmt::Display for ImpedanceReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "primary {:e}, secondary {:e} ({:?})",
            self.primary, self.secondary, self.status
        )
    }
}

/// Integration time of one impedance measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApertureTime {
    Short,
    Medium,
    Long,
}

impl Token for ApertureTime {
    const FIELD: &'static str = "aperture time";

    fn token(self) -> &'static str {
        match self {
            ApertureTime::Short => "SHOR",
            ApertureTime::Medium => "MED",
            ApertureTime::Long => "LONG",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "SHOR" | "SHORT" => Some(ApertureTime::Short),
            "MED" | "MEDIUM" => Some(ApertureTime::Medium),
            "LONG" => Some(ApertureTime::Long),
            _ => None,
        }
    }
}

/// `:APERture?` reply, `MED,1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementAperture {
    pub time: ApertureTime,
    pub averaging: u16,
}

impl FromStr for MeasurementAperture {
    type Err = ParseError;

    fn from_str(reply: &str) -> Result<Self, Self::Err> {
        let fields = Protocol::split_fields(reply, 2)?;
        Ok(Self {
            time: fields.token(0)?,
            averaging: fields.int(1)?,
        })
    }
}

impl fmt::Display for MeasurementAperture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} aperture, averaging x{}", self.time, self.averaging)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_settings_render() {
        let settings = ChannelSettings::new(OutputChannel::Ch1, 5.0, 1.0, 30.0, 3.0);
        assert_eq!(settings.to_string(), "CH1: 5V [30V MAX] 1A [3A MAX]");
    }

    #[test]
    fn test_rendering_is_not_a_wire_format() {
        // Display output is for diagnostics only and does not parse back
        let settings = ChannelSettings::new(OutputChannel::Ch1, 5.0, 1.0, 30.0, 3.0);
        assert!(settings.to_string().parse::<ChannelSettings>().is_err());

        let reading = OutputReading {
            voltage: 5.0,
            current: 1.0,
            power: 5.0,
        };
        assert_eq!(reading.to_string(), "5V 1A 5W");
        assert!(reading.to_string().parse::<OutputReading>().is_err());
    }

    #[test]
    fn test_channel_settings_from_reply() {
        let settings: ChannelSettings = "CH2:30V/3A,12.000,0.500".parse().unwrap();
        assert_eq!(
            settings,
            ChannelSettings::new(OutputChannel::Ch2, 12.0, 0.5, 30.0, 3.0)
        );
        assert_eq!(
            settings.ratings(),
            ChannelRatings {
                channel: OutputChannel::Ch2,
                max_voltage: 30.0,
                max_current: 3.0
            }
        );
    }

    #[test]
    fn test_channel_ratings_malformed() {
        assert_eq!(
            "CH1-30V/3A".parse::<ChannelRatings>(),
            Err(ParseError::FieldParse {
                index: 0,
                raw: "CH1-30V/3A".to_string(),
                expected: "channel rating"
            })
        );
        assert!(matches!(
            "CH9:30V/3A".parse::<ChannelRatings>(),
            Err(ParseError::UnknownEnumValue { .. })
        ));
        assert_eq!(
            "CH3:5V/3A".parse::<ChannelRatings>().unwrap().to_string(),
            "CH3: 5V/3A"
        );
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let reply = "4.9987,1.0002,4.9997";
        let first: OutputReading = reply.parse().unwrap();
        let second: OutputReading = reply.parse().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.voltage, 4.9987);
    }

    #[test]
    fn test_identification() {
        let idn: Identification = "RIGOL TECHNOLOGIES,DP832,DP8C0000001,00.01.14"
            .parse()
            .unwrap();
        assert_eq!(idn.manufacturer, "RIGOL TECHNOLOGIES");
        assert_eq!(idn.model, "DP832");
        assert_eq!(idn.firmware, "00.01.14");
        assert_eq!(
            "Keysight,E4980A,MY123".parse::<Identification>(),
            Err(ParseError::FieldCountMismatch {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_system_error_keeps_commas_in_message() {
        let err: SystemError = "-222,\"Data out of range, clipped\"".parse().unwrap();
        assert_eq!(err.code, -222);
        assert_eq!(err.message, "Data out of range, clipped");
        assert!(!err.is_no_error());

        let none: SystemError = "0,\"No error\"".parse().unwrap();
        assert!(none.is_no_error());

        assert_eq!(
            "-113".parse::<SystemError>(),
            Err(ParseError::FieldCountMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_impedance_reading() {
        let reading: ImpedanceReading = "+1.00000E-09,+2.00000E-03,+0".parse().unwrap();
        assert_eq!(reading.primary, 1e-9);
        assert_eq!(reading.secondary, 2e-3);
        assert!(reading.is_valid());

        let overload: ImpedanceReading = "+9.9E+37,+9.9E+37,+1".parse().unwrap();
        assert_eq!(overload.status, MeasurementStatus::Overload);

        assert_eq!(
            "1.0,2.0,2".parse::<ImpedanceReading>(),
            Err(ParseError::UnknownEnumValue {
                field: "measurement status",
                raw: "2".to_string()
            })
        );
    }

    #[test]
    fn test_measurement_aperture() {
        let aperture: MeasurementAperture = "MED,4".parse().unwrap();
        assert_eq!(aperture.time, ApertureTime::Medium);
        assert_eq!(aperture.averaging, 4);
        assert_eq!(ApertureTime::Short.token(), "SHOR");
    }
}
