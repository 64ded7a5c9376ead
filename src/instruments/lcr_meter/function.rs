use serde::{Deserialize, Serialize};

use crate::error::ScpiError;
use crate::instruments::check_range;
use crate::protocol::{Protocol, Token};
use crate::transport::TransportHandle;
use crate::types::{ApertureTime, MeasurementAperture};

pub const MIN_FREQUENCY: f64 = 20.0;
pub const MAX_FREQUENCY: f64 = 2.0e6;
/// Largest test signal level (option 001)
pub const MAX_TEST_VOLTAGE: f64 = 20.0;
pub const MAX_AVERAGING: u16 = 256;

/// Primary and secondary parameter pair measured by the LCR meter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpedanceFunction {
    CpD,
    CpQ,
    CpG,
    CpRp,
    CsD,
    CsQ,
    CsRs,
    LpD,
    LpQ,
    LpG,
    LpRp,
    LpRdc,
    LsD,
    LsQ,
    LsRs,
    LsRdc,
    RX,
    ZThetaDeg,
    ZThetaRad,
    GB,
    YThetaDeg,
    YThetaRad,
    VdId,
}

impl ImpedanceFunction {
    /// Names of the primary and secondary parameter, e.g. `("Cp", "D")`
    pub fn parameter_names(self) -> (&'static str, &'static str) {
        match self {
            ImpedanceFunction::CpD => ("Cp", "D"),
            ImpedanceFunction::CpQ => ("Cp", "Q"),
            ImpedanceFunction::CpG => ("Cp", "G"),
            ImpedanceFunction::CpRp => ("Cp", "Rp"),
            ImpedanceFunction::CsD => ("Cs", "D"),
            ImpedanceFunction::CsQ => ("Cs", "Q"),
            ImpedanceFunction::CsRs => ("Cs", "Rs"),
            ImpedanceFunction::LpD => ("Lp", "D"),
            ImpedanceFunction::LpQ => ("Lp", "Q"),
            ImpedanceFunction::LpG => ("Lp", "G"),
            ImpedanceFunction::LpRp => ("Lp", "Rp"),
            ImpedanceFunction::LpRdc => ("Lp", "Rdc"),
            ImpedanceFunction::LsD => ("Ls", "D"),
            ImpedanceFunction::LsQ => ("Ls", "Q"),
            ImpedanceFunction::LsRs => ("Ls", "Rs"),
            ImpedanceFunction::LsRdc => ("Ls", "Rdc"),
            ImpedanceFunction::RX => ("R", "X"),
            ImpedanceFunction::ZThetaDeg => ("Z", "θ(deg)"),
            ImpedanceFunction::ZThetaRad => ("Z", "θ(rad)"),
            ImpedanceFunction::GB => ("G", "B"),
            ImpedanceFunction::YThetaDeg => ("Y", "θ(deg)"),
            ImpedanceFunction::YThetaRad => ("Y", "θ(rad)"),
            ImpedanceFunction::VdId => ("Vdc", "Idc"),
        }
    }
}

impl Token for ImpedanceFunction {
    const FIELD: &'static str = "impedance function";

    fn token(self) -> &'static str {
        match self {
            ImpedanceFunction::CpD => "CPD",
            ImpedanceFunction::CpQ => "CPQ",
            ImpedanceFunction::CpG => "CPG",
            ImpedanceFunction::CpRp => "CPRP",
            ImpedanceFunction::CsD => "CSD",
            ImpedanceFunction::CsQ => "CSQ",
            ImpedanceFunction::CsRs => "CSRS",
            ImpedanceFunction::LpD => "LPD",
            ImpedanceFunction::LpQ => "LPQ",
            ImpedanceFunction::LpG => "LPG",
            ImpedanceFunction::LpRp => "LPRP",
            ImpedanceFunction::LpRdc => "LPRD",
            ImpedanceFunction::LsD => "LSD",
            ImpedanceFunction::LsQ => "LSQ",
            ImpedanceFunction::LsRs => "LSRS",
            ImpedanceFunction::LsRdc => "LSRD",
            ImpedanceFunction::RX => "RX",
            ImpedanceFunction::ZThetaDeg => "ZTD",
            ImpedanceFunction::ZThetaRad => "ZTR",
            ImpedanceFunction::GB => "GB",
            ImpedanceFunction::YThetaDeg => "YTD",
            ImpedanceFunction::YThetaRad => "YTR",
            ImpedanceFunction::VdId => "VDID",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "CPD" => Some(ImpedanceFunction::CpD),
            "CPQ" => Some(ImpedanceFunction::CpQ),
            "CPG" => Some(ImpedanceFunction::CpG),
            "CPRP" => Some(ImpedanceFunction::CpRp),
            "CSD" => Some(ImpedanceFunction::CsD),
            "CSQ" => Some(ImpedanceFunction::CsQ),
            "CSRS" => Some(ImpedanceFunction::CsRs),
            "LPD" => Some(ImpedanceFunction::LpD),
            "LPQ" => Some(ImpedanceFunction::LpQ),
            "LPG" => Some(ImpedanceFunction::LpG),
            "LPRP" => Some(ImpedanceFunction::LpRp),
            "LPRD" => Some(ImpedanceFunction::LpRdc),
            "LSD" => Some(ImpedanceFunction::LsD),
            "LSQ" => Some(ImpedanceFunction::LsQ),
            "LSRS" => Some(ImpedanceFunction::LsRs),
            "LSRD" => Some(ImpedanceFunction::LsRdc),
            "RX" => Some(ImpedanceFunction::RX),
            "ZTD" => Some(ImpedanceFunction::ZThetaDeg),
            "ZTR" => Some(ImpedanceFunction::ZThetaRad),
            "GB" => Some(ImpedanceFunction::GB),
            "YTD" => Some(ImpedanceFunction::YThetaDeg),
            "YTR" => Some(ImpedanceFunction::YThetaRad),
            "VDID" => Some(ImpedanceFunction::VdId),
            _ => None,
        }
    }
}

/// Measurement function, test signal and aperture
#[derive(Debug, Clone)]
pub struct Function {
    transport: TransportHandle,
}

impl Function {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    pub fn set_impedance_function(&self, function: ImpedanceFunction) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":FUNC:IMP:TYPE {}", function.token()))
    }

    pub fn impedance_function(&self) -> Result<ImpedanceFunction, ScpiError> {
        self.transport
            .query_with(":FUNC:IMP:TYPE?", Protocol::token_reply)
    }

    pub fn set_auto_range(&self, enabled: bool) -> Result<(), ScpiError> {
        self.transport.send(&format!(
            ":FUNC:IMP:RANG:AUTO {}",
            Protocol::on_off(enabled)
        ))
    }

    pub fn auto_range(&self) -> Result<bool, ScpiError> {
        self.transport
            .query_with(":FUNC:IMP:RANG:AUTO?", Protocol::bool_reply)
    }

    /// Fix the impedance range. The instrument picks the range containing `ohms`
    /// and leaves auto range.
    pub fn set_range(&self, ohms: f64) -> Result<(), ScpiError> {
        check_range("impedance range", ohms, 0.0, 1.0e9)?;
        self.transport.send(&format!(":FUNC:IMP:RANG {ohms}"))
    }

    pub fn range(&self) -> Result<f64, ScpiError> {
        self.transport
            .query_with(":FUNC:IMP:RANG?", Protocol::float_reply)
    }

    /// Test signal frequency, 20 Hz to 2 MHz
    pub fn set_frequency(&self, hz: f64) -> Result<(), ScpiError> {
        check_range("frequency", hz, MIN_FREQUENCY, MAX_FREQUENCY)?;
        self.transport.send(&format!(":FREQ:CW {hz}"))
    }

    pub fn frequency(&self) -> Result<f64, ScpiError> {
        self.transport.query_with(":FREQ:CW?", Protocol::float_reply)
    }

    /// Test signal level in volts rms
    pub fn set_voltage_level(&self, volts: f64) -> Result<(), ScpiError> {
        check_range("test signal level", volts, 0.0, MAX_TEST_VOLTAGE)?;
        self.transport
            .send(&format!(":VOLT:LEV {}", Protocol::fixed(volts, 3)))
    }

    pub fn voltage_level(&self) -> Result<f64, ScpiError> {
        self.transport.query_with(":VOLT:LEV?", Protocol::float_reply)
    }

    /// Integration time and averaging rate (1 to 256)
    pub fn set_aperture(&self, time: ApertureTime, averaging: u16) -> Result<(), ScpiError> {
        if !(1..=MAX_AVERAGING).contains(&averaging) {
            return Err(ScpiError::InvalidParameter(format!(
                "averaging rate must be within 1..={MAX_AVERAGING}, got {averaging}"
            )));
        }
        self.transport
            .send(&format!(":APER {},{averaging}", time.token()))
    }

    pub fn aperture(&self) -> Result<MeasurementAperture, ScpiError> {
        self.transport.query_as(":APER?")
    }
}
