//! Bit-flag status registers.
//!
//! A register is a raw `u16` read from the instrument plus a closed set of named bits.
//! Bits may be set simultaneously; [`StatusRegister::decompose`] returns every named
//! bit that is set and [`StatusRegister::unnamed_bits`] keeps whatever the instrument
//! reported beyond the known names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::error::ParseError;
use crate::protocol::Protocol;

/// A named bit of a status register
pub trait StatusBit: Copy + Ord + fmt::Debug + 'static {
    /// Every named bit, in ascending bit order
    const ALL: &'static [Self];

    fn mask(self) -> u16;

    fn name(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct StatusRegister<B: StatusBit> {
    raw: u16,
    #[serde(skip)]
    _bits: PhantomData<B>,
}

impl<B: StatusBit> StatusRegister<B> {
    pub fn from_bits(raw: u16) -> Self {
        Self {
            raw,
            _bits: PhantomData,
        }
    }

    pub fn from_flags<I: IntoIterator<Item = B>>(flags: I) -> Self {
        let raw = flags.into_iter().fold(0, |acc, bit| acc | bit.mask());
        Self::from_bits(raw)
    }

    pub fn bits(&self) -> u16 {
        self.raw
    }

    pub fn contains(&self, bit: B) -> bool {
        self.raw & bit.mask() != 0
    }

    pub fn is_clear(&self) -> bool {
        self.raw == 0
    }

    /// Every named bit that is set
    pub fn decompose(&self) -> BTreeSet<B> {
        B::ALL
            .iter()
            .copied()
            .filter(|bit| self.contains(*bit))
            .collect()
    }

    /// Set bits that have no name in this register
    pub fn unnamed_bits(&self) -> u16 {
        let known = B::ALL.iter().fold(0, |acc, bit| acc | bit.mask());
        self.raw & !known
    }
}

impl<B: StatusBit> Default for StatusRegister<B> {
    fn default() -> Self {
        Self::from_bits(0)
    }
}

impl<B: StatusBit> FromStr for StatusRegister<B> {
    type Err = ParseError;

    fn from_str(reply: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_bits(Protocol::int_reply(reply)?))
    }
}

impl<B: StatusBit> fmt::Display for StatusRegister<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clear() {
            return write!(f, "none");
        }

        let mut names: Vec<String> = self
            .decompose()
            .into_iter()
            .map(|bit| bit.name().to_string())
            .collect();
        if self.unnamed_bits() != 0 {
            names.push(format!("0x{:04X}", self.unnamed_bits()));
        }
        write!(f, "{}", names.join("|"))
    }
}

/// Questionable status register of electronic loads
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QuestionableBit {
    VoltageFault = 1 << 0,
    Overcurrent = 1 << 1,
    Overpower = 1 << 3,
    OverTemperature = 1 << 4,
    ReverseVoltage = 1 << 9,
    Unregulated = 1 << 10,
    Overvoltage = 1 << 12,
}

impl StatusBit for QuestionableBit {
    const ALL: &'static [Self] = &[
        QuestionableBit::VoltageFault,
        QuestionableBit::Overcurrent,
        QuestionableBit::Overpower,
        QuestionableBit::OverTemperature,
        QuestionableBit::ReverseVoltage,
        QuestionableBit::Unregulated,
        QuestionableBit::Overvoltage,
    ];

    fn mask(self) -> u16 {
        self as u16
    }

    fn name(self) -> &'static str {
        match self {
            QuestionableBit::VoltageFault => "VoltageFault",
            QuestionableBit::Overcurrent => "Overcurrent",
            QuestionableBit::Overpower => "Overpower",
            QuestionableBit::OverTemperature => "OverTemperature",
            QuestionableBit::ReverseVoltage => "ReverseVoltage",
            QuestionableBit::Unregulated => "Unregulated",
            QuestionableBit::Overvoltage => "Overvoltage",
        }
    }
}

/// IEEE 488.2 standard event status register (`*ESR?`)
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StandardEventBit {
    OperationComplete = 1 << 0,
    RequestControl = 1 << 1,
    QueryError = 1 << 2,
    DeviceDependentError = 1 << 3,
    ExecutionError = 1 << 4,
    CommandError = 1 << 5,
    UserRequest = 1 << 6,
    PowerOn = 1 << 7,
}

impl StatusBit for StandardEventBit {
    const ALL: &'static [Self] = &[
        StandardEventBit::OperationComplete,
        StandardEventBit::RequestControl,
        StandardEventBit::QueryError,
        StandardEventBit::DeviceDependentError,
        StandardEventBit::ExecutionError,
        StandardEventBit::CommandError,
        StandardEventBit::UserRequest,
        StandardEventBit::PowerOn,
    ];

    fn mask(self) -> u16 {
        self as u16
    }

    fn name(self) -> &'static str {
        match self {
            StandardEventBit::OperationComplete => "OperationComplete",
            StandardEventBit::RequestControl => "RequestControl",
            StandardEventBit::QueryError => "QueryError",
            StandardEventBit::DeviceDependentError => "DeviceDependentError",
            StandardEventBit::ExecutionError => "ExecutionError",
            StandardEventBit::CommandError => "CommandError",
            StandardEventBit::UserRequest => "UserRequest",
            StandardEventBit::PowerOn => "PowerOn",
        }
    }
}

/// IEEE 488.2 status byte (`*STB?`)
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatusByteBit {
    ErrorQueue = 1 << 2,
    Questionable = 1 << 3,
    MessageAvailable = 1 << 4,
    EventStatus = 1 << 5,
    RequestService = 1 << 6,
    Operation = 1 << 7,
}

impl StatusBit for StatusByteBit {
    const ALL: &'static [Self] = &[
        StatusByteBit::ErrorQueue,
        StatusByteBit::Questionable,
        StatusByteBit::MessageAvailable,
        StatusByteBit::EventStatus,
        StatusByteBit::RequestService,
        StatusByteBit::Operation,
    ];

    fn mask(self) -> u16 {
        self as u16
    }

    fn name(self) -> &'static str {
        match self {
            StatusByteBit::ErrorQueue => "ErrorQueue",
            StatusByteBit::Questionable => "Questionable",
            StatusByteBit::MessageAvailable => "MessageAvailable",
            StatusByteBit::EventStatus => "EventStatus",
            StatusByteBit::RequestService => "RequestService",
            StatusByteBit::Operation => "Operation",
        }
    }
}

pub type QuestionableStatus = StatusRegister<QuestionableBit>;
pub type StandardEventStatus = StatusRegister<StandardEventBit>;
pub type StatusByte = StatusRegister<StatusByteBit>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_questionable_decomposition() {
        let status = QuestionableStatus::from_bits(4097);
        assert_eq!(
            status.decompose(),
            BTreeSet::from([QuestionableBit::VoltageFault, QuestionableBit::Overvoltage])
        );
        assert!(status.contains(QuestionableBit::VoltageFault));
        assert!(status.contains(QuestionableBit::Overvoltage));
        assert!(!status.contains(QuestionableBit::Overcurrent));
        assert_eq!(status.unnamed_bits(), 0);
    }

    #[test]
    fn test_unnamed_bits_are_kept() {
        let status = QuestionableStatus::from_bits(0b0000_0000_0000_0101);
        assert_eq!(status.decompose(), BTreeSet::from([QuestionableBit::VoltageFault]));
        assert_eq!(status.unnamed_bits(), 0b100);
        assert_eq!(status.to_string(), "VoltageFault|0x0004");
    }

    #[test]
    fn test_from_flags() {
        let status = StandardEventStatus::from_flags([
            StandardEventBit::CommandError,
            StandardEventBit::PowerOn,
        ]);
        assert_eq!(status.bits(), 32 + 128);
        assert_eq!(status.to_string(), "CommandError|PowerOn");
    }

    #[test]
    fn test_parse_register_reply() {
        let stb: StatusByte = "+96".parse().unwrap();
        assert!(stb.contains(StatusByteBit::EventStatus));
        assert!(stb.contains(StatusByteBit::RequestService));

        let clear: QuestionableStatus = "0".parse().unwrap();
        assert!(clear.is_clear());
        assert_eq!(clear.to_string(), "none");

        assert!("70000".parse::<QuestionableStatus>().is_err());
        assert_eq!(
            "".parse::<QuestionableStatus>(),
            Err(ParseError::EmptyReply)
        );
    }
}
