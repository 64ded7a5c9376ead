//! Typed SCPI command sets for bench instruments.
//!
//! A [`TransportHandle`] wraps one connection. Instrument facades such as
//! [`instruments::Dp800`] build their command subsystems on top of it; every
//! subsystem turns typed calls into SCPI text and parses the replies into value
//! objects.

pub mod config;
pub mod error;
pub mod instruments;
pub mod logger;
pub mod plotting;
pub mod protocol;
pub mod status;
pub mod transport;
pub mod types;
pub mod waveform;

pub use error::{ParseError, ScpiError, TransportError};
pub use instruments::{Common, Dl3000, Dp800, Ds1000z, E4980a, Instrument};
pub use logger::{Logger, MeasurementRecord};
pub use protocol::{Ordinal, Protocol, Token};
pub use status::{
    QuestionableBit, QuestionableStatus, StandardEventBit, StandardEventStatus, StatusBit,
    StatusByte, StatusByteBit, StatusRegister,
};
pub use transport::{
    ConnectionConfig, MockTransport, SocketTransport, SocketTransportBuilder, Transport,
    TransportHandle,
};
pub use types::{
    ApertureTime, ChannelRatings, ChannelSettings, Identification, ImpedanceReading,
    InstrumentType, MeasurementAperture, MeasurementStatus, OutputChannel, OutputReading,
    SystemError,
};
pub use waveform::{WaveformDataPoint, WaveformFormat, WaveformMode, WaveformPreamble};
