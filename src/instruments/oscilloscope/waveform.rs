use log::debug;

use super::ScopeChannel;
use crate::error::{ParseError, ScpiError};
use crate::protocol::{Protocol, Token};
use crate::transport::TransportHandle;
use crate::waveform::{
    parse_ascii_samples, WaveformDataPoint, WaveformFormat, WaveformMode, WaveformPreamble,
};

/// Waveform readout (`:WAVeform` subsystem)
#[derive(Debug, Clone)]
pub struct Waveform {
    transport: TransportHandle,
}

impl Waveform {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    pub fn set_source(&self, channel: ScopeChannel) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":WAV:SOUR {}", channel.token()))
    }

    pub fn source(&self) -> Result<ScopeChannel, ScpiError> {
        self.transport.query_with(":WAV:SOUR?", Protocol::token_reply)
    }

    pub fn set_mode(&self, mode: WaveformMode) -> Result<(), ScpiError> {
        self.transport.send(&format!(":WAV:MODE {}", mode.token()))
    }

    pub fn mode(&self) -> Result<WaveformMode, ScpiError> {
        self.transport.query_with(":WAV:MODE?", Protocol::token_reply)
    }

    pub fn set_format(&self, format: WaveformFormat) -> Result<(), ScpiError> {
        self.transport.send(&format!(":WAV:FORM {}", format.token()))
    }

    pub fn format(&self) -> Result<WaveformFormat, ScpiError> {
        self.transport.query_with(":WAV:FORM?", Protocol::token_reply)
    }

    pub fn preamble(&self) -> Result<WaveformPreamble, ScpiError> {
        self.transport.query_as(":WAV:PRE?")
    }

    /// Samples in volts. Requires the ASCII format.
    pub fn data(&self) -> Result<Vec<f64>, ScpiError> {
        self.transport.query_with(":WAV:DATA?", parse_ascii_samples)
    }

    /// Capture the screen record of `channel` as time/voltage pairs.
    ///
    /// Selects the source, the ASCII format and the normal mode, then reads the
    /// preamble followed by the data. A record whose sample count differs from the
    /// preamble fails with `FieldCountMismatch`.
    ///
    /// # Examples
    /// ```
    /// use rusty_scpi::instruments::Ds1000z;
    /// use rusty_scpi::instruments::oscilloscope::ScopeChannel;
    /// use rusty_scpi::transport::{MockTransport, TransportHandle};
    ///
    /// let mock = MockTransport::new()
    ///     .with_reply(":WAV:PRE?", "2,0,3,1,1.0E-06,-1.0E-06,0,0.004,0,127")
    ///     .with_reply(":WAV:DATA?", "#9000000013 0.1,0.2,0.3,");
    /// let scope = Ds1000z::new(TransportHandle::new(mock));
    ///
    /// let points = scope.waveform.read_waveform(ScopeChannel::Ch1)?;
    /// assert_eq!(points.len(), 3);
    /// assert_eq!(points[1].time, 0.0);
    /// # Ok::<(), rusty_scpi::ScpiError>(())
    /// ```
    pub fn read_waveform(&self, channel: ScopeChannel) -> Result<Vec<WaveformDataPoint>, ScpiError> {
        self.set_source(channel)?;
        self.set_format(WaveformFormat::Ascii)?;
        self.set_mode(WaveformMode::Normal)?;

        let preamble = self.preamble()?;
        debug!("Waveform preamble for {channel}: {preamble}");

        let samples = self.data()?;
        if samples.len() != preamble.points as usize {
            return Err(ParseError::FieldCountMismatch {
                expected: preamble.points as usize,
                actual: samples.len(),
            }
            .into());
        }

        Ok(preamble.data_points(&samples))
    }
}
