use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::ffi::OsStr;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::ScpiError;

/// One timestamped measurement taken from an instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord<T> {
    pub timestamp: DateTime<Utc>,
    /// Model or address of the instrument the value came from
    pub instrument: String,
    pub channel: Option<String>,
    pub value: T,
}

impl<T> MeasurementRecord<T> {
    /// Record `value` with the current time
    pub fn now(instrument: impl Into<String>, channel: Option<String>, value: T) -> Self {
        Self {
            timestamp: Utc::now(),
            instrument: instrument.into(),
            channel,
            value,
        }
    }
}

/// Buffered writer of JSON lines.
///
/// Entries are appended to a `.jsonl` file every `buffer_size` entries. With
/// `final_format_json` the file is rewritten as one JSON array (`.json`) when the logger
/// is finalized or dropped. Transient write failures are retried on the next flush
/// until `MAX_FLUSH_FAILURES` consecutive failures occurred.
#[derive(Debug)]
pub struct Logger<T>
where
    T: Serialize + DeserializeOwned,
{
    buffer: Vec<T>,
    buffer_size: usize,
    file_path: PathBuf,
    final_format_json: bool,
    finalized: bool,
    flush_failures: usize,
}

const MAX_FLUSH_FAILURES: usize = 10;

impl<T> Logger<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new<P: Into<PathBuf>>(file_path: P, buffer_size: usize, final_format_json: bool) -> Self {
        let mut path = file_path.into();
        let extension = if final_format_json { "json" } else { "jsonl" };
        if path.extension() != Some(OsStr::new(extension)) {
            path.set_extension(extension);
        }

        Self {
            buffer: Vec::with_capacity(buffer_size),
            buffer_size: buffer_size.max(1),
            file_path: path,
            final_format_json,
            finalized: false,
            flush_failures: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn add(&mut self, entry: T) -> Result<(), ScpiError> {
        self.buffer.push(entry);
        if self.buffer.len() >= self.buffer_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Append buffered entries to the file
    pub fn flush(&mut self) -> Result<(), ScpiError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        match self.write_buffer() {
            Ok(()) => {
                info!(
                    "Flushed {} records to {}",
                    self.buffer.len(),
                    self.file_path.display()
                );
                self.buffer.clear();
                self.flush_failures = 0;
                Ok(())
            }
            Err(e) => {
                self.flush_failures += 1;
                error!(
                    "Flush failure {}/{MAX_FLUSH_FAILURES}: {e}",
                    self.flush_failures
                );
                if self.flush_failures >= MAX_FLUSH_FAILURES {
                    return Err(ScpiError::Io {
                        source: std::io::Error::other(e.to_string()),
                        context: format!(
                            "Too many consecutive flush failures for {}",
                            self.file_path.display()
                        ),
                    });
                }
                if self.flush_failures % 3 == 0 {
                    warn!("Records are piling up in memory ({} buffered)", self.buffer.len());
                }
                Ok(())
            }
        }
    }

    fn write_buffer(&self) -> Result<(), ScpiError> {
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ScpiError::Io {
                source,
                context: format!("Could not create {}", parent.display()),
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .map_err(|source| ScpiError::Io {
                source,
                context: format!("Could not open {}", self.file_path.display()),
            })?;

        let mut writer = BufWriter::new(file);
        for entry in &self.buffer {
            serde_json::to_writer(&mut writer, entry)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Flush and, with `final_format_json`, rewrite the JSONL file as a JSON array.
    /// Further calls do nothing.
    pub fn finalize_as_json(&mut self) -> Result<(), ScpiError> {
        self.flush()?;
        if !self.final_format_json || self.finalized {
            return Ok(());
        }
        self.finalized = true;

        let content = match std::fs::read_to_string(&self.file_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(ScpiError::Io {
                    source,
                    context: format!("Could not read {}", self.file_path.display()),
                });
            }
        };

        let entries = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<Result<Vec<T>, _>>()?;

        std::fs::write(&self.file_path, serde_json::to_string_pretty(&entries)?).map_err(
            |source| ScpiError::Io {
                source,
                context: format!("Could not write {}", self.file_path.display()),
            },
        )?;

        info!("Converted {} records to a JSON array", entries.len());
        Ok(())
    }

    /// Entries waiting in the buffer
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl<T> Drop for Logger<T>
where
    T: Serialize + DeserializeOwned,
{
    fn drop(&mut self) {
        if let Err(e) = self.finalize_as_json() {
            error!("Failed to finalize {}: {e}", self.file_path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutputReading;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rusty_scpi_logger_{}_{name}", std::process::id()))
    }

    fn reading(voltage: f64) -> MeasurementRecord<OutputReading> {
        MeasurementRecord::now(
            "DP832",
            Some("CH1".to_string()),
            OutputReading {
                voltage,
                current: 0.5,
                power: voltage * 0.5,
            },
        )
    }

    #[test]
    fn test_extension_follows_format() {
        let lines: Logger<u32> = Logger::new(temp_path("ext"), 4, false);
        assert_eq!(lines.path().extension(), Some(OsStr::new("jsonl")));
        let array: Logger<u32> = Logger::new(temp_path("ext"), 4, true);
        assert_eq!(array.path().extension(), Some(OsStr::new("json")));
    }

    #[test]
    fn test_flushes_when_buffer_is_full() {
        let mut logger = Logger::new(temp_path("lines"), 2, false);
        let path = logger.path().to_path_buf();
        let _ = std::fs::remove_file(&path);

        logger.add(reading(1.0)).unwrap();
        assert_eq!(logger.len(), 1);
        assert!(!path.exists());

        logger.add(reading(2.0)).unwrap();
        assert!(logger.is_empty());

        let content = std::fs::read_to_string(&path).unwrap();
        let records: Vec<MeasurementRecord<OutputReading>> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].value.voltage, 2.0);
        assert_eq!(records[0].channel.as_deref(), Some("CH1"));

        drop(logger);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_finalize_writes_json_array_once() {
        let mut logger = Logger::new(temp_path("array"), 10, true);
        let path = logger.path().to_path_buf();
        let _ = std::fs::remove_file(&path);

        logger.add(reading(1.0)).unwrap();
        logger.add(reading(3.0)).unwrap();
        logger.finalize_as_json().unwrap();
        logger.finalize_as_json().unwrap();
        drop(logger);

        let content = std::fs::read_to_string(&path).unwrap();
        let records: Vec<MeasurementRecord<OutputReading>> =
            serde_json::from_str(&content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].value.power, 1.5);

        std::fs::remove_file(&path).unwrap();
    }
}
