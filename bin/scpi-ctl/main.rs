use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{LevelFilter, error, info, warn};
use rusty_scpi::config::{AppConfig, load_config_or_default};
use rusty_scpi::instruments::oscilloscope::ScopeChannel;
use rusty_scpi::instruments::power_supply::Protection;
use rusty_scpi::instruments::{self, Dl3000, Dp800, Ds1000z, E4980a};
use rusty_scpi::plotting::plot_waveform;
use rusty_scpi::{
    InstrumentType, Logger, MeasurementRecord, OutputChannel, OutputReading, ScpiError,
    SocketTransport, TransportHandle,
};
use serde::Serialize;
use std::{
    fmt::Display,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

/// Command line access to SCPI instruments over LXI raw sockets
#[derive(Parser, Debug)]
#[command(name = "scpi-ctl")]
#[command(about = "Query and control SCPI bench instruments", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Override instrument host
    #[arg(long)]
    host: Option<String>,

    /// Override instrument port
    #[arg(long)]
    port: Option<u16>,

    /// Override instrument kind (lcr_meter, load, oscilloscope, power_supply)
    #[arg(long, value_parser = parse_kind)]
    kind: Option<InstrumentType>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the *IDN? reply
    Identify,
    /// Send a raw command
    Send { command: String },
    /// Send a raw query and print the reply
    Query { command: String },
    /// Drain the error queue
    Errors {
        #[arg(long, default_value_t = 32)]
        max: usize,
    },
    /// Settings, readback and protection state of power supply channels
    PsuStatus {
        /// Channel number, all channels when omitted
        #[arg(long)]
        channel: Option<u8>,
    },
    /// Mode, input state and readback of the electronic load
    LoadStatus,
    /// Fetch one impedance measurement
    LcrFetch {
        /// Fire a bus trigger before fetching
        #[arg(long)]
        trigger: bool,
    },
    /// Capture and plot an oscilloscope channel
    Waveform {
        #[arg(default_value_t = 1)]
        channel: u8,
        /// Also write the points to a JSON file
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },
    /// Record power supply readings until Ctrl+C
    LogOutput {
        #[arg(default_value_t = 1)]
        channel: u8,
        /// Stop after this many readings
        #[arg(long)]
        count: Option<usize>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut config = load_config_or_default(args.config.as_deref());

    let log_level = args
        .log_level
        .clone()
        .unwrap_or(config.logging.log_level.clone());
    initialize_logging(&log_level)?;

    if let Some(host) = &args.host {
        config.instrument.host = host.clone();
    }
    if let Some(port) = args.port {
        config.instrument.port = port;
    }
    if let Some(kind) = args.kind {
        config.instrument.kind = kind;
    }

    let transport = connect(&config)?;

    match args.command {
        Command::Identify => {
            let instrument = instruments::connect(config.instrument.kind, transport);
            let idn = instrument.common().identify()?;
            print_result(&idn, args.json)?;
        }
        Command::Send { command } => transport.send(&command)?,
        Command::Query { command } => println!("{}", transport.query(&command)?),
        Command::Errors { max } => {
            let instrument = instruments::connect(config.instrument.kind, transport);
            let errors = instrument.common().drain_errors(max)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&errors)?);
            } else if errors.is_empty() {
                println!("No errors");
            } else {
                errors.iter().for_each(|e| println!("{e}"));
            }
        }
        Command::PsuStatus { channel } => {
            let channels = match channel {
                Some(n) => vec![output_channel(n)?],
                None => vec![OutputChannel::Ch1, OutputChannel::Ch2, OutputChannel::Ch3],
            };
            psu_status(&Dp800::new(transport), &channels, args.json)?;
        }
        Command::LoadStatus => load_status(&Dl3000::new(transport), args.json)?,
        Command::LcrFetch { trigger } => {
            let lcr = E4980a::new(transport);
            let reading = if trigger {
                lcr.measurement.trigger_and_fetch()?
            } else {
                lcr.measurement.fetch()?
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&reading)?);
            } else {
                let (primary, secondary) = lcr.function.impedance_function()?.parameter_names();
                println!(
                    "{primary} = {:e}, {secondary} = {:e} ({:?})",
                    reading.primary, reading.secondary, reading.status
                );
            }
        }
        Command::Waveform { channel, save } => {
            let channel = ScopeChannel::from_number(channel).ok_or_else(|| {
                ScpiError::InvalidParameter(format!("no scope channel {channel}"))
            })?;
            let scope = Ds1000z::new(transport);
            let points = scope.waveform.read_waveform(channel)?;
            info!("Captured {} points from {channel}", points.len());

            if let Some(path) = save {
                std::fs::write(&path, serde_json::to_string_pretty(&points)?)?;
                info!("Waveform written to {}", path.display());
            }
            plot_waveform(&points, Some(format!("DS1000Z {channel}").as_str()), None, None)?;
        }
        Command::LogOutput { channel, count } => {
            let channel = output_channel(channel)?;
            let shutdown_flag = setup_shutdown_handler()?;
            log_output(&Dp800::new(transport), channel, &config, count, &shutdown_flag)?;
        }
    }

    Ok(())
}

fn connect(config: &AppConfig) -> Result<TransportHandle, ScpiError> {
    info!(
        "Connecting to {} at {}:{}",
        config.instrument.kind, config.instrument.host, config.instrument.port
    );
    let transport = SocketTransport::builder()
        .address(&config.instrument.host)
        .port(config.instrument.port)
        .config(config.connection.to_connection_config())
        .build()?;
    Ok(TransportHandle::new(transport))
}

fn parse_kind(raw: &str) -> Result<InstrumentType, String> {
    match raw.to_lowercase().replace('-', "_").as_str() {
        "lcr_meter" | "lcr" => Ok(InstrumentType::LcrMeter),
        "load" => Ok(InstrumentType::Load),
        "oscilloscope" | "scope" => Ok(InstrumentType::Oscilloscope),
        "power_supply" | "psu" => Ok(InstrumentType::PowerSupply),
        other => Err(format!("unknown instrument kind '{other}'")),
    }
}

fn output_channel(number: u8) -> Result<OutputChannel, ScpiError> {
    match number {
        1 => Ok(OutputChannel::Ch1),
        2 => Ok(OutputChannel::Ch2),
        3 => Ok(OutputChannel::Ch3),
        _ => Err(ScpiError::InvalidParameter(format!(
            "no output channel {number}"
        ))),
    }
}

fn print_result<T: Serialize + Display>(value: &T, json: bool) -> Result<(), ScpiError> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{value}");
    }
    Ok(())
}

#[derive(Serialize)]
struct ChannelStatus {
    settings: rusty_scpi::ChannelSettings,
    reading: OutputReading,
    enabled: bool,
    mode: Option<instruments::power_supply::OutputMode>,
    ovp_tripped: bool,
    ocp_tripped: bool,
}

fn psu_status(psu: &Dp800, channels: &[OutputChannel], json: bool) -> Result<(), ScpiError> {
    let mut report = Vec::with_capacity(channels.len());
    for &channel in channels {
        let enabled = psu.output.enabled(channel)?;
        report.push(ChannelStatus {
            settings: psu.source.settings(channel)?,
            reading: psu.measure.all(channel)?,
            enabled,
            mode: if enabled {
                Some(psu.output.mode(channel)?)
            } else {
                None
            },
            ovp_tripped: psu.output.protection_tripped(channel, Protection::Overvoltage)?,
            ocp_tripped: psu.output.protection_tripped(channel, Protection::Overcurrent)?,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for status in &report {
        println!("{}", status.settings);
        println!(
            "  output {} {}, reading {}",
            if status.enabled { "ON" } else { "OFF" },
            status.mode.map(|m| format!("{m:?}")).unwrap_or_default(),
            status.reading
        );
        if status.ovp_tripped || status.ocp_tripped {
            println!(
                "  protection tripped: OVP {} OCP {}",
                status.ovp_tripped, status.ocp_tripped
            );
        }
    }
    Ok(())
}

fn load_status(load: &Dl3000, json: bool) -> Result<(), ScpiError> {
    let function = load.source.function()?;
    let mode = load.source.mode()?;
    let enabled = load.input.enabled()?;
    let reading = load.measure.reading()?;
    let questionable = load.status.questionable_condition()?;

    if json {
        let report = serde_json::json!({
            "function": function,
            "mode": mode,
            "input_enabled": enabled,
            "reading": reading,
            "questionable": questionable,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{function:?} / {mode:?}, input {}",
            if enabled { "ON" } else { "OFF" }
        );
        println!("reading {reading}");
        println!("questionable {questionable}");
    }
    Ok(())
}

fn log_output(
    psu: &Dp800,
    channel: OutputChannel,
    config: &AppConfig,
    count: Option<usize>,
    shutdown_flag: &AtomicBool,
) -> Result<(), ScpiError> {
    let recording = &config.recording;
    let mut logger = Logger::new(
        &recording.record_path,
        recording.buffer_size,
        recording.final_format_json,
    );
    let instrument = format!("{}:{}", config.instrument.host, config.instrument.port);
    info!("Recording {channel} to {}", logger.path().display());

    let mut taken = 0;
    while !shutdown_flag.load(Ordering::SeqCst) && count.is_none_or(|n| taken < n) {
        match psu.measure.all(channel) {
            Ok(reading) => {
                info!("{channel}: {reading}");
                logger.add(MeasurementRecord::now(
                    instrument.as_str(),
                    Some(channel.to_string()),
                    reading,
                ))?;
                taken += 1;
            }
            Err(e @ ScpiError::Parse(_)) => warn!("Skipping reading: {e}"),
            Err(e) => {
                error!("Recording stopped: {e}");
                logger.finalize_as_json()?;
                return Err(e);
            }
        }
        thread::sleep(Duration::from_millis(recording.interval_ms));
    }

    logger.finalize_as_json()?;
    info!("Recorded {taken} readings");
    Ok(())
}

fn setup_shutdown_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let shutdown_flag = Arc::new(AtomicBool::new(false));
    let shutdown_flag_clone = shutdown_flag.clone();

    ctrlc::set_handler(move || {
        info!("Ctrl+C received - stopping...");
        shutdown_flag_clone.store(true, Ordering::SeqCst);
    })?;

    Ok(shutdown_flag)
}

fn initialize_logging(log_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => {
            eprintln!("Warning: Invalid log level '{log_level}', using 'info'");
            LevelFilter::Info
        }
    };

    env_logger::Builder::from_env(Env::default())
        .filter_level(level)
        .format_timestamp_millis()
        .init();

    Ok(())
}
