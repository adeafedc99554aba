mod config;
mod logging;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use clap::Parser;
use color_eyre::eyre::{eyre, Context, Result};

use config::CliConfig;
use davis_iss_core::config::GainSetting;
use davis_iss_core::driver::{MockDriver, SdrDriver};
use davis_iss_core::hop::channel_plan::channel_plan;
use davis_iss_core::hop::{self, HopController};
use davis_iss_core::{LoggingSink, PacketConfig, SamplePath};
use logging::{LogEvent, ReadingEvent, StatisticsEvent, StructuredLogger};

#[derive(Parser, Debug)]
#[command(author, version, about = "Davis Instruments ISS weather station receiver", long_about = None)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<String>,

    /// Captured `.iq` file to replay through the in-memory driver (no real
    /// RTL-SDR backend ships with this crate; see `--list-devices`).
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Loop the replay file at end-of-stream instead of stopping.
    #[arg(long)]
    replay_loop: bool,

    /// Only decode packets from this station id (0..8), overriding config.
    #[arg(long)]
    station_id: Option<u8>,

    /// Frequency correction in PPM, overriding config.
    #[arg(long)]
    ppm: Option<i32>,

    /// Tuner gain: "auto" or a fixed dB value, overriding config.
    #[arg(long)]
    gain: Option<String>,

    /// Stay on the first hop channel instead of following the hop sequence.
    #[arg(long)]
    no_hop: bool,

    /// Print the (stub) list of available SDR devices and exit.
    #[arg(long)]
    list_devices: bool,

    /// Enable verbose diagnostic output.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_gain(s: &str) -> Result<GainSetting> {
    if s.eq_ignore_ascii_case("auto") {
        Ok(GainSetting::Auto)
    } else {
        let db: f64 = s.parse().wrap_err_with(|| format!("invalid gain value: {s}"))?;
        Ok(GainSetting::Fixed(db))
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    if args.list_devices {
        println!("This crate ships no hardware SDR backend; use --replay <file.iq> with the in-memory driver.");
        return Ok(());
    }

    let mut cfg = match &args.config {
        Some(path) => {
            CliConfig::from_file(path).wrap_err_with(|| format!("failed to load config from {path}"))?
        }
        None => CliConfig::default(),
    };

    if let Some(station_id) = args.station_id {
        cfg.receiver.station_id = Some(station_id);
    }
    if let Some(ppm) = args.ppm {
        cfg.receiver.ppm_correction = ppm;
    }
    if let Some(gain) = &args.gain {
        cfg.receiver.gain = parse_gain(gain)?;
    }
    if let Some(replay) = args.replay.clone() {
        cfg.terminal.replay_path = Some(replay);
    }
    if args.replay_loop {
        cfg.terminal.replay_loop = true;
    }
    if args.no_hop {
        cfg.terminal.no_hop = true;
    }

    cfg.receiver
        .validate()
        .map_err(|e| eyre!("invalid receiver configuration: {e}"))?;

    let mut logger = StructuredLogger::new(cfg.terminal.logging.clone())?;
    logger.log(LogEvent::Info {
        message: format!(
            "starting receiver: symbol_length={} sample_rate={}Hz hop_follow={}",
            cfg.receiver.symbol_length,
            cfg.receiver.sample_rate(),
            !cfg.terminal.no_hop
        ),
    })?;

    let replay_path = cfg.terminal.replay_path.clone().ok_or_else(|| {
        eyre!("no sample source configured: pass --replay <file.iq> (no real hardware backend ships with this crate)")
    })?;
    let samples = std::fs::read(&replay_path)
        .wrap_err_with(|| format!("failed to read replay file {}", replay_path.display()))?;

    let mut mock = MockDriver::new(samples);
    if cfg.terminal.replay_loop {
        mock = mock.looping();
    }
    let driver: Arc<Mutex<dyn SdrDriver>> = Arc::new(Mutex::new(mock));

    {
        let mut guard = driver.lock().map_err(|_| eyre!("driver mutex poisoned"))?;
        guard.set_sample_rate(cfg.receiver.sample_rate() as u32)?;
        guard.set_gain(cfg.receiver.gain)?;
        guard.set_freq_correction(cfg.receiver.ppm_correction)?;
        guard.start_stream()?;
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
        })
        .wrap_err("failed to install Ctrl+C handler")?;
    }

    let (packet_tx, packet_rx) = crossbeam_channel::unbounded();

    let hop_thread = if cfg.terminal.no_hop {
        let first_freq = channel_plan()[0];
        driver
            .lock()
            .map_err(|_| eyre!("driver mutex poisoned"))?
            .set_center_freq(first_freq)?;
        None
    } else {
        let controller = HopController::new(cfg.receiver.hop.clone());
        let driver = Arc::clone(&driver);
        let shutdown = Arc::clone(&shutdown);
        Some(thread::spawn(move || hop::run(controller, packet_rx, driver, shutdown)))
    };

    let packet_config = PacketConfig::new(cfg.receiver.symbol_length)
        .map_err(|e| eyre!("invalid packet geometry: {e}"))?;
    let mut sample_path = SamplePath::new(packet_config);

    let start = Instant::now();
    let mut last_stats_log = Instant::now();
    let station_filter = cfg.receiver.station_id;

    let mut buf = vec![0u8; packet_config.block_size * 2];
    while !shutdown.load(Ordering::Relaxed) {
        let read_result = {
            let mut guard = driver.lock().map_err(|_| eyre!("driver mutex poisoned"))?;
            guard.read_block(&mut buf)
        };
        if let Err(e) = read_result {
            logger.log(LogEvent::Info {
                message: format!("sample source exhausted: {e}"),
            })?;
            shutdown.store(true, Ordering::Relaxed);
            break;
        }

        let now = start.elapsed().as_secs_f64();
        let station_matches = |id: u8| station_filter.map_or(true, |want| want == id);
        let mut logging_sink = LoggingSink::new(|event| {
            if station_matches(event.station_id) {
                let reading: ReadingEvent = event.into();
                // A logging failure is not a receiver-path error; print to
                // stderr and keep decoding.
                if let Err(e) = logger.log(LogEvent::Reading(reading)) {
                    eprintln!("log write failed: {e}");
                }
            }
            Ok(())
        });
        let events = sample_path.process_block(&buf, now, &mut logging_sink)?;

        if !cfg.terminal.no_hop {
            for event in events {
                let _ = packet_tx.send(event);
            }
        }

        if last_stats_log.elapsed().as_secs_f64() >= 10.0 {
            let stats = StatisticsEvent::from_outcome(sample_path.outcome(), start.elapsed().as_secs_f64());
            logger.log(LogEvent::Statistics(stats))?;
            sample_path.reset_outcome();
            last_stats_log = Instant::now();
        }

        if args.verbose {
            let outcome = sample_path.outcome();
            logger.log(LogEvent::Info {
                message: format!("{outcome:?}"),
            })?;
        }
    }

    // Cancel the hop controller before touching the driver: while it is
    // still running it can call set_center_freq at any moment, so it must
    // be joined before the driver is stopped and closed underneath it.
    if let Some(handle) = hop_thread {
        handle
            .join()
            .map_err(|_| eyre!("hop controller thread panicked"))?
            .map_err(|e| eyre!("hop controller error: {e}"))?;
    }

    {
        let mut guard = driver.lock().map_err(|_| eyre!("driver mutex poisoned"))?;
        guard.stop_stream()?;
        guard.close()?;
    }

    logger.log(LogEvent::Info {
        message: "receiver shut down cleanly".to_string(),
    })?;

    Ok(())
}
