//! Desktop simulator for the meteo status display.
//!
//! Plays the device's demo screen sequence against a synthetic sensor and
//! writes every frame as a PNG, styled like a blue monochrome OLED.
//!
//! ```text
//! meteo-simulator [OUTPUT_DIR] [READOUT_INTERVAL_SECS]
//! ```
//!
//! `OUTPUT_DIR` defaults to `frames`. Set `RUST_LOG=debug` to see cache
//! refreshes and per-frame logs.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics_simulator::{
    BinaryColorTheme, OutputSettings, OutputSettingsBuilder, SimulatorDisplay,
};
use log::{error, info, warn};

use meteo_core::clock::{SystemClock, WallClock};
use meteo_core::config::{Config, Endpoint, ReadoutInterval};
use meteo_core::sensors::{Quantity, Sample, Sensor, SensorBus, SensorCache, SensorError};
use meteo_core::ui::{Backgrounds, MonoFontSet, Screen, ScreenRenderer, ValuesScreen};

/// Pixel scale factor for the PNG output.
const OUTPUT_SCALE: u32 = 4;

/// How long each screen stays up.
const HOLD: Duration = Duration::from_secs(2);

const DEFAULT_OUTPUT_DIR: &str = "frames";

// ---------------------------------------------------------------------------
// Synthetic hardware
// ---------------------------------------------------------------------------

/// Sensor whose readings drift slowly over time.
struct DriftingSensor {
    started: Instant,
}

impl Sensor for DriftingSensor {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn read(&mut self) -> Result<Sample, SensorError> {
        let t = self.started.elapsed().as_secs_f64();

        // Humidity: 60-74 % around the demo value
        let humidity = 67.0 + 6.0 * (t / 40.0).sin() + (t / 7.0).cos();

        // Pressure: slow swell around 1003.5 hPa
        let pressure = 1003.53 + 2.5 * (t / 90.0).sin();

        // Temperature: 21-25 °C
        let temperature = 23.0342 + 1.5 * (t / 30.0).sin() + 0.3 * (t / 5.0).cos();

        Ok(Sample::new(humidity, pressure, temperature))
    }
}

struct SyntheticBus;

impl SensorBus for SyntheticBus {
    type Sensor = DriftingSensor;

    fn open(self, endpoint: Endpoint) -> Result<Self::Sensor, SensorError> {
        info!(
            "Synthetic sensor standing in for bus {} address {:#04x}",
            endpoint.port, endpoint.address
        );
        Ok(DriftingSensor {
            started: Instant::now(),
        })
    }
}

/// Host local time.
struct LocalWallClock;

impl WallClock for LocalWallClock {
    fn local_now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

// ---------------------------------------------------------------------------
// Frame output
// ---------------------------------------------------------------------------

struct FrameWriter {
    dir: PathBuf,
    display: SimulatorDisplay<BinaryColor>,
    settings: OutputSettings,
    index: usize,
}

impl FrameWriter {
    fn new(dir: PathBuf, renderer: &ScreenRenderer) -> Self {
        Self {
            dir,
            display: SimulatorDisplay::new(renderer.size()),
            settings: OutputSettingsBuilder::new()
                .theme(BinaryColorTheme::OledBlue)
                .scale(OUTPUT_SCALE)
                .build(),
            index: 0,
        }
    }

    /// Push the renderer's changes to the display and save it as a PNG.
    fn save(&mut self, renderer: &mut ScreenRenderer, layout: &str) {
        renderer.flush(&mut self.display).ok();

        self.index += 1;
        let path = self.dir.join(format!("{:02}-{}.png", self.index, layout));
        match self.display.to_rgb_output_image(&self.settings).save_png(&path) {
            Ok(()) => info!("Wrote {}", path.display()),
            Err(e) => error!("Failed to write {}: {}", path.display(), e),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_OUTPUT_DIR.into()));

    let mut config = Config::default();
    if let Some(text) = args.next() {
        match text.parse::<ReadoutInterval>() {
            Ok(interval) => config.sensor.readout_interval = interval,
            Err(e) => {
                error!("Readout interval {:?}: {}", text, e);
                return ExitCode::FAILURE;
            }
        }
    }

    if let Err(e) = std::fs::create_dir_all(&output_dir) {
        error!("Cannot create {}: {}", output_dir.display(), e);
        return ExitCode::FAILURE;
    }

    info!("Starting meteo simulator");
    info!(
        "Display: {}x{}, frames go to {}",
        config.display.width(),
        config.display.height(),
        output_dir.display()
    );

    let mut cache = match SensorCache::from_config(&config.sensor, SyntheticBus, SystemClock) {
        Ok(cache) => cache,
        Err(e) => {
            error!("Sensor unavailable: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut renderer = match ScreenRenderer::new(
        config.display,
        MonoFontSet::standard(),
        Backgrounds::generated(config.display.size()),
    ) {
        Ok(renderer) => renderer,
        Err(e) => {
            error!("Renderer unavailable: {}", e);
            return ExitCode::FAILURE;
        }
    };

    play_demo(&mut cache, &mut renderer, &output_dir);

    info!("Simulator exiting");
    ExitCode::SUCCESS
}

fn play_demo<S, C>(cache: &mut SensorCache<S, C>, renderer: &mut ScreenRenderer, output_dir: &Path)
where
    S: Sensor,
    C: meteo_core::clock::Clock,
{
    let mut frames = FrameWriter::new(output_dir.to_path_buf(), renderer);

    // Each pass moves the last quantity to the top
    let mut order = [Quantity::Humidity, Quantity::Temperature, Quantity::Pressure];
    for _ in 0..3 {
        order.rotate_right(1);
        match cache.refresh_if_stale() {
            Ok(sample) => {
                let screen = Screen::Values(ValuesScreen::from_sample(&sample, order));
                renderer.render(&screen);
                frames.save(renderer, screen.name());
            }
            Err(e) => warn!("Skipping values screen: {}", e),
        }
        std::thread::sleep(HOLD);
    }

    for show_seconds in [true, false] {
        renderer.draw_datetime(show_seconds, &LocalWallClock);
        frames.save(renderer, "datetime");
        std::thread::sleep(HOLD);
    }

    let screens = [
        Screen::Heading("Heading"),
        Screen::Message("Switch off?"),
        Screen::Shutdown,
        Screen::Selection {
            message: "Show seconds",
            selection: "Enabled",
        },
    ];
    for screen in &screens {
        renderer.render(screen);
        frames.save(renderer, screen.name());
        std::thread::sleep(HOLD);
    }
}
