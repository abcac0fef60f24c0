use std::path::PathBuf;

use anyhow::{bail, Context};
use specmorph::io::wav::{read_wav_file, write_wav_file, WavEncoding};
use specmorph::morph::params::{read_settings_json, write_settings_json};
use specmorph::{EngineConfig, MagnitudeStrategy, MorphSettings, PhaseStrategy, WindowType};

/// Parsed command line. Setting flags are kept optional so they can
/// override a `--settings` file field by field.
#[derive(Debug, Default)]
struct Options {
    main_path: PathBuf,
    aux_path: PathBuf,
    output_path: PathBuf,
    morph_factor: Option<f32>,
    magnitude: Option<MagnitudeStrategy>,
    phase: Option<PhaseStrategy>,
    invert_phase: bool,
    bypass: bool,
    formant_shift: Option<f32>,
    frame_size: Option<usize>,
    overlap_factor: Option<usize>,
    window_type: Option<WindowType>,
    settings_path: Option<PathBuf>,
    save_settings_path: Option<PathBuf>,
    encoding: WavEncoding,
    verbose: bool,
}

impl Options {
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(n) = self.frame_size {
            config = config.with_frame_size(n);
        }
        if let Some(w) = self.window_type {
            config = config.with_window_type(w);
        }
        match self.overlap_factor {
            Some(k) => config.with_overlap_factor(k),
            None => config.with_balanced_overlap(),
        }
    }

    fn morph_settings(&self) -> anyhow::Result<MorphSettings> {
        let mut settings = match &self.settings_path {
            Some(path) => read_settings_json(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => MorphSettings::default(),
        };
        if let Some(m) = self.morph_factor {
            settings.morph_factor = m;
        }
        if let Some(mag) = self.magnitude {
            settings.magnitude = mag;
        }
        if let Some(phase) = self.phase {
            settings.phase = phase;
        }
        if let Some(f) = self.formant_shift {
            settings.formant_shift = f;
        }
        settings.invert_phase |= self.invert_phase;
        settings.bypass |= self.bypass;
        settings.validate()?;
        Ok(settings)
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 4 {
        print_usage();
        std::process::exit(1);
    }

    let options = match parse_args(&args[1..]) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    let default_filter = if options.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(&options) {
        eprintln!("ERROR: {:#}", e);
        std::process::exit(1);
    }
}

fn run(options: &Options) -> anyhow::Result<()> {
    let config = options.engine_config();
    config.validate()?;
    let settings = options.morph_settings()?;

    if let Some(path) = &options.save_settings_path {
        write_settings_json(path, &settings)
            .with_context(|| format!("failed to save settings to {}", path.display()))?;
        log::info!("settings written to {}", path.display());
    }

    let main = read_wav_file(&options.main_path)
        .with_context(|| format!("failed to read {}", options.main_path.display()))?;
    let aux = read_wav_file(&options.aux_path)
        .with_context(|| format!("failed to read {}", options.aux_path.display()))?;

    log::info!(
        "main: {} frames, {} Hz, {} ch, {:.2}s",
        main.num_frames(),
        main.sample_rate,
        main.channels,
        main.duration_secs()
    );
    log::info!(
        "aux: {} frames, {} Hz, {} ch, {:.2}s",
        aux.num_frames(),
        aux.sample_rate,
        aux.channels,
        aux.duration_secs()
    );
    log::debug!("engine: {:?}", config);
    log::debug!(
        "settings: morph={:.3} magnitude={} phase={} invert={} bypass={} formant={}",
        settings.morph_factor,
        settings.magnitude,
        settings.phase,
        settings.invert_phase,
        settings.bypass,
        settings.formant_shift
    );

    let start = std::time::Instant::now();
    let output = specmorph::morph_buffers(&main, &aux, &config, &settings)
        .context("morphing failed")?;
    let elapsed = start.elapsed().as_secs_f64();

    let realtime_factor = if elapsed > 0.0 {
        main.duration_secs() / elapsed
    } else {
        f64::INFINITY
    };
    log::debug!(
        "processing time: {:.3}s ({:.1}x realtime)",
        elapsed,
        realtime_factor
    );

    write_wav_file(&options.output_path, &output, options.encoding)
        .with_context(|| format!("failed to write {}", options.output_path.display()))?;
    log::info!(
        "written {} frames to {}",
        output.num_frames(),
        options.output_path.display()
    );
    Ok(())
}

/// Parses everything after the program name.
fn parse_args(args: &[String]) -> anyhow::Result<Options> {
    if args.len() < 3 {
        bail!("expected <main.wav> <aux.wav> <output.wav>");
    }

    let mut options = Options {
        main_path: PathBuf::from(&args[0]),
        aux_path: PathBuf::from(&args[1]),
        output_path: PathBuf::from(&args[2]),
        ..Options::default()
    };
    let mut format_24bit = false;
    let mut format_float = false;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--morph" | "-m" => {
                i += 1;
                options.morph_factor = Some(parse_value(args, i, "morph")?);
            }
            "--mag" => {
                i += 1;
                options.magnitude = Some(parse_value(args, i, "mag")?);
            }
            "--phase" => {
                i += 1;
                options.phase = Some(parse_value(args, i, "phase")?);
            }
            "--invert-phase" => options.invert_phase = true,
            "--bypass" => options.bypass = true,
            "--formant" => {
                i += 1;
                options.formant_shift = Some(parse_value(args, i, "formant")?);
            }
            "--frame-size" => {
                i += 1;
                options.frame_size = Some(parse_value(args, i, "frame-size")?);
            }
            "--overlap" => {
                i += 1;
                options.overlap_factor = Some(parse_value(args, i, "overlap")?);
            }
            "--window" | "-w" => {
                i += 1;
                options.window_type = Some(parse_window_str(value_at(args, i, "window")?)?);
            }
            "--settings" => {
                i += 1;
                options.settings_path = Some(PathBuf::from(value_at(args, i, "settings")?));
            }
            "--save-settings" => {
                i += 1;
                options.save_settings_path =
                    Some(PathBuf::from(value_at(args, i, "save-settings")?));
            }
            "--24bit" => format_24bit = true,
            "--float" => format_float = true,
            "--verbose" | "-v" => options.verbose = true,
            other => bail!("unknown option '{}'", other),
        }
        i += 1;
    }

    options.encoding = if format_float {
        WavEncoding::Float32
    } else if format_24bit {
        WavEncoding::Pcm24
    } else {
        WavEncoding::Pcm16
    };
    Ok(options)
}

fn value_at<'a>(args: &'a [String], idx: usize, name: &str) -> anyhow::Result<&'a str> {
    args.get(idx)
        .map(String::as_str)
        .with_context(|| format!("--{} requires a value", name))
}

fn parse_value<T>(args: &[String], idx: usize, name: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = value_at(args, idx, name)?;
    raw.parse()
        .map_err(|e| anyhow::anyhow!("invalid {} '{}': {}", name, raw, e))
}

fn parse_window_str(s: &str) -> anyhow::Result<WindowType> {
    if let Some(beta_str) = s.strip_prefix("kaiser:") {
        return match beta_str.parse::<f64>() {
            Ok(beta) if beta >= 0.0 => Ok(WindowType::Kaiser((beta * 100.0).round() as u32)),
            _ => bail!(
                "invalid Kaiser beta: '{}' (expected positive number)",
                beta_str
            ),
        };
    }
    s.parse().map_err(|e: String| anyhow::anyhow!(e))
}

fn print_usage() {
    eprintln!("Usage: specmorph <main.wav> <aux.wav> <output.wav> [options]");
    eprintln!();
    eprintln!("Morph:");
    eprintln!("  --morph, -m <f>        Main/aux weight in [0, 1], 1 = main only (default: 0.5)");
    eprintln!("  --mag <name>           add, subtract, multiply, divide, linear-blend, all-pass");
    eprintln!("  --phase <name>         add, linear, linear-natural, smooth-step,");
    eprintln!("                         preserve-main-in, preserve-aux-in");
    eprintln!("  --invert-phase         Negate every output phase");
    eprintln!("  --bypass               Skip the morph, output delayed main");
    eprintln!("  --formant <f>          Reserved, no effect");
    eprintln!();
    eprintln!("Engine:");
    eprintln!("  --frame-size <N>       FFT frame size, power of two (default: 1024)");
    eprintln!("  --overlap <K>          Frames per frame length (default: 4, or the");
    eprintln!("                         smallest flat overlap for the window)");
    eprintln!("  --window, -w <type>    hann (default), blackman-harris, kaiser:<beta>");
    eprintln!();
    eprintln!("Files:");
    eprintln!("  --settings <json>      Load morph settings; flags override fields");
    eprintln!("  --save-settings <json> Write the effective morph settings");
    eprintln!("  --24bit                Write 24-bit PCM output (default: 16-bit)");
    eprintln!("  --float                Write 32-bit float output");
    eprintln!("  --verbose, -v          Debug logging (RUST_LOG also honored)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  specmorph drums.wav pad.wav out.wav --morph 0.3");
    eprintln!("  specmorph voice.wav synth.wav out.wav --mag all-pass --phase preserve-aux-in");
    eprintln!("  specmorph a.wav b.wav out.wav --frame-size 2048 --window blackman-harris --float");
}
