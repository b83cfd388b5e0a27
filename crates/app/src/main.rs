use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use reactive_visualiser_core::{
    AnalysisEngine, AppConfig, EdgeBorder, FramePipeline, FrameBuffer, VisualiserError,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

fn main() -> reactive_visualiser_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Filter {
            input,
            output,
            filters,
            level,
            border,
        } => run_filter(config, &input, &output, &filters, level, border),
        Commands::Analyse { input, output } => run_analyse(config, &input, &output),
    }
}

fn run_filter(
    mut config: AppConfig,
    input: &Path,
    output: &Path,
    keys: &str,
    level: f32,
    border: Option<EdgeBorder>,
) -> reactive_visualiser_core::Result<()> {
    tracing::info!(?input, ?output, keys, level, "filtering image");

    if let Some(border) = border {
        config.filters.edge_border = border;
    }

    let decoded = image::open(input)
        .map_err(|err| VisualiserError::msg(format!("cannot read {}: {err}", input.display())))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();
    let source = FrameBuffer::from_raw(width as usize, height as usize, decoded.into_raw())?;

    let mut pipeline = FramePipeline::new(config)?;
    for key in keys.chars() {
        if !pipeline.key_pressed(key) {
            tracing::warn!(%key, "ignoring unbound key");
        }
    }

    let rendered = pipeline.process(&source, level)?;
    tracing::info!(
        scale = rendered.transform.scale,
        rotation = rendered.transform.rotation,
        status = %pipeline.status_line(),
        "frame processed"
    );

    let filtered = rendered.image.into_owned().into_raw();
    let result = image::RgbaImage::from_raw(width, height, filtered)
        .ok_or_else(|| VisualiserError::msg("filtered frame does not fit the source dimensions"))?;
    result
        .save(output)
        .map_err(|err| VisualiserError::msg(format!("cannot write {}: {err}", output.display())))?;
    Ok(())
}

fn run_analyse(
    mut config: AppConfig,
    input: &Path,
    output: &Path,
) -> reactive_visualiser_core::Result<()> {
    tracing::info!(?input, ?output, "running offline analysis");

    let (samples, sample_rate) = read_wav_mono(input)?;
    config.analysis.sample_rate = sample_rate;

    let mut engine = AnalysisEngine::new(config.analysis.clone())?;
    let block_size = config.analysis.fft_size();
    for block in samples.chunks(block_size) {
        engine.process_block(block)?;
    }

    tracing::info!(
        frames = engine.frames().len(),
        peak_level = engine.summary().peak_level,
        "analysis complete"
    );

    let report = AnalysisReport {
        summary: engine.summary(),
        frames: engine.frames(),
    };
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(output, json)?;
    Ok(())
}

#[derive(Serialize)]
struct AnalysisReport<'a> {
    summary: &'a reactive_visualiser_core::AnalysisSummary,
    frames: &'a [reactive_visualiser_core::AnalysisFrame],
}

/// Decodes a WAV file, averaging channels down to mono in `[-1, 1]`.
fn read_wav_mono(path: &Path) -> reactive_visualiser_core::Result<(Vec<f32>, u32)> {
    let wav_error = |err: hound::Error| {
        VisualiserError::msg(format!("cannot decode {}: {err}", path.display()))
    };

    let mut reader = hound::WavReader::open(path).map_err(wav_error)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(wav_error)?,
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / max_value))
                .collect::<Result<_, _>>()
                .map_err(wav_error)?
        }
    };

    let mono = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();
    Ok((mono, spec.sample_rate))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Audio-reactive frame filters", long_about = None)]
struct Cli {
    /// Optional JSON configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the frame pipeline over a single image.
    Filter {
        /// Source image (PNG or JPEG).
        input: PathBuf,
        /// Destination image; the format follows the extension.
        output: PathBuf,
        /// Filter keys to hold down: 1 threshold, 2 invert, 3 posterize, 4 edges.
        #[arg(short, long, default_value = "4")]
        filters: String,
        /// Audio level driving the reactive scale.
        #[arg(long, default_value_t = 0.0)]
        level: f32,
        /// Edge detection border handling: `untouched` or `replicate`.
        #[arg(long)]
        border: Option<EdgeBorder>,
    },
    /// Analyse a WAV file ahead of time and persist level, spectrum and waveform frames.
    Analyse {
        /// Path to the WAV file that should be analysed.
        input: PathBuf,
        /// Output path for the generated JSON report.
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_channels_are_averaged_to_mono() {
        let path = std::env::temp_dir().join(format!(
            "reactive-visualiser-{}-mixdown.wav",
            std::process::id()
        ));
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for (left, right) in [(i16::MAX, 0i16), (-16_384, -16_384), (8_192, -8_192)] {
            writer.write_sample(left).unwrap();
            writer.write_sample(right).unwrap();
        }
        writer.finalize().unwrap();

        let decoded = read_wav_mono(&path);
        std::fs::remove_file(&path).unwrap();
        let (mono, sample_rate) = decoded.unwrap();

        assert_eq!(sample_rate, 44_100);
        assert_eq!(mono.len(), 3);
        assert!((mono[0] - 0.5).abs() < 1e-3);
        assert!((mono[1] + 0.5).abs() < 1e-6);
        assert_eq!(mono[2], 0.0);
    }

    #[test]
    fn unreadable_wav_is_an_error() {
        let path = std::env::temp_dir().join("reactive-visualiser-missing-input.wav");
        assert!(read_wav_mono(&path).is_err());
    }
}
