//! Example: stream a generated tone through a resampling session.
//!
//! Usage:
//!   cargo run --example stream_sine -- [IN_RATE] [OUT_RATE] [QUALITY]
//!
//! Defaults to 44100 -> 48000 Hz at HQ. Set `RUST_LOG=giztoy_resample=trace`
//! to see per-slice engine calls.

use giztoy_resample::{Frames, Quality, ResampleStream, SessionConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CHANNELS: usize = 2;
const SECONDS: usize = 2;
const CHUNK_MS: usize = 100;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let in_rate: f64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(44100.0);
    let out_rate: f64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(48000.0);
    let quality: Quality = args.next().map(|s| s.parse()).transpose()?.unwrap_or_default();

    let config = SessionConfig::new(in_rate, out_rate, CHANNELS).with_quality(quality);
    let mut stream = ResampleStream::new(config)?;
    info!(
        "streaming {}s of 1 kHz through {} ({} -> {} Hz, {})",
        SECONDS,
        stream.engine_name(),
        in_rate,
        out_rate,
        quality
    );

    // 1 kHz tone, left channel at full level, right at half.
    let frames = in_rate as usize * SECONDS;
    let tone: Vec<f32> = (0..frames)
        .flat_map(|i| {
            let v = (2.0 * std::f64::consts::PI * 1000.0 * i as f64 / in_rate).sin() as f32;
            [v * 0.9, v * 0.45]
        })
        .collect();

    let chunk_frames = (in_rate as usize * CHUNK_MS / 1000).max(1);
    let mut total = 0;
    for (i, piece) in tone.chunks(chunk_frames * CHANNELS).enumerate() {
        let out = stream.process(Frames::new(piece, CHANNELS)?, false)?;
        total += out.frames();
        info!(
            "chunk {:>3}: in={} out={} delay={:.1}",
            i,
            piece.len() / CHANNELS,
            out.frames(),
            stream.delay()
        );
    }

    let tail = stream.process(Frames::<f32>::new(&[], CHANNELS)?, true)?;
    total += tail.frames();
    info!("drained {} frames", tail.frames());

    let expected = (frames as f64 * out_rate / in_rate).round();
    info!(
        "total: {} frames in, {} frames out (expected about {}), clips={}",
        frames,
        total,
        expected,
        stream.clip_count()
    );
    Ok(())
}
