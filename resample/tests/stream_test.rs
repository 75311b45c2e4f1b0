//! Streaming session behavior against the default engine.

mod common;

use giztoy_resample::{
    Error, Frames, InterleavedBuf, Quality, ResampleStream, Sample, SampleFormat, SessionConfig,
    convert, convert_with,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use common::{DrainFailEngine, FailingEngine, sine, tones};

fn stream_whole<T: Sample>(cfg: SessionConfig, input: &[T]) -> InterleavedBuf<T> {
    let mut stream = ResampleStream::new(cfg).unwrap();
    stream.process(Frames::new(input, cfg.channels).unwrap(), true).unwrap()
}

fn check_stream_matches_batch<T: Sample>(cfg: SessionConfig, frames: usize) {
    let input = tones::<T>(cfg.in_rate, frames, cfg.channels);
    let streamed = stream_whole(cfg, &input);
    let batched = convert(&cfg, Frames::new(&input, cfg.channels).unwrap()).unwrap();
    assert_eq!(streamed.frames(), batched.frames(), "{cfg:?}");
    assert_eq!(streamed.as_slice(), batched.as_slice(), "{cfg:?}");
}

#[test]
fn test_stream_matches_batch() {
    check_stream_matches_batch::<f32>(SessionConfig::new(44100.0, 48000.0, 2), 20000);
    check_stream_matches_batch::<i16>(
        SessionConfig::new(48000.0, 16000.0, 1)
            .with_format(SampleFormat::Int16)
            .with_quality(Quality::Medium),
        30000,
    );
    check_stream_matches_batch::<f64>(
        SessionConfig::new(8000.0, 22050.0, 3)
            .with_format(SampleFormat::Float64)
            .with_quality(Quality::Low),
        9000,
    );
    check_stream_matches_batch::<i32>(
        SessionConfig::new(96000.0, 44100.0, 2)
            .with_format(SampleFormat::Int32)
            .with_quality(Quality::VeryHigh),
        12000,
    );
}

#[test]
fn test_arbitrary_chunks_match_single_call() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let setups = [(44100.0, 48000.0, 2), (16000.0, 8000.0, 1), (11025.0, 44100.0, 3)];
    for (in_rate, out_rate, channels) in setups {
        let cfg = SessionConfig::new(in_rate, out_rate, channels).with_quality(Quality::Medium);
        let frames = 12_345;
        let input = tones::<f32>(in_rate, frames, channels);
        let whole = stream_whole(cfg, &input);

        let mut stream = ResampleStream::new(cfg).unwrap();
        let mut pieces: Vec<f32> = Vec::new();
        let mut start = 0;
        while start < frames {
            // Zero-length pieces are allowed too.
            let len = rng.gen_range(0..3000).min(frames - start);
            let piece = &input[start * channels..(start + len) * channels];
            let out = stream.process(Frames::new(piece, channels).unwrap(), false).unwrap();
            pieces.extend_from_slice(&out);
            start += len;
        }
        let tail = stream.process(Frames::<f32>::new(&[], channels).unwrap(), true).unwrap();
        pieces.extend_from_slice(&tail);

        assert_eq!(pieces.len(), whole.len(), "{in_rate} -> {out_rate}");
        assert_eq!(pieces, whole.as_slice(), "{in_rate} -> {out_rate}");
    }
}

#[test]
fn test_sine_scenario() {
    let cfg = SessionConfig::new(44100.0, 48000.0, 2).with_quality(Quality::High);
    let input = sine(1000.0, 44100.0, 44100, 2, 1.0);

    let mut stream = ResampleStream::new(cfg).unwrap();
    let out = stream.process(Frames::new(&input, 2).unwrap(), true).unwrap();

    let frames = out.frames();
    assert!((47995..=48005).contains(&frames), "got {frames} frames");
    assert_eq!(stream.clip_count(), 0);

    // The tone starts at zero phase; the filter ramps in from silence.
    let first = out.frame(0).unwrap();
    assert!(first[0].abs() < 0.5, "first frame {first:?}");

    // Output frame j sits at input time j / ratio, so the phase carries over.
    for j in 1000..1100 {
        let expected = (2.0 * std::f64::consts::PI * 1000.0 * j as f64 / 48000.0).sin() as f32;
        let got = out.frame(j).unwrap()[0];
        assert!((got - expected).abs() < 0.03, "frame {j}: {got} vs {expected}");
    }

    // Both channels carry the same signal.
    for frame in 0..frames {
        let f = out.frame(frame).unwrap();
        assert_eq!(f[0], f[1]);
    }

    let left: Vec<f32> = (10_000..40_000).map(|i| out.frame(i).unwrap()[0]).collect();
    let peak = left.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    assert!((0.95..=1.05).contains(&peak), "peak {peak}");

    // 30000 frames at 48 kHz hold 625 cycles of 1 kHz.
    let crossings = left.windows(2).filter(|w| (w[0] < 0.0) != (w[1] < 0.0)).count();
    assert!((1248..=1252).contains(&crossings), "{crossings} zero crossings");
}

fn peak_index(samples: &[f32]) -> usize {
    samples
        .iter()
        .enumerate()
        .fold((0, 0.0f32), |best, (i, v)| if v.abs() > best.1 { (i, v.abs()) } else { best })
        .0
}

#[test]
fn test_transients_stay_aligned_across_chunks() {
    let mut rng = StdRng::seed_from_u64(0xa11);
    for (in_rate, out_rate) in [(44100.0, 48000.0), (48000.0, 16000.0), (16000.0, 16000.0)] {
        let ratio = out_rate / in_rate;
        let clicks = [37usize, 5000, 21000];
        let mut input = vec![0.0f32; 30000];
        for &k in &clicks {
            input[k] = 0.8;
        }

        let mut stream = ResampleStream::new(SessionConfig::new(in_rate, out_rate, 1)).unwrap();
        let mut out: Vec<f32> = Vec::new();
        let mut start = 0;
        while start < input.len() {
            let len = rng.gen_range(1..4000).min(input.len() - start);
            let piece = Frames::mono(&input[start..start + len]);
            out.extend_from_slice(&stream.process(piece, false).unwrap());
            start += len;
        }
        out.extend_from_slice(&stream.process(Frames::<f32>::mono(&[]), true).unwrap());
        assert_eq!(out.len(), (30000.0 * ratio).round() as usize);

        // Search halfway between neighbouring clicks.
        let bounds = [0, 2500, 13000, 30000].map(|b| ((b as f64 * ratio) as usize).min(out.len()));
        for (i, &k) in clicks.iter().enumerate() {
            let window = &out[bounds[i]..bounds[i + 1]];
            let peak = (bounds[i] + peak_index(window)) as i64;
            let expected = (k as f64 * ratio).round() as i64;
            assert!(
                (peak - expected).abs() <= 1,
                "{in_rate} -> {out_rate}: click at {k} peaked at {peak}, expected {expected}"
            );
        }
    }
}

#[test]
fn test_chunked_total_equals_rounded_ratio() {
    let cfg = SessionConfig::new(44100.0, 48000.0, 2);
    let input = sine(440.0, 44100.0, 44100, 2, 0.5);

    let mut stream = ResampleStream::new(cfg).unwrap();
    let mut total = 0;
    for piece in input.chunks(2 * 441) {
        total += stream.process(Frames::new(piece, 2).unwrap(), false).unwrap().frames();
        assert!(stream.delay() >= 0.0);
    }
    total += stream.process(Frames::<f32>::new(&[], 2).unwrap(), true).unwrap().frames();
    assert_eq!(total, 48000);
    assert_eq!(stream.delay(), 0.0);
}

#[test]
fn test_state_machine() {
    let cfg = SessionConfig::new(16000.0, 48000.0, 1);
    let input = sine(300.0, 16000.0, 1600, 1, 0.5);
    let mut stream = ResampleStream::new(cfg).unwrap();

    // Active -> Active
    stream.process(Frames::mono(&input), false).unwrap();
    assert!(!stream.is_ended());

    // Active -> Ended
    stream.process(Frames::mono(&input), true).unwrap();
    assert!(stream.is_ended());

    // Ended rejects input, including an empty last call.
    for last in [false, true] {
        assert!(matches!(stream.process(Frames::mono(&input), last), Err(Error::StreamEnded)));
        assert!(matches!(
            stream.process(Frames::<f32>::mono(&[]), last),
            Err(Error::StreamEnded)
        ));
        assert!(stream.is_ended());
    }

    // Ended -> Active
    stream.clear().unwrap();
    assert!(!stream.is_ended());
    let out = stream.process(Frames::mono(&input), true).unwrap();
    assert_eq!(out.frames(), 4800);

    // Clearing an active stream is allowed and restarts it.
    stream.clear().unwrap();
    stream.process(Frames::mono(&input), false).unwrap();
    stream.clear().unwrap();
    assert_eq!(stream.delay(), 0.0);
    assert_eq!(stream.process(Frames::mono(&input), true).unwrap().frames(), 4800);
}

#[test]
fn test_clear_reproduces_fresh_output() {
    let cfg = SessionConfig::new(22050.0, 16000.0, 2);
    let input = tones::<f32>(22050.0, 5000, 2);

    let mut stream = ResampleStream::new(cfg).unwrap();
    let first = stream.process(Frames::new(&input, 2).unwrap(), true).unwrap();
    stream.clear().unwrap();
    let second = stream.process(Frames::new(&input, 2).unwrap(), true).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_int16_clipping_and_reset() {
    let cfg = SessionConfig::new(16000.0, 44100.0, 1).with_format(SampleFormat::Int16);
    // Full-scale square wave overshoots after band-limiting.
    let square: Vec<i16> = (0..8000)
        .map(|i| if (i / 20) % 2 == 0 { i16::MAX } else { i16::MIN })
        .collect();

    let mut stream = ResampleStream::new(cfg).unwrap();
    let mut last_clips = 0;
    for piece in square.chunks(1000) {
        stream.process(Frames::mono(piece), false).unwrap();
        let clips = stream.clip_count();
        assert!(clips >= last_clips, "clip count went down");
        last_clips = clips;
    }
    stream.process(Frames::<i16>::mono(&[]), true).unwrap();
    assert!(stream.clip_count() > 0);
    assert!(stream.clip_count() >= last_clips);

    stream.clear().unwrap();
    assert_eq!(stream.clip_count(), 0);

    // A quiet signal does not clip.
    let quiet = tones::<i16>(16000.0, 4000, 1);
    stream.process(Frames::mono(&quiet), true).unwrap();
    assert_eq!(stream.clip_count(), 0);
}

#[test]
fn test_engine_process_error() {
    let cfg = SessionConfig::new(8000.0, 16000.0, 1);
    let mut stream = ResampleStream::<FailingEngine>::with_engine(cfg).unwrap();
    assert_eq!(stream.engine_name(), "failing");

    let input = [0.0f32; 100];
    let err = stream.process(Frames::mono(&input), false).unwrap_err();
    assert!(matches!(err, Error::EngineProcess(ref msg) if msg == "scripted process failure"));
    assert!(!stream.is_ended());

    assert!(matches!(stream.clear(), Err(Error::EngineReset(_))));
}

#[test]
fn test_drain_failure_still_ends_stream() {
    let cfg = SessionConfig::new(8000.0, 16000.0, 2);
    let mut stream = ResampleStream::<DrainFailEngine>::with_engine(cfg).unwrap();
    let input = [0.5f32; 200];

    let out = stream.process(Frames::new(&input, 2).unwrap(), false).unwrap();
    assert_eq!(out.frames(), 100);

    let err = stream.process(Frames::new(&input, 2).unwrap(), true).unwrap_err();
    assert!(matches!(err, Error::EngineProcess(ref msg) if msg.contains("drain")));
    assert!(stream.is_ended());
    assert!(matches!(
        stream.process(Frames::new(&input, 2).unwrap(), false),
        Err(Error::StreamEnded)
    ));

    stream.clear().unwrap();
    assert!(!stream.is_ended());
}

#[test]
fn test_batch_with_failing_engine() {
    let cfg = SessionConfig::new(8000.0, 16000.0, 1);
    let input = [0.0f32; 100];
    assert!(matches!(
        convert_with::<FailingEngine, f32>(&cfg, Frames::mono(&input)),
        Err(Error::EngineProcess(_))
    ));
    // Empty input still reaches the drain call.
    assert!(matches!(
        convert_with::<FailingEngine, f32>(&cfg, Frames::mono(&[])),
        Err(Error::EngineProcess(_))
    ));
}
