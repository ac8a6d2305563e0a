use std::f32::consts::TAU;
use std::fs::File;
use std::hint::black_box;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use m4bjoin_core::{build_chapters, render_ffmetadata, ManifestEntry, MediaProbe, SymphoniaProbe};
use tempfile::TempDir;

struct SyntheticAudio {
    _dir: TempDir,
    path: PathBuf,
}

impl SyntheticAudio {
    fn new(file_name: &str, sample_rate: u32, seconds: u32, channels: u16) -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(file_name);
        write_sine_wave(&path, sample_rate, seconds, channels, 440.0)?;
        Ok(Self { _dir: dir, path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

fn write_sine_wave(
    path: &Path,
    sample_rate: u32,
    seconds: u32,
    channels: u16,
    frequency: f32,
) -> io::Result<()> {
    let total_frames = seconds as usize * sample_rate as usize;
    let amplitude = i16::MAX as f32 * 0.6;
    let block_align = channels * 2;
    let data_bytes = (total_frames * block_align as usize) as u32;

    let mut file = io::BufWriter::new(File::create(path)?);
    file.write_all(b"RIFF")?;
    file.write_all(&(36u32 + data_bytes).to_le_bytes())?;
    file.write_all(b"WAVE")?;
    file.write_all(b"fmt ")?;
    file.write_all(&16u32.to_le_bytes())?; // PCM header length
    file.write_all(&1u16.to_le_bytes())?; // PCM format
    file.write_all(&channels.to_le_bytes())?;
    file.write_all(&sample_rate.to_le_bytes())?;
    file.write_all(&(sample_rate * u32::from(block_align)).to_le_bytes())?;
    file.write_all(&block_align.to_le_bytes())?;
    file.write_all(&16u16.to_le_bytes())?;
    file.write_all(b"data")?;
    file.write_all(&data_bytes.to_le_bytes())?;

    for frame in 0..total_frames {
        let t = frame as f32 / sample_rate as f32;
        let sample = (amplitude * (frequency * TAU * t).sin()) as i16;
        for _ in 0..channels {
            file.write_all(&sample.to_le_bytes())?;
        }
    }

    file.flush()
}

fn manifest(len: usize) -> Vec<(ManifestEntry, Duration)> {
    (0..len)
        .map(|i| {
            let entry = ManifestEntry {
                filename: format!("{i:04} - Chapter.mp3"),
                title: (i % 3 != 0).then(|| format!("Chapter {i}; part #{}", i % 7)),
            };
            let duration = Duration::from_millis(600_000 + (i as u64 * 7_919) % 900_000);
            (entry, duration)
        })
        .collect()
}

fn chapter_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("chapters");

    for len in [10usize, 100, 1_000] {
        let tracks = manifest(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &tracks, |b, tracks| {
            b.iter(|| {
                let chapters = build_chapters(tracks.iter().map(|(entry, d)| (entry, *d)));
                black_box(render_ffmetadata(&chapters))
            });
        });
    }

    group.finish();
}

fn probe_benchmarks(c: &mut Criterion) {
    let fixture = SyntheticAudio::new("synthetic.wav", 44_100, 30, 2)
        .expect("failed to synthesize audio fixture");

    c.bench_function("symphonia_probe_wav_30s", |b| {
        b.iter(|| {
            SymphoniaProbe
                .probe(black_box(fixture.path()))
                .expect("probe failed")
        });
    });
}

criterion_group!(benches, chapter_benchmarks, probe_benchmarks);
criterion_main!(benches);
