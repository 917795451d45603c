// src/trace.rs - Recorded landmark traces (CSV) for offline replay
use crate::landmarks::{Landmarks, HAND_LANDMARK_COUNT};
use anyhow::{anyhow, bail, ensure, Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use tracing::info;

// time, hand, then x/y per landmark
const FIXED_COLUMNS: usize = 2;
const TRACE_COLUMNS: usize = FIXED_COLUMNS + 2 * HAND_LANDMARK_COUNT;

#[derive(Debug, Clone, PartialEq)]
pub struct TraceFrame {
    /// Offset from the start of the recording.
    pub time: Duration,
    pub landmarks: Option<Landmarks>,
}

pub fn trace_header() -> Vec<String> {
    let mut header = vec!["time".to_string(), "hand".to_string()];
    for i in 0..HAND_LANDMARK_COUNT {
        header.push(format!("x{}", i));
        header.push(format!("y{}", i));
    }
    header
}

/// Loads a trace in the `time,hand,x0,y0,...,x20,y20` format.
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<TraceFrame>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Cannot open trace {:?}", path))?;
    read_trace(file).with_context(|| format!("Invalid trace {:?}", path))
}

pub fn read_trace<R: Read>(reader: R) -> Result<Vec<TraceFrame>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().context("Missing trace header")?;
    ensure!(
        headers.get(0) == Some("time") && headers.get(1) == Some("hand"),
        "Trace header must start with time,hand (found {:?})",
        headers
    );

    let mut frames: Vec<TraceFrame> = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        // Header is line 1
        let line = row_idx + 2;
        let record = result.with_context(|| format!("Unreadable row on line {}", line))?;
        let frame = parse_row(&record).with_context(|| format!("Bad row on line {}", line))?;

        if let Some(prev) = frames.last() {
            ensure!(
                frame.time >= prev.time,
                "Time goes backwards on line {} ({:.3}s after {:.3}s)",
                line,
                frame.time.as_secs_f64(),
                prev.time.as_secs_f64()
            );
        }

        frames.push(frame);
    }

    Ok(frames)
}

fn parse_row(record: &StringRecord) -> Result<TraceFrame> {
    ensure!(record.len() >= FIXED_COLUMNS, "Expected at least time and hand columns");

    let seconds: f64 = record[0].parse().context("Invalid time")?;
    ensure!(
        seconds.is_finite() && seconds >= 0.0,
        "Time must be a non-negative number of seconds, got {}",
        seconds
    );
    let time = Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("Time out of range: {}", seconds))?;

    let landmarks = match &record[1] {
        "0" => None,
        "1" => {
            ensure!(
                record.len() >= TRACE_COLUMNS,
                "Hand rows need {} columns, found {}",
                TRACE_COLUMNS,
                record.len()
            );

            let mut pairs = Vec::with_capacity(HAND_LANDMARK_COUNT);
            for i in 0..HAND_LANDMARK_COUNT {
                let col = FIXED_COLUMNS + 2 * i;
                let x: f64 = record[col].parse().with_context(|| format!("Invalid x{}", i))?;
                let y: f64 = record[col + 1].parse().with_context(|| format!("Invalid y{}", i))?;
                pairs.push((x, y));
            }

            Some(Landmarks::from_pairs(&pairs)?)
        }
        other => bail!("hand must be 0 or 1, got {:?}", other),
    };

    Ok(TraceFrame { time, landmarks })
}

/// Streams frames of a live session to a trace as they arrive.
pub struct TraceRecorder<W: Write = File> {
    writer: csv::Writer<W>,
    frames: usize,
}

impl TraceRecorder<File> {
    /// Creates the trace file (and its directory) and writes the header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create directory {:?}", parent))?;
        }

        let file = File::create(path).with_context(|| format!("Cannot create trace {:?}", path))?;
        info!("Recording trace to {:?}", path);
        Self::new(file)
    }
}

impl<W: Write> TraceRecorder<W> {
    pub fn new(out: W) -> Result<Self> {
        let mut writer = WriterBuilder::new().from_writer(out);
        writer.write_record(trace_header())?;
        Ok(Self { writer, frames: 0 })
    }

    pub fn add_frame(&mut self, time: Duration, landmarks: Option<&Landmarks>) -> Result<()> {
        let mut row = vec![format!("{:.6}", time.as_secs_f64())];
        match landmarks {
            Some(hand) => {
                row.push("1".to_string());
                for p in hand.points().iter().take(HAND_LANDMARK_COUNT) {
                    row.push(format!("{:.6}", p.x));
                    row.push(format!("{:.6}", p.y));
                }
            }
            None => {
                row.push("0".to_string());
                row.resize(TRACE_COLUMNS, String::new());
            }
        }

        self.writer.write_record(&row)?;
        self.frames += 1;
        Ok(())
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Flushes buffered rows and hands back the underlying writer.
    pub fn finish(self) -> Result<W> {
        let frames = self.frames;
        let out = self
            .writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush trace: {}", e.error()))?;
        info!("Recorded {} frames", frames);
        Ok(out)
    }
}
