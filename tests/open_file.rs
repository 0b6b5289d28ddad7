//! End-to-end tests through the public API: files on disk, opened by path.

use anyhow::{Context, Result, ensure};
use sigrun::{
    BinaryHeader, GeometryOutcome, ListenerRegistry, ProgressListener, SegyError, SegyFormat,
    Sigrun, TextHeader, TraceHeader, geometry,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

const SAMPLES: i32 = 16;

/// Temporary file removed on drop.
struct TempSegy {
    path: PathBuf,
}

impl TempSegy {
    fn write(name: &str, bytes: &[u8]) -> Result<Self> {
        let path = std::env::temp_dir()
            .join(format!("sigrun-{}-{}-{}.sgy", name, std::process::id(), bytes.len()));
        std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        Ok(Self { path })
    }
}

impl Drop for TempSegy {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Serialize a survey of `rows` x `columns` traces with `place` choosing the axis fields.
fn survey_bytes<F>(format: &SegyFormat, rows: i32, columns: i32, place: F) -> Result<Vec<u8>>
where
    F: Fn(&mut TraceHeader, i32, i32),
{
    let mut bytes = vec![0u8; format.header_length()];
    let (text, binary) = bytes.split_at_mut(format.text.size());

    TextHeader::from_lines((1..=40).map(|n| format!("C{:2} INTEGRATION SURVEY", n)))
        .encode(&format.text, text)?;
    BinaryHeader {
        sample_interval: 2000,
        samples_per_trace: SAMPLES,
        data_sample_code: 3,
        ..Default::default()
    }
    .encode(&format.binary, binary)?;

    let mut trace = vec![0u8; format.trace.size()];
    for row in 0..rows {
        for column in 0..columns {
            let mut header = TraceHeader { number_of_samples: SAMPLES, ..Default::default() };
            place(&mut header, row, column);
            trace.fill(0);
            header.encode(&format.trace, &mut trace)?;
            bytes.extend_from_slice(&trace);
            bytes.resize(bytes.len() + SAMPLES as usize * 2, 0);
        }
    }
    Ok(bytes)
}

#[test]
fn open_by_path_and_infer_grid() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();
    let format = SegyFormat::standard();
    let bytes = survey_bytes(&format, 5, 7, |header, row, column| {
        header.inline = 2000 + row;
        header.crossline = 300 + 5 * column;
    })?;
    let file = TempSegy::write("grid", &bytes)?;

    let mut stream = Sigrun::open(&file.path).context("opening survey")?;
    ensure!(stream.text_header().printable_lines()[0].starts_with("C 1 INTEGRATION SURVEY"));
    ensure!(stream.sample_format().size() == 2);
    ensure!(stream.number_of_traces(SAMPLES) == Some(35));

    let inlines: Vec<i32> = stream.traces().map(|trace| trace.header.inline).collect();
    ensure!(inlines.len() == 35);
    ensure!(inlines.windows(2).all(|pair| pair[0] <= pair[1]));

    let report = geometry::infer_geometry(&mut stream, SAMPLES);
    match report.outcome() {
        GeometryOutcome::Gridded(grid) => {
            ensure!(grid.inline_count == 5 && grid.xline_count == 7);
            ensure!(grid.xline_increment == 5);
            ensure!(grid.xline_axis().map(|axis| axis.field) == Some("crossline"));
        }
        other => anyhow::bail!("expected a grid, got {:?}", other),
    }

    stream.close()?;
    ensure!(matches!(stream.close(), Err(SegyError::Closed)));
    Ok(())
}

#[test]
fn yaml_layout_moves_axis_fields() -> Result<()> {
    let format = SegyFormat::from_yaml_str(
        r#"
text_encoding: ascii
trace:
  - { name: number_of_samples, start: 114, end: 116 }
  - { name: inline, start: 16, end: 20 }
  - { name: crossline, start: 20, end: 24 }
"#,
    )?;
    let bytes = survey_bytes(&format, 3, 4, |header, row, column| {
        header.inline = 10 + row;
        header.crossline = 1 + column;
    })?;
    ensure!(&bytes[0..3] == b"C 1", "ASCII text header");

    let file = TempSegy::write("yaml", &bytes)?;
    let progress = Arc::new(AtomicU64::new(0));
    let sink = Arc::clone(&progress);
    let listeners = Arc::new(ListenerRegistry::with_listeners([Arc::new(move |offset: u64| {
        sink.store(offset, Ordering::Relaxed)
    }) as Arc<dyn ProgressListener>]));

    let mut stream = Sigrun::open_with(&file.path, format, listeners)?;
    let count = stream.traces().count();
    ensure!(count == 12);
    ensure!(progress.load(Ordering::Relaxed) == bytes.len() as u64);

    // read back with the standard layout the axes land in other fields
    let mut standard = Sigrun::open(&file.path)?;
    let header = standard.trace_header(1, SAMPLES).context("trace 1")?;
    ensure!(header.inline == 0 && header.crossline == 0);
    ensure!(header.energy_source_point == 10 && header.ensemble_number == 2);
    Ok(())
}

#[test]
fn missing_and_foreign_files() -> Result<()> {
    let result = Sigrun::open("/no/such/dir/survey.sgy");
    ensure!(matches!(result, Err(SegyError::File { .. })));

    let file = TempSegy::write("short", b"not a seismic file")?;
    let result = Sigrun::open(&file.path);
    ensure!(matches!(result, Err(SegyError::NotSegy { .. })));
    Ok(())
}
