use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::sync::Arc;

use gclog::{Event, EventSink, ParserConfig, ParsingMetrics, Pipeline};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: gclog [--all] <gc.log>...";

/// Initialise the tracing / logging subsystem. Events go to stdout, logs to stderr.
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gclog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Writes one JSON object per event. The first write error stops output.
struct JsonLines<W: Write> {
    out: W,
    include_throwaway: bool,
    error: Option<io::Error>,
}

impl<W: Write> EventSink for JsonLines<W> {
    fn accept(&mut self, event: Event) {
        if self.error.is_some() || (!self.include_throwaway && event.kind.is_throwaway()) {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, &event)
            .map_err(io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        if let Err(err) = result {
            self.error = Some(err);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut include_throwaway = false;
    let mut paths = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--all" => include_throwaway = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ => paths.push(arg),
        }
    }
    if paths.is_empty() {
        return Err(USAGE.into());
    }

    let config = ParserConfig::load()?;
    info!(
        "Preprocessing: enabled={}, discard_noise={}, max_block_lines={}",
        config.preprocess.enabled, config.preprocess.discard_noise, config.preprocess.max_block_lines
    );

    let metrics = Arc::new(ParsingMetrics::new());
    let mut sink = JsonLines {
        out: BufWriter::new(io::stdout().lock()),
        include_throwaway,
        error: None,
    };

    for path in &paths {
        let file = File::open(path).map_err(|e| {
            error!("Failed to open {}: {}", path, e);
            e
        })?;

        // One pipeline per file: multi-line constructs never span files.
        let mut pipeline = Pipeline::with_metrics(&config, Arc::clone(&metrics))?;
        for line in BufReader::new(file).lines() {
            pipeline.push(&line?, &mut sink);
        }
        pipeline.finish(&mut sink);

        if let Some(err) = sink.error.take() {
            return Err(err.into());
        }
        info!("Processed {}", path);
    }
    sink.out.flush()?;

    let snapshot = metrics.snapshot();
    info!(
        raw_lines = snapshot.raw_lines,
        events = snapshot.classified,
        merged = snapshot.merged_blocks,
        noise = snapshot.noise_discarded,
        avg_classify_us = snapshot.avg_classify_time_us,
        "Done"
    );
    if snapshot.unrecognized > 0 {
        warn!(
            "{} of {} lines unrecognized ({:.1}% recognized)",
            snapshot.unrecognized,
            snapshot.classified,
            snapshot.recognition_rate * 100.0
        );
    }
    if snapshot.failure_events > 0 {
        warn!(
            "{} collections ran after a collector failure",
            snapshot.failure_events
        );
    }
    Ok(())
}
