//! Raw buffer mapping command

use anyhow::{Context, Result, bail};
use retouch_core::{Raster, Sample};
use retouch_lut::ToneLut;
use retouch_ops::{MapJob, MappingWorker, RgbToneCurves};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::ApplyArgs;

const WORKER_TIMEOUT: Duration = Duration::from_secs(600);

pub fn run(args: ApplyArgs, verbose: u8) -> Result<()> {
    let master = super::open_session(&args.curve)?.lut().clone();
    let job = build_job(&args, master)?;

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read: {}", args.input.display()))?;

    if verbose > 0 {
        println!(
            "Mapping {} ({}x{}x{}, {}-bit)",
            args.input.display(),
            args.width,
            args.height,
            args.channels,
            args.depth
        );
    }

    let start = Instant::now();
    let out = match args.depth.as_str() {
        "8" => {
            let src = Raster::from_data(args.width, args.height, args.channels, bytes)
                .context("Input size does not match -W/-H/-c")?;
            map_raster(src, &job, args.background)?.into_data()
        }
        "16" => {
            if bytes.len() % 2 != 0 {
                bail!("16-bit input has an odd byte count ({})", bytes.len());
            }
            let samples = bytes
                .chunks_exact(2)
                .map(|b| u16::from_le_bytes([b[0], b[1]]))
                .collect();
            let src = Raster::from_data(args.width, args.height, args.channels, samples)
                .context("Input size does not match -W/-H/-c")?;
            map_raster(src, &job, args.background)?
                .into_data()
                .into_iter()
                .flat_map(u16::to_le_bytes)
                .collect()
        }
        other => bail!("Unsupported depth: {other}"),
    };
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "mapped");

    write_output(&args.output, &out)?;
    if verbose > 0 {
        println!("Done.");
    }
    Ok(())
}

/// Master-only job, or per-channel curves if any channel preset is given.
fn build_job(args: &ApplyArgs, master: ToneLut) -> Result<MapJob> {
    if args.red.is_none() && args.green.is_none() && args.blue.is_none() {
        return Ok(MapJob::Lut(master));
    }
    let channel = |path: &Option<std::path::PathBuf>| -> Result<ToneLut> {
        match path {
            Some(p) => Ok(super::load_preset(p)?.session()?.lut().clone()),
            None => Ok(ToneLut::identity()),
        }
    };
    Ok(MapJob::Rgb(RgbToneCurves::from_luts(
        channel(&args.red)?,
        channel(&args.green)?,
        channel(&args.blue)?,
        master,
    )))
}

fn map_raster<T: Sample>(src: Raster<T>, job: &MapJob, background: bool) -> Result<Raster<T>> {
    if !background {
        return Ok(job.run(&src));
    }
    let mut worker = MappingWorker::spawn(src)?;
    let generation = worker.submit(job.clone())?;
    debug!(generation, "waiting for mapping worker");
    match worker.wait(WORKER_TIMEOUT)? {
        Some(mapped) => Ok(mapped.image),
        None => bail!("Mapping worker timed out"),
    }
}

fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    std::fs::write(path, data).with_context(|| format!("Failed to write: {}", path.display()))
}
