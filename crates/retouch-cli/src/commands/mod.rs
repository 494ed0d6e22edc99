//! CLI command implementations

pub mod apply;
pub mod edit;
pub mod lut;

use anyhow::{Context, Result, bail};
use retouch_curve::{CurveBuilder, CurvePreset, CurveSession, SplineKind};
use retouch_lut::ToneLut;
use serde::Serialize;
use std::path::Path;

use crate::{CurveArgs, OutputFormat};

/// Parses `x,y` into a point.
pub fn parse_xy(s: &str) -> Result<(f32, f32)> {
    let (x, y) = s
        .split_once(',')
        .with_context(|| format!("expected X,Y, got '{s}'"))?;
    let x = x.trim().parse().with_context(|| format!("invalid x in '{s}'"))?;
    let y = y.trim().parse().with_context(|| format!("invalid y in '{s}'"))?;
    Ok((x, y))
}

/// Load a curve preset
pub fn load_preset(path: &Path) -> Result<CurvePreset> {
    CurvePreset::from_file(path).with_context(|| format!("Failed to load preset: {}", path.display()))
}

/// Resolves the spline from `--spline`/`--tension`, falling back to the preset.
fn spline_kind(args: &CurveArgs, preset: Option<&CurvePreset>) -> Result<SplineKind> {
    let mut kind = match (&args.spline, preset) {
        (Some(name), _) => name.parse::<SplineKind>().map_err(anyhow::Error::msg)?,
        (None, Some(p)) => p.spline_kind(),
        (None, None) => SplineKind::default(),
    };
    if let Some(tension) = args.tension {
        match &mut kind {
            SplineKind::Cardinal { tension: t } => *t = tension,
            SplineKind::Natural => bail!("--tension needs a cardinal spline"),
        }
    }
    Ok(kind)
}

/// Opens a session from the preset (or the default endpoints) and adds the
/// `-p` points.
pub fn open_session(args: &CurveArgs) -> Result<CurveSession> {
    let preset = args.preset.as_deref().map(load_preset).transpose()?;
    let builder = CurveBuilder::new(spline_kind(args, preset.as_ref())?);

    let mut session = match &preset {
        Some(p) => CurveSession::with_points(p.point_set()?, builder)?,
        None => CurveSession::with_points(Default::default(), builder)?,
    };
    for raw in &args.points {
        let (x, y) = parse_xy(raw)?;
        session
            .add_point(x, y)
            .with_context(|| format!("cannot add point {raw}"))?;
    }
    Ok(session)
}

/// JSON shape for `lut` and `edit` output.
#[derive(Serialize)]
struct CurveReport<'a> {
    spline: String,
    points: Vec<ReportPoint<'a>>,
    lut: &'a ToneLut,
}

#[derive(Serialize)]
struct ReportPoint<'a> {
    id: &'a str,
    x: f32,
    y: f32,
    locked: bool,
}

/// Prints the session's points and LUT.
pub fn print_session(session: &CurveSession, format: OutputFormat, with_points: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let report = CurveReport {
                spline: session.builder().kind().to_string(),
                points: session
                    .points()
                    .iter()
                    .map(|p| ReportPoint {
                        id: p.id.as_str(),
                        x: p.x,
                        y: p.y,
                        locked: p.locked,
                    })
                    .collect(),
                lut: session.lut(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            if with_points {
                println!("# spline: {}", session.builder().kind());
                for p in session.points() {
                    let lock = if p.locked { " (locked)" } else { "" };
                    println!("# {:>8}  {:.4}  {:.4}{}", p.id, p.x, p.y, lock);
                }
            }
            for (i, (t, v)) in session.lut().plot_points().enumerate() {
                println!("{i:3}  {t:.2}  {v:.6}");
            }
        }
    }
    Ok(())
}
