//! Control-point edit replay command

use anyhow::{Context, Result, bail};
use retouch_curve::{CurvePreset, CurveSession, PointId, SplineKind};
use std::str::FromStr;
use tracing::info;

use crate::{EditArgs, OutputFormat};

/// One edit op from the command line.
#[derive(Debug, Clone, PartialEq)]
enum EditOp {
    Add(f32, f32),
    Move(PointId, f32, f32),
    Remove(PointId),
    Reset,
    Spline(SplineKind),
}

impl FromStr for EditOp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (verb, rest) = s.split_once(':').unwrap_or((s, ""));
        match verb {
            "add" => {
                let (x, y) = super::parse_xy(rest)?;
                Ok(Self::Add(x, y))
            }
            "move" => {
                let (id, xy) = rest
                    .split_once(':')
                    .with_context(|| format!("expected move:ID:X,Y, got '{s}'"))?;
                let (x, y) = super::parse_xy(xy)?;
                Ok(Self::Move(PointId::new(id), x, y))
            }
            "remove" if !rest.is_empty() => Ok(Self::Remove(PointId::new(rest))),
            "reset" => Ok(Self::Reset),
            "spline" => Ok(Self::Spline(rest.parse().map_err(anyhow::Error::msg)?)),
            _ => bail!("unknown edit op '{s}'"),
        }
    }
}

/// Applies `op` and returns a one-line outcome.
fn apply(session: &mut CurveSession, op: &EditOp) -> Result<String> {
    Ok(match op {
        EditOp::Add(x, y) => match session.add_point(*x, *y) {
            Ok(id) => format!("added {id}"),
            Err(e) => format!("rejected: {e}"),
        },
        EditOp::Move(id, x, y) => {
            if session.move_point(id, *x, *y) {
                format!("moved {id}")
            } else {
                format!("ignored move of {id}")
            }
        }
        EditOp::Remove(id) => {
            if session.remove_point(id) {
                format!("removed {id}")
            } else {
                format!("ignored removal of {id}")
            }
        }
        EditOp::Reset => {
            session.reset()?;
            "reset".to_string()
        }
        EditOp::Spline(kind) => {
            session.set_spline(*kind)?;
            format!("spline {kind}")
        }
    })
}

pub fn run(args: EditArgs) -> Result<()> {
    let ops = args
        .ops
        .iter()
        .map(|s| s.parse::<EditOp>())
        .collect::<Result<Vec<_>>>()?;

    let mut session = super::open_session(&args.curve)?;
    for (raw, op) in args.ops.iter().zip(&ops) {
        let outcome = apply(&mut session, op)?;
        info!(op = %raw, %outcome, "edit");
        if matches!(args.format, OutputFormat::Text) {
            println!("# {raw}: {outcome}");
        }
    }

    if let Some(path) = &args.save {
        CurvePreset::from_session(&session)
            .save(path)
            .with_context(|| format!("Failed to save preset: {}", path.display()))?;
    }

    super::print_session(&session, args.format, true)
}
