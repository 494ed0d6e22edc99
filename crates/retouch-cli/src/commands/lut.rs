//! LUT printing command

use anyhow::Result;
use tracing::debug;

use crate::LutArgs;

pub fn run(args: LutArgs) -> Result<()> {
    let session = super::open_session(&args.curve)?;
    debug!(points = session.points().len(), spline = %session.builder().kind(), "lut");
    super::print_session(&session, args.format, false)
}
