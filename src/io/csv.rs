use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::sim::Sample;

const HEADER: &str = "t,x,y,z,vx,vy,vz,roll_deg,pitch_deg,yaw_deg,wx,wy,wz,speed,mode,pending";

/// Write one row per sample. Attitude is exported as roll/pitch/yaw in
/// degrees, angular velocity in rad/s (world frame).
pub fn write_telemetry<W: Write>(out: &mut W, samples: &[Sample]) -> io::Result<()> {
    writeln!(out, "{}", HEADER)?;
    for s in samples {
        let (roll, pitch, yaw) = s.quat.euler_angles();
        writeln!(
            out,
            "{:.3},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.3},{:.3},{:.3},{:.5},{:.5},{:.5},{:.4},{},{}",
            s.time,
            s.pos.x,
            s.pos.y,
            s.pos.z,
            s.vel.x,
            s.vel.y,
            s.vel.z,
            roll.to_degrees(),
            pitch.to_degrees(),
            yaw.to_degrees(),
            s.omega.x,
            s.omega.y,
            s.omega.z,
            s.vel.norm(),
            s.mode,
            s.pending,
        )?;
    }
    Ok(())
}

pub fn write_telemetry_file(path: impl AsRef<Path>, samples: &[Sample]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_telemetry(&mut out, samples)?;
    out.flush()
}
