use std::io::Write;
use std::path::Path;

use serde::Serialize;

use super::{create_file, OutputError};
use crate::sim::propagator::TrajectoryPoint;

/// One CSV row: t, x, y, z, vx, vy, vz, jacobi (nondimensional).
#[derive(Debug, Serialize)]
struct Row {
    t: f64,
    x: f64,
    y: f64,
    z: f64,
    vx: f64,
    vy: f64,
    vz: f64,
    jacobi: f64,
}

impl From<&TrajectoryPoint> for Row {
    fn from(p: &TrajectoryPoint) -> Self {
        Row {
            t: p.time,
            x: p.state.pos.x,
            y: p.state.pos.y,
            z: p.state.pos.z,
            vx: p.state.vel.x,
            vy: p.state.vel.y,
            vz: p.state.vel.z,
            jacobi: p.jacobi,
        }
    }
}

/// Write a sampled trajectory as CSV with a header row.
pub fn write_trajectory<W: Write>(writer: W, trajectory: &[TrajectoryPoint]) -> Result<(), OutputError> {
    let mut wtr = ::csv::Writer::from_writer(writer);
    for p in trajectory {
        wtr.serialize(Row::from(p))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write trajectory to a CSV file, creating parent directories.
pub fn write_trajectory_file<P: AsRef<Path>>(
    path: P,
    trajectory: &[TrajectoryPoint],
) -> Result<(), OutputError> {
    let file = create_file(path.as_ref())?;
    write_trajectory(std::io::BufWriter::new(file), trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::SynodicState;

    fn point(t: f64) -> TrajectoryPoint {
        TrajectoryPoint {
            time: t,
            state: SynodicState::new(1.0 + t, 0.0, -0.1, 0.0, 0.2, 0.0),
            jacobi: 3.05,
        }
    }

    #[test]
    fn csv_output_has_header_and_rows() {
        let traj = vec![point(0.0), point(0.5)];
        let mut buf = Vec::new();
        write_trajectory(&mut buf, &traj).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "t,x,y,z,vx,vy,vz,jacobi");
        assert_eq!(lines.len(), 3); // header + 2 data rows
        assert_eq!(lines[2], "0.5,1.5,0.0,-0.1,0.0,0.2,0.0,3.05");
    }

    #[test]
    fn values_survive_a_read_back() {
        let traj = vec![point(0.25)];
        let mut buf = Vec::new();
        write_trajectory(&mut buf, &traj).unwrap();
        let mut rdr = ::csv::Reader::from_reader(buf.as_slice());
        let rec = rdr.records().next().unwrap().unwrap();
        let x: f64 = rec[1].parse().unwrap();
        assert_eq!(x, 1.25);
    }
}
