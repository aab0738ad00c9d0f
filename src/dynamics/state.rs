use nalgebra::{Matrix6, Vector3, Vector6};

// ---------------------------------------------------------------------------
// Index mapping shared by state vectors and STM rows/columns
// ---------------------------------------------------------------------------

/// Component indices of a synodic state vector.
///
/// The same mapping applies to rows and columns of the 6x6
/// state-transition matrix: `stm[(VX, Z)]` is d(vx_f)/d(z_0).
pub mod idx {
    pub const X: usize = 0;
    pub const Y: usize = 1;
    pub const Z: usize = 2;
    pub const VX: usize = 3;
    pub const VY: usize = 4;
    pub const VZ: usize = 5;
}

/// 6x6 state-transition matrix.
pub type Stm = Matrix6<f64>;

// ---------------------------------------------------------------------------
// Synodic (rotating-frame) state
// ---------------------------------------------------------------------------

/// Nondimensional CR3BP state in the rotating synodic frame.
/// Frame: origin at the barycenter, x toward the secondary, z along the
/// angular momentum of the primaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynodicState {
    pub pos: Vector3<f64>, // [x, y, z]
    pub vel: Vector3<f64>, // [vx, vy, vz]
}

impl SynodicState {
    pub fn new(x: f64, y: f64, z: f64, vx: f64, vy: f64, vz: f64) -> Self {
        Self {
            pos: Vector3::new(x, y, z),
            vel: Vector3::new(vx, vy, vz),
        }
    }

    pub fn from_array(s: [f64; 6]) -> Self {
        Self::new(s[0], s[1], s[2], s[3], s[4], s[5])
    }

    pub fn from_vector(v: &Vector6<f64>) -> Self {
        Self::new(v[0], v[1], v[2], v[3], v[4], v[5])
    }

    pub fn to_vector(&self) -> Vector6<f64> {
        Vector6::new(
            self.pos.x, self.pos.y, self.pos.z, self.vel.x, self.vel.y, self.vel.z,
        )
    }

    pub fn to_array(&self) -> [f64; 6] {
        [
            self.pos.x, self.pos.y, self.pos.z, self.vel.x, self.vel.y, self.vel.z,
        ]
    }
}

// ---------------------------------------------------------------------------
// State derivative
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deriv {
    pub dpos: Vector3<f64>, // velocity
    pub dvel: Vector3<f64>, // acceleration in the rotating frame
}

impl Deriv {
    pub fn to_vector(&self) -> Vector6<f64> {
        Vector6::new(
            self.dpos.x, self.dpos.y, self.dpos.z, self.dvel.x, self.dvel.y, self.dvel.z,
        )
    }
}
