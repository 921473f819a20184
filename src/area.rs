use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{positive, ConfigError};
use crate::momentum::Momentum;

/// Transverse momentum carried by each ghost
pub const GHOST_PT: f64 = 1e-100;

/// Explicit ghosts on a regular rapidity-azimuth grid
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GhostSpec {
    max_rap: f64,
    repeats: u32,
    ghost_area: f64,
}

impl GhostSpec {
    pub fn new(
        max_rap: f64,
        repeats: u32,
        ghost_area: f64,
    ) -> Result<Self, ConfigError> {
        let max_rap = positive("Ghost_EtaMax", max_rap)?;
        let ghost_area = positive("GhostArea", ghost_area)?;
        if repeats != 1 {
            return Err(ConfigError::GhostRepeats(repeats));
        }
        Ok(Self {
            max_rap,
            repeats,
            ghost_area,
        })
    }

    pub fn max_rap(&self) -> f64 {
        self.max_rap
    }

    pub fn repeats(&self) -> u32 {
        self.repeats
    }

    /// Number of grid cells in rapidity and azimuth
    fn grid(&self) -> (usize, usize) {
        let cell = self.ghost_area.sqrt();
        let n_rap = ((2. * self.max_rap / cell).ceil() as usize).max(1);
        let n_phi = ((2. * PI / cell).ceil() as usize).max(1);
        (n_rap, n_phi)
    }

    /// Area represented by a single ghost
    ///
    /// The grid is adjusted to cover the rapidity range exactly, so this
    /// differs slightly from the requested ghost area.
    pub fn actual_ghost_area(&self) -> f64 {
        let (n_rap, n_phi) = self.grid();
        (2. * self.max_rap / n_rap as f64) * (2. * PI / n_phi as f64)
    }

    pub fn n_ghosts(&self) -> usize {
        let (n_rap, n_phi) = self.grid();
        n_rap * n_phi
    }

    /// Ghost momenta at the centres of the grid cells
    pub fn ghosts(&self) -> Vec<Momentum> {
        let (n_rap, n_phi) = self.grid();
        let d_rap = 2. * self.max_rap / n_rap as f64;
        let d_phi = 2. * PI / n_phi as f64;
        let mut ghosts = Vec::with_capacity(n_rap * n_phi);
        for i in 0..n_rap {
            let y = -self.max_rap + (i as f64 + 0.5) * d_rap;
            for j in 0..n_phi {
                let phi = -PI + (j as f64 + 0.5) * d_phi;
                ghosts.push(Momentum::from_pt_y_phi_m(GHOST_PT, y, phi, 0.));
            }
        }
        ghosts
    }
}
