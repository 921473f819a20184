use std::f64::consts::PI;
use std::ops::{Add, AddAssign, Index};

use serde::{Deserialize, Serialize};

/// Rapidity assigned to momenta along the beam axis
pub const MAX_RAP: f64 = 1e5;

/// Four-momentum `[E, px, py, pz]`
#[derive(
    Copy, Clone, PartialEq, PartialOrd, Debug, Default, Deserialize, Serialize,
)]
pub struct Momentum(pub [f64; 4]);

impl Momentum {
    pub const fn new(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self([e, px, py, pz])
    }

    /// Construct from transverse momentum, rapidity, azimuth and mass
    pub fn from_pt_y_phi_m(pt: f64, y: f64, phi: f64, m: f64) -> Self {
        let mt = (pt * pt + m * m).sqrt();
        Self([mt * y.cosh(), pt * phi.cos(), pt * phi.sin(), mt * y.sinh()])
    }

    pub fn e(&self) -> f64 {
        self.0[0]
    }

    pub fn px(&self) -> f64 {
        self.0[1]
    }

    pub fn py(&self) -> f64 {
        self.0[2]
    }

    pub fn pz(&self) -> f64 {
        self.0[3]
    }

    pub fn pt2(&self) -> f64 {
        self.px() * self.px() + self.py() * self.py()
    }

    pub fn pt(&self) -> f64 {
        self.pt2().sqrt()
    }

    pub fn m2(&self) -> f64 {
        self.e() * self.e() - self.pt2() - self.pz() * self.pz()
    }

    /// Invariant mass, zero for (numerically) space-like momenta
    pub fn m(&self) -> f64 {
        self.m2().max(0.).sqrt()
    }

    /// Rapidity
    ///
    /// Momenta without transverse component along the beam axis get
    /// `±MAX_RAP`. Space-like momenta are treated as massless.
    pub fn rap(&self) -> f64 {
        let (e, pz) = (self.e(), self.pz());
        if self.pt2() == 0. && e == pz.abs() {
            return if pz == 0. { 0. } else { MAX_RAP.copysign(pz) };
        }
        let mt2 = self.pt2() + self.m2().max(0.);
        let e_plus_pz = e + pz.abs();
        let rap = 0.5 * (mt2 / (e_plus_pz * e_plus_pz)).ln();
        if pz > 0. {
            -rap
        } else {
            rap
        }
    }

    /// Azimuthal angle in `(-π, π]`
    pub fn phi(&self) -> f64 {
        if self.pt2() == 0. {
            0.
        } else {
            self.py().atan2(self.px())
        }
    }

    /// Squared distance in the rapidity-azimuth plane
    pub fn delta_r2(&self, other: &Momentum) -> f64 {
        delta_r2(self.rap(), self.phi(), other.rap(), other.phi())
    }

    pub fn delta_r(&self, other: &Momentum) -> f64 {
        self.delta_r2(other).sqrt()
    }

    /// `min(pt1², pt2²) ΔR²`
    pub fn kt_distance(&self, other: &Momentum) -> f64 {
        self.pt2().min(other.pt2()) * self.delta_r2(other)
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|p| p.is_finite())
    }
}

impl From<[f64; 4]> for Momentum {
    fn from(p: [f64; 4]) -> Self {
        Self(p)
    }
}

impl From<Momentum> for [f64; 4] {
    fn from(p: Momentum) -> Self {
        p.0
    }
}

impl Index<usize> for Momentum {
    type Output = f64;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.0[idx]
    }
}

impl Add for Momentum {
    type Output = Momentum;

    fn add(mut self, rhs: Momentum) -> Self::Output {
        self += rhs;
        self
    }
}

impl AddAssign for Momentum {
    fn add_assign(&mut self, rhs: Momentum) {
        for (p, q) in self.0.iter_mut().zip(rhs.0) {
            *p += q;
        }
    }
}

impl std::iter::Sum for Momentum {
    fn sum<I: Iterator<Item = Momentum>>(iter: I) -> Self {
        iter.fold(Momentum::default(), |acc, p| acc + p)
    }
}

/// Azimuthal difference wrapped to `(-π, π]`
pub fn delta_phi(phi1: f64, phi2: f64) -> f64 {
    let mut dphi = (phi1 - phi2) % (2. * PI);
    if dphi > PI {
        dphi -= 2. * PI;
    } else if dphi <= -PI {
        dphi += 2. * PI;
    }
    dphi
}

pub fn delta_r2(y1: f64, phi1: f64, y2: f64, phi2: f64) -> f64 {
    let dy = y1 - y2;
    let dphi = delta_phi(phi1, phi2);
    dy * dy + dphi * dphi
}
