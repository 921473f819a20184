//! N-subjettiness, see [arXiv:1011.2268](https://arxiv.org/abs/1011.2268)
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use log::{debug, trace};

use crate::cluster_sequence::exclusive_jets;
use crate::compound::CompoundJet;
use crate::error::{positive, ConfigError};
use crate::jets::JetAlgorithm;
use crate::momentum::{delta_r2, Momentum};
use crate::particle::InputParticle;

/// Maximum number of axis refinement steps
pub const MAX_ITERATIONS: usize = 100;
/// Axes moving by less than this are considered converged
pub const AXIS_EPSILON: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub struct NSubjettiness {
    r0: f64,
    n_min: usize,
    n_max: usize,
}

impl NSubjettiness {
    /// `r0` is the characteristic radius used for normalisation
    pub fn new(r0: f64, n_min: usize, n_max: usize) -> Result<Self, ConfigError> {
        let r0 = positive("nSubjettiness R0", r0)?;
        if n_min > n_max {
            return Err(ConfigError::NRange {
                min: n_min,
                max: n_max,
            });
        }
        Ok(Self { r0, n_min, n_max })
    }

    pub fn n_min(&self) -> usize {
        self.n_min
    }

    pub fn n_max(&self) -> usize {
        self.n_max
    }

    pub fn n_range(&self) -> RangeInclusive<usize> {
        self.n_min..=self.n_max
    }

    /// τ_N for each configured N, one entry per jet
    pub fn run(&self, jets: &[CompoundJet]) -> BTreeMap<usize, Vec<f64>> {
        self.n_range()
            .map(|n| {
                let taus = jets
                    .iter()
                    .map(|jet| {
                        self.tau(jet.constituents(), &jet.hard_jet().momentum, n)
                    })
                    .collect();
                (n, taus)
            })
            .collect()
    }

    /// τ_N of a jet with momentum `jet` and the given constituents
    ///
    /// τ_0 is the unnormalised pt-weighted distance of the constituents
    /// to the jet axis.
    ///
    /// Distances ΔR are measured in rapidity and azimuth, which agrees
    /// with pseudorapidity for massless constituents.
    pub fn tau(
        &self,
        constituents: &[InputParticle],
        jet: &Momentum,
        n: usize,
    ) -> f64 {
        let points: Vec<_> = constituents.iter().map(|c| Point::new(&c.momentum)).collect();
        if n == 0 {
            let axis = [Axis::from(jet)];
            return objective(&points, &axis);
        }
        let norm: f64 = points.iter().map(|p| p.pt).sum::<f64>() * self.r0;
        if points.len() <= n || !(norm > 0.) {
            return 0.;
        }
        let momenta: Vec<_> = constituents.iter().map(|c| c.momentum).collect();
        let seeds: Vec<_> = exclusive_jets(&momenta, JetAlgorithm::Kt, n)
            .iter()
            .map(Axis::from)
            .collect();
        minimise(&points, seeds) / norm
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct Point {
    pt: f64,
    rap: f64,
    phi: f64,
    momentum: Momentum,
}

impl Point {
    fn new(p: &Momentum) -> Self {
        Self {
            pt: p.pt(),
            rap: p.rap(),
            phi: p.phi(),
            momentum: *p,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct Axis {
    rap: f64,
    phi: f64,
}

impl From<&Momentum> for Axis {
    fn from(p: &Momentum) -> Self {
        Self {
            rap: p.rap(),
            phi: p.phi(),
        }
    }
}

impl Axis {
    fn dr2(&self, other: &Axis) -> f64 {
        delta_r2(self.rap, self.phi, other.rap, other.phi)
    }

    fn dr2_point(&self, p: &Point) -> f64 {
        delta_r2(self.rap, self.phi, p.rap, p.phi)
    }
}

/// Index of the closest axis, ties go to the lowest index
fn nearest_axis(p: &Point, axes: &[Axis]) -> usize {
    let mut best = 0;
    let mut best_dr2 = f64::INFINITY;
    for (k, axis) in axes.iter().enumerate() {
        let dr2 = axis.dr2_point(p);
        if dr2 < best_dr2 {
            best = k;
            best_dr2 = dr2;
        }
    }
    best
}

fn assign(points: &[Point], axes: &[Axis]) -> Vec<usize> {
    points.iter().map(|p| nearest_axis(p, axes)).collect()
}

fn objective(points: &[Point], axes: &[Axis]) -> f64 {
    points
        .iter()
        .map(|p| {
            let min_dr2 = axes
                .iter()
                .map(|axis| axis.dr2_point(p))
                .fold(f64::INFINITY, f64::min);
            p.pt * min_dr2.sqrt()
        })
        .sum()
}

/// Move each axis to the summed momentum of its assigned points
///
/// Axes without assigned points stay where they are.
fn recompute_axes(points: &[Point], assignment: &[usize], axes: &[Axis]) -> Vec<Axis> {
    let mut sums = vec![None; axes.len()];
    for (p, &k) in points.iter().zip(assignment) {
        let sum: &mut Option<Momentum> = &mut sums[k];
        *sum = Some(sum.map_or(p.momentum, |s| s + p.momentum));
    }
    sums.iter()
        .zip(axes)
        .map(|(sum, axis)| match sum {
            Some(p) if p.pt2() > 0. => Axis::from(p),
            _ => *axis,
        })
        .collect()
}

/// Refine the seed axes and return the minimal pt-weighted distance sum
///
/// Iterates assigning points to the closest axis and recomputing the
/// axes until the assignment is stable, the axes stop moving, or a
/// step fails to decrease the objective.
fn minimise(points: &[Point], seeds: Vec<Axis>) -> f64 {
    let mut axes = seeds;
    let mut assignment = assign(points, &axes);
    let mut value = objective(points, &axes);
    for iteration in 0..MAX_ITERATIONS {
        let new_axes = recompute_axes(points, &assignment, &axes);
        let new_value = objective(points, &new_axes);
        if !(new_value < value) {
            trace!("Axis refinement stalled after {iteration} iterations");
            return value;
        }
        let displacement = axes
            .iter()
            .zip(&new_axes)
            .map(|(a, b)| a.dr2(b))
            .fold(0., f64::max)
            .sqrt();
        let new_assignment = assign(points, &new_axes);
        let stable = new_assignment == assignment;
        axes = new_axes;
        assignment = new_assignment;
        value = new_value;
        if stable || displacement < AXIS_EPSILON {
            trace!("Axes converged after {} iterations", iteration + 1);
            return value;
        }
    }
    debug!("Axes not converged after {MAX_ITERATIONS} iterations");
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::from_momenta;

    fn particle(pt: f64, y: f64, phi: f64) -> Momentum {
        Momentum::from_pt_y_phi_m(pt, y, phi, 0.)
    }

    fn total(particles: &[InputParticle]) -> Momentum {
        particles.iter().map(|p| p.momentum).sum()
    }

    #[test]
    fn invalid_range() {
        assert!(matches!(
            NSubjettiness::new(1., 3, 2),
            Err(ConfigError::NRange { min: 3, max: 2 })
        ));
        assert!(NSubjettiness::new(0., 1, 2).is_err());
    }

    #[test]
    fn single_particle() {
        let nsub = NSubjettiness::new(0.8, 0, 3).unwrap();
        let particles = from_momenta([particle(50., 0.3, 1.)]);
        let jet = total(&particles);
        for n in 0..=3 {
            assert!(nsub.tau(&particles, &jet, n).abs() < 1e-10);
        }
    }

    #[test]
    fn tau0_is_unnormalised() {
        let nsub = NSubjettiness::new(0.8, 0, 1).unwrap();
        let particles = from_momenta([particle(10., 0., 0.), particle(10., 0., 0.4)]);
        let jet = total(&particles);
        let tau0 = nsub.tau(&particles, &jet, 0);
        assert!((tau0 - 4.).abs() < 1e-6);
        let tau1 = nsub.tau(&particles, &jet, 1);
        assert!((tau1 - 4. / (20. * 0.8)).abs() < 1e-6);
    }

    #[test]
    fn distances_in_rapidity() {
        let nsub = NSubjettiness::new(1., 0, 1).unwrap();
        let particles = from_momenta([Momentum::from_pt_y_phi_m(10., 0.4, 0., 20.)]);
        let axis = particle(1., 0., 0.);
        assert!((nsub.tau(&particles, &axis, 0) - 4.).abs() < 1e-10);
    }

    #[test]
    fn prongs_are_resolved() {
        let nsub = NSubjettiness::new(1., 1, 4).unwrap();
        let mut momenta = Vec::new();
        for (y, phi) in [(0., 0.), (0.8, 0.3), (0.2, 0.9)] {
            for (dy, dphi, pt) in [(0., 0., 40.), (0.04, -0.02, 8.), (-0.03, 0.05, 5.)] {
                momenta.push(particle(pt, y + dy, phi + dphi));
            }
        }
        let particles = from_momenta(momenta);
        let jet = total(&particles);
        let taus: Vec<_> = (1..=4).map(|n| nsub.tau(&particles, &jet, n)).collect();
        assert!(taus[1] < taus[0]);
        assert!(taus[2] < taus[1]);
        assert!(taus[3] <= taus[2]);
        // three prongs are well described by three axes
        assert!(taus[2] / taus[1] < 0.2);
    }

    #[test]
    fn refinement_does_not_increase_objective() {
        let points: Vec<_> = [
            particle(10., 0., 0.),
            particle(5., 0.3, 0.1),
            particle(7., 0.6, -0.2),
            particle(2., -0.4, 0.5),
        ]
        .iter()
        .map(Point::new)
        .collect();
        let seeds = vec![
            Axis { rap: 1., phi: 1. },
            Axis { rap: -1., phi: -1. },
        ];
        let start = objective(&points, &seeds);
        assert!(minimise(&points, seeds) <= start);
    }

    #[test]
    fn deterministic() {
        let nsub = NSubjettiness::new(1., 1, 3).unwrap();
        let particles = from_momenta([
            particle(10., 0., 0.),
            particle(10., 0.5, 0.),
            particle(10., 0., 0.5),
            particle(10., 0.5, 0.5),
        ]);
        let jet = total(&particles);
        for n in 1..=3 {
            let first = nsub.tau(&particles, &jet, n);
            let second = nsub.tau(&particles, &jet, n);
            assert_eq!(first.to_bits(), second.to_bits());
        }
    }
}
