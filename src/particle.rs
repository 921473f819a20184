use log::warn;

use crate::momentum::Momentum;

/// An input particle with its position in the host's particle list
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
pub struct InputParticle {
    pub momentum: Momentum,
    pub index: usize,
}

impl InputParticle {
    pub fn new(index: usize, momentum: Momentum) -> Self {
        Self { momentum, index }
    }
}

/// Convert host candidates given as `(index, [E, px, py, pz])`
///
/// Candidates with non-finite momentum components or without transverse
/// momentum are skipped.
pub fn adapt<I, P>(candidates: I) -> Vec<InputParticle>
where
    I: IntoIterator<Item = (usize, P)>,
    P: Into<Momentum>,
{
    candidates
        .into_iter()
        .filter_map(|(index, p)| {
            let momentum = p.into();
            if momentum.is_finite() && momentum.pt2() > 0. {
                Some(InputParticle::new(index, momentum))
            } else {
                warn!("Ignoring particle {index} with momentum {momentum:?}");
                None
            }
        })
        .collect()
}

/// Convert a list of `[E, px, py, pz]`, indexing by list position
pub fn from_momenta<I, P>(momenta: I) -> Vec<InputParticle>
where
    I: IntoIterator<Item = P>,
    P: Into<Momentum>,
{
    adapt(momenta.into_iter().enumerate())
}

/// Convert a list of `(px, py, pz, E)` tuples, indexing by list position
pub fn from_px_py_pz_e<I>(momenta: I) -> Vec<InputParticle>
where
    I: IntoIterator<Item = (f64, f64, f64, f64)>,
{
    from_momenta(
        momenta
            .into_iter()
            .map(|(px, py, pz, e)| Momentum::new(e, px, py, pz)),
    )
}
