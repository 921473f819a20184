use serde::{Deserialize, Serialize};

use crate::momentum::Momentum;
use crate::particle::InputParticle;

/// Maximum number of subjets in a [CompoundJet]
pub const MAX_SUBJETS: usize = 2;
/// Maximum number of filter jets in a [CompoundJet]
pub const MAX_FILTERJETS: usize = 3;

/// A (sub)jet with its catchment area and constituent indices
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CompoundSubjet {
    pub momentum: Momentum,
    pub area: f64,
    /// Ascending indices into the input particle list
    pub constituents: Vec<usize>,
}

/// A fat jet together with its substructure
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundJet {
    hard_jet: CompoundSubjet,
    constituents: Vec<InputParticle>,
    subjets: Vec<CompoundSubjet>,
    filterjets: Vec<CompoundSubjet>,
}

impl CompoundJet {
    pub(crate) fn new(
        hard_jet: CompoundSubjet,
        constituents: Vec<InputParticle>,
        subjets: Vec<CompoundSubjet>,
        filterjets: Vec<CompoundSubjet>,
    ) -> Self {
        debug_assert!(subjets.len() <= MAX_SUBJETS);
        debug_assert!(filterjets.len() <= MAX_FILTERJETS);
        Self {
            hard_jet,
            constituents,
            subjets,
            filterjets,
        }
    }

    pub fn hard_jet(&self) -> &CompoundSubjet {
        &self.hard_jet
    }

    pub fn hard_jet_area(&self) -> f64 {
        self.hard_jet.area
    }

    /// The real particles clustered into the fat jet
    pub fn constituents(&self) -> &[InputParticle] {
        &self.constituents
    }

    /// Subjets by decreasing transverse momentum
    pub fn subjets(&self) -> &[CompoundSubjet] {
        &self.subjets
    }

    /// Filter jets by decreasing transverse momentum
    pub fn filterjets(&self) -> &[CompoundSubjet] {
        &self.filterjets
    }
}
