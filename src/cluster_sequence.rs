//! Sequential recombination clustering with explicit merge history
//!
//! The clustering itself is done by [jetty]. Its steps are replayed
//! into an arena of [HistoryElement]s. The first entries correspond to
//! the inputs, every later entry records either the recombination of
//! two earlier entries or the recombination of an entry with the beam.
//! Jets refer to the history entry that created them, so the
//! clustering can be undone step by step.
use std::collections::HashMap;

use jetty::{ClusterHistory, ClusterStep, PseudoJet};
use log::{trace, warn};

use crate::area::GhostSpec;
use crate::jets::{JetAlgorithm, JetDefinition};
use crate::momentum::Momentum;
use crate::particle::InputParticle;

/// Radius for exclusive clustering
///
/// Large enough that no jet is ever closer to the beam than to
/// another jet.
const EXCLUSIVE_RADIUS: f64 = 1e3;

/// Origin of a clustering input
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    /// Real particle with its index in the host's particle list
    Particle(usize),
    Ghost,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Constituent {
    pub momentum: Momentum,
    pub label: Label,
}

impl Constituent {
    pub fn ghost(momentum: Momentum) -> Self {
        Self {
            momentum,
            label: Label::Ghost,
        }
    }

    pub fn is_ghost(&self) -> bool {
        self.label == Label::Ghost
    }
}

impl From<&InputParticle> for Constituent {
    fn from(p: &InputParticle) -> Self {
        Self {
            momentum: p.momentum,
            label: Label::Particle(p.index),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Input,
    /// Recombination of two history entries
    Merge(usize, usize),
    /// Recombination of a history entry with the beam
    Beam(usize),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HistoryElement {
    pub step: Step,
    pub child: Option<usize>,
    /// Jet created in this step
    pub jet: Option<usize>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClusterJet {
    pub momentum: Momentum,
    history: usize,
    particles: usize,
    ghosts: usize,
}

impl ClusterJet {
    pub fn history_index(&self) -> usize {
        self.history
    }

    /// Number of real particles clustered into this jet
    pub fn n_particles(&self) -> usize {
        self.particles
    }

    pub fn n_ghosts(&self) -> usize {
        self.ghosts
    }

    pub fn is_pure_ghost(&self) -> bool {
        self.particles == 0
    }
}

#[derive(Clone, Debug)]
pub struct ClusterSequence {
    jet_def: JetDefinition,
    inputs: Vec<Constituent>,
    jets: Vec<ClusterJet>,
    history: Vec<HistoryElement>,
    ghost_area: Option<f64>,
}

impl ClusterSequence {
    /// Cluster the particles into inclusive jets
    pub fn new(particles: &[InputParticle], jet_def: JetDefinition) -> Self {
        let inputs = particles.iter().map(Constituent::from).collect();
        Self::from_constituents(inputs, jet_def, None)
    }

    /// Cluster the particles together with explicit ghosts
    pub fn with_ghosts(
        particles: &[InputParticle],
        jet_def: JetDefinition,
        ghosts: &GhostSpec,
    ) -> Self {
        let ghost_momenta = ghosts.ghosts();
        let mut inputs = Vec::with_capacity(particles.len() + ghost_momenta.len());
        inputs.extend(particles.iter().map(Constituent::from));
        inputs.extend(ghost_momenta.into_iter().map(Constituent::ghost));
        Self::from_constituents(inputs, jet_def, Some(ghosts.actual_ghost_area()))
    }

    /// Cluster arbitrary inputs
    ///
    /// If `ghost_area` is given, each ghost among the inputs contributes
    /// this area to the jet it ends up in.
    pub fn from_constituents(
        inputs: Vec<Constituent>,
        jet_def: JetDefinition,
        ghost_area: Option<f64>,
    ) -> Self {
        let mut seq = Self::init(inputs, jet_def, ghost_area);
        let steps = jet_def.cluster_history(seq.pseudojets());
        seq.replay(steps, 0);
        seq
    }

    fn init(
        inputs: Vec<Constituent>,
        jet_def: JetDefinition,
        ghost_area: Option<f64>,
    ) -> Self {
        let n = inputs.len();
        let mut jets = Vec::with_capacity(2 * n);
        let mut history = Vec::with_capacity(2 * n);
        for (i, input) in inputs.iter().enumerate() {
            let ghosts = usize::from(input.is_ghost());
            jets.push(ClusterJet {
                momentum: input.momentum,
                history: i,
                particles: 1 - ghosts,
                ghosts,
            });
            history.push(HistoryElement {
                step: Step::Input,
                child: None,
                jet: Some(i),
            });
        }
        Self {
            jet_def,
            inputs,
            jets,
            history,
            ghost_area,
        }
    }

    fn pseudojets(&self) -> Vec<PseudoJet> {
        self.inputs
            .iter()
            .map(|c| PseudoJet::from(c.momentum.0))
            .collect()
    }

    pub fn jet_def(&self) -> &JetDefinition {
        &self.jet_def
    }

    pub fn history(&self) -> &[HistoryElement] {
        &self.history
    }

    /// Area carried by each ghost, if there are ghosts
    pub fn ghost_area(&self) -> Option<f64> {
        self.ghost_area
    }

    pub fn n_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Jets recombined with the beam with transverse momentum above
    /// `ptmin`, in order of clustering
    ///
    /// Jets consisting only of ghosts are never included.
    pub fn inclusive_jets(&self, ptmin: f64) -> Vec<ClusterJet> {
        let ptmin2 = ptmin * ptmin;
        self.beam_jets()
            .filter(|jet| jet.momentum.pt2() > ptmin2 && !jet.is_pure_ghost())
            .collect()
    }

    fn beam_jets(&self) -> impl Iterator<Item = ClusterJet> + '_ {
        self.history
            .iter()
            .filter_map(|h| match h.step {
                Step::Beam(parent) => self.history[parent].jet,
                _ => None,
            })
            .map(|j| self.jets[j])
    }

    /// The two jets merged into `jet`, harder one first
    pub fn has_parents(
        &self,
        jet: &ClusterJet,
    ) -> Option<(ClusterJet, ClusterJet)> {
        let Step::Merge(h1, h2) = self.history[jet.history].step else {
            return None;
        };
        let j1 = self.jets[self.history[h1].jet?];
        let j2 = self.jets[self.history[h2].jet?];
        if j1.momentum.pt2() < j2.momentum.pt2() {
            Some((j2, j1))
        } else {
            Some((j1, j2))
        }
    }

    /// All inputs clustered into `jet`, in input order
    pub fn constituents(&self, jet: &ClusterJet) -> Vec<Constituent> {
        let mut positions = Vec::new();
        let mut stack = vec![jet.history];
        while let Some(h) = stack.pop() {
            match self.history[h].step {
                Step::Input => positions.push(h),
                Step::Merge(h1, h2) => stack.extend([h1, h2]),
                Step::Beam(h1) => stack.push(h1),
            }
        }
        positions.sort_unstable();
        positions.into_iter().map(|pos| self.inputs[pos]).collect()
    }

    /// Indices of the real particles in `jet`, in ascending order
    pub fn particle_indices(&self, jet: &ClusterJet) -> Vec<usize> {
        let mut indices: Vec<_> = self
            .constituents(jet)
            .into_iter()
            .filter_map(|c| match c.label {
                Label::Particle(idx) => Some(idx),
                Label::Ghost => None,
            })
            .collect();
        indices.sort_unstable();
        indices
    }

    /// Active catchment area, zero without ghosts
    pub fn area(&self, jet: &ClusterJet) -> f64 {
        match self.ghost_area {
            Some(area) => jet.ghosts as f64 * area,
            None => 0.,
        }
    }

    /// Record clustering steps until at most `n_stop` jets are left
    ///
    /// Returns the indices of the jets that have been recombined
    /// neither with another jet nor with the beam.
    fn replay(&mut self, steps: ClusterHistory<'_>, n_stop: usize) -> Vec<usize> {
        let mut live: HashMap<PseudoJet, Vec<usize>> = HashMap::new();
        for (jet, pseudojet) in self.pseudojets().into_iter().enumerate() {
            live.entry(pseudojet).or_default().push(jet);
        }
        let mut n_jets = self.inputs.len();
        for step in steps {
            if n_jets <= n_stop {
                break;
            }
            match step {
                ClusterStep::Combine([p1, p2]) => {
                    let (Some(a), Some(b)) = (take(&mut live, &p1), take(&mut live, &p2))
                    else {
                        warn!("Unknown pseudojets {p1:?}, {p2:?} in clustering history");
                        break;
                    };
                    let k = self.merge(a, b);
                    live.entry(p1 + p2).or_default().push(k);
                    n_jets -= 1;
                }
                ClusterStep::Jet(p) => {
                    let Some(a) = take(&mut live, &p) else {
                        warn!("Unknown jet {p:?} in clustering history");
                        break;
                    };
                    self.merge_with_beam(a);
                }
            }
        }
        let mut remaining: Vec<_> = live.into_values().flatten().collect();
        remaining.sort_unstable();
        remaining
    }

    fn merge(&mut self, a: usize, b: usize) -> usize {
        let (ja, jb) = (self.jets[a], self.jets[b]);
        let k = self.jets.len();
        let h = self.history.len();
        trace!("Merging jets {a} and {b} into {k}");
        self.history.push(HistoryElement {
            step: Step::Merge(ja.history.min(jb.history), ja.history.max(jb.history)),
            child: None,
            jet: Some(k),
        });
        self.history[ja.history].child = Some(h);
        self.history[jb.history].child = Some(h);
        self.jets.push(ClusterJet {
            momentum: ja.momentum + jb.momentum,
            history: h,
            particles: ja.particles + jb.particles,
            ghosts: ja.ghosts + jb.ghosts,
        });
        k
    }

    fn merge_with_beam(&mut self, a: usize) {
        let ha = self.jets[a].history;
        let h = self.history.len();
        trace!("Merging jet {a} with beam");
        self.history.push(HistoryElement {
            step: Step::Beam(ha),
            child: None,
            jet: None,
        });
        self.history[ha].child = Some(h);
    }
}

// Several jets can share the same momentum, e.g. a jet and the same
// jet after absorbing a ghost
fn take(live: &mut HashMap<PseudoJet, Vec<usize>>, p: &PseudoJet) -> Option<usize> {
    let jets = live.get_mut(p)?;
    let jet = jets.pop();
    if jets.is_empty() {
        live.remove(p);
    }
    jet
}

/// Exclusive clustering of `momenta` into (at most) `n` jets
///
/// There is no beam distance, so all inputs end up in one of the
/// returned jets. The jets are sorted by decreasing transverse momentum.
pub fn exclusive_jets(
    momenta: &[Momentum],
    algorithm: JetAlgorithm,
    n: usize,
) -> Vec<Momentum> {
    let inputs = momenta
        .iter()
        .enumerate()
        .map(|(i, &momentum)| Constituent {
            momentum,
            label: Label::Particle(i),
        })
        .collect();
    let jet_def = JetDefinition::new(algorithm, EXCLUSIVE_RADIUS);
    let mut seq = ClusterSequence::init(inputs, jet_def, None);
    let steps = jet_def.cluster_history(seq.pseudojets());
    let remaining = seq.replay(steps, n);
    let jets = remaining
        .into_iter()
        .map(|j| seq.jets[j])
        .chain(seq.beam_jets())
        .collect();
    sorted_by_pt(jets).into_iter().map(|j| j.momentum).collect()
}

/// Sort by decreasing transverse momentum, ties in clustering order
pub fn sorted_by_pt(mut jets: Vec<ClusterJet>) -> Vec<ClusterJet> {
    jets.sort_by(|a, b| {
        b.momentum
            .pt2()
            .total_cmp(&a.momentum.pt2())
            .then(a.history.cmp(&b.history))
    });
    jets
}
