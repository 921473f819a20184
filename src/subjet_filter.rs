//! The subjet/filter algorithm
//!
//! See [arXiv:0802.2470](https://arxiv.org/abs/0802.2470). Each fat jet
//! is split by undoing its clustering until a splitting with a
//! significant mass drop and not too asymmetric momentum sharing is
//! found. The constituents of the two resulting subjets are then
//! reclustered with a smaller radius and the hardest (up to three)
//! of these filter jets are kept.
use std::fmt::{self, Display};
use std::ops::AddAssign;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::area::GhostSpec;
use crate::cluster_sequence::{sorted_by_pt, ClusterJet, ClusterSequence, Label};
use crate::compound::{CompoundJet, CompoundSubjet, MAX_FILTERJETS};
use crate::error::{non_negative, positive, ConfigError};
use crate::jets::{JetAlgorithm, JetDefinition};
use crate::particle::InputParticle;

/// Choice of the filter radius
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FilterRadius {
    /// Always use `r_filt`
    #[default]
    Fixed,
    /// Use `min(r_filt, ΔR(subjet1, subjet2) / 2)`
    Capped,
}

/// Outcome of a deferred asymmetry cut that fails
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AsymmetryPolicy {
    /// The fat jet is not split
    #[default]
    RejectCandidate,
    /// The mass-drop splitting is kept anyway
    StopRecursion,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Settings {
    /// Fat jet definition
    pub jet_def: JetDefinition,
    /// Maximum number of fat jets per event, zero means no limit
    pub n_fat_max: usize,
    pub filter_algorithm: JetAlgorithm,
    pub r_filt: f64,
    pub filter_radius: FilterRadius,
    pub jet_pt_min: f64,
    pub mass_drop_cut: f64,
    pub asymm_cut: f64,
    /// Only apply the asymmetry cut to the first mass-drop splitting
    pub asymm_cut_later: bool,
    pub asymmetry_policy: AsymmetryPolicy,
    /// Stop undoing the clustering at jets with at most this many
    /// real constituents
    pub min_constituents: usize,
    /// Explicit ghosts for area computation
    pub ghosts: Option<GhostSpec>,
}

/// Counters accumulated over all processed events
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub events: u64,
    pub fat_jets: u64,
    pub mass_drop: u64,
    pub asymmetry: u64,
    pub filtered: u64,
}

impl AddAssign<&Diagnostics> for Diagnostics {
    fn add_assign(&mut self, rhs: &Diagnostics) {
        self.events += rhs.events;
        self.fat_jets += rhs.fat_jets;
        self.mass_drop += rhs.mass_drop;
        self.asymmetry += rhs.asymmetry;
        self.filtered += rhs.filtered;
    }
}

fn percentage(n: u64, total: u64) -> f64 {
    if total == 0 {
        0.
    } else {
        100. * n as f64 / total as f64
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Subjet/filter summary")?;
        writeln!(f, "  events processed:    {}", self.events)?;
        writeln!(f, "  fat jets processed:  {}", self.fat_jets)?;
        writeln!(
            f,
            "  passed mass drop:    {} ({:.1}%)",
            self.mass_drop,
            percentage(self.mass_drop, self.fat_jets)
        )?;
        writeln!(
            f,
            "  passed asymmetry:    {} ({:.1}%)",
            self.asymmetry,
            percentage(self.asymmetry, self.fat_jets)
        )?;
        write!(
            f,
            "  with filter jets:    {} ({:.1}%)",
            self.filtered,
            percentage(self.filtered, self.fat_jets)
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubjetFilter {
    settings: Settings,
}

impl SubjetFilter {
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        positive("rParam", settings.jet_def.radius)?;
        positive("rFilt", settings.r_filt)?;
        non_negative("jetPtMin", settings.jet_pt_min)?;
        non_negative("massDropCut", settings.mass_drop_cut)?;
        non_negative("asymmCut", settings.asymm_cut)?;
        if settings.min_constituents == 0 {
            return Err(ConfigError::MinConstituents);
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Find fat jets in `particles` and decompose them
    ///
    /// Every fat jet above the transverse momentum threshold is
    /// returned, ordered by decreasing transverse momentum.
    pub fn run(
        &self,
        particles: &[InputParticle],
        diagnostics: &mut Diagnostics,
    ) -> Vec<CompoundJet> {
        diagnostics.events += 1;
        let settings = &self.settings;
        let seq = match &settings.ghosts {
            Some(ghosts) => {
                ClusterSequence::with_ghosts(particles, settings.jet_def, ghosts)
            }
            None => ClusterSequence::new(particles, settings.jet_def),
        };
        let mut fat_jets = sorted_by_pt(seq.inclusive_jets(settings.jet_pt_min));
        if settings.n_fat_max > 0 {
            fat_jets.truncate(settings.n_fat_max);
        }
        debug!("Found {} fat jets", fat_jets.len());
        fat_jets
            .iter()
            .map(|fat_jet| self.decompose(&seq, fat_jet, diagnostics))
            .collect()
    }

    fn decompose(
        &self,
        seq: &ClusterSequence,
        fat_jet: &ClusterJet,
        diagnostics: &mut Diagnostics,
    ) -> CompoundJet {
        diagnostics.fat_jets += 1;
        let hard_jet = compound_subjet(seq, fat_jet);
        let constituents: Vec<_> = seq
            .constituents(fat_jet)
            .into_iter()
            .filter_map(|c| match c.label {
                Label::Particle(idx) => Some(InputParticle::new(idx, c.momentum)),
                Label::Ghost => None,
            })
            .collect();
        if constituents.is_empty() {
            return CompoundJet::new(hard_jet, constituents, vec![], vec![]);
        }

        let Some((j1, j2)) = self.find_subjets(seq, fat_jet, diagnostics) else {
            debug!(
                "No substructure in fat jet with pt = {}",
                fat_jet.momentum.pt()
            );
            let undivided = hard_jet.clone();
            return CompoundJet::new(hard_jet, constituents, vec![undivided], vec![]);
        };
        let (j1, j2) = if j1.momentum.pt2() >= j2.momentum.pt2() {
            (j1, j2)
        } else {
            (j2, j1)
        };
        let filterjets = self.filter(seq, &j1, &j2);
        if !filterjets.is_empty() {
            diagnostics.filtered += 1;
        }
        debug!(
            "Fat jet with pt = {}: subjets with pt = {}, {}; {} filter jets",
            fat_jet.momentum.pt(),
            j1.momentum.pt(),
            j2.momentum.pt(),
            filterjets.len()
        );
        let subjets = vec![compound_subjet(seq, &j1), compound_subjet(seq, &j2)];
        CompoundJet::new(hard_jet, constituents, subjets, filterjets)
    }

    /// Undo the clustering of `fat_jet`, following the heavier branch
    ///
    /// Splittings off clusters of ghosts are skipped, so the returned
    /// subjets always contain real particles.
    fn find_subjets(
        &self,
        seq: &ClusterSequence,
        fat_jet: &ClusterJet,
        diagnostics: &mut Diagnostics,
    ) -> Option<(ClusterJet, ClusterJet)> {
        let settings = &self.settings;
        let y_cut = settings.asymm_cut * settings.asymm_cut;
        let mut jet = *fat_jet;
        while jet.n_particles() > settings.min_constituents {
            let (mut j1, mut j2) = seq.has_parents(&jet)?;
            if j2.is_pure_ghost() {
                jet = j1;
                continue;
            }
            if j1.is_pure_ghost() {
                jet = j2;
                continue;
            }
            if j1.momentum.m2() < j2.momentum.m2() {
                std::mem::swap(&mut j1, &mut j2);
            }
            let parent = &jet.momentum;
            let mass_drop = j1.momentum.m() < settings.mass_drop_cut * parent.m();
            let asymmetric =
                j1.momentum.kt_distance(&j2.momentum) > y_cut * parent.m2();
            trace!(
                "Splitting m = {} -> {} + {}: mass drop {mass_drop}, asymmetry {asymmetric}",
                parent.m(),
                j1.momentum.m(),
                j2.momentum.m()
            );
            if mass_drop && (asymmetric || settings.asymm_cut_later) {
                diagnostics.mass_drop += 1;
                if asymmetric {
                    diagnostics.asymmetry += 1;
                    return Some((j1, j2));
                }
                return match settings.asymmetry_policy {
                    AsymmetryPolicy::RejectCandidate => None,
                    AsymmetryPolicy::StopRecursion => Some((j1, j2)),
                };
            }
            jet = j1;
        }
        None
    }

    /// Recluster the constituents of both subjets with the filter radius
    fn filter(
        &self,
        seq: &ClusterSequence,
        j1: &ClusterJet,
        j2: &ClusterJet,
    ) -> Vec<CompoundSubjet> {
        let settings = &self.settings;
        let r_filt = match settings.filter_radius {
            FilterRadius::Fixed => settings.r_filt,
            FilterRadius::Capped => settings
                .r_filt
                .min(0.5 * j1.momentum.delta_r(&j2.momentum)),
        };
        if !(r_filt > 0.) {
            return Vec::new();
        }
        let mut inputs = seq.constituents(j1);
        inputs.extend(seq.constituents(j2));
        let filter_def = JetDefinition::new(settings.filter_algorithm, r_filt);
        let filter_seq =
            ClusterSequence::from_constituents(inputs, filter_def, seq.ghost_area());
        sorted_by_pt(filter_seq.inclusive_jets(0.))
            .iter()
            .take(MAX_FILTERJETS)
            .map(|jet| compound_subjet(&filter_seq, jet))
            .collect()
    }
}

fn compound_subjet(seq: &ClusterSequence, jet: &ClusterJet) -> CompoundSubjet {
    CompoundSubjet {
        momentum: jet.momentum,
        area: seq.area(jet),
        constituents: seq.particle_indices(jet),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::momentum::Momentum;
    use crate::particle::from_momenta;

    fn settings() -> Settings {
        Settings {
            jet_def: JetDefinition::new(JetAlgorithm::CambridgeAachen, 1.2),
            n_fat_max: 0,
            filter_algorithm: JetAlgorithm::CambridgeAachen,
            r_filt: 0.3,
            filter_radius: FilterRadius::Fixed,
            jet_pt_min: 0.,
            mass_drop_cut: 0.667,
            asymm_cut: 0.3,
            asymm_cut_later: false,
            asymmetry_policy: AsymmetryPolicy::RejectCandidate,
            min_constituents: 1,
            ghosts: None,
        }
    }

    fn particle(pt: f64, y: f64, phi: f64) -> Momentum {
        Momentum::from_pt_y_phi_m(pt, y, phi, 0.)
    }

    // two collimated prongs separated by ΔR = 1 plus a soft particle
    fn two_prongs() -> Vec<InputParticle> {
        from_momenta([
            particle(100., 0., 0.),
            particle(20., 0.05, 0.05),
            particle(90., 1., 0.),
            particle(15., 0.95, -0.05),
            particle(1., 0.2, 0.4),
        ])
    }

    #[test]
    fn two_pronged_jet() {
        let alg = SubjetFilter::new(settings()).unwrap();
        let mut diagnostics = Diagnostics::default();
        let jets = alg.run(&two_prongs(), &mut diagnostics);
        assert_eq!(jets.len(), 1);
        let jet = &jets[0];
        assert_eq!(jet.subjets().len(), 2);
        assert!(jet.subjets()[0].momentum.pt() >= jet.subjets()[1].momentum.pt());
        assert_eq!(jet.subjets()[0].constituents, [0, 1, 4]);
        assert_eq!(jet.subjets()[1].constituents, [2, 3]);
        // the soft particle is too far away from the hard prongs
        assert_eq!(jet.filterjets().len(), 3);
        assert_eq!(jet.filterjets()[2].constituents, [4]);
        assert_eq!(jet.constituents().len(), 5);
        assert_eq!(jet.hard_jet().constituents, [0, 1, 2, 3, 4]);
        assert_eq!(diagnostics.fat_jets, 1);
        assert_eq!(diagnostics.mass_drop, 1);
        assert_eq!(diagnostics.asymmetry, 1);
        assert_eq!(diagnostics.filtered, 1);
    }

    #[test]
    fn capped_filter_radius() {
        let mut settings = settings();
        settings.r_filt = 2.;
        settings.filter_radius = FilterRadius::Capped;
        let alg = SubjetFilter::new(settings).unwrap();
        let jets = alg.run(&two_prongs(), &mut Diagnostics::default());
        // r_filt = ΔR / 2 keeps the prongs apart
        assert_eq!(jets[0].filterjets().len(), 2);

        settings.filter_radius = FilterRadius::Fixed;
        let alg = SubjetFilter::new(settings).unwrap();
        let jets = alg.run(&two_prongs(), &mut Diagnostics::default());
        assert_eq!(jets[0].filterjets().len(), 1);
    }

    #[test]
    fn asymmetric_splitting() {
        // soft second prong: mass drop, but fails the asymmetry cut
        let particles = from_momenta([
            particle(200., 0., 0.),
            particle(5., 0.8, 0.),
        ]);
        let alg = SubjetFilter::new(settings()).unwrap();
        let mut diagnostics = Diagnostics::default();
        let jets = alg.run(&particles, &mut diagnostics);
        assert_eq!(jets.len(), 1);
        assert_eq!(jets[0].subjets().len(), 1);
        assert!(jets[0].filterjets().is_empty());
        assert_eq!(diagnostics.mass_drop, 0);

        let mut settings = settings();
        settings.asymm_cut_later = true;
        let alg = SubjetFilter::new(settings).unwrap();
        let mut diagnostics = Diagnostics::default();
        let jets = alg.run(&particles, &mut diagnostics);
        assert_eq!(jets[0].subjets().len(), 1);
        assert_eq!(diagnostics.mass_drop, 1);
        assert_eq!(diagnostics.asymmetry, 0);

        settings.asymmetry_policy = AsymmetryPolicy::StopRecursion;
        let alg = SubjetFilter::new(settings).unwrap();
        let jets = alg.run(&particles, &mut Diagnostics::default());
        assert_eq!(jets[0].subjets().len(), 2);
        assert!(!jets[0].filterjets().is_empty());
    }

    // a soft wide-angle particle on top of two hard prongs:
    // the first splitting has a mass drop but is too asymmetric
    fn nested_prongs() -> Vec<InputParticle> {
        from_momenta([
            particle(100., 0., 0.),
            particle(30., 0.35, 0.),
            particle(5., -0.9, 0.),
        ])
    }

    #[test]
    fn asymmetry_cut_at_every_step() {
        let mut settings = settings();
        settings.jet_def.radius = 1.5;
        let alg = SubjetFilter::new(settings).unwrap();
        let mut diagnostics = Diagnostics::default();
        let jets = alg.run(&nested_prongs(), &mut diagnostics);
        assert_eq!(jets.len(), 1);
        let jet = &jets[0];
        assert_eq!(jet.subjets().len(), 2);
        assert_eq!(jet.subjets()[0].constituents, [0]);
        assert_eq!(jet.subjets()[1].constituents, [1]);
        assert_eq!(jet.filterjets().len(), 2);
        assert_eq!(jet.hard_jet().constituents, [0, 1, 2]);
        assert_eq!(diagnostics.mass_drop, 1);
        assert_eq!(diagnostics.asymmetry, 1);

        // deferred: the first mass drop decides
        settings.asymm_cut_later = true;
        let alg = SubjetFilter::new(settings).unwrap();
        let mut diagnostics = Diagnostics::default();
        let jets = alg.run(&nested_prongs(), &mut diagnostics);
        assert_eq!(jets[0].subjets().len(), 1);
        assert_eq!(diagnostics.mass_drop, 1);
        assert_eq!(diagnostics.asymmetry, 0);

        settings.asymmetry_policy = AsymmetryPolicy::StopRecursion;
        let alg = SubjetFilter::new(settings).unwrap();
        let jets = alg.run(&nested_prongs(), &mut Diagnostics::default());
        assert_eq!(jets[0].subjets().len(), 2);
        assert_eq!(jets[0].subjets()[0].constituents, [0, 1]);
        assert_eq!(jets[0].subjets()[1].constituents, [2]);
    }

    #[test]
    fn minimum_constituents() {
        let mut settings = settings();
        settings.jet_def.radius = 1.5;
        settings.min_constituents = 2;
        let alg = SubjetFilter::new(settings).unwrap();
        let mut diagnostics = Diagnostics::default();
        let jets = alg.run(&nested_prongs(), &mut diagnostics);
        assert_eq!(jets[0].subjets().len(), 1);
        assert_eq!(diagnostics.mass_drop, 0);

        settings.min_constituents = 3;
        let alg = SubjetFilter::new(settings).unwrap();
        let jets = alg.run(&two_prongs(), &mut Diagnostics::default());
        assert_eq!(jets[0].subjets().len(), 2);

        settings.min_constituents = 5;
        let alg = SubjetFilter::new(settings).unwrap();
        let jets = alg.run(&two_prongs(), &mut Diagnostics::default());
        assert_eq!(jets[0].subjets().len(), 1);

        settings.min_constituents = 0;
        assert!(SubjetFilter::new(settings).is_err());
    }

    #[test]
    fn ghosts_do_not_form_subjets() {
        let particles = from_momenta([particle(50., 0.5, 1.)]);
        for (asymm_cut_later, asymmetry_policy) in [
            (false, AsymmetryPolicy::RejectCandidate),
            (true, AsymmetryPolicy::RejectCandidate),
            (true, AsymmetryPolicy::StopRecursion),
        ] {
            let settings = Settings {
                asymm_cut_later,
                asymmetry_policy,
                ghosts: Some(GhostSpec::new(3., 1, 0.02).unwrap()),
                ..settings()
            };
            let alg = SubjetFilter::new(settings).unwrap();
            let mut diagnostics = Diagnostics::default();
            let jets = alg.run(&particles, &mut diagnostics);
            assert_eq!(jets.len(), 1);
            assert_eq!(jets[0].subjets().len(), 1);
            assert_eq!(jets[0].subjets()[0].constituents, [0]);
            assert!(jets[0].subjets()[0].area > 0.);
            assert!(jets[0].filterjets().is_empty());
            assert_eq!(diagnostics.mass_drop, 0);
        }
    }

    #[test]
    fn fat_jet_limit_and_threshold() {
        let particles = from_momenta([
            particle(100., 0., 0.),
            particle(50., 0., 3.),
            particle(10., 2.5, -1.5),
        ]);
        let mut settings = settings();
        settings.jet_pt_min = 20.;
        let alg = SubjetFilter::new(settings).unwrap();
        let jets = alg.run(&particles, &mut Diagnostics::default());
        assert_eq!(jets.len(), 2);
        assert!(jets[0].hard_jet().momentum.pt() > jets[1].hard_jet().momentum.pt());

        settings.n_fat_max = 1;
        let alg = SubjetFilter::new(settings).unwrap();
        let jets = alg.run(&particles, &mut Diagnostics::default());
        assert_eq!(jets.len(), 1);
        assert_eq!(jets[0].hard_jet().constituents, [0]);
    }

    #[test]
    fn areas() {
        let mut settings = settings();
        settings.ghosts = Some(GhostSpec::new(3., 1, 0.02).unwrap());
        let alg = SubjetFilter::new(settings).unwrap();
        let jets = alg.run(&two_prongs(), &mut Diagnostics::default());
        assert_eq!(jets.len(), 1);
        let jet = &jets[0];
        assert!(jet.hard_jet_area() > 0.);
        assert_eq!(jet.subjets().len(), 2);
        for subjet in jet.subjets() {
            assert!(subjet.area > 0.);
            assert!(subjet.area < jet.hard_jet_area());
        }
        let filter_area: f64 = jet.filterjets().iter().map(|j| j.area).sum();
        let subjet_area: f64 = jet.subjets().iter().map(|j| j.area).sum();
        assert!(filter_area <= subjet_area + 1e-9);
        for filterjet in jet.filterjets() {
            assert!(!filterjet.constituents.is_empty());
        }
    }

    #[test]
    fn invalid_settings() {
        let mut s = settings();
        s.r_filt = 0.;
        assert!(SubjetFilter::new(s).is_err());
        let mut s = settings();
        s.jet_def.radius = f64::NAN;
        assert!(SubjetFilter::new(s).is_err());
        let mut s = settings();
        s.jet_pt_min = -1.;
        assert!(SubjetFilter::new(s).is_err());
    }

    #[test]
    fn summary() {
        let diagnostics = Diagnostics {
            events: 2,
            fat_jets: 4,
            mass_drop: 2,
            asymmetry: 1,
            filtered: 1,
        };
        let summary = diagnostics.to_string();
        assert!(summary.contains("fat jets processed:  4"));
        assert!(summary.contains("passed mass drop:    2 (50.0%)"));
        assert!(summary.contains("passed asymmetry:    1 (25.0%)"));
        let mut total = Diagnostics::default();
        total += &diagnostics;
        total += &diagnostics;
        assert_eq!(total.events, 4);
    }
}
