//! Flat output collections
//!
//! Fat jets refer to their subjets and filter jets by index into the
//! flat subjet and filter jet collections. The first (up to two)
//! daughters of a fat jet are always its subjets, the remaining ones
//! its filter jets.
use std::collections::BTreeMap;
use std::ops::Range;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::compound::{CompoundJet, CompoundSubjet};
use crate::momentum::Momentum;

/// A stored jet with references of type `C` to its constituents
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct JetRecord<C> {
    pub p4: Momentum,
    pub area: f64,
    pub constituents: Vec<C>,
}

/// Reference from a fat jet into the subjet or filter jet collection
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize,
)]
pub enum FatJetDaughter {
    Subjet(usize),
    Filterjet(usize),
}

/// N-subjettiness values aligned with the fat jet collection
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TauCollection {
    pub n: usize,
    pub values: Vec<f64>,
}

impl TauCollection {
    /// Collection name `tau<N>`
    pub fn name(&self) -> String {
        tau_name(self.n)
    }
}

pub fn tau_name(n: usize) -> String {
    format!("tau{n}")
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EventOutput<C> {
    pub fat_jets: Vec<JetRecord<FatJetDaughter>>,
    pub subjets: Vec<JetRecord<C>>,
    pub filterjets: Vec<JetRecord<C>>,
    /// Ordered by N
    pub taus: Vec<TauCollection>,
}

impl<C> EventOutput<C> {
    pub fn tau(&self, n: usize) -> Option<&[f64]> {
        self.taus
            .iter()
            .find(|t| t.n == n)
            .map(|t| t.values.as_slice())
    }
}

/// Translate compound jets into flat collections
///
/// `resolve` maps the index of an input particle to the host's
/// constituent reference. Indices it does not recognise are dropped.
pub fn assemble<C, F>(
    jets: &[CompoundJet],
    taus: &BTreeMap<usize, Vec<f64>>,
    mut resolve: F,
) -> EventOutput<C>
where
    F: FnMut(usize) -> Option<C>,
{
    let mut subjets = Vec::new();
    let mut filterjets = Vec::new();
    let mut fat_jets = Vec::with_capacity(jets.len());
    for jet in jets {
        let sub = append(&mut subjets, jet.subjets(), &mut resolve);
        let filter = append(&mut filterjets, jet.filterjets(), &mut resolve);
        let constituents = sub
            .map(FatJetDaughter::Subjet)
            .chain(filter.map(FatJetDaughter::Filterjet))
            .collect();
        let hard_jet = jet.hard_jet();
        fat_jets.push(JetRecord {
            p4: hard_jet.momentum,
            area: hard_jet.area,
            constituents,
        });
    }
    let taus = taus
        .iter()
        .map(|(&n, values)| {
            debug_assert_eq!(values.len(), fat_jets.len());
            TauCollection {
                n,
                values: values.clone(),
            }
        })
        .collect();
    EventOutput {
        fat_jets,
        subjets,
        filterjets,
        taus,
    }
}

fn append<C, F>(
    records: &mut Vec<JetRecord<C>>,
    jets: &[CompoundSubjet],
    resolve: &mut F,
) -> Range<usize>
where
    F: FnMut(usize) -> Option<C>,
{
    let start = records.len();
    for jet in jets {
        let constituents = jet
            .constituents
            .iter()
            .filter_map(|&idx| {
                let res = resolve(idx);
                if res.is_none() {
                    warn!("Dropping reference to unknown particle {idx}");
                }
                res
            })
            .collect();
        records.push(JetRecord {
            p4: jet.momentum,
            area: jet.area,
            constituents,
        });
    }
    start..records.len()
}
