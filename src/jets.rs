use std::str::FromStr;

use jetty::{anti_kt_f, cambridge_aachen_f, kt_f, ClusterHistory, PseudoJet};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::error::UnknownJetAlgorithm;

/// Sequential recombination jet algorithms
#[derive(
    Display,
    EnumIter,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Deserialize,
    Serialize,
)]
pub enum JetAlgorithm {
    /// The [kt](https://arxiv.org/abs/hep-ph/9305266) algorithm
    #[strum(to_string = "kt")]
    Kt,
    /// The [Cambridge](https://arxiv.org/abs/hep-ph/9707323)/[Aachen](https://arxiv.org/abs/hep-ph/9907280) algorithm
    #[strum(to_string = "Cambridge/Aachen")]
    CambridgeAachen,
    /// The [anti-kt](https://arxiv.org/abs/0802.1189) algorithm
    #[strum(to_string = "anti-kt")]
    AntiKt,
}

impl JetAlgorithm {
    /// Exponent `p` of the transverse momentum in the distance measure
    pub fn pt_exponent(self) -> i32 {
        match self {
            Self::Kt => 1,
            Self::CambridgeAachen => 0,
            Self::AntiKt => -1,
        }
    }
}

impl FromStr for JetAlgorithm {
    type Err = UnknownJetAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ca" | "CambridgeAachen" => Ok(Self::CambridgeAachen),
            "ak" | "AntiKt" => Ok(Self::AntiKt),
            "kt" | "Kt" => Ok(Self::Kt),
            _ => Err(UnknownJetAlgorithm(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct JetDefinition {
    pub algorithm: JetAlgorithm,
    pub radius: f64,
}

impl JetDefinition {
    pub fn new(algorithm: JetAlgorithm, radius: f64) -> Self {
        Self { algorithm, radius }
    }

    /// Step-by-step clustering of `partons`
    pub(crate) fn cluster_history(
        &self,
        partons: Vec<PseudoJet>,
    ) -> ClusterHistory<'static> {
        let r = self.radius;
        match self.algorithm {
            JetAlgorithm::AntiKt => ClusterHistory::new(partons, anti_kt_f(r)),
            JetAlgorithm::Kt => ClusterHistory::new(partons, kt_f(r)),
            JetAlgorithm::CambridgeAachen => {
                ClusterHistory::new(partons, cambridge_aachen_f(r))
            }
        }
    }
}
