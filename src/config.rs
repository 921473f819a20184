use serde::{Deserialize, Serialize};

use crate::area::GhostSpec;
use crate::error::ConfigError;
use crate::jets::{JetAlgorithm, JetDefinition};
use crate::nsubjettiness::NSubjettiness;
use crate::subjet_filter::{AsymmetryPolicy, FilterRadius, Settings, SubjetFilter};

/// Producer configuration
///
/// Field names follow the parameters of the CMSSW subjet/filter jet
/// producer. Missing fields take their default values.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Label used in the summary
    pub label: String,
    /// One of `ca`, `CambridgeAachen`, `ak`, `AntiKt`, `kt`, `Kt`
    pub jet_algorithm: String,
    pub r_param: f64,
    pub do_area: bool,
    pub ghost_eta_max: f64,
    pub active_area_repeats: u32,
    pub ghost_area: f64,
    /// Maximum number of fat jets, zero means no limit
    pub n_fat_max: usize,
    pub filterjet_algorithm: String,
    pub r_filt: f64,
    pub filter_radius: FilterRadius,
    pub jet_pt_min: f64,
    pub mass_drop_cut: f64,
    pub asymm_cut: f64,
    pub asymm_cut_later: bool,
    pub asymmetry_policy: AsymmetryPolicy,
    /// Minimum number of real constituents for undoing a clustering step
    pub min_constituents: usize,
    pub nsubjettiness_nmin: usize,
    pub nsubjettiness_nmax: usize,
    /// Normalisation radius for N-subjettiness, defaults to `r_param`
    pub nsubjettiness_r0: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            label: "subjetFilter".to_owned(),
            jet_algorithm: "CambridgeAachen".to_owned(),
            r_param: 1.2,
            do_area: false,
            ghost_eta_max: 5.0,
            active_area_repeats: 1,
            ghost_area: 0.01,
            n_fat_max: 0,
            filterjet_algorithm: "CambridgeAachen".to_owned(),
            r_filt: 0.3,
            filter_radius: FilterRadius::Fixed,
            jet_pt_min: 0.,
            mass_drop_cut: 0.667,
            asymm_cut: 0.3,
            asymm_cut_later: true,
            asymmetry_policy: AsymmetryPolicy::RejectCandidate,
            min_constituents: 1,
            nsubjettiness_nmin: 1,
            nsubjettiness_nmax: 3,
            nsubjettiness_r0: None,
        }
    }
}

impl Config {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn jet_def(&self) -> Result<JetDefinition, ConfigError> {
        let algorithm: JetAlgorithm = self.jet_algorithm.parse()?;
        Ok(JetDefinition::new(algorithm, self.r_param))
    }

    pub fn ghost_spec(&self) -> Result<Option<GhostSpec>, ConfigError> {
        if !self.do_area {
            return Ok(None);
        }
        let spec = GhostSpec::new(
            self.ghost_eta_max,
            self.active_area_repeats,
            self.ghost_area,
        )?;
        Ok(Some(spec))
    }

    pub fn subjet_filter(&self) -> Result<SubjetFilter, ConfigError> {
        let settings = Settings {
            jet_def: self.jet_def()?,
            n_fat_max: self.n_fat_max,
            filter_algorithm: self.filterjet_algorithm.parse()?,
            r_filt: self.r_filt,
            filter_radius: self.filter_radius,
            jet_pt_min: self.jet_pt_min,
            mass_drop_cut: self.mass_drop_cut,
            asymm_cut: self.asymm_cut,
            asymm_cut_later: self.asymm_cut_later,
            asymmetry_policy: self.asymmetry_policy,
            min_constituents: self.min_constituents,
            ghosts: self.ghost_spec()?,
        };
        SubjetFilter::new(settings)
    }

    pub fn nsubjettiness(&self) -> Result<NSubjettiness, ConfigError> {
        NSubjettiness::new(
            self.nsubjettiness_r0.unwrap_or(self.r_param),
            self.nsubjettiness_nmin,
            self.nsubjettiness_nmax,
        )
    }
}
