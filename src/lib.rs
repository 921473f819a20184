//! Subjet/filter decomposition of fat jets and N-subjettiness
//!
//! For each event, [Producer::produce] clusters the input particles into
//! fat jets, splits each fat jet into (up to) two subjets using the
//! mass-drop criterion, reclusters the subjet constituents into (up to)
//! three filter jets and computes the N-subjettiness τ_N of each fat jet
//! for a configured range of N.
//!
//! ```
//! use subjet_filter::{particle, Config, Momentum, Producer};
//!
//! let mut producer = Producer::new(&Config::default()).unwrap();
//! let particles = particle::from_momenta([
//!     Momentum::from_pt_y_phi_m(100., 0., 0., 0.),
//!     Momentum::from_pt_y_phi_m(90., 1., 0., 0.),
//! ]);
//! let out = producer.produce(&particles);
//! assert_eq!(out.fat_jets.len(), 1);
//! assert_eq!(out.subjets.len(), 2);
//! ```
#![warn(clippy::all, rust_2018_idioms)]

pub mod area;
pub mod cluster_sequence;
pub mod compound;
pub mod config;
pub mod error;
pub mod jets;
pub mod momentum;
pub mod nsubjettiness;
pub mod output;
pub mod particle;
pub mod producer;
pub mod subjet_filter;

pub use crate::compound::{CompoundJet, CompoundSubjet};
pub use crate::config::Config;
pub use crate::error::{ConfigError, UnknownJetAlgorithm};
pub use crate::jets::{JetAlgorithm, JetDefinition};
pub use crate::momentum::Momentum;
pub use crate::output::{EventOutput, FatJetDaughter, JetRecord};
pub use crate::particle::InputParticle;
pub use crate::producer::Producer;
pub use crate::subjet_filter::{Diagnostics, SubjetFilter};
