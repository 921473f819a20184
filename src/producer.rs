use std::collections::HashSet;

use log::{debug, info};

use crate::config::Config;
use crate::error::ConfigError;
use crate::nsubjettiness::NSubjettiness;
use crate::output::{assemble, EventOutput};
use crate::particle::InputParticle;
use crate::subjet_filter::{Diagnostics, SubjetFilter};

/// Runs the subjet/filter algorithm and N-subjettiness on single events
///
/// The only state kept between events are the diagnostic counters.
/// For concurrent processing, use one producer per thread and combine
/// their diagnostics.
#[derive(Clone, Debug)]
pub struct Producer {
    label: String,
    subjet_filter: SubjetFilter,
    nsubjettiness: NSubjettiness,
    diagnostics: Diagnostics,
}

impl Producer {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let subjet_filter = config.subjet_filter()?;
        let nsubjettiness = config.nsubjettiness()?;
        debug!("Settings: {:#?}", subjet_filter.settings());
        Ok(Self {
            label: config.label.clone(),
            subjet_filter,
            nsubjettiness,
            diagnostics: Diagnostics::default(),
        })
    }

    /// Process one event
    ///
    /// Constituents of the output jets refer to the `index` of the
    /// input particles.
    pub fn produce(&mut self, particles: &[InputParticle]) -> EventOutput<usize> {
        let live: HashSet<usize> = particles.iter().map(|p| p.index).collect();
        self.produce_with(particles, |idx| live.contains(&idx).then_some(idx))
    }

    /// Process one event, translating constituent indices with `resolve`
    ///
    /// Constituents for which `resolve` returns `None` are dropped.
    pub fn produce_with<C, F>(
        &mut self,
        particles: &[InputParticle],
        resolve: F,
    ) -> EventOutput<C>
    where
        F: FnMut(usize) -> Option<C>,
    {
        let jets = self.subjet_filter.run(particles, &mut self.diagnostics);
        let taus = self.nsubjettiness.run(&jets);
        assemble(&jets, &taus, resolve)
    }

    pub fn subjet_filter(&self) -> &SubjetFilter {
        &self.subjet_filter
    }

    pub fn nsubjettiness(&self) -> &NSubjettiness {
        &self.nsubjettiness
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn summary(&self) -> String {
        format!("{}: {}", self.label, self.diagnostics)
    }

    /// Log the summary of all processed events
    pub fn end_job(&self) {
        info!("{}", self.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::momentum::Momentum;
    use crate::particle::from_momenta;

    #[test]
    fn counts_events() {
        let mut producer = Producer::new(&Config::default()).unwrap();
        let particles =
            from_momenta([Momentum::from_pt_y_phi_m(30., 0., 0., 0.)]);
        for _ in 0..3 {
            let out = producer.produce(&particles);
            assert_eq!(out.fat_jets.len(), 1);
            assert_eq!(out.taus.len(), 3);
        }
        producer.produce(&[]);
        assert_eq!(producer.diagnostics().events, 4);
        assert_eq!(producer.diagnostics().fat_jets, 3);
        assert!(producer.summary().starts_with("subjetFilter: "));
    }

    #[test]
    fn invalid_algorithm_fails_early() {
        let config = Config {
            filterjet_algorithm: "cone".to_owned(),
            ..Default::default()
        };
        assert!(Producer::new(&config).is_err());
    }
}
