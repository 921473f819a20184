use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Unknown jet algorithm: {0}, use (ca|CambridgeAachen)|(kt|Kt)|(ak|AntiKt)"
)]
pub struct UnknownJetAlgorithm(pub String);

/// Errors detected when setting up the algorithms
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    UnknownJetAlgorithm(#[from] UnknownJetAlgorithm),
    #[error("{name} has to be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} has to be finite and non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("Invalid N-subjettiness range: Nmin = {min} > Nmax = {max}")]
    NRange { min: usize, max: usize },
    #[error("The minimum number of subjet constituents has to be at least 1")]
    MinConstituents,
    #[error("Explicit ghosts support exactly one repeat, got {0}")]
    GhostRepeats(u32),
    #[error("Failed to parse configuration")]
    Parse(#[from] toml::de::Error),
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value > 0. && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

pub(crate) fn non_negative(
    name: &'static str,
    value: f64,
) -> Result<f64, ConfigError> {
    if value >= 0. && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
