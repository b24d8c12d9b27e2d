//! Error types for the injector.

use phaseloop_pipeline::SpliceError;

use crate::phase::Phase;

/// A value that does not name one of the seven phases.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid phase identifier '{value}'")]
pub struct InvalidPhase {
    value: String,
}

impl InvalidPhase {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Returns the rejected value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Errors returned by the [`Injector`](crate::Injector) facade.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InjectorError {
    /// A phase identifier could not be resolved.
    #[error(transparent)]
    InvalidPhase(#[from] InvalidPhase),

    /// The injector has already been spliced into a loop.
    #[error("injector is already installed into a player loop")]
    AlreadyInstalled,
}

/// A phase whose dispatch leaf could not be spliced into the host loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to inject {phase} dispatch into player loop: {source}")]
pub struct PhaseSpliceError {
    /// The phase that is not wired.
    pub phase: Phase,
    /// Why the splice failed.
    #[source]
    pub source: SpliceError,
}
