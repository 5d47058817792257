use core::fmt::{Display, Formatter};

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tpcc_core::TransactionKind;

use crate::Error;

/// One of the two measured workload phases.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    ReadWrite,
    ReadOnly,
}

impl Phase {
    /// Relative weights in [`TransactionKind::ALL`] order.
    #[must_use]
    pub const fn weights(self) -> [u32; 5] {
        match self {
            Self::ReadWrite => [10, 10, 1, 1, 1],
            Self::ReadOnly => [0, 0, 0, 1, 1],
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ReadWrite => "rw",
            Self::ReadOnly => "ro",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Discrete distribution over the transaction kinds of a phase.
#[derive(Debug, Clone)]
pub struct Mix {
    index: WeightedIndex<u32>,
}

impl Mix {
    /// # Errors
    ///
    /// Returns an error if the phase weights are all zero.
    pub fn new(phase: Phase) -> Result<Self, Error> {
        Ok(Self {
            index: WeightedIndex::new(phase.weights())?,
        })
    }

    pub fn choose(&self, rng: &mut StdRng) -> TransactionKind {
        TransactionKind::ALL[self.index.sample(rng)]
    }
}
