use serde::{Deserialize, Serialize};
use tpcc_core::Scale;
use tpcc_drivers::ClientConfig;
use typed_builder::TypedBuilder;

use crate::Error;

/// How workers are isolated from each other.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Isolation {
    /// One OS process per worker, re-executing the current binary.
    Process,
    /// One dedicated thread per worker inside the current process.
    Thread,
}

/// Immutable run configuration.
///
/// Built once at startup and handed to every component by reference; worker
/// processes receive it serialized inside their spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct BenchConfig {
    #[builder(default)]
    pub scale: Scale,
    /// Base seed; worker `i` seeds its generator with `seed + i`.
    #[builder(default = 0)]
    pub seed: u64,
    /// Retries allowed per scheduled transaction after its first attempt.
    #[builder(default = 64)]
    pub max_retries: u32,
    #[builder(default)]
    pub client: ClientConfig,
    /// Run the consistency checks around the workload.
    #[builder(default = true)]
    pub validate: bool,
    #[builder(default = Isolation::Thread)]
    pub isolation: Isolation,
}

impl BenchConfig {
    /// # Errors
    ///
    /// Returns an error if the scale cannot describe a loadable database.
    pub fn ensure_valid(&self) -> Result<(), Error> {
        self.scale.validate()?;
        Ok(())
    }

    /// Whether all `execute` calls are serialized by the global lock.
    #[must_use]
    pub const fn serialized(&self) -> bool {
        self.client.global_lock.is_some()
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
