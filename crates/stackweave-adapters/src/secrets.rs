//! Random credential generation.

use std::sync::Mutex;

use rand::{Rng, SeedableRng, rngs::StdRng};
use stackweave_core::{
    application::{ApplicationError, SecretGenerator},
    domain::constructs::database::PasswordPolicy,
    error::StackweaveResult,
};

/// Draws secrets from printable ASCII, minus whatever the policy excludes.
#[derive(Debug)]
pub struct RandomSecretGenerator {
    rng: Mutex<StdRng>,
}

impl RandomSecretGenerator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible output, for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomSecretGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretGenerator for RandomSecretGenerator {
    fn generate(&self, policy: &PasswordPolicy) -> StackweaveResult<String> {
        let alphabet: Vec<char> = ('!'..='~').filter(|c| !policy.excluded.contains(*c)).collect();
        if alphabet.is_empty() {
            return Err(ApplicationError::SecretGenerationFailed {
                reason: "no characters left after exclusions".into(),
            }
            .into());
        }

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok((0..policy.length)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
            .collect())
    }
}
