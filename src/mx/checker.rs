use std::sync::Arc;
use std::time::Duration;

use crate::address::extract_domain;
use crate::options::CheckOptions;
use crate::throttle::ThrottleSender;

use super::{
    Liveness, Outcome,
    resolver::{LookupMx, classify, resolve_with},
};

/// Resolves one address to a final [`Outcome`], signalling the throttle
/// channel on every resource-exhaustion occurrence and retrying after a
/// cooldown while retries remain.
pub struct MxChecker<R: ?Sized> {
    resolver: Arc<R>,
    throttle: ThrottleSender,
    lookup_timeout: Duration,
    cooldown: Duration,
    max_retries: u32,
}

impl<R> MxChecker<R>
where
    R: LookupMx + ?Sized,
{
    pub fn new(resolver: Arc<R>, throttle: ThrottleSender, options: &CheckOptions) -> Self {
        Self {
            resolver,
            throttle,
            lookup_timeout: options.lookup_timeout,
            cooldown: options.cooldown,
            max_retries: options.max_retries,
        }
    }

    pub async fn check(&self, address: String) -> Outcome {
        let domain = match extract_domain(&address) {
            Ok(domain) => domain,
            Err(err) => {
                tracing::debug!(%address, error = %err, "unusable address, classified dead");
                return Outcome::dead(address);
            }
        };

        let mut attempts = 0;
        loop {
            attempts += 1;
            let result = resolve_with(self.resolver.as_ref(), &domain, self.lookup_timeout).await;
            let mut outcome = classify(&address, result);
            outcome.attempts = attempts;

            if outcome.liveness != Liveness::ResourceExhausted {
                tracing::debug!(%address, liveness = %outcome.liveness, attempts, "classified");
                return outcome;
            }

            self.throttle.signal();
            if attempts > self.max_retries {
                tracing::warn!(%address, attempts, "retries exhausted, address left unresolved");
                return outcome;
            }
            tokio::time::sleep(self.cooldown).await;
        }
    }
}
