use std::time::Duration;

use async_trait::async_trait;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
};

use super::{Error, MxRecord, MxStatus, Outcome};

/// The one DNS operation the sweep needs. Implemented for the tokio resolver
/// and for test doubles.
#[async_trait]
pub trait LookupMx: Send + Sync {
    /// Returns the MX records of `domain`. A domain without records (NXDOMAIN
    /// included) is `Ok` with an empty list.
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, Error>;
}

/// Builds a resolver from the host configuration, falling back to the
/// built-in upstreams when the system configuration cannot be read.
pub fn system_resolver(lookup_timeout: Duration) -> TokioAsyncResolver {
    match TokioAsyncResolver::tokio_from_system_conf() {
        Ok(resolver) => resolver,
        Err(err) => {
            let err = Error::resolver_init(err);
            tracing::warn!(error = %err, "falling back to default upstream resolvers");
            let mut opts = ResolverOpts::default();
            opts.timeout = lookup_timeout;
            TokioAsyncResolver::tokio(ResolverConfig::default(), opts)
        }
    }
}

/// Lookup `ascii_domain`, bounded by `timeout`. Records come back sorted by
/// preference and deduplicated.
pub async fn resolve_with<R>(
    resolver: &R,
    ascii_domain: &str,
    timeout: Duration,
) -> Result<MxStatus, Error>
where
    R: LookupMx + ?Sized,
{
    let mut records = match tokio::time::timeout(timeout, resolver.lookup_mx(ascii_domain)).await
    {
        Ok(result) => result?,
        Err(_) => return Err(Error::timeout(timeout)),
    };

    records.sort();
    records.dedup();

    if records.is_empty() {
        Ok(MxStatus::NoRecords)
    } else {
        Ok(MxStatus::Records(records))
    }
}

/// Maps a lookup result to the liveness of `address`.
///
/// Descriptor exhaustion is the only failure that is not a verdict on the
/// domain; every other error (timeouts included) counts as dead.
pub fn classify(address: &str, result: Result<MxStatus, Error>) -> Outcome {
    match result {
        Ok(MxStatus::Records(records)) => Outcome::alive(address, records),
        Ok(MxStatus::NoRecords) => Outcome::dead(address),
        Err(err) if err.is_resource_exhausted() => {
            tracing::warn!(%address, error = %err, "local resource exhaustion during MX lookup");
            Outcome::exhausted(address)
        }
        Err(err) => {
            tracing::debug!(%address, error = %err, "MX lookup failed");
            Outcome::dead(address)
        }
    }
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

#[async_trait]
impl LookupMx for TokioAsyncResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, Error> {
        let lookup = match self.mx_lookup(domain).await {
            Ok(lookup) => lookup,
            Err(err) => {
                if should_treat_as_empty(&err) {
                    return Ok(Vec::new());
                }
                return Err(Error::lookup(err));
            }
        };
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }
}

fn should_treat_as_empty(err: &ResolveError) -> bool {
    matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. })
}
