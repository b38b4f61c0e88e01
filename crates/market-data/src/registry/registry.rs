//! Static source → provider lookup.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::errors::MarketDataError;
use crate::models::Source;
use crate::provider::{
    BybitProvider, GrinexProvider, PublicRateChain, RapiraProvider, RateProvider, Upstream,
};
use crate::retry::RetryPolicy;
use crate::transport::HttpTransport;

/// Configured endpoint per provider. `None` (or blank) selects the default
/// public rate endpoint.
#[derive(Clone, Debug, Default)]
pub struct ProviderEndpoints {
    pub bybit: Option<String>,
    pub rapira: Option<String>,
    pub grinex: Option<String>,
}

/// Immutable registry of rate providers, keyed by source.
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: HashMap<Source, Arc<dyn RateProvider>>,
}

impl ProviderRegistry {
    /// Build a registry from explicit providers. A later provider for the
    /// same source replaces an earlier one.
    pub fn from_providers(providers: Vec<Arc<dyn RateProvider>>) -> Self {
        let providers = providers
            .into_iter()
            .map(|provider| (provider.source(), provider))
            .collect();
        Self { providers }
    }

    /// The three standard providers, sharing one transport, retry policy and
    /// public rate chain.
    pub fn standard(
        transport: Arc<dyn HttpTransport>,
        endpoints: ProviderEndpoints,
        retry: RetryPolicy,
    ) -> Self {
        let upstream = Upstream::new(transport, retry);
        let public_chain = Arc::new(PublicRateChain::new(upstream.clone()));

        let bybit = BybitProvider::new(upstream.clone(), endpoints.bybit, public_chain.clone());
        let rapira = RapiraProvider::new(upstream.clone(), endpoints.rapira, public_chain.clone());
        let grinex = GrinexProvider::new(upstream, endpoints.grinex, public_chain);
        info!(
            "Rate providers: bybit={}, rapira={}, grinex={}",
            bybit.endpoint(),
            rapira.endpoint(),
            grinex.endpoint()
        );

        Self::from_providers(vec![
            Arc::new(bybit) as Arc<dyn RateProvider>,
            Arc::new(rapira),
            Arc::new(grinex),
        ])
    }

    /// Provider for `source`.
    pub fn get(&self, source: Source) -> Result<Arc<dyn RateProvider>, MarketDataError> {
        self.providers
            .get(&source)
            .cloned()
            .ok_or(MarketDataError::ProviderNotConfigured(source))
    }

    pub fn sources(&self) -> Vec<Source> {
        Source::ALL
            .into_iter()
            .filter(|source| self.providers.contains_key(source))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RetryClass;
    use crate::testing::StubTransport;

    #[test]
    fn test_standard_registers_every_source() {
        let registry = ProviderRegistry::standard(
            Arc::new(StubTransport::new()),
            ProviderEndpoints::default(),
            RetryPolicy::no_delay(),
        );
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.sources(), Source::ALL.to_vec());
        for source in Source::ALL {
            assert_eq!(registry.get(source).unwrap().source(), source);
        }
        assert_eq!(registry.get(Source::Grinex).unwrap().id(), "GRINEX");
    }

    #[test]
    fn test_missing_source() {
        let stub = StubTransport::new();
        let chain = Arc::new(PublicRateChain::new(stub.upstream()));
        let rapira: Arc<dyn RateProvider> =
            Arc::new(RapiraProvider::new(stub.upstream(), None, chain));
        let registry = ProviderRegistry::from_providers(vec![rapira]);

        let err = registry.get(Source::Bybit).err().unwrap();
        assert!(matches!(
            err,
            MarketDataError::ProviderNotConfigured(Source::Bybit)
        ));
        assert_eq!(err.retry_class(), RetryClass::Never);
        assert_eq!(registry.sources(), vec![Source::Rapira]);
    }
}
