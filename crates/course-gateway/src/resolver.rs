//! Catalog endpoint resolution.

use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::Url;

use crate::{GatewayError, Result};

/// Picks the base URL of a catalog instance for the next request.
pub trait EndpointResolver: Send + Sync {
    fn resolve(&self) -> Result<Url>;
}

/// Always resolves to one fixed base URL.
#[derive(Debug, Clone)]
pub struct StaticEndpoint {
    base: Url,
}

impl StaticEndpoint {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// Parses a base URL string.
    pub fn parse(base: &str) -> Result<Self> {
        parse_url(base).map(Self::new)
    }
}

impl EndpointResolver for StaticEndpoint {
    fn resolve(&self) -> Result<Url> {
        Ok(self.base.clone())
    }
}

/// Round-robins over the instances registered under one service name.
#[derive(Debug)]
pub struct DiscoveredEndpoints {
    service: String,
    instances: Vec<Url>,
    next: AtomicUsize,
}

impl DiscoveredEndpoints {
    pub fn new(service: impl Into<String>, instances: Vec<Url>) -> Self {
        Self {
            service: service.into(),
            instances,
            next: AtomicUsize::new(0),
        }
    }

    /// Parses a list of instance base URLs.
    pub fn parse<'a>(
        service: impl Into<String>,
        instances: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        let instances = instances
            .into_iter()
            .map(parse_url)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(service, instances))
    }
}

impl EndpointResolver for DiscoveredEndpoints {
    fn resolve(&self) -> Result<Url> {
        if self.instances.is_empty() {
            return Err(GatewayError::unavailable(format!(
                "no instances registered for {}",
                self.service
            )));
        }

        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.instances.len();
        Ok(self.instances[index].clone())
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw.trim())
        .map_err(|e| GatewayError::Validation(format!("invalid catalog url '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_validates_urls() {
        assert!(matches!(
            StaticEndpoint::parse("not a url"),
            Err(GatewayError::Validation(_))
        ));
        assert!(StaticEndpoint::parse("http://localhost:8081").is_ok());
        let discovered =
            DiscoveredEndpoints::parse("catalog-service", ["http://a:1", " http://b:2 "]).unwrap();
        assert_eq!(discovered.resolve().unwrap(), url("http://a:1"));
        assert_eq!(discovered.resolve().unwrap(), url("http://b:2"));
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn static_endpoint_is_stable() {
        let resolver = StaticEndpoint::new(url("http://catalog:8081"));
        assert_eq!(resolver.resolve().unwrap(), url("http://catalog:8081"));
        assert_eq!(resolver.resolve().unwrap(), url("http://catalog:8081"));
    }

    #[test]
    fn discovered_endpoints_round_robin() {
        let resolver = DiscoveredEndpoints::new(
            "catalog-service",
            vec![url("http://10.0.0.1:8081"), url("http://10.0.0.2:8081")],
        );

        assert_eq!(resolver.resolve().unwrap(), url("http://10.0.0.1:8081"));
        assert_eq!(resolver.resolve().unwrap(), url("http://10.0.0.2:8081"));
        assert_eq!(resolver.resolve().unwrap(), url("http://10.0.0.1:8081"));
    }

    #[test]
    fn no_instances_is_unavailable() {
        let resolver = DiscoveredEndpoints::new("catalog-service", vec![]);
        assert!(resolver.resolve().unwrap_err().is_unavailable());
    }
}
