use std::fmt;

use reqwest::Url;
use scraper::Html;
use tracing::{debug, info};

use super::strategies::{CodeHostingStrategy, GenericStrategy, ListingStrategy, PortfolioStrategy};
use super::{ExtractedRecord, SiteStrategy};
use crate::domain::{RawContent, TargetDescriptor};
use crate::observability::metrics;

/// Host pattern that routes a target to a site-family strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteSignature {
    /// Exact host, e.g. `www.sudancar.com`
    Host(String),
    /// Host or any subdomain of it, e.g. `github.com` matches `gist.github.com`
    HostSuffix(String),
    /// Any host containing the fragment
    HostContains(String),
}

impl SiteSignature {
    pub fn host(host: &str) -> Self {
        SiteSignature::Host(host.to_ascii_lowercase())
    }

    pub fn suffix(suffix: &str) -> Self {
        SiteSignature::HostSuffix(suffix.to_ascii_lowercase())
    }

    pub fn contains(fragment: &str) -> Self {
        SiteSignature::HostContains(fragment.to_ascii_lowercase())
    }

    /// Higher is tried first
    pub fn specificity(&self) -> u8 {
        match self {
            SiteSignature::Host(_) => 3,
            SiteSignature::HostSuffix(_) => 2,
            SiteSignature::HostContains(_) => 1,
        }
    }

    pub fn matches(&self, host: &str) -> bool {
        match self {
            SiteSignature::Host(h) => host == h,
            SiteSignature::HostSuffix(s) => {
                host == s || host.strip_suffix(s.as_str()).is_some_and(|rest| rest.ends_with('.'))
            }
            SiteSignature::HostContains(fragment) => host.contains(fragment.as_str()),
        }
    }
}

impl fmt::Display for SiteSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteSignature::Host(h) => write!(f, "host = {h}"),
            SiteSignature::HostSuffix(s) => write!(f, "host ends with {s}"),
            SiteSignature::HostContains(c) => write!(f, "host contains {c}"),
        }
    }
}

struct Registration {
    signature: SiteSignature,
    strategy: Box<dyn SiteStrategy>,
}

/// Signature → strategy table with a mandatory generic terminal
pub struct ExtractionRegistry {
    entries: Vec<Registration>,
    generic: Box<dyn SiteStrategy>,
}

impl ExtractionRegistry {
    /// Create a registry with the built-in site families
    pub fn new() -> Self {
        let mut registry = Self::generic_only();

        registry.register(SiteSignature::suffix("sudancar.com"), Box::new(ListingStrategy));
        registry.register(SiteSignature::suffix("github.com"), Box::new(CodeHostingStrategy));
        registry.register(SiteSignature::suffix("vercel.app"), Box::new(PortfolioStrategy));

        registry
    }

    /// A registry that sends everything to the generic strategy
    pub fn generic_only() -> Self {
        Self {
            entries: Vec::new(),
            generic: Box::new(GenericStrategy),
        }
    }

    /// Register a strategy for a site family.
    /// Entries stay ordered by specificity; equal specificity keeps registration order.
    pub fn register(&mut self, signature: SiteSignature, strategy: Box<dyn SiteStrategy>) {
        let position = self
            .entries
            .iter()
            .position(|e| e.signature.specificity() < signature.specificity())
            .unwrap_or(self.entries.len());
        self.entries.insert(position, Registration { signature, strategy });
    }

    /// Pick the strategy for a target URL. Unparseable URLs and unmatched hosts go generic.
    pub fn strategy_for(&self, url: &str) -> &dyn SiteStrategy {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()));

        if let Some(host) = host {
            if let Some(entry) = self.entries.iter().find(|e| e.signature.matches(&host)) {
                return entry.strategy.as_ref();
            }
        }
        self.generic.as_ref()
    }

    /// (signature, family) pairs in the order they are tried, generic last
    pub fn dispatch_order(&self) -> Vec<(String, &'static str)> {
        self.entries
            .iter()
            .map(|e| (e.signature.to_string(), e.strategy.family()))
            .chain(std::iter::once(("any host".to_string(), self.generic.family())))
            .collect()
    }

    /// Extract fields for one target. A failed fetch yields an all-absent record.
    pub fn extract(&self, target: &TargetDescriptor, raw: &RawContent) -> ExtractedRecord {
        match raw {
            RawContent::FetchFailed { reason } => {
                debug!(target_name = %target.name, %reason, "no page content; all fields absent");
                metrics::extract::page_unavailable();
                ExtractedRecord::absent()
            }
            RawContent::Page(markup) => {
                let strategy = self.strategy_for(&target.url);
                let document = Html::parse_document(markup);
                let record = strategy.extract(&document);

                info!(
                    target_name = %target.name,
                    strategy = strategy.family(),
                    fields = record.live_count(),
                    "extracted fields"
                );
                metrics::extract::strategy_used(strategy.family());
                metrics::extract::fields_extracted(record.live_count() as u64);
                record
            }
        }
    }
}

impl Default for ExtractionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
