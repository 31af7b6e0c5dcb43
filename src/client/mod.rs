//! Discovery of Active Directory services.

use crate::{
    guid::Guid,
    record::{NsRecord, SrvRecord},
    resolver::{DnsTransport, LookupError},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// SRV target selection policies.
pub mod policy;

mod service;
pub use service::{DiscoveryQuery, Service};

/// Errors encountered by a [`Discovery`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    /// The query is missing a part its service needs
    #[error("invalid discovery query: {0}")]
    InvalidQuery(&'static str),
    /// DNS lookup errors
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl DiscoveryError {
    /// Whether this is an authoritative "no such name" answer, as opposed to
    /// a failure to find out.
    pub fn is_negative(&self) -> bool {
        matches!(self, Self::Lookup(LookupError::NoSuchName(_)))
    }
}

/// An ordered list of candidates, most preferred first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateList<T> {
    records: Vec<T>,
}

impl<T> CandidateList<T> {
    /// Gets the candidates in order of preference.
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Gets the number of candidates.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Whether the lookup found nothing.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Takes the candidates out of the list.
    pub fn into_records(self) -> Vec<T> {
        self.records
    }
}

impl<T> From<Vec<T>> for CandidateList<T> {
    fn from(records: Vec<T>) -> Self {
        Self { records }
    }
}

impl<T> IntoIterator for CandidateList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a CandidateList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Client for discovering domain controllers, global catalogs, KDCs and the
/// PDC emulator of a realm through DNS.
///
/// # Usage
///
/// A [`Discovery`] is created around a [`DnsTransport`] with
/// [`Discovery::new_with_transport`] and answers one query per call; it
/// keeps no records between calls.
///
/// ## Randomness
///
/// Candidates of equal priority are ordered by weighted random choice. The
/// generator used for that is owned by the client, can be replaced with
/// [`Discovery::rng`] (e.g. with a seeded one for reproducible ordering),
/// and is locked only while a result is being ranked.
#[derive(Debug)]
pub struct Discovery<Transport, R = StdRng> {
    transport: Transport,
    rng: Mutex<R>,
}

impl<Transport: Default> Discovery<Transport> {
    /// Creates a new client using the default transport.
    pub fn new() -> Self {
        Self::new_with_transport(Transport::default())
    }
}

impl<Transport: Default> Default for Discovery<Transport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Transport> Discovery<Transport> {
    /// Creates a new client sending its queries through `transport`.
    pub fn new_with_transport(transport: Transport) -> Self {
        Self {
            transport,
            rng: Mutex::new(StdRng::from_rng(&mut rand::rng())),
        }
    }
}

impl<Transport, R> Discovery<Transport, R> {
    /// Sets the transport of the client.
    pub fn transport<T>(self, transport: T) -> Discovery<T, R> {
        Discovery {
            transport,
            rng: self.rng,
        }
    }

    /// Sets the random number generator used to order candidates.
    pub fn rng<Q>(self, rng: Q) -> Discovery<Transport, Q> {
        Discovery {
            transport: self.transport,
            rng: Mutex::new(rng),
        }
    }

    /// Gets the client's transport.
    pub fn get_transport(&self) -> &Transport {
        &self.transport
    }
}

impl<Transport: DnsTransport, R: Rng + Send> Discovery<Transport, R> {
    /// Looks up the SRV records of `service` for `query` and orders them per
    /// RFC 2782.
    ///
    /// A site-qualified query that finds nothing is an empty result; falling
    /// back to the whole realm is left to the caller.
    pub async fn discover(
        &self,
        service: Service,
        query: &DiscoveryQuery,
    ) -> Result<CandidateList<SrvRecord>, DiscoveryError> {
        let name = service.query_name(query)?;
        #[cfg(feature = "log")]
        tracing::debug!(%service, query = %name, "discovering");

        let records = self.transport.lookup_srv(&name).await?;

        // A `.` target says the service is decidedly not available here
        let records: Vec<_> = records
            .into_iter()
            .filter(|record| {
                let available = !record.is_unavailable();
                if !available {
                    #[cfg(feature = "log")]
                    tracing::trace!(query = %name, "SRV target '.', service not available");
                }
                available
            })
            .collect();

        let ranked = self.rank(records);
        #[cfg(feature = "log")]
        tracing::debug!(%service, query = %name, count = ranked.len(), "discovered");
        Ok(ranked.into())
    }

    /// Lists the domain controllers of `realm`, restricted to `site` if given.
    pub async fn dcs(
        &self,
        realm: &str,
        site: Option<&str>,
    ) -> Result<CandidateList<SrvRecord>, DiscoveryError> {
        self.discover(Service::DomainControllers, &with_site(realm, site))
            .await
    }

    /// Lists the global catalogs of `realm`, restricted to `site` if given.
    pub async fn gcs(
        &self,
        realm: &str,
        site: Option<&str>,
    ) -> Result<CandidateList<SrvRecord>, DiscoveryError> {
        self.discover(Service::GlobalCatalogs, &with_site(realm, site))
            .await
    }

    /// Lists the KDCs of `forest`, restricted to `site` if given.
    pub async fn kdcs(
        &self,
        forest: &str,
        site: Option<&str>,
    ) -> Result<CandidateList<SrvRecord>, DiscoveryError> {
        self.discover(Service::Kdcs, &with_site(forest, site)).await
    }

    /// Finds the PDC emulator of `domain`.
    pub async fn pdc(&self, domain: &str) -> Result<CandidateList<SrvRecord>, DiscoveryError> {
        self.discover(Service::Pdc, &DiscoveryQuery::new(domain))
            .await
    }

    /// Lists the domain controllers of the domain with GUID `guid` in `forest`.
    pub async fn dcs_by_guid(
        &self,
        forest: &str,
        guid: Guid,
    ) -> Result<CandidateList<SrvRecord>, DiscoveryError> {
        let query = DiscoveryQuery::new(forest).domain_guid(guid);
        self.discover(Service::DcsByGuid, &query).await
    }

    /// Lists the nameservers of `domain` in the order the transport returned
    /// them. NS records carry no priority or weight, so nothing is ranked.
    pub async fn nameservers(&self, domain: &str) -> Result<CandidateList<NsRecord>, DiscoveryError> {
        #[cfg(feature = "log")]
        tracing::debug!(query = %domain, "looking up nameservers");
        let records = self.transport.lookup_ns(domain).await?;
        Ok(records.into())
    }

    fn rank(&self, records: Vec<SrvRecord>) -> Vec<SrvRecord> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        policy::rank(records, &mut *rng)
    }
}

fn with_site(name: &str, site: Option<&str>) -> DiscoveryQuery {
    let query = DiscoveryQuery::new(name);
    match site {
        Some(site) => query.site(site),
        None => query,
    }
}
