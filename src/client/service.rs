//! Query names for the Active Directory services located through SRV records.

use super::DiscoveryError;
use crate::{guid::Guid, resolver::LookupError};
use std::fmt::{self, Display};

/// Services that can be discovered through SRV records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Domain controllers (`_ldap._tcp`)
    DomainControllers,
    /// Global catalogs (`_gc._tcp`)
    GlobalCatalogs,
    /// Kerberos key distribution centers (`_kerberos._tcp`), anchored at the forest
    Kdcs,
    /// The PDC emulator (`_ldap._tcp.pdc._msdcs`)
    Pdc,
    /// Domain controllers of a domain identified by its GUID, anchored at the forest
    DcsByGuid,
}

/// How the query name is assembled around the anchor name.
#[derive(Debug, Clone, Copy)]
enum Template {
    /// `<service>.<transport>[.<site>._sites].<anchor>`
    Service,
    /// `<service>.<transport>.<role>._msdcs.<anchor>`
    Msdcs(&'static str),
    /// `<guid>._msdcs.<anchor>`
    Guid,
}

/// Which name in a [`DiscoveryQuery`] the query is anchored at.
#[derive(Debug, Clone, Copy)]
enum Anchor {
    Domain,
    Forest,
}

#[derive(Debug, Clone, Copy)]
struct Descriptor {
    service: &'static str,
    transport: &'static str,
    template: Template,
    anchor: Anchor,
    site_qualifiable: bool,
}

impl Service {
    /// Every service, in declaration order.
    pub const ALL: [Service; 5] = [
        Self::DomainControllers,
        Self::GlobalCatalogs,
        Self::Kdcs,
        Self::Pdc,
        Self::DcsByGuid,
    ];

    const fn descriptor(self) -> Descriptor {
        const fn tcp(service: &'static str, template: Template, anchor: Anchor) -> Descriptor {
            Descriptor {
                service,
                transport: "_tcp",
                template,
                anchor,
                site_qualifiable: matches!(template, Template::Service),
            }
        }

        match self {
            Self::DomainControllers => tcp("_ldap", Template::Service, Anchor::Domain),
            Self::GlobalCatalogs => tcp("_gc", Template::Service, Anchor::Domain),
            Self::Kdcs => tcp("_kerberos", Template::Service, Anchor::Forest),
            Self::Pdc => tcp("_ldap", Template::Msdcs("pdc"), Anchor::Domain),
            Self::DcsByGuid => tcp("_ldap", Template::Guid, Anchor::Forest),
        }
    }

    /// Whether a site in the query narrows the lookup to that site.
    pub const fn is_site_qualifiable(self) -> bool {
        self.descriptor().site_qualifiable
    }

    /// Builds the DNS name to query for this service.
    ///
    /// Sites are only honored by site-qualifiable services; other services
    /// ignore them. Only the parts the template needs are checked here (an
    /// empty anchor, a dotted site); the lookup validates the final name.
    pub fn query_name(self, query: &DiscoveryQuery) -> Result<String, DiscoveryError> {
        let desc = self.descriptor();

        let anchor = match desc.anchor {
            Anchor::Domain => query.name(),
            Anchor::Forest => query.forest_name().unwrap_or(query.name()),
        };
        if anchor.trim().is_empty() {
            return Err(invalid_name(anchor, "empty name"));
        }

        let name = match desc.template {
            Template::Service => match query.site_name().filter(|_| desc.site_qualifiable) {
                Some(site) if site.contains('.') => {
                    return Err(invalid_name(site, "site is not a single label"));
                }
                Some(site) => format!(
                    "{}.{}.{site}._sites.{anchor}",
                    desc.service, desc.transport
                ),
                None => format!("{}.{}.{anchor}", desc.service, desc.transport),
            },
            Template::Msdcs(role) => {
                format!("{}.{}.{role}._msdcs.{anchor}", desc.service, desc.transport)
            }
            Template::Guid => {
                let guid = query
                    .guid()
                    .ok_or(DiscoveryError::InvalidQuery("missing domain GUID"))?;
                format!("{guid}._msdcs.{anchor}")
            }
        };
        Ok(name)
    }
}

fn invalid_name(name: &str, reason: &'static str) -> DiscoveryError {
    DiscoveryError::Lookup(LookupError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

impl Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DomainControllers => "domain controllers",
            Self::GlobalCatalogs => "global catalogs",
            Self::Kdcs => "KDCs",
            Self::Pdc => "PDC emulator",
            Self::DcsByGuid => "domain controllers by GUID",
        })
    }
}

/// What to discover services for: a realm/domain name, optionally narrowed
/// to a site, with the forest and domain GUID where the service needs them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryQuery {
    name: String,
    site: Option<String>,
    forest: Option<String>,
    domain_guid: Option<Guid>,
}

impl DiscoveryQuery {
    /// Creates a query for the realm or domain `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the site. An empty or blank site means no site.
    pub fn site(self, site: impl Into<String>) -> Self {
        let site = site.into();
        Self {
            site: Some(site).filter(|s| !s.trim().is_empty()),
            ..self
        }
    }

    /// Sets the forest, used by forest-anchored services instead of the name.
    pub fn forest(self, forest: impl Into<String>) -> Self {
        Self {
            forest: Some(forest.into()),
            ..self
        }
    }

    /// Sets the domain GUID.
    pub fn domain_guid(self, guid: Guid) -> Self {
        Self {
            domain_guid: Some(guid),
            ..self
        }
    }
}

impl DiscoveryQuery {
    /// Gets the realm or domain name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the site, if any.
    pub fn site_name(&self) -> Option<&str> {
        self.site.as_deref()
    }

    /// Gets the forest, if set.
    pub fn forest_name(&self) -> Option<&str> {
        self.forest.as_deref()
    }

    /// Gets the domain GUID, if set.
    pub fn guid(&self) -> Option<&Guid> {
        self.domain_guid.as_ref()
    }
}
