#![deny(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

/*!
Discovery of Active Directory domain controllers, global catalogs, KDCs and
the PDC emulator through DNS SRV records.

# Introduction

Active Directory advertises its services with SRV records, as defined in
[RFC 2782](https://tools.ietf.org/html/rfc2782), of the form

`_Service._Proto.Name TTL Class SRV Priority Weight Port Target`

For instance, the domain controllers of `example.com` might be published as:

```text
_ldap._tcp.example.com. 600 IN SRV 0 100 389 dc1.example.com.
_ldap._tcp.example.com. 600 IN SRV 0 100 389 dc2.example.com.
_ldap._tcp.example.com. 600 IN SRV 10 0  389 backup.example.com.
```

A client should try `dc1` and `dc2` first (lowest priority), in a random
order weighted by their weights, and only then `backup`.

[`Discovery`] composes the query name for each kind of service (optionally
narrowed to a site, e.g. `_ldap._tcp.<site>._sites.example.com`), looks it up
through a [`DnsTransport`] and returns the candidates in that order:

| Operation | Query name |
|---|---|
| [`Discovery::dcs`] | `_ldap._tcp[.<site>._sites].<realm>` |
| [`Discovery::gcs`] | `_gc._tcp[.<site>._sites].<realm>` |
| [`Discovery::kdcs`] | `_kerberos._tcp[.<site>._sites].<forest>` |
| [`Discovery::pdc`] | `_ldap._tcp.pdc._msdcs.<domain>` |
| [`Discovery::dcs_by_guid`] | `<guid>._msdcs.<forest>` |
| [`Discovery::nameservers`] | `<domain>` (NS, not ranked) |

Nothing is cached between calls, and nothing is retried: a failed lookup is
reported as a [`DiscoveryError`], and an empty list means the name exists
but has no such records.

# Transports

Sending queries is left to an implementation of [`DnsTransport`]. The
provided backends are enabled by the following features:

- `hickory` (via [`hickory_resolver::Resolver`])

[`DnsTransport`]: resolver::DnsTransport
*/

mod client;
pub use client::{
    policy, CandidateList, Discovery, DiscoveryError, DiscoveryQuery, Service,
};

pub mod guid;
pub use guid::Guid;

mod record;
pub use record::{NsRecord, RdataError, SrvRecord};

pub mod resolver;
