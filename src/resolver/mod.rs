//! DNS query primitive.
//!
//! The transport that actually talks to a nameserver is supplied by the
//! caller through [`DnsTransport`]. This module validates query names, hands
//! the query to the transport and interprets the RDATA it gets back.

use crate::record::{NsRecord, RdataError, SrvRecord};
use async_trait::async_trait;
use std::fmt::{self, Display};

#[cfg(feature = "hickory")]
pub mod hickory;

/// Longest textual domain name, not counting a trailing dot.
const MAX_NAME_LEN: usize = 253;

/// Longest single label.
const MAX_LABEL_LEN: usize = 63;

/// DNS record types queried by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// Nameserver record
    Ns,
    /// Service locator record
    Srv,
    /// Canonical name record, seen in chased answers
    Cname,
    /// Any other type, by number
    Other(u16),
}

impl RecordType {
    /// Gets the record type's IANA number.
    pub fn code(self) -> u16 {
        match self {
            Self::Ns => 2,
            Self::Cname => 5,
            Self::Srv => 33,
            Self::Other(code) => code,
        }
    }
}

impl From<u16> for RecordType {
    fn from(code: u16) -> Self {
        match code {
            2 => Self::Ns,
            5 => Self::Cname,
            33 => Self::Srv,
            other => Self::Other(other),
        }
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ns => f.write_str("NS"),
            Self::Srv => f.write_str("SRV"),
            Self::Cname => f.write_str("CNAME"),
            Self::Other(code) => write!(f, "TYPE{code}"),
        }
    }
}

/// An answer record as delivered by a transport: its type and raw RDATA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Type of the answer record
    pub record_type: RecordType,
    /// RDATA with names in uncompressed wire format
    pub rdata: Vec<u8>,
}

impl RawRecord {
    /// Creates a raw record.
    pub fn new(record_type: RecordType, rdata: impl Into<Vec<u8>>) -> Self {
        Self {
            record_type,
            rdata: rdata.into(),
        }
    }
}

/// Failures reported by a [`DnsTransport`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Authoritative answer that the name does not exist (NXDOMAIN)
    #[error("no such name")]
    NoSuchName,
    /// No response within the transport's deadline
    #[error("query timed out")]
    Timeout,
    /// Any other transport failure
    #[error("{0}")]
    Other(String),
}

/// Errors encountered by a DNS lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The query name is not a valid DNS name; nothing was sent
    #[error("invalid DNS name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name
        name: String,
        /// What is wrong with it
        reason: &'static str,
    },
    /// The name does not exist
    #[error("no such name: {0}")]
    NoSuchName(String),
    /// The transport gave up waiting
    #[error("timed out querying {0}")]
    Timeout(String),
    /// The transport failed
    #[error("transport error querying {name}: {message}")]
    Transport {
        /// The query name
        name: String,
        /// Transport-provided description
        message: String,
    },
    /// A record in the response could not be parsed
    #[error("malformed {record_type} record for {name}: {source}")]
    MalformedResponse {
        /// The query name
        name: String,
        /// Type of the offending record
        record_type: RecordType,
        /// Parse failure
        source: RdataError,
    },
}

impl LookupError {
    fn from_transport(name: &str, err: TransportError) -> Self {
        let name = name.to_string();
        match err {
            TransportError::NoSuchName => Self::NoSuchName(name),
            TransportError::Timeout => Self::Timeout(name),
            TransportError::Other(message) => Self::Transport { name, message },
        }
    }
}

/// Record types that can be produced by a lookup.
pub trait Record: Sized + Send {
    /// The type queried for these records.
    const RECORD_TYPE: RecordType;

    /// Parses the record from its RDATA.
    fn from_rdata(rdata: &[u8]) -> Result<Self, RdataError>;
}

impl Record for SrvRecord {
    const RECORD_TYPE: RecordType = RecordType::Srv;

    fn from_rdata(rdata: &[u8]) -> Result<Self, RdataError> {
        SrvRecord::from_rdata(rdata)
    }
}

impl Record for NsRecord {
    const RECORD_TYPE: RecordType = RecordType::Ns;

    fn from_rdata(rdata: &[u8]) -> Result<Self, RdataError> {
        NsRecord::from_rdata(rdata)
    }
}

/// Represents the ability to send a DNS query and return its answers.
///
/// Retries, timeouts, resolver configuration and caching are the
/// implementation's business; a lookup issues exactly one `query`.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// Queries `name` for records of `record_type`, returning the answer
    /// section in the order received. A NOERROR response without matching
    /// answers is an empty `Vec`, not an error.
    async fn query(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<RawRecord>, TransportError>;

    /// Gets the SRV records for `name` in the order the transport returned
    /// them, without sorting by priority or shuffling based on weight.
    async fn lookup_srv(&self, name: &str) -> Result<Vec<SrvRecord>, LookupError> {
        lookup(self, name).await
    }

    /// Gets the NS records for `name` in the order the transport returned them.
    async fn lookup_ns(&self, name: &str) -> Result<Vec<NsRecord>, LookupError> {
        lookup(self, name).await
    }
}

#[async_trait]
impl<T: DnsTransport + ?Sized> DnsTransport for &T {
    async fn query(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<RawRecord>, TransportError> {
        (**self).query(name, record_type).await
    }
}

/// Validates `name` and looks up its records of type `R`.
///
/// Answers of other types (e.g. the CNAMEs of a chased answer) are ignored.
/// A single unparseable record fails the whole lookup.
pub async fn lookup<R, T>(transport: &T, name: &str) -> Result<Vec<R>, LookupError>
where
    R: Record,
    T: DnsTransport + ?Sized,
{
    validate_name(name)?;

    let answers = match transport.query(name, R::RECORD_TYPE).await {
        Ok(answers) => answers,
        Err(e) => {
            let e = LookupError::from_transport(name, e);
            #[cfg(feature = "log")]
            tracing::debug!(%e, "DNS query failed");
            return Err(e);
        }
    };

    answers
        .iter()
        .filter(|answer| answer.record_type == R::RECORD_TYPE)
        .map(|answer| {
            R::from_rdata(&answer.rdata).map_err(|source| LookupError::MalformedResponse {
                name: name.to_string(),
                record_type: R::RECORD_TYPE,
                source,
            })
        })
        .collect::<Result<Vec<R>, LookupError>>()
        .inspect(|_records| {
            #[cfg(feature = "log")]
            tracing::trace!(query = name, count = _records.len(), record_type = %R::RECORD_TYPE, "parsed answers");
        })
}

/// Checks that `name` is a syntactically valid DNS name: at most 253
/// octets (a single trailing dot aside), labels of 1 to 63 octets made of
/// ascii letters, digits, `-` and `_`.
pub fn validate_name(name: &str) -> Result<(), LookupError> {
    let invalid = |reason: &'static str| LookupError::InvalidName {
        name: name.to_string(),
        reason,
    };

    let trimmed = name.strip_suffix('.').unwrap_or(name);
    if trimmed.is_empty() {
        return Err(invalid("empty name"));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(invalid("name longer than 253 octets"));
    }

    for label in trimmed.split('.') {
        if label.is_empty() {
            return Err(invalid("empty label"));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(invalid("label longer than 63 octets"));
        }
        if !label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(invalid("illegal character in label"));
        }
    }

    Ok(())
}
