//! DNS transport backed by [`hickory_resolver`].

use super::{DnsTransport, RawRecord, RecordType, TransportError};
use async_trait::async_trait;
use hickory_resolver::{
    name_server::ConnectionProvider,
    proto::{
        rr::{RData, RecordType as HickoryRecordType},
        serialize::binary::BinEncodable,
        ProtoErrorKind,
    },
    ResolveError, ResolveErrorKind, Resolver,
};

#[async_trait]
impl<P> DnsTransport for Resolver<P>
where
    P: ConnectionProvider,
{
    async fn query(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<RawRecord>, TransportError> {
        let lookup = match self
            .lookup(name, HickoryRecordType::from(record_type.code()))
            .await
        {
            Ok(lookup) => lookup,
            Err(e) => return map_lookup_error(e),
        };

        lookup
            .records()
            .iter()
            .map(|record| {
                // Hand back wire bytes so every transport goes through the same record parser
                let rdata = encode_rdata(record.data())?;
                Ok(RawRecord::new(
                    RecordType::from(u16::from(record.record_type())),
                    rdata,
                ))
            })
            .collect()
    }
}

/// Re-encodes parsed RDATA to wire format. A fresh encoder has nothing to
/// point back to, so names come out uncompressed.
fn encode_rdata(rdata: &RData) -> Result<Vec<u8>, TransportError> {
    rdata
        .to_bytes()
        .map_err(|e| TransportError::Other(format!("re-encoding rdata: {e}")))
}

/// NXDOMAIN is a failure, while a name without records of the type is a
/// clean empty answer.
fn map_lookup_error(e: ResolveError) -> Result<Vec<RawRecord>, TransportError> {
    if e.is_nx_domain() {
        return Err(TransportError::NoSuchName);
    }
    if e.is_no_records_found() {
        return Ok(Vec::new());
    }
    match e.kind() {
        ResolveErrorKind::Proto(proto) if matches!(proto.kind(), ProtoErrorKind::Timeout) => {
            Err(TransportError::Timeout)
        }
        _ => Err(TransportError::Other(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_resolver::proto::{
        op::{Query, ResponseCode},
        rr::{rdata::SRV, Name},
        ProtoError,
    };
    use std::str::FromStr;

    fn no_records(response_code: ResponseCode) -> ResolveError {
        let query = Query::query(
            Name::from_str("_ldap._tcp.example.com.").unwrap(),
            HickoryRecordType::SRV,
        );
        ResolveError::from(ProtoError::from(ProtoErrorKind::NoRecordsFound {
            query: Box::new(query),
            soa: None,
            ns: None,
            negative_ttl: None,
            response_code,
            trusted: true,
            authorities: None,
        }))
    }

    fn proto_error(kind: ProtoErrorKind) -> ResolveError {
        ResolveError::from(ProtoError::from(kind))
    }

    #[test]
    fn nxdomain_is_no_such_name() {
        assert_eq!(
            map_lookup_error(no_records(ResponseCode::NXDomain)),
            Err(TransportError::NoSuchName)
        );
    }

    #[test]
    fn nodata_is_empty() {
        assert_eq!(
            map_lookup_error(no_records(ResponseCode::NoError)),
            Ok(Vec::new())
        );
    }

    #[test]
    fn timeout_is_timeout() {
        assert_eq!(
            map_lookup_error(proto_error(ProtoErrorKind::Timeout)),
            Err(TransportError::Timeout)
        );
    }

    #[test]
    fn other_failures_keep_their_message() {
        match map_lookup_error(proto_error(ProtoErrorKind::Message("connection refused"))) {
            Err(TransportError::Other(message)) => {
                assert!(message.contains("connection refused"), "{message}")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn encoded_srv_parses_back() {
        let srv = SRV::new(
            10,
            60,
            389,
            Name::from_str("dc1.example.com.").unwrap(),
        );
        let rdata = encode_rdata(&RData::SRV(srv)).unwrap();
        let record = crate::SrvRecord::from_rdata(&rdata).unwrap();
        assert_eq!(record, crate::SrvRecord::new("dc1.example.com", 389, 10, 60));
    }

    // Needs a working system resolver
    #[tokio::test]
    #[ignore]
    async fn live_nameservers() -> Result<(), ResolveError> {
        let resolver = Resolver::builder_tokio()?.build();
        let records = resolver.lookup_ns("example.com").await.unwrap();
        assert_ne!(records.len(), 0);
        Ok(())
    }
}
