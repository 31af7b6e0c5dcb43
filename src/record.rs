//! SRV and NS records, and parsing of their RDATA.

use std::fmt::{self, Display};

/// Longest domain name in wire format, length octets included (RFC 1035).
const MAX_WIRE_NAME_LEN: usize = 255;

/// A single SRV answer, with the fields defined by RFC 2782.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SrvRecord {
    target: String,
    port: u16,
    priority: u16,
    weight: u16,
}

impl SrvRecord {
    /// Creates a SRV record from its fields.
    pub fn new(target: impl Into<String>, port: u16, priority: u16, weight: u16) -> Self {
        Self {
            target: target.into(),
            port,
            priority,
            weight,
        }
    }

    /// Gets a SRV record's target.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Gets a SRV record's port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Gets a SRV record's priority.
    pub fn priority(&self) -> u16 {
        self.priority
    }

    /// Gets a SRV record's weight.
    pub fn weight(&self) -> u16 {
        self.weight
    }

    /// Whether this record is the RFC 2782 marker (target `.`) saying the
    /// service is decidedly not available in the domain.
    pub fn is_unavailable(&self) -> bool {
        self.target == "."
    }

    /// Parses SRV RDATA: priority, weight and port as big-endian u16,
    /// followed by an uncompressed target name.
    pub fn from_rdata(rdata: &[u8]) -> Result<Self, RdataError> {
        let mut cur = Cursor::new(rdata);
        let priority = cur.read_u16()?;
        let weight = cur.read_u16()?;
        let port = cur.read_u16()?;
        let target = cur.read_name()?;
        cur.finish()?;
        Ok(Self {
            target,
            port,
            priority,
            weight,
        })
    }
}

impl Display for SrvRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target, self.port)
    }
}

/// A single NS answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NsRecord {
    host: String,
}

impl NsRecord {
    /// Creates a NS record naming `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    /// Gets the nameserver host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Parses NS RDATA, a single uncompressed name.
    pub fn from_rdata(rdata: &[u8]) -> Result<Self, RdataError> {
        let mut cur = Cursor::new(rdata);
        let host = cur.read_name()?;
        cur.finish()?;
        Ok(Self { host })
    }
}

impl Display for NsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host)
    }
}

/// Reasons RDATA could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RdataError {
    /// Ran out of bytes at `offset`
    #[error("truncated rdata at offset {offset}")]
    Truncated {
        /// Offset of the read that failed
        offset: usize,
    },
    /// Name used a compression pointer, which SRV and NS rdata must not
    #[error("compression pointer in name at offset {offset}")]
    CompressedName {
        /// Offset of the pointer
        offset: usize,
    },
    /// Label length octet with the reserved high bits set
    #[error("invalid label type {octet:#04x} at offset {offset}")]
    InvalidLabel {
        /// The length octet
        octet: u8,
        /// Offset of the length octet
        offset: usize,
    },
    /// Name is longer than 255 octets in wire format
    #[error("name exceeds 255 octets")]
    NameTooLong,
    /// Label contains bytes that cannot appear in a host name
    #[error("non-ascii label at offset {offset}")]
    NonAsciiLabel {
        /// Offset of the label
        offset: usize,
    },
    /// Bytes remain after the record was fully read
    #[error("{0} trailing bytes after rdata")]
    TrailingBytes(usize),
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], RdataError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.buf.len())
            .ok_or(RdataError::Truncated { offset: self.pos })?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_u16(&mut self) -> Result<u16, RdataError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Reads a sequence of length-prefixed labels up to the root label.
    /// The root name alone reads as `.`.
    fn read_name(&mut self) -> Result<String, RdataError> {
        let start = self.pos;
        let mut labels = Vec::new();
        loop {
            let offset = self.pos;
            let len = self.take(1)?[0];
            match len & 0xC0 {
                0x00 => {}
                0xC0 => return Err(RdataError::CompressedName { offset }),
                _ => return Err(RdataError::InvalidLabel { octet: len, offset }),
            }
            if self.pos - start + len as usize > MAX_WIRE_NAME_LEN {
                return Err(RdataError::NameTooLong);
            }
            if len == 0 {
                break;
            }
            let label = self.take(len as usize)?;
            if !label.iter().all(|b| b.is_ascii_graphic()) {
                return Err(RdataError::NonAsciiLabel { offset });
            }
            // Only ascii graphic bytes remain, so this is valid utf-8
            labels.push(String::from_utf8_lossy(label).into_owned());
        }

        if labels.is_empty() {
            Ok(String::from("."))
        } else {
            Ok(labels.join("."))
        }
    }

    fn finish(self) -> Result<(), RdataError> {
        match self.buf.len() - self.pos {
            0 => Ok(()),
            n => Err(RdataError::TrailingBytes(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_name(name: &str) -> Vec<u8> {
        let mut out = Vec::new();
        for label in name.split('.').filter(|l| !l.is_empty()) {
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
        out.push(0);
        out
    }

    fn srv_rdata(priority: u16, weight: u16, port: u16, target: &str) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&priority.to_be_bytes());
        out.extend_from_slice(&weight.to_be_bytes());
        out.extend_from_slice(&port.to_be_bytes());
        out.extend(wire_name(target));
        out
    }

    #[test]
    fn parses_srv() {
        let record = SrvRecord::from_rdata(&srv_rdata(0, 100, 389, "dc1.example.com")).unwrap();
        assert_eq!(record, SrvRecord::new("dc1.example.com", 389, 0, 100));
        assert_eq!(record.to_string(), "dc1.example.com:389");
        assert!(!record.is_unavailable());
    }

    #[test]
    fn parses_srv_with_extreme_fields() {
        let record =
            SrvRecord::from_rdata(&srv_rdata(u16::MAX, u16::MAX, u16::MAX, "a.b")).unwrap();
        assert_eq!(record.priority(), 65535);
        assert_eq!(record.weight(), 65535);
        assert_eq!(record.port(), 65535);
    }

    #[test]
    fn root_target_is_unavailable() {
        let record = SrvRecord::from_rdata(&srv_rdata(0, 0, 0, ".")).unwrap();
        assert_eq!(record.target(), ".");
        assert!(record.is_unavailable());
    }

    #[test]
    fn truncated_fixed_fields() {
        assert_eq!(
            SrvRecord::from_rdata(&[0, 1, 0, 2, 1]),
            Err(RdataError::Truncated { offset: 4 })
        );
        assert_eq!(
            SrvRecord::from_rdata(&[]),
            Err(RdataError::Truncated { offset: 0 })
        );
    }

    #[test]
    fn truncated_target() {
        let mut rdata = srv_rdata(0, 0, 88, "kdc.example.com");
        rdata.truncate(rdata.len() - 4);
        assert!(matches!(
            SrvRecord::from_rdata(&rdata),
            Err(RdataError::Truncated { .. })
        ));
    }

    #[test]
    fn missing_root_label() {
        let mut rdata = srv_rdata(0, 0, 88, "kdc.example.com");
        rdata.pop();
        assert!(matches!(
            SrvRecord::from_rdata(&rdata),
            Err(RdataError::Truncated { .. })
        ));
    }

    #[test]
    fn rejects_compression_pointer() {
        let mut rdata = srv_rdata(0, 0, 88, "");
        rdata.pop();
        rdata.extend_from_slice(&[0xC0, 0x0C]);
        assert_eq!(
            SrvRecord::from_rdata(&rdata),
            Err(RdataError::CompressedName { offset: 6 })
        );
    }

    #[test]
    fn rejects_reserved_label_type() {
        assert_eq!(
            NsRecord::from_rdata(&[0x40, 0]),
            Err(RdataError::InvalidLabel {
                octet: 0x40,
                offset: 0
            })
        );
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut rdata = srv_rdata(1, 2, 3, "dc.example.com");
        rdata.extend_from_slice(&[1, 2]);
        assert_eq!(
            SrvRecord::from_rdata(&rdata),
            Err(RdataError::TrailingBytes(2))
        );
    }

    #[test]
    fn rejects_overlong_name() {
        let label = "a".repeat(63);
        let name = vec![label.as_str(); 5].join(".");
        assert_eq!(
            NsRecord::from_rdata(&wire_name(&name)),
            Err(RdataError::NameTooLong)
        );
    }

    #[test]
    fn rejects_non_ascii_label() {
        assert_eq!(
            NsRecord::from_rdata(&[2, b'a', 0xFF, 0]),
            Err(RdataError::NonAsciiLabel { offset: 0 })
        );
    }

    #[test]
    fn parses_ns() {
        let record = NsRecord::from_rdata(&wire_name("ns1.example.com")).unwrap();
        assert_eq!(record.host(), "ns1.example.com");
        assert_eq!(record.to_string(), "ns1.example.com");
    }
}
