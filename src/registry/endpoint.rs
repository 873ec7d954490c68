//! Backend endpoint values.

use std::collections::BTreeMap;
use std::fmt;

/// Version stamp the registry attaches to an endpoint update.
///
/// Opaque to the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ModificationTag {
    pub guid: String,
    pub index: u32,
}

/// A single backend address plus registry metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
    tags: BTreeMap<String, String>,
    modification_tag: ModificationTag,
}

impl Endpoint {
    /// Create an endpoint with no metadata.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            tags: BTreeMap::new(),
            modification_tag: ModificationTag::default(),
        }
    }

    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_modification_tag(mut self, tag: ModificationTag) -> Self {
        self.modification_tag = tag;
        self
    }

    /// Parse a `"host:port"` string.
    pub fn parse(addr: &str) -> Option<Self> {
        let (host, port) = addr.rsplit_once(':')?;
        if host.is_empty() {
            return None;
        }
        let port = port.parse().ok()?;
        Some(Self::new(host, port))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn modification_tag(&self) -> &ModificationTag {
        &self.modification_tag
    }

    /// Pool membership key.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let e = Endpoint::parse("127.0.0.1:8080").unwrap();
        assert_eq!(e.host(), "127.0.0.1");
        assert_eq!(e.port(), 8080);
        assert_eq!(e.address(), "127.0.0.1:8080");

        assert!(Endpoint::parse("127.0.0.1").is_none());
        assert!(Endpoint::parse(":80").is_none());
        assert!(Endpoint::parse("host:notaport").is_none());
    }
}
