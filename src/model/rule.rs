//! L7 routing rules.

use crate::model::route_config::ServiceKey;
use crate::registry::RouteUri;

/// Host condition of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMatch {
    /// Host header equals the value.
    Exact(String),
    /// Host header ends with the suffix, e.g. `.cf.com` for `*.cf.com`.
    Wildcard(String),
}

/// Routing directive for one full uri.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub full_uri: String,
    pub host: HostMatch,
    pub path_segments: Vec<String>,
    pub forward_to: ServiceKey,
}

impl Rule {
    /// Derive the rule for `uri` forwarding to `forward_to`.
    pub fn for_uri(uri: &RouteUri, forward_to: ServiceKey) -> Self {
        let host = uri.host();
        let host = match host.strip_prefix('*') {
            Some(suffix) => HostMatch::Wildcard(suffix.to_string()),
            None => HostMatch::Exact(host.to_string()),
        };

        Self {
            full_uri: uri.as_str().to_string(),
            host,
            path_segments: uri.path_segments().into_iter().map(String::from).collect(),
            forward_to,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.host, HostMatch::Wildcard(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_uri() {
        let key = ServiceKey::new("cf-baz", 80);
        let rule = Rule::for_uri(&RouteUri::new("baz.cf.com/segment1/segment2"), key.clone());
        assert_eq!(rule.full_uri, "baz.cf.com/segment1/segment2");
        assert_eq!(rule.host, HostMatch::Exact("baz.cf.com".into()));
        assert_eq!(rule.path_segments, vec!["segment1", "segment2"]);
        assert_eq!(rule.forward_to, key);

        let rule = Rule::for_uri(&RouteUri::new("*.foo.cf.com"), key);
        assert_eq!(rule.host, HostMatch::Wildcard(".foo.cf.com".into()));
        assert!(rule.is_wildcard());
        assert!(rule.path_segments.is_empty());
    }
}
