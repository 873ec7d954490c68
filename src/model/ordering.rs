//! Total orders over model entries.
//!
//! Snapshot output order is by key; device evaluation order (rule ordinals)
//! is by specificity. Both are pure functions of the entries themselves.

use std::cmp::Ordering;

use crate::model::route_config::RouteConfig;
use crate::model::rule::{HostMatch, Rule};

/// Service name ascending, then service port ascending.
pub fn cmp_route_configs(a: &RouteConfig, b: &RouteConfig) -> Ordering {
    a.key
        .service_name
        .cmp(&b.key.service_name)
        .then(a.key.service_port.cmp(&b.key.service_port))
}

/// Full uri ascending.
pub fn cmp_rules(a: &Rule, b: &Rule) -> Ordering {
    a.full_uri.cmp(&b.full_uri)
}

/// Most specific rule first.
///
/// Exact hosts beat wildcards, deeper paths beat shallower ones, longer
/// wildcard suffixes beat shorter ones. Remaining ties fall back to the uri.
pub fn cmp_rule_specificity(a: &Rule, b: &Rule) -> Ordering {
    a.is_wildcard()
        .cmp(&b.is_wildcard())
        .then(b.path_segments.len().cmp(&a.path_segments.len()))
        .then(wildcard_len(b).cmp(&wildcard_len(a)))
        .then(cmp_rules(a, b))
}

fn wildcard_len(rule: &Rule) -> usize {
    match &rule.host {
        HostMatch::Wildcard(suffix) => suffix.len(),
        HostMatch::Exact(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::route_config::ServiceKey;
    use crate::registry::RouteUri;

    fn rc(name: &str, port: u16) -> RouteConfig {
        RouteConfig::new(ServiceKey::new(name, port), "cf")
    }

    #[test]
    fn test_route_config_sort() {
        let mut configs = vec![
            rc("bar", 80),
            rc("foo", 2),
            rc("foo", 8080),
            rc("baz", 1),
            rc("foo", 80),
            rc("foo", 9090),
            rc("baz", 1000),
            rc("foo", 1),
            rc("bar", 1),
        ];
        configs.sort_by(cmp_route_configs);

        let sorted: Vec<(&str, u16)> = configs
            .iter()
            .map(|c| (c.service_name(), c.service_port()))
            .collect();
        assert_eq!(
            sorted,
            vec![
                ("bar", 1),
                ("bar", 80),
                ("baz", 1),
                ("baz", 1000),
                ("foo", 1),
                ("foo", 2),
                ("foo", 80),
                ("foo", 8080),
                ("foo", 9090),
            ]
        );
    }

    #[test]
    fn test_rules_sort() {
        let key = ServiceKey::new("pool", 80);
        let mut rules: Vec<Rule> = ["foo", "bar", "baz", "foo/a", "bar.cf.com"]
            .iter()
            .map(|u| Rule::for_uri(&RouteUri::new(u), key.clone()))
            .collect();
        rules.sort_by(cmp_rules);

        let uris: Vec<&str> = rules.iter().map(|r| r.full_uri.as_str()).collect();
        assert_eq!(uris, vec!["bar", "bar.cf.com", "baz", "foo", "foo/a"]);
    }

    #[test]
    fn test_specificity() {
        let key = ServiceKey::new("pool", 80);
        let mut rules: Vec<Rule> = [
            "*.cf.com",
            "baz.cf.com",
            "*.foo.cf.com",
            "baz.cf.com/segment1/segment2/segment3",
            "baz.cf.com/segment1",
            "bar.cf.com",
        ]
        .iter()
        .map(|u| Rule::for_uri(&RouteUri::new(u), key.clone()))
        .collect();
        rules.sort_by(cmp_rule_specificity);

        let uris: Vec<&str> = rules.iter().map(|r| r.full_uri.as_str()).collect();
        assert_eq!(
            uris,
            vec![
                "baz.cf.com/segment1/segment2/segment3",
                "baz.cf.com/segment1",
                "bar.cf.com",
                "baz.cf.com",
                "*.foo.cf.com",
                "*.cf.com",
            ]
        );
    }
}
