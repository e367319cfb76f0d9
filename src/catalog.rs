use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{Protocol, Proxy, ProxyStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyFilters {
    pub country: Option<String>,
    pub status: Option<ProxyStatus>,
    pub protocol: Option<Protocol>,
    pub search: Option<String>,
}

/// Applies the panel's list filters. Search matches a substring of the ip or
/// a case-insensitive substring of the org name.
pub fn filter_proxies(proxies: &[Proxy], filters: &ProxyFilters) -> Vec<Proxy> {
    proxies
        .iter()
        .filter(|p| {
            filters
                .country
                .as_deref()
                .is_none_or(|country| p.country == country)
        })
        .filter(|p| filters.status.is_none_or(|status| p.status == status))
        .filter(|p| {
            filters
                .protocol
                .is_none_or(|protocol| p.protocol == protocol)
        })
        .filter(|p| {
            filters.search.as_deref().is_none_or(|needle| {
                let needle = needle.to_lowercase();
                p.ip.contains(&needle) || p.org.to_lowercase().contains(&needle)
            })
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_proxies: usize,
    pub active_proxies: usize,
    pub countries_count: usize,
    pub connected_users: u32,
}

/// Counts come from the catalog; `connected_users` is a placeholder draw in
/// the panel's 100..1100 range, from the injected rng so tests can pin it.
pub fn dashboard_stats<R: Rng>(proxies: &[Proxy], rng: &mut R) -> DashboardStats {
    let countries: BTreeSet<&str> = proxies.iter().map(|p| p.country.as_str()).collect();
    DashboardStats {
        total_proxies: proxies.len(),
        active_proxies: proxies
            .iter()
            .filter(|p| p.status == ProxyStatus::Online)
            .count(),
        countries_count: countries.len(),
        connected_users: rng.gen_range(100..1100),
    }
}

/// The panel's built-in demo catalog.
pub fn sample_proxies() -> Vec<Proxy> {
    fn proxy(
        country: &str,
        ip: &str,
        port: u16,
        protocol: Protocol,
        status: ProxyStatus,
        latency: u32,
        org: &str,
    ) -> Proxy {
        Proxy {
            country: country.to_string(),
            ip: ip.to_string(),
            port,
            protocol,
            status,
            latency,
            org: org.to_string(),
        }
    }

    use Protocol::{Ss, Trojan, Vless};
    use ProxyStatus::{Offline, Online};

    vec![
        proxy("ID", "103.152.112.162", 80, Trojan, Online, 45, "PT Artha Telekomindo"),
        proxy("SG", "172.104.46.25", 443, Vless, Online, 12, "DigitalOcean"),
        proxy("US", "142.4.215.115", 443, Ss, Online, 8, "OVH"),
        proxy("JP", "157.112.145.88", 80, Trojan, Offline, 0, "Hostinger"),
        proxy("KR", "101.79.200.150", 443, Vless, Online, 23, "KT"),
        proxy("ID", "103.175.126.35", 80, Ss, Online, 67, "Biznet"),
        proxy("SG", "178.128.81.209", 443, Trojan, Offline, 0, "DigitalOcean"),
        proxy("US", "192.155.90.118", 443, Vless, Online, 15, "Linode"),
        proxy("JP", "150.95.146.66", 80, Ss, Online, 31, "ConoHa"),
        proxy("KR", "218.38.137.114", 443, Trojan, Offline, 0, "SK Broadband"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;

    #[test]
    fn country_filter_narrows_the_list() {
        let proxies = sample_proxies();
        let filters = ProxyFilters {
            country: Some("ID".to_string()),
            ..ProxyFilters::default()
        };
        let out = filter_proxies(&proxies, &filters);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|p| p.country == "ID"));
    }

    #[test]
    fn filters_compose_conjunctively() {
        let proxies = sample_proxies();
        let filters = ProxyFilters {
            country: Some("SG".to_string()),
            status: Some(ProxyStatus::Online),
            protocol: Some(Protocol::Vless),
            search: None,
        };
        let out = filter_proxies(&proxies, &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].ip, "172.104.46.25");
    }

    #[test]
    fn search_matches_ip_or_org_case_insensitively() {
        let proxies = sample_proxies();

        let by_org = filter_proxies(
            &proxies,
            &ProxyFilters {
                search: Some("digitalocean".to_string()),
                ..ProxyFilters::default()
            },
        );
        assert_eq!(by_org.len(), 2);

        let by_ip = filter_proxies(
            &proxies,
            &ProxyFilters {
                search: Some("103.152".to_string()),
                ..ProxyFilters::default()
            },
        );
        assert_eq!(by_ip.len(), 1);
        assert_eq!(by_ip[0].ip, "103.152.112.162");
    }

    #[test]
    fn empty_filters_return_everything() {
        let proxies = sample_proxies();
        assert_eq!(
            filter_proxies(&proxies, &ProxyFilters::default()),
            proxies
        );
    }

    #[test]
    fn stats_count_catalog_and_pin_connected_users_via_rng() {
        let proxies = sample_proxies();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let stats = dashboard_stats(&proxies, &mut rng);
        assert_eq!(stats.total_proxies, 10);
        assert_eq!(stats.active_proxies, 7);
        assert_eq!(stats.countries_count, 5);
        assert!((100..1100).contains(&stats.connected_users));

        let mut rng2 = rand::rngs::StdRng::seed_from_u64(1);
        assert_eq!(stats, dashboard_stats(&proxies, &mut rng2));
    }

    #[test]
    fn stats_serialize_with_panel_field_names() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(2);
        let stats = dashboard_stats(&sample_proxies(), &mut rng);
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("totalProxies").is_some());
        assert!(json.get("activeProxies").is_some());
        assert!(json.get("countriesCount").is_some());
        assert!(json.get("connectedUsers").is_some());
    }
}
