use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::client_config::ConfigFormat;
use crate::domain::{Protocol, validate_host, validate_port};

/// User-chosen parameters for one subscription link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSpec {
    pub format: ConfigFormat,
    pub countries: Vec<String>,
    pub protocols: Vec<Protocol>,
    pub ports: Vec<u16>,
    pub limit: u32,
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    InvalidDomain {
        domain: String,
        reason: &'static str,
    },
    InvalidLimit {
        limit: u32,
    },
    InvalidPort {
        port: u16,
    },
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDomain { domain, reason } => {
                write!(f, "invalid subscription domain: {domain} ({reason})")
            }
            Self::InvalidLimit { limit } => write!(f, "invalid subscription limit: {limit}"),
            Self::InvalidPort { port } => write!(f, "invalid subscription port: {port}"),
        }
    }
}

impl std::error::Error for SubscriptionError {}

/// Builds the panel's subscription URL. Query parameters keep the fixed order
/// `format, limit, domain` plus `cc`, `vpn`, `port` for non-empty lists.
pub fn build_subscription_url(spec: &SubscriptionSpec) -> Result<String, SubscriptionError> {
    if let Err(reason) = validate_host(&spec.domain) {
        return Err(SubscriptionError::InvalidDomain {
            domain: spec.domain.clone(),
            reason,
        });
    }
    if spec.limit == 0 {
        return Err(SubscriptionError::InvalidLimit { limit: spec.limit });
    }
    for port in &spec.ports {
        if validate_port(*port).is_err() {
            return Err(SubscriptionError::InvalidPort { port: *port });
        }
    }

    let mut url = format!(
        "https://{}/api/v1/sub?format={}&limit={}&domain={}",
        spec.domain,
        spec.format.as_str(),
        spec.limit,
        spec.domain
    );
    if !spec.countries.is_empty() {
        url.push_str("&cc=");
        url.push_str(&spec.countries.join(","));
    }
    if !spec.protocols.is_empty() {
        url.push_str("&vpn=");
        let joined: Vec<&str> = spec.protocols.iter().map(Protocol::as_str).collect();
        url.push_str(&joined.join(","));
    }
    if !spec.ports.is_empty() {
        url.push_str("&port=");
        let joined: Vec<String> = spec.ports.iter().map(u16::to_string).collect();
        url.push_str(&joined.join(","));
    }
    Ok(url)
}

/// A saved subscription entry, shaped like the panel's subscription cards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub name: String,
    pub format: ConfigFormat,
    pub countries: Vec<String>,
    pub protocols: Vec<Protocol>,
    pub ports: Vec<u16>,
    pub limit: u32,
    pub domain: String,
    pub created_at: String,
}

pub fn new_subscription(spec: &SubscriptionSpec, now: DateTime<Utc>) -> Subscription {
    Subscription {
        id: Ulid::new().to_string(),
        name: subscription_name(&spec.countries, spec.format),
        format: spec.format,
        countries: spec.countries.clone(),
        protocols: spec.protocols.clone(),
        ports: spec.ports.clone(),
        limit: spec.limit,
        domain: spec.domain.clone(),
        created_at: now.format("%Y-%m-%d").to_string(),
    }
}

fn subscription_name(countries: &[String], format: ConfigFormat) -> String {
    let scope = if countries.is_empty() {
        "Global".to_string()
    } else {
        countries.join(", ")
    };
    format!("{scope} Proxies ({})", format.as_str().to_uppercase())
}
