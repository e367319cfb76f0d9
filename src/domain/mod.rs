use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Trojan,
    Vless,
    Ss,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trojan => "trojan",
            Self::Vless => "vless",
            Self::Ss => "ss",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trojan" => Some(Self::Trojan),
            "vless" => Some(Self::Vless),
            "ss" => Some(Self::Ss),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProxyStatus {
    Online,
    Offline,
}

impl ProxyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "online" => Some(Self::Online),
            "offline" => Some(Self::Offline),
            _ => None,
        }
    }
}

/// One catalog entry, shaped like the panel API's proxy objects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Proxy {
    pub country: String,
    pub ip: String,
    pub port: u16,
    pub protocol: Protocol,
    pub status: ProxyStatus,
    pub latency: u32,
    pub org: String,
}

/// WebSocket stream options. `None` falls back to the per-format default
/// (`/vmess`, `/vless`, `/trojan`; `Host` header defaults to the server host).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WsTransport {
    pub path: Option<String>,
    pub host_header: Option<String>,
}

/// Everything a format encoder needs for one endpoint. Built fresh per
/// generation request and consumed by exactly one encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub identifier: String,
    pub display_name: String,
    pub transport: WsTransport,
    pub tls: bool,
}

impl ConnectionParams {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        identifier: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            identifier: identifier.into(),
            display_name: display_name.into(),
            transport: WsTransport::default(),
            tls: true,
        }
    }
}

pub fn validate_port(port: u16) -> Result<(), &'static str> {
    if port == 0 {
        return Err("port must be 1..=65535");
    }
    Ok(())
}

/// Accepts ASCII hostnames and IPv4 literals. IPv6 literals, unicode domains
/// and anything else needing escaping is rejected, never sanitized.
pub fn validate_host(host: &str) -> Result<(), &'static str> {
    if host.is_empty() {
        return Err("host is required");
    }
    if host.len() > 253 {
        return Err("host is too long (max 253)");
    }
    if !host
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
    {
        return Err("host must be an ASCII hostname or IPv4 literal (letters/digits/dots/hyphens)");
    }
    if host.starts_with('.') || host.ends_with('.') {
        return Err("host must not start or end with a dot (.)");
    }
    if host.contains("..") {
        return Err("host must not contain consecutive dots (..)");
    }
    for label in host.split('.') {
        if label.len() > 63 {
            return Err("host label is too long (max 63)");
        }
        let bytes = label.as_bytes();
        if bytes.first() == Some(&b'-') || bytes.last() == Some(&b'-') {
            return Err("host labels must not start/end with '-'");
        }
    }
    Ok(())
}
