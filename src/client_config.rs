use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::domain::{ConnectionParams, validate_host};

pub const DEFAULT_VMESS_PATH: &str = "/vmess";
pub const DEFAULT_VLESS_PATH: &str = "/vless";
pub const DEFAULT_TROJAN_PATH: &str = "/trojan";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Vmess,
    Vless,
    Trojan,
    Clash,
    Raw,
}

impl ConfigFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vmess => "vmess",
            Self::Vless => "vless",
            Self::Trojan => "trojan",
            Self::Clash => "clash",
            Self::Raw => "raw",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "vmess" => Some(Self::Vmess),
            "vless" => Some(Self::Vless),
            "trojan" => Some(Self::Trojan),
            "clash" => Some(Self::Clash),
            "raw" => Some(Self::Raw),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedConfig {
    pub format: ConfigFormat,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    UnknownFormat {
        got: String,
    },
    MissingHost,
    MissingIdentifier,
    UnsupportedHostFormat {
        host: String,
        reason: &'static str,
    },
    Serialization {
        format: ConfigFormat,
        reason: String,
    },
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFormat { got } => write!(f, "unknown config format: {got}"),
            Self::MissingHost => write!(f, "host is required"),
            Self::MissingIdentifier => write!(f, "identifier is required"),
            Self::UnsupportedHostFormat { host, reason } => {
                write!(f, "unsupported host format: {host} ({reason})")
            }
            Self::Serialization { format, reason } => {
                write!(f, "{} config serialization error: {reason}", format.as_str())
            }
        }
    }
}

impl std::error::Error for EncodeError {}

/// Dispatches to the format encoder for `format`, validating first. Pure and
/// idempotent: identical inputs always yield an identical `Result`.
///
/// Validation is fail-fast, in this order: unknown format, empty host, empty
/// identifier, host format policy. The first violated rule is the error.
pub fn build_config(format: &str, params: &ConnectionParams) -> Result<EncodedConfig, EncodeError> {
    let format = ConfigFormat::parse(format).ok_or_else(|| EncodeError::UnknownFormat {
        got: format.to_string(),
    })?;
    if params.host.is_empty() {
        return Err(EncodeError::MissingHost);
    }
    if params.identifier.is_empty() {
        return Err(EncodeError::MissingIdentifier);
    }
    if let Err(reason) = validate_host(&params.host) {
        return Err(EncodeError::UnsupportedHostFormat {
            host: params.host.clone(),
            reason,
        });
    }

    let content = match format {
        ConfigFormat::Vmess => encode_vmess(params)?,
        ConfigFormat::Vless => encode_vless(params),
        ConfigFormat::Trojan => encode_trojan(params),
        ConfigFormat::Clash => encode_clash(params)?,
        ConfigFormat::Raw => encode_raw(params),
    };
    Ok(EncodedConfig { format, content })
}

/// Empty labels are substituted deterministically so an encoder never emits an
/// empty name and never draws randomness.
fn effective_name(params: &ConnectionParams) -> String {
    if params.display_name.trim().is_empty() {
        format!("{}:{}", params.host, params.port)
    } else {
        params.display_name.clone()
    }
}

fn ws_path<'a>(params: &'a ConnectionParams, default: &'a str) -> &'a str {
    params.transport.path.as_deref().unwrap_or(default)
}

fn ws_host<'a>(params: &'a ConnectionParams) -> &'a str {
    params.transport.host_header.as_deref().unwrap_or(&params.host)
}

/// The vmess share-link JSON payload. Field declaration order is the key
/// order on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct VmessShare {
    v: String,
    ps: String,
    add: String,
    port: u16,
    id: String,
    aid: String,
    scy: String,
    net: String,
    #[serde(rename = "type")]
    header_type: String,
    host: String,
    path: String,
    tls: String,
    sni: String,
}

fn encode_vmess(params: &ConnectionParams) -> Result<String, EncodeError> {
    let share = VmessShare {
        v: "2".to_string(),
        ps: effective_name(params),
        add: params.host.clone(),
        port: params.port,
        id: params.identifier.clone(),
        aid: "0".to_string(),
        scy: "auto".to_string(),
        net: "ws".to_string(),
        header_type: "none".to_string(),
        host: ws_host(params).to_string(),
        path: ws_path(params, DEFAULT_VMESS_PATH).to_string(),
        tls: if params.tls { "tls" } else { "" }.to_string(),
        sni: params.host.clone(),
    };
    let json = serde_json::to_vec(&share).map_err(|e| EncodeError::Serialization {
        format: ConfigFormat::Vmess,
        reason: e.to_string(),
    })?;
    // Standard alphabet, padded, no line wraps.
    Ok(format!(
        "vmess://{}",
        base64::engine::general_purpose::STANDARD.encode(json)
    ))
}

fn encode_vless(params: &ConnectionParams) -> String {
    let mut query = String::from("encryption=none");
    push_common_query(&mut query, params, DEFAULT_VLESS_PATH);
    format!(
        "vless://{}@{}:{}?{}#{}",
        params.identifier,
        params.host,
        params.port,
        query,
        percent_encode_rfc3986(&effective_name(params))
    )
}

fn encode_trojan(params: &ConnectionParams) -> String {
    let mut query = String::new();
    push_common_query(&mut query, params, DEFAULT_TROJAN_PATH);
    // push_common_query prefixes each pair with '&'; trojan has no leading key.
    let query = query.trim_start_matches('&');
    format!(
        "trojan://{}@{}:{}?{}#{}",
        params.identifier,
        params.host,
        params.port,
        query,
        percent_encode_rfc3986(&effective_name(params))
    )
}

fn push_common_query(query: &mut String, params: &ConnectionParams, default_path: &str) {
    if params.tls {
        query.push_str("&security=tls&sni=");
        query.push_str(&percent_encode_rfc3986(&params.host));
    } else {
        query.push_str("&security=none");
    }
    query.push_str("&type=ws&host=");
    query.push_str(&percent_encode_rfc3986(ws_host(params)));
    query.push_str("&path=");
    query.push_str(&percent_encode_rfc3986(ws_path(params, default_path)));
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
struct ClashProxy {
    name: String,
    #[serde(rename = "type")]
    proxy_type: String,
    server: String,
    port: u16,
    uuid: String,
    #[serde(rename = "alterId")]
    alter_id: u32,
    cipher: String,
    tls: bool,
    servername: String,
    network: String,
    #[serde(rename = "ws-opts")]
    ws_opts: ClashWsOpts,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
struct ClashWsOpts {
    path: String,
    headers: ClashWsHeaders,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
struct ClashWsHeaders {
    #[serde(rename = "Host")]
    host: String,
}

fn encode_clash(params: &ConnectionParams) -> Result<String, EncodeError> {
    let proxy = ClashProxy {
        name: effective_name(params),
        proxy_type: "vmess".to_string(),
        server: params.host.clone(),
        port: params.port,
        uuid: params.identifier.clone(),
        alter_id: 0,
        cipher: "auto".to_string(),
        tls: params.tls,
        servername: params.host.clone(),
        network: "ws".to_string(),
        ws_opts: ClashWsOpts {
            path: ws_path(params, DEFAULT_VMESS_PATH).to_string(),
            headers: ClashWsHeaders {
                host: ws_host(params).to_string(),
            },
        },
    };
    // A one-item sequence so the snippet drops into a larger `proxies:` list
    // without re-indentation.
    serde_yaml::to_string(&vec![proxy]).map_err(|e| EncodeError::Serialization {
        format: ConfigFormat::Clash,
        reason: e.to_string(),
    })
}

fn encode_raw(params: &ConnectionParams) -> String {
    format!("{}@{}:{}", params.identifier, params.host, params.port)
}

fn percent_encode_rfc3986(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.as_bytes() {
        let c = *b;
        let is_unreserved =
            matches!(c, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~');
        if is_unreserved {
            out.push(c as char);
        } else {
            out.push('%');
            out.push(hex_upper_nibble((c >> 4) & 0x0f));
            out.push(hex_upper_nibble(c & 0x0f));
        }
    }
    out
}

fn hex_upper_nibble(n: u8) -> char {
    match n {
        0..=9 => (b'0' + n) as char,
        10..=15 => (b'A' + (n - 10)) as char,
        _ => unreachable!("nibble must be <= 15"),
    }
}
