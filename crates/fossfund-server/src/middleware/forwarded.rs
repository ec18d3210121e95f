// Forwarded header handling
// X-Forwarded-* headers are only honoured when the peer is a trusted proxy

use std::net::IpAddr;

use actix_web::{HttpRequest, http::header};

use crate::model::constants::{X_FORWARDED_FOR, X_FORWARDED_HOST, X_FORWARDED_PROTO};

const LOCALHOST: &str = "localhost";
const ANY: &str = "*";

/// Addresses allowed to set forwarded headers
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies {
    ips: Vec<IpAddr>,
    localhost: bool,
    any: bool,
}

impl TrustedProxies {
    /// Build from configured entries: IP addresses, `localhost` or `*`
    ///
    /// Entries that are none of these are ignored with a warning.
    pub fn new(entries: Vec<String>) -> Self {
        let mut proxies = Self::default();

        for entry in entries {
            let entry = entry.trim();
            if entry == ANY {
                proxies.any = true;
            } else if entry.eq_ignore_ascii_case(LOCALHOST) {
                proxies.localhost = true;
            } else {
                match entry.parse::<IpAddr>() {
                    Ok(ip) => proxies.ips.push(ip),
                    Err(_) => tracing::warn!(entry, "Ignoring invalid forwarded allow address"),
                }
            }
        }

        proxies
    }

    pub fn is_trusted(&self, peer: IpAddr) -> bool {
        self.any
            || (self.localhost && peer.is_loopback())
            || self.ips.iter().any(|ip| ip_eq(*ip, peer))
    }
}

// Compares IPv4 addresses also in their IPv4-mapped IPv6 form
fn ip_eq(a: IpAddr, b: IpAddr) -> bool {
    a == b || a.to_canonical() == b.to_canonical()
}

/// Client address, host and scheme as seen through trusted proxies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub remote: String,
    pub host: String,
    pub scheme: String,
}

fn header_str<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl ClientInfo {
    pub fn from_request(req: &HttpRequest, proxies: &TrustedProxies) -> Self {
        let peer = req.peer_addr().map(|addr| addr.ip());
        let trusted = peer.is_some_and(|ip| proxies.is_trusted(ip));

        let direct_host = || {
            header_str(req, header::HOST.as_str())
                .map(str::to_string)
                .or_else(|| req.uri().authority().map(|a| a.to_string()))
                .unwrap_or_default()
        };
        let direct_scheme = || {
            if req.app_config().secure() {
                "https".to_string()
            } else {
                "http".to_string()
            }
        };
        let direct_remote = || {
            peer.map(|ip| ip.to_string())
                .unwrap_or_else(|| "-".to_string())
        };

        if !trusted {
            return Self {
                remote: direct_remote(),
                host: direct_host(),
                scheme: direct_scheme(),
            };
        }

        let remote = header_str(req, X_FORWARDED_FOR)
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(direct_remote);
        let host = header_str(req, X_FORWARDED_HOST)
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .unwrap_or_else(direct_host);
        let scheme = header_str(req, X_FORWARDED_PROTO)
            .map(|v| v.to_ascii_lowercase())
            .filter(|v| v == "http" || v == "https")
            .unwrap_or_else(direct_scheme);

        Self {
            remote,
            host,
            scheme,
        }
    }
}
