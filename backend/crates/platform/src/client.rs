//! Client identification utilities
//!
//! Resolves the source address of a request for rate limiting and audit
//! records.

use std::{convert::Infallible, net::IpAddr, net::SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};

/// Client address as reported by the nearest reverse proxy
///
/// Proxies append the peer they saw to `X-Forwarded-For`, so only the last
/// entry is one our own proxy wrote. Earlier entries are whatever the client
/// sent and are ignored.
pub fn forwarded_client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .last()
        .and_then(|xff| xff.rsplit(',').next())
        .and_then(|last| last.trim().parse::<IpAddr>().ok())
}

/// Resolve the client IP
///
/// Forwarding headers are honoured only when `trust_forwarded` is set, i.e.
/// the server is reachable solely through a proxy that writes them.
/// Otherwise the direct connection address is used.
pub fn extract_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trust_forwarded: bool,
) -> Option<IpAddr> {
    if trust_forwarded {
        if let Some(ip) = forwarded_client_ip(headers) {
            return Some(ip);
        }
    }
    direct_ip
}

/// Client address of the current request
///
/// Taken from the connection only. Never rejects: when the server was not
/// started with connect info the address is `None`. Handlers that sit behind
/// a trusted proxy refine it with [`ClientAddr::behind_proxy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAddr(pub Option<IpAddr>);

impl ClientAddr {
    pub fn from_parts(parts: &Parts) -> Self {
        let direct_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Self(direct_ip)
    }

    /// Prefer the proxy-reported address when `trusted`
    pub fn behind_proxy(self, headers: &HeaderMap, trusted: bool) -> Self {
        Self(extract_client_ip(headers, self.0, trusted))
    }

    /// Key for per-client bookkeeping such as rate limits
    pub fn key(&self) -> String {
        self.0
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_forwarded_header_ignored_by_default() {
        let headers = forwarded("192.168.1.1");
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        assert_eq!(extract_client_ip(&headers, Some(direct), false), Some(direct));
        assert_eq!(extract_client_ip(&headers, None, false), None);
    }

    #[test]
    fn test_trusted_proxy_uses_last_hop() {
        let headers = forwarded("6.6.6.6, 192.168.1.1");
        let direct: IpAddr = "10.0.0.2".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct), true);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_trusted_proxy_falls_back_to_direct() {
        let direct: IpAddr = "10.0.0.2".parse().unwrap();

        assert_eq!(extract_client_ip(&HeaderMap::new(), Some(direct), true), Some(direct));
        assert_eq!(extract_client_ip(&forwarded("garbage"), Some(direct), true), Some(direct));
    }

    #[test]
    fn test_client_addr_from_connect_info() {
        let mut request = Request::builder().uri("/").body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo("10.1.2.3:4567".parse::<SocketAddr>().unwrap()));
        let (parts, _) = request.into_parts();

        let addr = ClientAddr::from_parts(&parts);
        assert_eq!(addr.key(), "10.1.2.3");
    }

    #[test]
    fn test_client_addr_ignores_spoofed_header() {
        let mut request = Request::builder()
            .uri("/")
            .header("x-forwarded-for", "198.51.100.7")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo("10.1.2.3:4567".parse::<SocketAddr>().unwrap()));
        let (parts, _) = request.into_parts();

        let addr = ClientAddr::from_parts(&parts);
        assert_eq!(addr.key(), "10.1.2.3");
        assert_eq!(addr.behind_proxy(&parts.headers, false).key(), "10.1.2.3");
        assert_eq!(addr.behind_proxy(&parts.headers, true).key(), "198.51.100.7");
    }

    #[test]
    fn test_client_addr_unknown() {
        let (parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();
        let addr = ClientAddr::from_parts(&parts);
        assert_eq!(addr, ClientAddr(None));
        assert_eq!(addr.key(), "unknown");
    }
}
