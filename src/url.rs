//! Absolute URL grammar and hostname matching

use std::sync::LazyLock;

use regex::Regex;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*):(?P<rest>\S*)$").expect("url pattern is valid")
});

static HOST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-._~%]+$").expect("host pattern is valid"));

static IPV6_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[0-9A-Fa-f:.]+\]$").expect("ipv6 pattern is valid"));

/// Schemes that must carry a non-empty host
const SPECIAL_SCHEMES: &[&str] = &["http", "https", "ws", "wss", "ftp"];

/// The parts of an absolute URL the validators care about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub scheme: String,
    /// Lowercased hostname; empty for URLs without an authority
    pub host: String,
    pub port: Option<u16>,
}

/// Parse an absolute URL, `None` when malformed
pub fn parse(input: &str) -> Option<ParsedUrl> {
    let captures = URL_RE.captures(input)?;
    let scheme = captures["scheme"].to_ascii_lowercase();
    let rest = &captures["rest"];
    let special = SPECIAL_SCHEMES.contains(&scheme.as_str());

    let Some(after_slashes) = rest.strip_prefix("//") else {
        if special {
            return None;
        }
        return Some(ParsedUrl {
            scheme,
            host: String::new(),
            port: None,
        });
    };

    // special schemes treat a backslash as a path separator
    let authority_end = if special {
        after_slashes.find(['/', '?', '#', '\\'])
    } else {
        after_slashes.find(['/', '?', '#'])
    }
    .unwrap_or(after_slashes.len());
    let authority = &after_slashes[..authority_end];
    let host_port = match authority.rfind('@') {
        Some(at) => &authority[at + 1..],
        None => authority,
    };

    let (host, port) = split_host_port(host_port)?;
    if host.is_empty() {
        if special {
            return None;
        }
    } else if !(HOST_RE.is_match(host) || IPV6_RE.is_match(host)) {
        return None;
    }

    Some(ParsedUrl {
        scheme,
        host: host.to_ascii_lowercase(),
        port,
    })
}

fn split_host_port(host_port: &str) -> Option<(&str, Option<u16>)> {
    let (host, port) = if host_port.starts_with('[') {
        let close = host_port.find(']')?;
        let (host, tail) = host_port.split_at(close + 1);
        match tail {
            "" => (host, None),
            _ => (host, Some(tail.strip_prefix(':')?)),
        }
    } else {
        match host_port.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (host_port, None),
        }
    };

    let port = match port {
        None | Some("") => None,
        Some(digits) => Some(digits.parse::<u16>().ok()?),
    };
    Some((host, port))
}

/// True when `host` equals one of `domains` or is a subdomain of one
pub fn host_matches<S: AsRef<str>>(host: &str, domains: &[S]) -> bool {
    domains.iter().any(|d| {
        let d = d.as_ref().to_ascii_lowercase();
        host == d || host.ends_with(&format!(".{}", d))
    })
}

/// Hostname of `input`, `None` when the URL is malformed
pub fn hostname(input: &str) -> Option<String> {
    parse(input).map(|u| u.host)
}
