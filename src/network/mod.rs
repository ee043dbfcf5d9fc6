pub mod limiter;
pub mod policy;

use crate::error::HoneypotError;

/// Extract the host part of a `host:port` remote endpoint.
///
/// IPv6 hosts must be bracketed (`[::1]:22`). The port itself is not
/// validated; only its presence is required.
pub fn split_host(endpoint: &str) -> Result<&str, HoneypotError> {
    let fail = |reason: &'static str| HoneypotError::AddressParse {
        endpoint: endpoint.to_string(),
        reason,
    };

    let host = if let Some(rest) = endpoint.strip_prefix('[') {
        let (host, after) = rest.split_once(']').ok_or_else(|| fail("missing ']'"))?;
        if !after.starts_with(':') {
            return Err(fail("missing port"));
        }
        if after[1..].contains(':') {
            return Err(fail("too many colons"));
        }
        host
    } else {
        let (host, _port) = endpoint.rsplit_once(':').ok_or_else(|| fail("missing port"))?;
        if host.contains(':') {
            return Err(fail("too many colons"));
        }
        if host.contains('[') || host.contains(']') {
            return Err(fail("unexpected bracket"));
        }
        host
    };

    if host.is_empty() {
        return Err(fail("missing host"));
    }
    Ok(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_port_stripped() {
        assert_eq!(split_host("10.0.0.1:51234").unwrap(), "10.0.0.1");
        assert_eq!(split_host("10.0.0.1:40000").unwrap(), "10.0.0.1");
    }

    #[test]
    fn bracketed_ipv6() {
        assert_eq!(split_host("[2001:db8::1]:22").unwrap(), "2001:db8::1");
        assert_eq!(split_host("[::1]:5000").unwrap(), "::1");
    }

    #[test]
    fn hostname_is_opaque() {
        assert_eq!(split_host("scanner.example:1").unwrap(), "scanner.example");
    }

    #[test]
    fn invalid_endpoints() {
        assert!(split_host("10.0.0.1").is_err());
        assert!(split_host("2001:db8::1").is_err());
        assert!(split_host("[::1]").is_err());
        assert!(split_host("[::1:22").is_err());
        assert!(split_host(":22").is_err());
        assert!(split_host("").is_err());
        assert!(split_host("a]b:1").is_err());
    }

    #[test]
    fn error_names_endpoint() {
        let err = split_host("garbage").unwrap_err();
        assert!(err.to_string().contains("garbage"));
        assert!(err.to_string().contains("missing port"));
    }
}
