use anyhow::{Context as AnyhowContext, Result};
use std::net::SocketAddr;

/// Where `zoomer serve` listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BindTarget {
    pub(crate) addr: SocketAddr,
    /// Every address `bind` resolved to, for the startup banner.
    pub(crate) resolved: Vec<SocketAddr>,
}

/// Resolve `bind` and pick the address to listen on, IPv4 first.
///
/// The review page has no authentication, so any non-loopback resolution is
/// refused unless `public` is set.
pub(crate) async fn resolve_bind_target(bind: &str, public: bool) -> Result<BindTarget> {
    let resolved: Vec<SocketAddr> = tokio::net::lookup_host(bind)
        .await
        .with_context(|| format!("Failed to resolve bind address: {bind}"))?
        .collect();

    if !public {
        if let Some(exposed) = resolved.iter().find(|addr| !addr.ip().is_loopback()) {
            anyhow::bail!(
                "Refusing to bind to non-loopback address {exposed} without --public (from {bind}). The review page has no authentication; pass --public only on a trusted network."
            );
        }
    }

    let addr = resolved
        .iter()
        .copied()
        .find(SocketAddr::is_ipv4)
        .or_else(|| resolved.first().copied())
        .with_context(|| format!("Bind address resolved to no socket addresses: {bind}"))?;

    Ok(BindTarget { addr, resolved })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn loopback_binds_without_public() {
        let target = resolve_bind_target("127.0.0.1:0", false).await.unwrap();
        assert_eq!(target.addr, "127.0.0.1:0".parse::<SocketAddr>().unwrap());
        assert_eq!(target.resolved, vec![target.addr]);
    }

    #[tokio::test]
    async fn wildcard_requires_public() {
        let err = resolve_bind_target("0.0.0.0:0", false).await.unwrap_err();
        assert!(err.to_string().contains("Refusing to bind"));

        let target = resolve_bind_target("0.0.0.0:0", true).await.unwrap();
        assert!(target.addr.ip().is_unspecified());
    }

    #[tokio::test]
    async fn unresolvable_address_is_an_error() {
        assert!(resolve_bind_target("not an address", false).await.is_err());
    }
}
