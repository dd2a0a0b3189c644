//! Serving host identity, resolved once at startup and stamped on every point.

/// Resolve this machine's hostname.
///
/// Falls back to `$HOSTNAME`, then `"localhost"`, when the OS lookup fails.
pub fn resolve_hostname() -> String {
    os_hostname()
        .or_else(|| std::env::var("HOSTNAME").ok())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(unix)]
fn os_hostname() -> Option<String> {
    nix::unistd::gethostname()
        .ok()
        .and_then(|h| h.into_string().ok())
}

#[cfg(not(unix))]
fn os_hostname() -> Option<String> {
    std::env::var("COMPUTERNAME").ok()
}
