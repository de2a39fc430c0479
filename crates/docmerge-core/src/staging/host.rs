//! Host identifier embedded in staging directory names.

use crate::filename::remove_extensions;

const FALLBACK_HOST: &str = "localhost";

/// Short hostname of this machine (domain suffix removed), or `localhost`
/// when it cannot be determined.
pub fn host_identifier() -> String {
    match system_hostname() {
        Some(name) => short_host(&name),
        None => {
            tracing::warn!("unable to obtain the hostname, using {FALLBACK_HOST}");
            FALLBACK_HOST.to_string()
        }
    }
}

/// Reduce a hostname to something safe inside a directory name.
pub(crate) fn short_host(name: &str) -> String {
    let short: String = remove_extensions(name.trim())
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect();
    if short.is_empty() {
        FALLBACK_HOST.to_string()
    } else {
        short
    }
}

#[cfg(unix)]
fn system_hostname() -> Option<String> {
    let mut buf = [0u8; 256];
    let r = unsafe { libc::gethostname(buf.as_mut_ptr().cast::<libc::c_char>(), buf.len()) };
    if r != 0 {
        tracing::debug!(errno = ?std::io::Error::last_os_error(), "gethostname failed");
        return None;
    }
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    let name = String::from_utf8_lossy(&buf[..len]).into_owned();
    (!name.trim().is_empty()).then_some(name)
}

#[cfg(not(unix))]
fn system_hostname() -> Option<String> {
    std::env::var("COMPUTERNAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .ok()
        .filter(|s| !s.trim().is_empty())
}
