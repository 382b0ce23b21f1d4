//! Session cookie storage.
//!
//! The service authenticates with httpOnly cookies (`access_token`,
//! `refresh_token`). `SessionJar` is the cookie store handed to the HTTP
//! client; it optionally persists to `<base>/session.json` with restricted
//! permissions (0600). Cookie values are never logged.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use url::Url;

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredCookie {
    name: String,
    value: String,
    domain: String,
    /// Sent only to `domain` itself, not its subdomains
    host_only: bool,
    path: String,
    secure: bool,
    /// Unix seconds; `None` is a session cookie
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires: Option<i64>,
}

impl StoredCookie {
    fn is_expired(&self, now: i64) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }

    fn same_slot(&self, other: &StoredCookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }

    fn matches(&self, url: &Url, now: i64) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        if self.is_expired(now) {
            return false;
        }
        if self.secure && !is_secure_origin(url) {
            return false;
        }
        let host = host.to_ascii_lowercase();
        let domain_ok = if self.host_only {
            host == self.domain
        } else {
            domain_matches(&host, &self.domain)
        };
        domain_ok && path_matches(url.path(), &self.path)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    cookies: Vec<StoredCookie>,
}

/// Cookie store for the authenticated session.
#[derive(Debug, Default)]
pub struct SessionJar {
    cookies: Mutex<Vec<StoredCookie>>,
    path: Option<PathBuf>,
}

impl SessionJar {
    /// A jar that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the jar from `path`, persisting every later change there.
    /// A missing file yields an empty jar.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cookies = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session from {}", path.display()))?;
            let file: SessionFile = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse session from {}", path.display()))?;
            let now = now_secs();
            file.cookies
                .into_iter()
                .filter(|c| !c.is_expired(now))
                .collect()
        } else {
            Vec::new()
        };

        tracing::debug!(path = %path.display(), cookies = cookies.len(), "loaded session");
        Ok(Self {
            cookies: Mutex::new(cookies),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True if any unexpired cookie is stored.
    pub fn has_session(&self) -> bool {
        let now = now_secs();
        self.lock().iter().any(|c| !c.is_expired(now))
    }

    /// Names of the stored cookies, for diagnostics.
    pub fn cookie_names(&self) -> Vec<String> {
        self.lock().iter().map(|c| c.name.clone()).collect()
    }

    /// Forgets every cookie and removes the session file.
    ///
    /// # Errors
    /// Returns an error if the session file cannot be removed.
    pub fn clear(&self) -> Result<()> {
        let mut cookies = self.lock();
        cookies.clear();
        if let Some(path) = &self.path
            && path.exists()
        {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove session file {}", path.display()))?;
        }
        tracing::debug!("session cleared");
        Ok(())
    }

    /// Writes the jar to its session file. No-op for in-memory jars.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        self.persist(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StoredCookie>> {
        self.cookies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Callers hold the cookie lock across the write, so the file always
    /// reflects the latest change.
    fn persist(&self, cookies: &[StoredCookie]) -> Result<()> {
        match &self.path {
            Some(path) => write_private(path, cookies),
            None => Ok(()),
        }
    }
}

fn store(cookies: &mut Vec<StoredCookie>, header: &str, url: &Url, now: i64) {
    let Some(cookie) = parse_set_cookie(header, url, now) else {
        return;
    };
    cookies.retain(|existing| !existing.same_slot(&cookie));
    if cookie.is_expired(now) || cookie.value.is_empty() {
        tracing::debug!(name = %cookie.name, "cookie removed by server");
    } else {
        tracing::debug!(name = %cookie.name, "cookie stored");
        cookies.push(cookie);
    }
}

impl reqwest::cookie::CookieStore for SessionJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let now = now_secs();
        let mut cookies = self.lock();
        let mut changed = false;
        for header in cookie_headers {
            if let Ok(header) = header.to_str() {
                store(&mut cookies, header, url, now);
                changed = true;
            }
        }
        if changed && let Err(e) = self.persist(&cookies) {
            tracing::warn!("Failed to persist session: {e:#}");
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let now = now_secs();
        let cookies = self.lock();
        let mut matching: Vec<&StoredCookie> =
            cookies.iter().filter(|c| c.matches(url, now)).collect();
        if matching.is_empty() {
            return None;
        }
        // More specific paths first.
        matching.sort_by(|a, b| b.path.len().cmp(&a.path.len()));
        let header = matching
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&header).ok()
    }
}

/// Parses one `Set-Cookie` header received from `url`.
///
/// Returns `None` for malformed headers and for cookies whose `Domain` does
/// not cover the request host.
fn parse_set_cookie(header: &str, url: &Url, now: i64) -> Option<StoredCookie> {
    let parsed = cookie::Cookie::parse(header).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();

    let (domain, host_only) = match parsed.domain() {
        Some(domain) if !domain.is_empty() => {
            let domain = domain.trim_start_matches('.').to_ascii_lowercase();
            if !domain_matches(&host, &domain) {
                tracing::debug!(name = %parsed.name(), "cookie rejected: domain mismatch");
                return None;
            }
            (domain, false)
        }
        _ => (host, true),
    };

    let path = match parsed.path() {
        Some(path) if path.starts_with('/') => path.to_string(),
        _ => default_path(url.path()),
    };

    let expires = match (parsed.max_age(), parsed.expires_datetime()) {
        (Some(max_age), _) => Some(now.saturating_add(max_age.whole_seconds())),
        (None, Some(at)) => Some(at.unix_timestamp()),
        (None, None) => None,
    };

    Some(StoredCookie {
        name: parsed.name().to_string(),
        value: parsed.value().to_string(),
        domain,
        host_only,
        path,
        secure: parsed.secure().unwrap_or(false),
        expires,
    })
}

/// Directory of the request path, per RFC 6265 section 5.1.4.
fn default_path(request_path: &str) -> String {
    if !request_path.starts_with('/') {
        return "/".to_string();
    }
    match request_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => request_path[..idx].to_string(),
    }
}

fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain
        || (host.len() > domain.len()
            && host.ends_with(domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
}

fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/')
            || request_path.as_bytes().get(cookie_path.len()) == Some(&b'/'))
}

/// Local development servers count as secure origins.
fn is_secure_origin(url: &Url) -> bool {
    url.scheme() == "https" || matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"))
}

fn write_private(path: &Path, cookies: &[StoredCookie]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let file = SessionFile {
        cookies: cookies.to_vec(),
    };
    let contents = serde_json::to_string_pretty(&file).context("Failed to serialize session")?;
    let tmp_path = path.with_extension("json.tmp");

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        let mut out = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&tmp_path)
            .with_context(|| format!("Failed to open {} for writing", tmp_path.display()))?;
        out.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
    }

    #[cfg(not(unix))]
    {
        fs::write(&tmp_path, contents)
            .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
    }

    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            tmp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}
