//! URL normalization for user-entered links.

const WEB_SCHEMES: &[&str] = &["http://", "https://"];
const CONTACT_SCHEMES: &[&str] = &["tel:", "sms:", "mailto:"];

/// Normalize a web URL: a bare host or path gains `https://`.
///
/// Empty input stays empty.
pub fn normalize_url(raw: &str) -> String {
  let s = raw.trim();
  if s.is_empty() || has_scheme(s, WEB_SCHEMES) {
    return s.to_owned();
  }
  format!("https://{s}")
}

/// Normalize a link that may also be a contact URI or a locally-hosted
/// asset (`/static/...`).
pub fn normalize_link(raw: &str) -> String {
  let s = raw.trim();
  if s.starts_with('/') || has_scheme(s, CONTACT_SCHEMES) {
    return s.to_owned();
  }
  normalize_url(s)
}

fn has_scheme(s: &str, schemes: &[&str]) -> bool {
  schemes.iter().any(|scheme| {
    s.get(..scheme.len())
      .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
  })
}
