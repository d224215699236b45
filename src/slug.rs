//! URL-safe form identifiers derived from titles.

use crate::error::AppError;
use crate::store::FormStore;
use chrono::{DateTime, Utc};

/// Highest numeric suffix tried before giving up on a slug.
pub const MAX_SLUG_SUFFIX: u32 = 50;

const MAX_SLUG_BASE_LEN: usize = 240;

/// Lowercase, turn whitespace/underscore runs into single dashes, keep only `[a-z0-9-]`, trim dashes.
/// e.g. "Customer  Feedback_2024!" -> "customer-feedback-2024"
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for c in lowered.trim().chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Cut a slug so that it plus a `-NN` suffix fits the 255-character column.
pub fn truncate_slug(mut slug: String) -> String {
    if slug.len() > MAX_SLUG_BASE_LEN {
        slug.truncate(MAX_SLUG_BASE_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// Placeholder used when a title slugifies to nothing (e.g. only punctuation or non-Latin text).
pub fn fallback_slug(now: DateTime<Utc>) -> String {
    format!("form-{}", now.timestamp_millis())
}

/// Find the first free slug among `base`, `base-1`, ... `base-50`.
/// The check is not atomic with the insert; the storage unique constraint has the final word.
pub async fn resolve_unique_slug<S>(store: &S, base: &str) -> Result<String, AppError>
where
    S: FormStore + ?Sized,
{
    if store.find_by_slug(base).await?.is_none() {
        return Ok(base.to_string());
    }
    for n in 1..=MAX_SLUG_SUFFIX {
        let candidate = format!("{}-{}", base, n);
        if store.find_by_slug(&candidate).await?.is_none() {
            tracing::debug!(base, slug = %candidate, "slug collision resolved with suffix");
            return Ok(candidate);
        }
    }
    tracing::warn!(base, "slug suffixes exhausted");
    Err(AppError::SlugExhausted)
}
