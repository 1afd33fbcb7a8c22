//! Reusable field rules shared by the schemas.

use crate::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static HTTP_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/?#]+[^\s]*$").expect("valid url regex"));
static TIMEZONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(UTC|[A-Z][A-Za-z_]+(/[A-Za-z0-9_+\-]+){1,2})$").expect("valid timezone regex")
});

pub(crate) const MAX_TAGS: usize = 20;
pub(crate) const MAX_TAG_CHARS: usize = 30;

/// Checks trimmed `value` length is within `min..=max` characters.
pub(crate) fn text_length(
    errors: &mut ValidationError,
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) {
    let count = value.trim().chars().count();
    if count < min {
        if min == 1 {
            errors.push(field, "is required");
        } else {
            errors.push(field, format!("must be at least {min} characters"));
        }
    } else if count > max {
        errors.push(field, format!("must be at most {max} characters"));
    }
}

/// Checks an optional text does not exceed `max` characters.
pub(crate) fn optional_max(errors: &mut ValidationError, field: &str, value: Option<&str>, max: usize) {
    if let Some(value) = value {
        if value.trim().chars().count() > max {
            errors.push(field, format!("must be at most {max} characters"));
        }
    }
}

/// Checks each tag's length and the count of distinct normalized tags.
pub(crate) fn tags(errors: &mut ValidationError, field: &str, tags: &[String]) {
    if normalize_tags(tags).len() > MAX_TAGS {
        errors.push(field, format!("must contain at most {MAX_TAGS} tags"));
    }
    for tag in tags {
        let count = tag.trim().chars().count();
        if count == 0 {
            errors.push(field, "tags cannot be empty");
        } else if count > MAX_TAG_CHARS {
            errors.push(
                field,
                format!("tag `{}` exceeds {MAX_TAG_CHARS} characters", tag.trim()),
            );
        }
    }
}

pub(crate) fn http_url(errors: &mut ValidationError, field: &str, value: &str) {
    if !HTTP_URL_RE.is_match(value.trim()) {
        errors.push(field, "must be an http(s) URL");
    }
}

pub(crate) fn timezone(errors: &mut ValidationError, field: &str, value: &str) {
    if !TIMEZONE_RE.is_match(value.trim()) {
        errors.push(field, "must be `UTC` or an `Area/City` zone name");
    }
}

/// Trims `value` and maps blank text to `None`.
pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Lowercases, trims, deduplicates and sorts tags.
pub(crate) fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{http_url, normalize_tags, tags, timezone, MAX_TAGS};
    use crate::validation::ValidationError;

    #[test]
    fn normalize_tags_dedupes_case_insensitively() {
        let tags = vec![" Work".to_string(), "work".to_string(), "Home".to_string()];
        assert_eq!(normalize_tags(&tags), vec!["home", "work"]);
    }

    #[test]
    fn tag_limit_counts_distinct_normalized_tags() {
        let mut list: Vec<String> = (0..MAX_TAGS).map(|i| format!("tag{i}")).collect();
        list.extend((0..MAX_TAGS).map(|i| format!("TAG{i}")));
        let mut errors = ValidationError::new();
        tags(&mut errors, "tags", &list);
        assert!(errors.is_empty());

        list.push("one-more".to_string());
        let mut errors = ValidationError::new();
        tags(&mut errors, "tags", &list);
        assert!(errors.has_field("tags"));
    }

    #[test]
    fn timezone_accepts_area_city_and_utc() {
        for ok in ["UTC", "Europe/Berlin", "America/Argentina/Buenos_Aires", "Etc/GMT+5"] {
            let mut errors = ValidationError::new();
            timezone(&mut errors, "timezone", ok);
            assert!(errors.is_empty(), "{ok} should be accepted");
        }
        let mut errors = ValidationError::new();
        timezone(&mut errors, "timezone", "mars time");
        assert!(errors.has_field("timezone"));
    }

    #[test]
    fn url_requires_http_scheme() {
        let mut errors = ValidationError::new();
        http_url(&mut errors, "avatar_url", "ftp://host/file.png");
        http_url(&mut errors, "avatar_url", "https://cdn.example.com/a.png");
        assert_eq!(errors.issues().len(), 1);
    }
}
