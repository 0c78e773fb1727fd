//! Process-environment locale detection.

use tracing::debug;

/// Language reported when the environment does not name a usable locale.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Region reported when the environment names a language but no region.
pub const FALLBACK_REGION: &str = "US";

/// Environment variables consulted, highest precedence first.
const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// Best-guess `language-REGION` pair for the running process.
///
/// Reads `LC_ALL`, `LC_MESSAGES` and `LANG` in that order. The `C` and
/// `POSIX` locales, empty values and unparseable values are skipped; when
/// nothing usable is found the result is `en-US`.
pub fn system_locale() -> String {
    system_locale_with(|name| std::env::var(name).ok())
}

/// Same as [`system_locale`], reading variables through `lookup`.
pub fn system_locale_with<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    for var in LOCALE_VARS {
        let Some(value) = lookup(var) else {
            continue;
        };
        if let Some((language, region)) = normalize_posix_locale(&value) {
            let region = region.unwrap_or_else(|| FALLBACK_REGION.to_string());
            debug!(var, %language, %region, "Detected system locale");
            return format!("{language}-{region}");
        }
    }
    format!("{FALLBACK_LANGUAGE}-{FALLBACK_REGION}")
}

/// Parses a POSIX locale value such as `fr_CA.UTF-8@euro` into its
/// lower-cased language and upper-cased region.
///
/// Returns `None` for `C`, `POSIX`, empty values, or a language subtag that
/// is not two or three ASCII letters.
pub fn normalize_posix_locale(value: &str) -> Option<(String, Option<String>)> {
    let base = value
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base.eq_ignore_ascii_case("C") || base.eq_ignore_ascii_case("POSIX") {
        return None;
    }

    let mut parts = base.split(['_', '-']);
    let language = parts.next().unwrap_or_default();
    if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let region = parts
        .next()
        .filter(|r| !r.is_empty() && r.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_uppercase);

    Some((language.to_ascii_lowercase(), region))
}
