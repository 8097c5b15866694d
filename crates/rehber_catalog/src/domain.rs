//! Domain-name helpers and small link utilities.

use url::Url;

use crate::fold::fold;
use crate::model::Link;

/// Registries where the registrable name spans three host labels.
const MULTI_PART_TLDS: &[&str] = &[
    "com.tr", "org.tr", "net.tr", "gov.tr", "edu.tr", "bel.tr", "k12.tr",
    "co.uk", "org.uk", "gov.uk", "ac.uk",
    "com.au", "net.au", "org.au",
    "com.br", "com.mx", "com.ar", "com.co", "com.cl", "com.pe",
    "co.jp", "co.kr", "co.nz", "co.in",
    "com.sa", "com.sg",
];

pub const WINUTIL_COMMAND: &str = "irm \"https://christitus.com/win\" | iex";

fn is_ipv4_like(host: &str) -> bool {
    let parts: Vec<&str> = host.split('.').collect();
    parts.len() == 4
        && parts
            .iter()
            .all(|part| (1..=3).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit()))
}

/// Display label for a URL: the registrable domain, `www.` stripped,
/// IPv4 hosts passed through. Unparseable input yields an empty label.
pub fn domain_label(raw_url: &str) -> String {
    let Ok(parsed) = Url::parse(raw_url) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };
    let mut host = host.to_lowercase();
    if let Some(stripped) = host.strip_prefix("www.") {
        host = stripped.to_string();
    }
    if host.is_empty() {
        return String::new();
    }
    if is_ipv4_like(&host) {
        return host;
    }
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() <= 2 {
        return host;
    }
    let tail2 = parts[parts.len() - 2..].join(".");
    if MULTI_PART_TLDS.contains(&tail2.as_str()) {
        return parts[parts.len() - 3..].join(".");
    }
    tail2
}

/// Base part of a domain label with the (possibly multi-part) TLD
/// removed. Longer TLDs are tried first so `com.tr` wins over `tr`.
pub fn domain_base(label: &str) -> String {
    if label.is_empty() {
        return String::new();
    }
    if is_ipv4_like(label) {
        return label.to_string();
    }
    static SORTED: std::sync::OnceLock<Vec<&'static str>> = std::sync::OnceLock::new();
    let sorted = SORTED.get_or_init(|| {
        let mut tlds = MULTI_PART_TLDS.to_vec();
        tlds.sort_by_key(|tld| std::cmp::Reverse(tld.len()));
        tlds
    });
    for tld in sorted {
        if let Some(base) = label.strip_suffix(&format!(".{tld}")) {
            return base.to_string();
        }
    }
    match label.rfind('.') {
        Some(idx) if idx > 0 => label[..idx].to_string(),
        _ => label.to_string(),
    }
}

/// Folded, trimmed tag form used for equality comparisons.
pub fn normalize_tag(value: &str) -> String {
    fold(value.trim())
}

/// A link counts as official when flagged so in the data, or when one
/// of its tags equals the base of its own domain.
pub fn is_official_link(link: &Link, label: &str) -> bool {
    if link.official {
        return true;
    }
    if label.is_empty() {
        return false;
    }
    let base = normalize_tag(&domain_base(label));
    if base.is_empty() {
        return false;
    }
    link.tags.iter().any(|tag| normalize_tag(tag) == base)
}

/// Copy payload for a link, if it has one. `copyText` wins; the
/// winutil installer keeps its well-known one-liner.
pub fn resolve_copy_value(link: &Link) -> Option<String> {
    if let Some(copy_text) = link.copy_text.as_deref() {
        if !copy_text.is_empty() {
            return Some(copy_text.to_string());
        }
    }
    let name = crate::fold::normalize(&link.name);
    if name == "winutil" || link.url.contains("christitus.com/win") {
        return Some(WINUTIL_COMMAND.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_strips_www_and_keeps_registrable_domain() {
        assert_eq!(domain_label("https://www.example.com/path"), "example.com");
        assert_eq!(domain_label("https://gitlab.pages.example.com"), "example.com");
        assert_eq!(domain_label("https://www.ornek.com.tr/x"), "ornek.com.tr");
        assert_eq!(domain_label("http://192.168.1.1/admin"), "192.168.1.1");
        assert_eq!(domain_label("not a url"), "");
    }

    #[test]
    fn base_drops_single_and_multi_part_tlds() {
        assert_eq!(domain_base("example.com"), "example");
        assert_eq!(domain_base("ornek.com.tr"), "ornek");
        assert_eq!(domain_base("10.0.0.1"), "10.0.0.1");
        assert_eq!(domain_base("localhost"), "localhost");
    }

    #[test]
    fn official_detection_uses_flag_or_domain_tag() {
        let mut link = Link {
            name: "Steam".to_string(),
            url: "https://store.steampowered.com".to_string(),
            tags: vec!["Oyun".to_string(), "SteamPowered".to_string()],
            ..Default::default()
        };
        assert!(is_official_link(&link, "steampowered.com"));
        assert!(!is_official_link(&link, "example.com"));
        link.official = true;
        assert!(is_official_link(&link, ""));
    }

    #[test]
    fn winutil_copy_value_is_special_cased() {
        let link = Link {
            name: "Winutil".to_string(),
            url: "https://christitus.com/win".to_string(),
            ..Default::default()
        };
        assert_eq!(resolve_copy_value(&link).as_deref(), Some(WINUTIL_COMMAND));
        let plain = Link {
            name: "Steam".to_string(),
            url: "https://store.steampowered.com".to_string(),
            ..Default::default()
        };
        assert_eq!(resolve_copy_value(&plain), None);
    }
}
