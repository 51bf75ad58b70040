//! URL-derived signals: the hostname, the Workday brand, and the last-resort
//! company guess.

use url::Url;

/// Hosting domain of the one ATS whose subdomain names the employer,
/// e.g. `manulife.wd3.myworkdayjobs.com`.
pub const WORKDAY_HOST: &str = "myworkdayjobs.com";

/// Lower-cased hostname of `url`, or `None` when it has no host.
pub fn hostname(url: &str) -> Option<String> {
    Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .filter(|h| !h.is_empty())
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

pub fn is_workday_host(host: &str) -> bool {
    host.contains(WORKDAY_HOST)
}

/// Employer name from a Workday subdomain: `acme-corp.wd5…` → `"Acme Corp"`.
pub fn workday_brand(host: &str) -> Option<String> {
    if !is_workday_host(host) {
        return None;
    }
    let label = strip_www(host).split('.').next().unwrap_or_default();
    let brand = label
        .replace('-', " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");
    if brand.is_empty() {
        None
    } else {
        Some(brand)
    }
}

/// Registrable-name guess: the label before the TLD, capitalised.
///
/// `careers.acme.io` → `"Acme"`, `localhost` → `"Localhost"`,
/// no host at all → `"Unknown"`.
pub fn company_from_host(host: Option<&str>) -> String {
    let host = match host {
        Some(h) => strip_www(h),
        None => return "Unknown".to_string(),
    };
    let parts: Vec<&str> = host.split('.').collect();
    let base = if parts.len() >= 2 {
        parts[parts.len() - 2]
    } else {
        parts[0]
    };
    let name = capitalize(base);
    if name.is_empty() {
        "Unknown".to_string()
    } else {
        name
    }
}

/// First character upper-cased, the rest lower-cased.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_is_lowercased() {
        assert_eq!(
            hostname("https://Jobs.Example.COM/role/1").as_deref(),
            Some("jobs.example.com")
        );
        assert_eq!(hostname("not a url"), None);
        assert_eq!(hostname("mailto:someone@example.com"), None);
    }

    #[test]
    fn workday_brand_title_cases_subdomain() {
        assert_eq!(
            workday_brand("acme-corp.wd5.myworkdayjobs.com").as_deref(),
            Some("Acme Corp")
        );
        assert_eq!(
            workday_brand("www.manulife.wd3.myworkdayjobs.com").as_deref(),
            Some("Manulife")
        );
        assert_eq!(workday_brand("boards.greenhouse.io"), None);
    }

    #[test]
    fn company_from_host_takes_second_to_last_label() {
        assert_eq!(company_from_host(Some("www.acme.com")), "Acme");
        assert_eq!(company_from_host(Some("jobs.lever.co")), "Lever");
        assert_eq!(company_from_host(Some("localhost")), "Localhost");
        assert_eq!(company_from_host(None), "Unknown");
    }

    #[test]
    fn capitalize_lowercases_tail() {
        assert_eq!(capitalize("aCME"), "Acme");
        assert_eq!(capitalize(""), "");
    }
}
