use glob::Pattern;
use url::Url;

/// A domain pattern used to recognize the hosts an organization serves from
#[derive(Debug, Clone)]
pub enum HostPattern {
    /// Exact hostname match (case-insensitive)
    Exact(String),
    /// Glob pattern match (e.g., *.example.com)
    Glob(Pattern),
}

impl HostPattern {
    /// Parse a host pattern string into a HostPattern
    ///
    /// If the pattern contains '*' or '?', it's treated as a glob pattern.
    /// Otherwise, it's treated as an exact match (case-insensitive).
    pub fn parse(pattern: &str) -> crate::Result<Self> {
        let pattern_lower = pattern.trim().to_lowercase();
        if pattern_lower.is_empty() {
            return Err(crate::Error::InvalidPattern(
                "Empty host pattern".to_string(),
            ));
        }

        if pattern_lower.contains('*') || pattern_lower.contains('?') {
            let glob_pattern = Pattern::new(&pattern_lower).map_err(|e| {
                crate::Error::InvalidPattern(format!("Invalid glob pattern '{}': {}", pattern, e))
            })?;
            Ok(HostPattern::Glob(glob_pattern))
        } else {
            Ok(HostPattern::Exact(pattern_lower))
        }
    }

    /// Check if a hostname matches this pattern (case-insensitive)
    pub fn matches(&self, hostname: &str) -> bool {
        let hostname_lower = hostname.to_lowercase();
        match self {
            HostPattern::Exact(pattern) => &hostname_lower == pattern,
            HostPattern::Glob(pattern) => pattern.matches(&hostname_lower),
        }
    }

    /// The literal domain for exact patterns
    pub fn as_exact(&self) -> Option<&str> {
        match self {
            HostPattern::Exact(domain) => Some(domain),
            HostPattern::Glob(_) => None,
        }
    }
}

/// Lowercased host of a URL, or `None` for unparseable or host-less URLs
/// (`data:`, `blob:`, `about:blank`, ...).
pub fn host_of(url: &str) -> Option<String> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!("Failed to parse URL {}: {}", url, e);
            return None;
        }
    };

    parsed.host_str().map(|host| host.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let pattern = HostPattern::parse("youtube.com").unwrap();
        assert!(pattern.matches("youtube.com"));
        assert!(pattern.matches("YOUTUBE.COM"));
        assert!(!pattern.matches("www.youtube.com"));
        assert!(!pattern.matches("youtube.com.evil.net"));
        assert_eq!(pattern.as_exact(), Some("youtube.com"));
    }

    #[test]
    fn test_glob_subdomains() {
        let pattern = HostPattern::parse("*.intercomcdn.com").unwrap();
        assert!(pattern.matches("js.intercomcdn.com"));
        assert!(pattern.matches("static.intercomcdn.com"));
        assert!(pattern.matches("JS.INTERCOMCDN.COM"));
        assert!(!pattern.matches("intercomcdn.com"));
        assert!(!pattern.matches("intercomcdn.com.example.org"));
        assert!(pattern.as_exact().is_none());
    }

    #[test]
    fn test_pattern_is_normalized() {
        let pattern = HostPattern::parse("  *.Vimeo.COM ").unwrap();
        assert!(pattern.matches("player.vimeo.com"));
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        assert!(HostPattern::parse("").is_err());
        assert!(HostPattern::parse("   ").is_err());
    }

    #[test]
    fn test_host_of() {
        assert_eq!(
            host_of("https://Player.Vimeo.com/video/1").as_deref(),
            Some("player.vimeo.com")
        );
        assert_eq!(host_of("data:image/png;base64,AAAA"), None);
        assert_eq!(host_of("not a url"), None);
    }
}
