//! Sender identity breakdown from a raw `From`-style header value.

/// Second-to-last domain labels that mark a compound suffix, so the
/// organizationally meaningful domain keeps three labels instead of two
/// (`some.college.ac.uk` → `college.ac.uk`, not `ac.uk`).
const COMPOUND_SUFFIXES: [&str; 6] = ["ac", "edu", "co", "com", "gov", "oz"];

/// The parseable elements of an email identity.
///
/// Every field is optional: anything whose prerequisite data could not be
/// parsed is simply `None`. Parsing never fails outright.
///
/// # Examples
/// - `"Dr. Oxford <a.b@some.college.ac.uk>"` → `name = "Dr. Oxford"`,
///   `address = "a.b@some.college.ac.uk"`, `username = "a.b"`,
///   `domain = "some.college.ac.uk"`, `tld = "uk"`, `mld = "college.ac.uk"`
/// - `"not-an-email"` → every field `None`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressElements {
    /// Display name (angle-bracket or trailing-comment form).
    pub name: Option<String>,
    /// The bare address, lower-cased.
    pub address: Option<String>,
    /// Local part of the address (before the `@`), lower-cased.
    pub username: Option<String>,
    /// Domain part of the address (after the `@`), lower-cased.
    pub domain: Option<String>,
    /// Last dot-separated domain label.
    pub tld: Option<String>,
    /// Mid-level domain: the last two labels, or three for compound suffixes.
    pub mld: Option<String>,
}

impl AddressElements {
    /// Parse a raw header value into its elements.
    ///
    /// Supported shapes:
    /// - `"Display Name <user@domain>"`
    /// - `"\"Quoted, Name\" <user@domain>"`
    /// - `"user@domain (Display Name)"` (old Usenet style)
    /// - `"user@domain"`
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let mut elements = Self::default();
        if trimmed.is_empty() {
            return elements;
        }

        let mut candidate = trimmed;

        // "Display Name <address>" or "<address>"
        if let (Some(start), Some(end)) = (trimmed.rfind('<'), trimmed.rfind('>')) {
            if end > start {
                let name = strip_quotes(&trimmed[..start]);
                if !name.is_empty() {
                    elements.name = Some(name);
                }
                candidate = trimmed[start + 1..end].trim();
            }
        } else if let (Some(start), Some(end)) = (trimmed.find('('), trimmed.rfind(')')) {
            // "address (Display Name)" comment form
            if end > start {
                let name = trimmed[start + 1..end].trim();
                if !name.is_empty() {
                    elements.name = Some(name.to_string());
                }
                candidate = trimmed[..start].trim();
            }
        }

        // Without an @ there is no address, and nothing derived from one.
        let mut parts = candidate.split('@');
        let local = parts.next().unwrap_or_default();
        let Some(host) = parts.next() else {
            return elements;
        };

        elements.address = Some(candidate.to_lowercase());
        elements.username = Some(local.to_lowercase());

        if host.is_empty() {
            return elements;
        }
        let host = host.to_lowercase();

        let labels: Vec<&str> = host.split('.').collect();
        elements.tld = labels.last().map(|l| (*l).to_string());
        let mld_len = if labels.len() >= 3 && COMPOUND_SUFFIXES.contains(&labels[labels.len() - 2])
        {
            3
        } else {
            2.min(labels.len())
        };
        elements.mld = Some(labels[labels.len() - mld_len..].join("."));
        elements.domain = Some(host);

        elements
    }

    /// The populated fields as `(key, value)` pairs, in a fixed order,
    /// for merging into metadata under a prefix.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::with_capacity(6);
        let pairs = [
            ("name", &self.name),
            ("address", &self.address),
            ("username", &self.username),
            ("domain", &self.domain),
            ("tld", &self.tld),
            ("mld", &self.mld),
        ];
        for (key, value) in pairs {
            if let Some(v) = value {
                out.push((key, v.as_str()));
            }
        }
        out
    }
}

/// Strip surrounding double-quotes and trim whitespace.
fn strip_quotes(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound_suffix_domain() {
        let el = AddressElements::parse("Dr. Oxford <a.b@some.college.ac.uk>");
        assert_eq!(el.name.as_deref(), Some("Dr. Oxford"));
        assert_eq!(el.address.as_deref(), Some("a.b@some.college.ac.uk"));
        assert_eq!(el.username.as_deref(), Some("a.b"));
        assert_eq!(el.domain.as_deref(), Some("some.college.ac.uk"));
        assert_eq!(el.tld.as_deref(), Some("uk"));
        assert_eq!(el.mld.as_deref(), Some("college.ac.uk"));
    }

    #[test]
    fn test_parse_plain_two_label_domain() {
        let el = AddressElements::parse("Plain Jane <jane@example.com>");
        assert_eq!(el.mld.as_deref(), Some("example.com"));
        assert_eq!(el.tld.as_deref(), Some("com"));
    }

    #[test]
    fn test_parse_not_an_email() {
        let el = AddressElements::parse("not-an-email");
        assert_eq!(el.name, None);
        assert_eq!(el.address, None);
        assert_eq!(el.username, None);
        assert_eq!(el.domain, None);
        assert_eq!(el.tld, None);
        assert_eq!(el.mld, None);
    }

    #[test]
    fn test_parse_name_without_address() {
        let el = AddressElements::parse("Dr. Oxford <not-an-email>");
        assert_eq!(el.name.as_deref(), Some("Dr. Oxford"));
        assert_eq!(el.address, None);
        assert_eq!(el.mld, None);
    }

    #[test]
    fn test_parse_comment_style_name() {
        let el = AddressElements::parse("jblow@cs.utexas.edu (Joe Blow)");
        assert_eq!(el.name.as_deref(), Some("Joe Blow"));
        assert_eq!(el.address.as_deref(), Some("jblow@cs.utexas.edu"));
        assert_eq!(el.mld.as_deref(), Some("utexas.edu"));
        assert_eq!(el.tld.as_deref(), Some("edu"));
    }

    #[test]
    fn test_parse_address_lowercased() {
        let el = AddressElements::parse("Someone <Someone@Example.COM>");
        assert_eq!(el.address.as_deref(), Some("someone@example.com"));
        assert_eq!(el.username.as_deref(), Some("someone"));
        assert_eq!(el.domain.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_parse_quoted_display_name() {
        let el = AddressElements::parse("\"Last, First\" <lf@example.org>");
        assert_eq!(el.name.as_deref(), Some("Last, First"));
        assert_eq!(el.address.as_deref(), Some("lf@example.org"));
    }

    #[test]
    fn test_parse_single_label_domain() {
        let el = AddressElements::parse("root@localhost");
        assert_eq!(el.domain.as_deref(), Some("localhost"));
        assert_eq!(el.tld.as_deref(), Some("localhost"));
        assert_eq!(el.mld.as_deref(), Some("localhost"));
    }

    #[test]
    fn test_parse_empty_host() {
        let el = AddressElements::parse("user@");
        assert_eq!(el.address.as_deref(), Some("user@"));
        assert_eq!(el.username.as_deref(), Some("user"));
        assert_eq!(el.domain, None);
        assert_eq!(el.tld, None);
        assert_eq!(el.mld, None);
    }

    #[test]
    fn test_fields_order_and_presence() {
        let el = AddressElements::parse("Plain Jane <jane@example.com>");
        let keys: Vec<&str> = el.fields().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["name", "address", "username", "domain", "tld", "mld"]
        );

        let partial = AddressElements::parse("Dr. Oxford <not-an-email>");
        let keys: Vec<&str> = partial.fields().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["name"]);
    }
}
