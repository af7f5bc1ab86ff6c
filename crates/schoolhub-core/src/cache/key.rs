use std::fmt;

/// One segment of a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Str(String),
    Int(i64),
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Str(s) => f.write_str(s),
            KeyPart::Int(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for KeyPart {
    fn from(s: &str) -> Self {
        KeyPart::Str(s.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(s: String) -> Self {
        KeyPart::Str(s)
    }
}

impl From<i64> for KeyPart {
    fn from(i: i64) -> Self {
        KeyPart::Int(i)
    }
}

impl From<i32> for KeyPart {
    fn from(i: i32) -> Self {
        KeyPart::Int(i64::from(i))
    }
}

impl From<chrono::NaiveDate> for KeyPart {
    fn from(d: chrono::NaiveDate) -> Self {
        KeyPart::Str(d.format("%Y-%m-%d").to_string())
    }
}

/// Identifier a fetched value is stored and invalidated under,
/// e.g. `["students", 12]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Vec<KeyPart>);

impl CacheKey {
    pub fn new(root: &str) -> Self {
        Self(vec![KeyPart::from(root)])
    }

    /// Append a parameter segment
    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    /// True when `prefix`'s parts lead this key; every key starts with itself
    pub fn starts_with(&self, prefix: &CacheKey) -> bool {
        self.0.starts_with(prefix.parts())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|p| p.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_equality_includes_parameters() {
        let a = CacheKey::new("results").with("student").with(4);
        let b = CacheKey::new("results").with("student").with(4);
        let c = CacheKey::new("results").with("collective").with(4);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, CacheKey::new("results"));
    }

    #[test]
    fn test_int_and_string_parts_differ() {
        assert_ne!(CacheKey::new("students").with(1), CacheKey::new("students").with("1"));
    }

    #[test]
    fn test_display() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 10, 7).unwrap();
        let key = CacheKey::new("attendance").with("section").with(2).with(date);
        assert_eq!(key.to_string(), "[attendance, section, 2, 2024-10-07]");
    }

    #[test]
    fn test_prefix_matching() {
        let rosters = CacheKey::new("students").with("section");
        assert!(CacheKey::new("students").with("section").with(2).starts_with(&rosters));
        assert!(rosters.starts_with(&rosters));
        assert!(!CacheKey::new("students").starts_with(&rosters));
        assert!(!CacheKey::new("students").with(2).starts_with(&rosters));
    }
}
