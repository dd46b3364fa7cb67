use std::collections::HashMap;

/// Sentinel returned by registry lookups for unregistered input.
pub const UNKNOWN: &str = "unknown";

/// One registered backend: a readable source name and its short service-type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceEntry {
    pub source: &'static str,
    pub service_type: &'static str,
}

impl ServiceEntry {
    pub const fn new(source: &'static str, service_type: &'static str) -> Self {
        Self {
            source,
            service_type,
        }
    }
}

/// Bidirectional source/service-type lookup. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    entries: Vec<ServiceEntry>,
    by_source: HashMap<&'static str, &'static str>,
    by_type: HashMap<&'static str, &'static str>,
}

impl ServiceRegistry {
    pub fn new(entries: &[ServiceEntry]) -> Self {
        let mut by_source = HashMap::with_capacity(entries.len());
        let mut by_type = HashMap::with_capacity(entries.len());
        for entry in entries {
            by_source.insert(entry.source, entry.service_type);
            by_type.insert(entry.service_type, entry.source);
        }
        Self {
            entries: entries.to_vec(),
            by_source,
            by_type,
        }
    }

    /// Service-type code for a source name.
    pub fn service_type(&self, source: &str) -> &'static str {
        self.by_source.get(source).copied().unwrap_or(UNKNOWN)
    }

    /// Source name for a service-type code.
    pub fn service_source(&self, service_type: &str) -> &'static str {
        self.by_type.get(service_type).copied().unwrap_or(UNKNOWN)
    }

    pub fn is_valid_source(&self, source: &str) -> bool {
        self.by_source.contains_key(source)
    }

    pub fn is_valid_service_type(&self, service_type: &str) -> bool {
        self.by_type.contains_key(service_type)
    }

    pub fn entries(&self) -> &[ServiceEntry] {
        &self.entries
    }

    pub fn sources(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.source).collect()
    }

    pub fn service_types(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.service_type).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[ServiceEntry] = &[
        ServiceEntry::new("owner", "0"),
        ServiceEntry::new("vendor_a", "va"),
    ];

    #[test]
    fn lookups_are_inverse() {
        let registry = ServiceRegistry::new(TABLE);
        for entry in registry.entries() {
            assert_eq!(
                registry.service_type(registry.service_source(entry.service_type)),
                entry.service_type
            );
            assert_eq!(
                registry.service_source(registry.service_type(entry.source)),
                entry.source
            );
        }
    }

    #[test]
    fn unknown_input() {
        let registry = ServiceRegistry::new(TABLE);
        assert_eq!(registry.service_type("nope"), UNKNOWN);
        assert_eq!(registry.service_source("zz"), UNKNOWN);
        assert!(!registry.is_valid_source("nope"));
        assert!(registry.is_valid_service_type("va"));
        assert_eq!(registry.sources(), vec!["owner", "vendor_a"]);
        assert_eq!(registry.service_types(), vec!["0", "va"]);
    }
}
