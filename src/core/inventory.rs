use std::collections::HashMap;

/// Foreman hosts keyed by lower-cased BIOS UUID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForemanInventory {
    hosts: HashMap<String, String>,
}

impl ForemanInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uuid: &str, hostname: impl Into<String>) {
        self.hosts.insert(uuid.to_lowercase(), hostname.into());
    }

    pub fn contains(&self, normalized_uuid: &str) -> bool {
        self.hosts.contains_key(normalized_uuid)
    }

    pub fn hostname(&self, uuid: &str) -> Option<&str> {
        self.hosts.get(&uuid.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl<U: AsRef<str>, H: Into<String>> FromIterator<(U, H)> for ForemanInventory {
    fn from_iter<I: IntoIterator<Item = (U, H)>>(iter: I) -> Self {
        let mut inv = ForemanInventory::new();
        for (uuid, hostname) in iter {
            inv.insert(uuid.as_ref(), hostname);
        }
        inv
    }
}
