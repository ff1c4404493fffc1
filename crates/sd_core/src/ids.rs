use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a placed instance, unique within one registry.
///
/// `InstanceId::UNASSIGNED` marks an instance that has not been stored yet;
/// generated ids start at 1 and are never handed out twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct InstanceId(pub u64);

impl InstanceId {
    pub const UNASSIGNED: InstanceId = InstanceId(0);

    pub fn is_assigned(&self) -> bool {
        *self != Self::UNASSIGNED
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable key of a spawnable template in the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub String);

impl TemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TemplateId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Monotonic source of instance ids.
#[derive(Debug)]
pub struct InstanceIdGenerator {
    next: u64,
}

impl Default for InstanceIdGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl InstanceIdGenerator {
    pub fn next_id(&mut self) -> InstanceId {
        let id = InstanceId(self.next);
        self.next += 1;
        id
    }

    /// Whether `id` has never been handed out by this generator and can be
    /// claimed. `u64::MAX` never can, since the counter cannot move past it.
    pub fn is_unissued(&self, id: InstanceId) -> bool {
        id.0 >= self.next && id.0.checked_add(1).is_some()
    }

    /// Accept an externally chosen id, moving the counter past it.
    /// Returns the id actually used: a fresh one when `id` cannot be claimed.
    pub fn claim(&mut self, id: InstanceId) -> InstanceId {
        match id.0.checked_add(1) {
            Some(next) if id.0 >= self.next => {
                self.next = next;
                id
            }
            Some(_) => id,
            None => self.next_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_assigned_and_increasing() {
        let mut ids = InstanceIdGenerator::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(a.is_assigned());
        assert!(b > a);
    }

    #[test]
    fn claim_moves_counter_forward_only() {
        let mut ids = InstanceIdGenerator::default();
        ids.claim(InstanceId(10));
        assert_eq!(ids.next_id(), InstanceId(11));
        ids.claim(InstanceId(3));
        assert_eq!(ids.next_id(), InstanceId(12));
        assert!(!ids.is_unissued(InstanceId(3)));
    }

    #[test]
    fn max_id_is_never_claimable() {
        let mut ids = InstanceIdGenerator::default();
        let max = InstanceId(u64::MAX);
        assert!(!ids.is_unissued(max));

        let used = ids.claim(max);
        assert_eq!(used, InstanceId(1));
        assert_eq!(ids.next_id(), InstanceId(2));
    }

    #[test]
    fn template_id_serializes_as_plain_string() {
        let id = TemplateId::new("rail_01");
        assert_eq!(ron::to_string(&id).unwrap(), "\"rail_01\"");
    }
}
