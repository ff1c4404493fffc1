use bitflags::bitflags;

bitflags! {
    /// Collision classification of a scene node.
    ///
    /// The preview object carries no flags so that the ground probe and other
    /// raycasts pass straight through it. Committed instances are switched to
    /// [`CollisionFlags::NORMAL`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct CollisionFlags: u8 {
        const RAYCAST_TARGET = 0b0000_0001;
        const SOLID = 0b0000_0010;
        const NORMAL = Self::RAYCAST_TARGET.bits() | Self::SOLID.bits();
    }
}

impl CollisionFlags {
    /// Flags used by preview objects.
    pub const fn ignore() -> Self {
        Self::empty()
    }

    /// Flags used by committed instances.
    pub const fn normal() -> Self {
        Self::NORMAL
    }

    pub fn is_ignored(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_contains_both_bits() {
        let normal = CollisionFlags::normal();
        assert!(normal.contains(CollisionFlags::RAYCAST_TARGET));
        assert!(normal.contains(CollisionFlags::SOLID));
        assert!(!normal.is_ignored());
    }

    #[test]
    fn ignore_is_empty() {
        assert!(CollisionFlags::ignore().is_ignored());
        assert_eq!(CollisionFlags::default(), CollisionFlags::ignore());
    }
}
