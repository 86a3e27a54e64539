//! Entity handle with generational index
//!
//! Handles are lightweight (8 bytes) references into a host world's entity
//! registry. The generation counter makes handles to released slots stale.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity handle (generation-indexed for safety)
///
/// Format: [32-bit index | 32-bit generation]
/// - Index: Slot in the host's entity registry
/// - Generation: Incremented when the slot is released (despawn or cancelled spawn)
///
/// Example:
/// ```ignore
/// let handle = dispatcher.spawn(&mut SpawnContext::new(&mut world), &placement, &desc)
///     .handle()
///     .unwrap();
/// world.despawn(handle)?;
/// // handle is now stale (generation mismatch)
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    index: u32,
    generation: u32,
}

impl EntityHandle {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_differ_by_generation() {
        let handle = EntityHandle::new(7, 3);
        assert_eq!(handle.index(), 7);
        assert_eq!(handle.generation(), 3);
        assert_ne!(handle, EntityHandle::new(7, 4));
    }

    #[test]
    fn display_shows_index_and_generation() {
        assert_eq!(EntityHandle::new(12, 1).to_string(), "12v1");
    }
}
