//! Scoped deferred construction
//!
//! [`DeferredSpawn`] owns one pending allocation in a [`HostWorld`]. It walks
//! `Allocated → Configured → Published` (or `Cancelled`) and finalizes the
//! host primitive exactly once, either explicitly or when dropped. A guard
//! dropped while unwinding discards its actor instead of publishing it.

use crate::{EntityHandle, HostWorld, SpawnRequest, Transform, TriggerActor};

/// Lifecycle of a deferred spawn.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpawnPhase {
    /// `begin_spawn` ran. The handle may be empty if the host denied it.
    Allocated,
    /// The pending actor has been configured.
    Configured,
    /// `finish_spawn` ran.
    Published,
    /// `cancel_spawn` ran.
    Cancelled,
}

/// Guard over a pending allocation.
///
/// Dropping the guard before [`publish`](Self::publish) or
/// [`cancel`](Self::cancel) publishes whatever state the actor is in, so the
/// host never keeps a dangling deferred slot. During a panic the pending actor
/// is cancelled instead.
pub struct DeferredSpawn<'w> {
    world: &'w mut dyn HostWorld,
    handle: Option<EntityHandle>,
    placement: Transform,
    phase: SpawnPhase,
}

impl<'w> DeferredSpawn<'w> {
    /// Allocate through `world.begin_spawn`.
    pub fn begin(world: &'w mut dyn HostWorld, request: SpawnRequest<'_>) -> Self {
        let placement = *request.placement;
        let handle = world.begin_spawn(request);
        tracing::trace!(
            class = %request.class,
            owner = request.owner,
            handle = ?handle,
            "deferred spawn allocated"
        );
        Self {
            world,
            handle,
            placement,
            phase: SpawnPhase::Allocated,
        }
    }

    #[inline]
    pub fn handle(&self) -> Option<EntityHandle> {
        self.handle
    }

    #[inline]
    pub fn phase(&self) -> SpawnPhase {
        self.phase
    }

    /// Run `configure` against the pending actor's trigger capability.
    ///
    /// Returns `false` when there is no pending actor or it is not a trigger;
    /// the phase is left untouched in that case.
    pub fn configure<F>(&mut self, configure: F) -> bool
    where
        F: FnOnce(&mut dyn TriggerActor),
    {
        if self.phase != SpawnPhase::Allocated && self.phase != SpawnPhase::Configured {
            return false;
        }
        let Some(handle) = self.handle else {
            return false;
        };
        match self.world.pending_trigger_mut(handle) {
            Some(trigger) => {
                configure(trigger);
                self.phase = SpawnPhase::Configured;
                true
            }
            None => false,
        }
    }

    /// Finish construction at the original placement and hand the actor to
    /// the host.
    pub fn publish(mut self) -> Option<EntityHandle> {
        self.finish();
        self.handle
    }

    /// Release the pending allocation without publishing it.
    pub fn cancel(mut self) {
        self.discard();
    }

    fn discard(&mut self) {
        if self.is_finalized() {
            return;
        }
        match self.handle {
            Some(handle) => self.world.cancel_spawn(handle),
            None => self.world.finish_spawn(None, &self.placement),
        }
        self.phase = SpawnPhase::Cancelled;
    }

    fn is_finalized(&self) -> bool {
        matches!(self.phase, SpawnPhase::Published | SpawnPhase::Cancelled)
    }

    fn finish(&mut self) {
        if self.is_finalized() {
            return;
        }
        self.world.finish_spawn(self.handle, &self.placement);
        self.phase = SpawnPhase::Published;
    }
}

impl Drop for DeferredSpawn<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.discard();
        } else {
            self.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActorClass, CollisionHandling, Episode, SessionContext};
    use glam::Vec3;

    #[derive(Default)]
    struct Plate {
        friction: f32,
        extent: Vec3,
        role: String,
    }

    impl TriggerActor for Plate {
        fn bind_episode(&mut self, _episode: Episode) {}
        fn set_friction(&mut self, friction: f32) {
            self.friction = friction;
        }
        fn set_extent(&mut self, extent: Vec3) {
            self.extent = extent;
        }
        fn set_role_name(&mut self, role_name: String) {
            self.role = role_name;
        }
        fn episode(&self) -> Option<&Episode> {
            None
        }
        fn friction(&self) -> f32 {
            self.friction
        }
        fn extent(&self) -> Vec3 {
            self.extent
        }
        fn role_name(&self) -> &str {
            &self.role
        }
    }

    /// Host that records every primitive call.
    #[derive(Default)]
    struct Recorder {
        deny: bool,
        pending: Option<Plate>,
        calls: Vec<String>,
    }

    impl HostWorld for Recorder {
        fn session(&self) -> Option<&dyn SessionContext> {
            None
        }

        fn begin_spawn(&mut self, _request: SpawnRequest<'_>) -> Option<EntityHandle> {
            self.calls.push("begin".into());
            if self.deny {
                return None;
            }
            self.pending = Some(Plate::default());
            Some(EntityHandle::new(0, 0))
        }

        fn pending_trigger_mut(&mut self, _handle: EntityHandle) -> Option<&mut dyn TriggerActor> {
            self.pending.as_mut().map(|p| p as &mut dyn TriggerActor)
        }

        fn finish_spawn(&mut self, handle: Option<EntityHandle>, _placement: &Transform) {
            let friction = self.pending.as_ref().map(|p| p.friction);
            self.calls.push(format!("finish {:?} {:?}", handle.is_some(), friction));
        }

        fn cancel_spawn(&mut self, _handle: EntityHandle) {
            self.pending = None;
            self.calls.push("cancel".into());
        }
    }

    fn request<'a>(class: &'a ActorClass, placement: &'a Transform) -> SpawnRequest<'a> {
        SpawnRequest {
            class,
            placement,
            owner: "test",
            collision: CollisionHandling::AlwaysSpawn,
        }
    }

    #[test]
    fn configure_then_publish_finishes_once() {
        let class = ActorClass::new("plate");
        let placement = Transform::IDENTITY;
        let mut host = Recorder::default();
        {
            let mut spawn = DeferredSpawn::begin(&mut host, request(&class, &placement));
            assert_eq!(spawn.phase(), SpawnPhase::Allocated);
            assert!(spawn.configure(|t| t.set_friction(2.0)));
            assert_eq!(spawn.phase(), SpawnPhase::Configured);
            assert!(spawn.publish().is_some());
        }
        assert_eq!(host.calls, vec!["begin", "finish true Some(2.0)"]);
    }

    #[test]
    fn drop_finalizes_pending_spawn() {
        let class = ActorClass::new("plate");
        let placement = Transform::IDENTITY;
        let mut host = Recorder::default();
        {
            let _spawn = DeferredSpawn::begin(&mut host, request(&class, &placement));
        }
        assert_eq!(host.calls, vec!["begin", "finish true Some(0.0)"]);
    }

    #[test]
    fn denied_allocation_still_finishes_with_empty_handle() {
        let class = ActorClass::new("plate");
        let placement = Transform::IDENTITY;
        let mut host = Recorder {
            deny: true,
            ..Default::default()
        };
        {
            let mut spawn = DeferredSpawn::begin(&mut host, request(&class, &placement));
            assert!(spawn.handle().is_none());
            assert!(!spawn.configure(|t| t.set_friction(1.0)));
        }
        assert_eq!(host.calls, vec!["begin", "finish false None"]);
    }

    #[test]
    fn cancel_replaces_finish() {
        let class = ActorClass::new("plate");
        let placement = Transform::IDENTITY;
        let mut host = Recorder::default();
        {
            let spawn = DeferredSpawn::begin(&mut host, request(&class, &placement));
            spawn.cancel();
        }
        assert_eq!(host.calls, vec!["begin", "cancel"]);
    }

    #[test]
    fn panic_during_configure_cancels() {
        let class = ActorClass::new("plate");
        let placement = Transform::IDENTITY;
        let mut host = Recorder::default();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut spawn = DeferredSpawn::begin(&mut host, request(&class, &placement));
            spawn.configure(|t| {
                t.set_friction(4.2);
                panic!("extent rejected");
            });
        }));
        assert!(outcome.is_err());
        assert_eq!(host.calls, vec!["begin", "cancel"]);
    }

    #[test]
    fn panic_after_denied_allocation_still_finishes() {
        let class = ActorClass::new("plate");
        let placement = Transform::IDENTITY;
        let mut host = Recorder {
            deny: true,
            ..Default::default()
        };
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _spawn = DeferredSpawn::begin(&mut host, request(&class, &placement));
            panic!("aborted");
        }));
        assert!(outcome.is_err());
        assert_eq!(host.calls, vec!["begin", "finish false None"]);
    }
}
