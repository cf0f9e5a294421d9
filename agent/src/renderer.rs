//! Notification seam between the agent and presentation adapters.

use karel_core::Event;
use karel_world::World;

/// Receives the events produced by the agent.
///
/// Renderers are fire-and-forget: the agent never inspects their outcome, so
/// implementations must absorb their own failures.
pub trait Renderer {
    /// Presents a single event against the current world state.
    fn render(&mut self, world: &World, event: &Event);
}

/// Renderer that discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _world: &World, _event: &Event) {}
}

/// Records events in order, which is handy for controllers and tests.
impl Renderer for Vec<Event> {
    fn render(&mut self, _world: &World, event: &Event) {
        self.push(event.clone());
    }
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn render(&mut self, world: &World, event: &Event) {
        (**self).render(world, event);
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, world: &World, event: &Event) {
        (**self).render(world, event);
    }
}
