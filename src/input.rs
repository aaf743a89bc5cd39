//! Pointer tracking and host input events.
//!
//! Input reaches an engine as [`HostEvent`]s in surface-local pixels. Events
//! only write state (the last pointer position, a click queue); the next tick
//! reads it. Nothing here ever blocks the frame loop.
//!
//! The native window host converts winit events with [`Input::translate`]:
//!
//! ```ignore
//! if let Some(event) = input.translate(&window_event) {
//!     engine.handle_event(event);
//! }
//! ```

use glam::Vec2;
use std::collections::{HashSet, VecDeque};
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};

/// An input event delivered to an engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// The pointer moved to a new position.
    PointerMoved(Vec2),
    /// The pointer left the surface.
    PointerLeft,
    /// A click or tap at a position.
    Click(Vec2),
    /// The container changed size.
    Resized { width: u32, height: u32 },
}

impl HostEvent {
    /// Which listener must be attached for this event to be handled.
    pub fn listener(&self) -> Listener {
        match self {
            HostEvent::PointerMoved(_) | HostEvent::PointerLeft => Listener::Pointer,
            HostEvent::Click(_) => Listener::Click,
            HostEvent::Resized { .. } => Listener::Resize,
        }
    }
}

/// A class of input an engine subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    Pointer,
    Click,
    Resize,
}

impl Listener {
    pub const ALL: [Listener; 3] = [Listener::Pointer, Listener::Click, Listener::Resize];
}

/// Listener registrations owned by one engine.
///
/// Events whose listener is not attached are dropped, which is how a
/// stopped engine stops reacting to input.
#[derive(Debug, Default, Clone)]
pub struct Listeners {
    attached: HashSet<Listener>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach every listener.
    pub fn attach_all(&mut self) {
        self.attached.extend(Listener::ALL);
    }

    /// Detach everything. Returns how many listeners were removed.
    pub fn detach_all(&mut self) -> usize {
        let n = self.attached.len();
        self.attached.clear();
        n
    }

    pub fn is_attached(&self, listener: Listener) -> bool {
        self.attached.contains(&listener)
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }
}

/// Pointer state read by the simulation.
#[derive(Debug, Default, Clone)]
pub struct Pointer {
    position: Option<Vec2>,
    clicks: VecDeque<Vec2>,
}

impl Pointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known position, `None` when the pointer is off the surface.
    #[inline]
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    pub fn move_to(&mut self, position: Vec2) {
        self.position = Some(position);
    }

    pub fn leave(&mut self) {
        self.position = None;
    }

    /// Queue a click for the next tick.
    pub fn click(&mut self, position: Vec2) {
        self.clicks.push_back(position);
    }

    /// Clicks queued since the last drain.
    pub fn pending_clicks(&self) -> usize {
        self.clicks.len()
    }

    /// Take every queued click, oldest first.
    pub fn drain_clicks(&mut self) -> impl Iterator<Item = Vec2> + '_ {
        self.clicks.drain(..)
    }
}

/// Converts winit window events into [`HostEvent`]s.
///
/// winit reports button presses without a position, so the last cursor
/// position is remembered here.
#[derive(Debug, Default)]
pub struct Input {
    cursor: Option<Vec2>,
    buttons_held: HashSet<MouseButton>,
}

impl Input {
    /// Create a new input translator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate a winit window event, if it is one the engine cares about.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<HostEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.cursor_moved(Vec2::new(position.x as f32, position.y as f32)))
            }
            WindowEvent::CursorLeft { .. } => Some(self.cursor_left()),
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.press(*button),
                ElementState::Released => {
                    self.release(*button);
                    None
                }
            },
            WindowEvent::Touch(touch) => {
                let pos = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                match touch.phase {
                    TouchPhase::Started => {
                        self.cursor = Some(pos);
                        Some(HostEvent::Click(pos))
                    }
                    TouchPhase::Moved => Some(self.cursor_moved(pos)),
                    TouchPhase::Ended | TouchPhase::Cancelled => Some(self.cursor_left()),
                }
            }
            WindowEvent::Resized(size) => Some(HostEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            _ => None,
        }
    }

    fn cursor_moved(&mut self, pos: Vec2) -> HostEvent {
        self.cursor = Some(pos);
        HostEvent::PointerMoved(pos)
    }

    fn cursor_left(&mut self) -> HostEvent {
        self.cursor = None;
        HostEvent::PointerLeft
    }

    /// Only the initial left press clicks, at the last cursor position.
    fn press(&mut self, button: MouseButton) -> Option<HostEvent> {
        let fresh = self.buttons_held.insert(button);
        if fresh && button == MouseButton::Left {
            self.cursor.map(HostEvent::Click)
        } else {
            None
        }
    }

    fn release(&mut self, button: MouseButton) {
        self.buttons_held.remove(&button);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalSize;
    #[test]
    fn test_listeners_detach_all() {
        let mut listeners = Listeners::new();
        listeners.attach_all();
        assert_eq!(listeners.len(), 3);
        assert!(listeners.is_attached(Listener::Click));
        assert_eq!(listeners.detach_all(), 3);
        assert_eq!(listeners.detach_all(), 0);
        assert!(!listeners.is_attached(Listener::Pointer));
    }

    #[test]
    fn test_pointer_clicks_queue_in_order() {
        let mut pointer = Pointer::new();
        pointer.click(Vec2::new(1.0, 1.0));
        pointer.click(Vec2::new(2.0, 2.0));
        assert_eq!(pointer.pending_clicks(), 2);
        let clicks: Vec<_> = pointer.drain_clicks().collect();
        assert_eq!(clicks, vec![Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)]);
        assert_eq!(pointer.pending_clicks(), 0);
    }

    #[test]
    fn test_pointer_leave() {
        let mut pointer = Pointer::new();
        pointer.move_to(Vec2::new(3.0, 4.0));
        assert_eq!(pointer.position(), Some(Vec2::new(3.0, 4.0)));
        pointer.leave();
        assert_eq!(pointer.position(), None);
    }

    #[test]
    fn test_press_clicks_at_last_cursor() {
        let mut input = Input::new();
        // No cursor yet, so no click position.
        assert_eq!(input.press(MouseButton::Left), None);
        input.release(MouseButton::Left);

        assert_eq!(
            input.cursor_moved(Vec2::new(40.0, 30.0)),
            HostEvent::PointerMoved(Vec2::new(40.0, 30.0))
        );
        assert_eq!(
            input.press(MouseButton::Left),
            Some(HostEvent::Click(Vec2::new(40.0, 30.0)))
        );
        // Held button does not click again.
        assert_eq!(input.press(MouseButton::Left), None);
        input.release(MouseButton::Left);
        assert!(input.press(MouseButton::Left).is_some());
    }

    #[test]
    fn test_only_left_button_clicks() {
        let mut input = Input::new();
        input.cursor_moved(Vec2::new(5.0, 5.0));
        assert_eq!(input.press(MouseButton::Right), None);
        assert_eq!(input.press(MouseButton::Middle), None);
        assert_eq!(input.cursor_left(), HostEvent::PointerLeft);
        assert_eq!(input.press(MouseButton::Left), None);
    }

    #[test]
    fn test_translate_resize() {
        let mut input = Input::new();
        let event = WindowEvent::Resized(PhysicalSize::new(800, 600));
        assert_eq!(
            input.translate(&event),
            Some(HostEvent::Resized {
                width: 800,
                height: 600
            })
        );
        assert_eq!(input.translate(&event).map(|e| e.listener()), Some(Listener::Resize));
    }
}
