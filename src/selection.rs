//! Drag-gesture tracking for the rectangular selection tool.
//!
//! A gesture is pointer-down, any number of pointer-moves, then pointer-up or
//! pointer-leave. The tracker turns it into one normalized [`SelectionRect`]
//! in image space. Positions are clamped to the image before use, so every
//! rectangle it produces lies inside the image.

use log::{debug, trace};

use crate::geometry::{ImageDimensions, Point, SelectionRect};

/// Where the tracker is in a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerState {
    /// No gesture in progress. A selection may or may not exist.
    Idle,
    /// Pointer is down; the rectangle follows the pointer.
    Dragging {
        /// Image-space position where the gesture started.
        anchor: Point,
    },
    /// Gesture finished; the rectangle is frozen until the next start or clear.
    Committed,
}

/// Accumulates drag gestures into a single live selection.
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    bounds: ImageDimensions,
    state: TrackerState,
    selection: Option<SelectionRect>,
    locked: bool,
}

impl SelectionTracker {
    /// Tracker for an image of the given size, idle with no selection.
    #[must_use]
    pub fn new(bounds: ImageDimensions) -> Self {
        Self {
            bounds,
            state: TrackerState::Idle,
            selection: None,
            locked: false,
        }
    }

    /// Start a gesture at `pos`.
    ///
    /// Discards any previous selection and emits an empty rectangle at the
    /// anchor. Returns `false` without changing anything while the tracker is
    /// locked.
    pub fn start(&mut self, pos: Point) -> bool {
        if self.locked {
            debug!("gesture start rejected: selection is locked");
            return false;
        }
        let anchor = pos.clamped_to(self.bounds);
        self.state = TrackerState::Dragging { anchor };
        self.selection = Some(SelectionRect::from_corners(anchor, anchor));
        trace!("gesture started at ({}, {})", anchor.x, anchor.y);
        true
    }

    /// Follow the pointer to `pos` during a drag.
    ///
    /// Returns the updated rectangle, or `None` when no drag is active or the
    /// tracker is locked.
    pub fn update(&mut self, pos: Point) -> Option<SelectionRect> {
        let TrackerState::Dragging { anchor } = self.state else {
            return None;
        };
        if self.locked {
            return None;
        }
        let rect = SelectionRect::from_corners(anchor, pos.clamped_to(self.bounds));
        self.selection = Some(rect);
        Some(rect)
    }

    /// Finish the drag (pointer released), freezing the last rectangle.
    pub fn end(&mut self) {
        if matches!(self.state, TrackerState::Dragging { .. }) {
            self.state = TrackerState::Committed;
            debug!("selection committed: {:?}", self.selection);
        }
    }

    /// Pointer left the surface mid-drag. Ends the drag exactly like [`end`](Self::end).
    pub fn exit(&mut self) {
        self.end();
    }

    /// Drop the selection and return to idle. Valid from any state.
    pub fn clear(&mut self) {
        self.state = TrackerState::Idle;
        self.selection = None;
    }

    /// Start over for a newly loaded image.
    pub fn reset(&mut self, bounds: ImageDimensions) {
        *self = Self::new(bounds);
    }

    /// Refuse new gestures, used while a processed result is shown.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Accept gestures again.
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Whether gesture starts are currently refused.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Current gesture state.
    #[must_use]
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, TrackerState::Dragging { .. })
    }

    /// The live selection, if any.
    #[must_use]
    pub fn selection(&self) -> Option<SelectionRect> {
        self.selection
    }

    /// Image bounds used for clamping.
    #[must_use]
    pub fn bounds(&self) -> ImageDimensions {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> SelectionTracker {
        SelectionTracker::new(ImageDimensions::new(800, 600).unwrap())
    }

    #[test]
    fn start_discards_previous_selection_and_emits_empty_rect() {
        let mut t = tracker();
        assert!(t.start(Point::new(10.0, 10.0)));
        t.update(Point::new(50.0, 40.0));
        t.end();

        assert!(t.start(Point::new(200.0, 100.0)));
        let rect = t.selection().unwrap();
        assert!(rect.is_empty());
        assert_eq!((rect.x, rect.y), (200.0, 100.0));
        assert_eq!(
            t.state(),
            TrackerState::Dragging {
                anchor: Point::new(200.0, 100.0)
            }
        );
    }

    #[test]
    fn committed_rect_depends_only_on_anchor_and_last_move() {
        let mut t = tracker();
        assert!(t.start(Point::new(300.0, 250.0)));
        for (x, y) in [(500.0, 10.0), (0.0, 0.0), (120.0, 333.0), (100.0, 100.0)] {
            t.update(Point::new(x, y));
        }
        t.end();
        assert_eq!(t.state(), TrackerState::Committed);
        assert_eq!(
            t.selection(),
            Some(SelectionRect {
                x: 100.0,
                y: 100.0,
                width: 200.0,
                height: 150.0
            })
        );
    }

    #[test]
    fn moves_after_commit_are_ignored() {
        let mut t = tracker();
        assert!(t.start(Point::new(1.0, 1.0)));
        t.update(Point::new(5.0, 5.0));
        t.end();
        let frozen = t.selection();
        assert!(t.update(Point::new(100.0, 100.0)).is_none());
        assert_eq!(t.selection(), frozen);
    }

    #[test]
    fn moves_without_a_gesture_are_ignored() {
        let mut t = tracker();
        assert!(t.update(Point::new(5.0, 5.0)).is_none());
        assert!(t.selection().is_none());
        t.end();
        assert_eq!(t.state(), TrackerState::Idle);
    }

    #[test]
    fn pointer_outside_image_is_clamped() {
        let mut t = tracker();
        assert!(t.start(Point::new(700.0, 500.0)));
        let rect = t.update(Point::new(5000.0, -40.0)).unwrap();
        t.exit();
        assert_eq!(t.state(), TrackerState::Committed);
        assert_eq!(
            rect,
            SelectionRect {
                x: 700.0,
                y: 0.0,
                width: 100.0,
                height: 500.0
            }
        );
        assert!(rect.x + rect.width <= 800.0);
        assert!(rect.y + rect.height <= 600.0);
    }

    #[test]
    fn click_without_drag_commits_empty_rect() {
        let mut t = tracker();
        assert!(t.start(Point::new(42.0, 42.0)));
        t.end();
        let rect = t.selection().unwrap();
        assert_eq!((rect.width, rect.height), (0.0, 0.0));
        assert!(rect.is_empty());
    }

    #[test]
    fn clear_is_valid_from_every_state() {
        let mut t = tracker();
        t.clear();
        assert_eq!(t.state(), TrackerState::Idle);

        assert!(t.start(Point::new(1.0, 1.0)));
        t.clear();
        assert_eq!(t.state(), TrackerState::Idle);
        assert!(t.selection().is_none());
        assert!(t.update(Point::new(3.0, 3.0)).is_none());

        assert!(t.start(Point::new(1.0, 1.0)));
        t.end();
        t.clear();
        assert_eq!(t.state(), TrackerState::Idle);
        assert!(t.selection().is_none());
    }

    #[test]
    fn locked_tracker_rejects_gesture_start() {
        let mut t = tracker();
        assert!(t.start(Point::new(10.0, 10.0)));
        t.update(Point::new(20.0, 20.0));
        t.end();
        t.lock();

        let before = t.selection();
        assert!(!t.start(Point::new(400.0, 400.0)));
        assert_eq!(t.state(), TrackerState::Committed);
        assert_eq!(t.selection(), before);

        t.unlock();
        assert!(t.start(Point::new(400.0, 400.0)));
    }

    #[test]
    fn locked_tracker_ignores_moves_of_an_open_drag() {
        let mut t = tracker();
        assert!(t.start(Point::new(5.0, 5.0)));
        t.update(Point::new(15.0, 10.0));
        t.lock();

        let before = t.selection();
        assert!(t.update(Point::new(39.0, 29.0)).is_none());
        assert_eq!(t.selection(), before);

        t.end();
        assert_eq!(t.state(), TrackerState::Committed);
    }

    #[test]
    fn reset_adopts_new_bounds_and_unlocks() {
        let mut t = tracker();
        assert!(t.start(Point::new(10.0, 10.0)));
        t.lock();
        let small = ImageDimensions::new(50, 50).unwrap();
        t.reset(small);
        assert_eq!(t.bounds(), small);
        assert_eq!(t.state(), TrackerState::Idle);
        assert!(t.selection().is_none());
        assert!(!t.is_locked());
    }
}
