//! Pointer and touch state owned by one heatmap instance.

use std::time::Duration;

use phenomap_protocol::HitTarget;

/// Touches held longer than this count as clicks.
pub const LONG_PRESS: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchGesture {
    Click,
    Hover,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    /// Button left edge minus the pointer x at press time.
    displacement: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Touch {
    target: HitTarget,
    started: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct InputController {
    drag: Option<Drag>,
    touch: Option<Touch>,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer pressed on the slider button.
    pub fn press_button(&mut self, pointer_x: f64, button_left: f64) {
        self.drag = Some(Drag {
            displacement: button_left - pointer_x,
        });
    }

    /// Candidate button position for a pointer move, `None` when no drag
    /// is in progress. Bounds are checked by the slider.
    pub fn drag_position(&self, pointer_x: f64) -> Option<f64> {
        self.drag.map(|drag| pointer_x + drag.displacement)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Pointer released anywhere on the page.
    pub fn release(&mut self) {
        self.drag = None;
    }

    pub fn touch_start(&mut self, target: HitTarget, now: Duration) {
        self.touch = Some(Touch {
            target,
            started: now,
        });
    }

    /// Classify a finished touch on `target`. Returns `None` without a
    /// matching start.
    pub fn touch_end(&mut self, target: HitTarget, now: Duration) -> Option<TouchGesture> {
        let touch = self.touch.take().filter(|t| t.target == target)?;
        let held = now.saturating_sub(touch.started);
        Some(if held > LONG_PRESS {
            TouchGesture::Click
        } else {
            TouchGesture::Hover
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: HitTarget = HitTarget::Cell { row: 0, column: 1 };

    #[test]
    fn drag_keeps_pointer_offset() {
        let mut input = InputController::new();
        assert_eq!(input.drag_position(50.0), None);
        input.press_button(105.0, 100.0);
        assert_eq!(input.drag_position(125.0), Some(120.0));
        input.release();
        assert!(!input.is_dragging());
        assert_eq!(input.drag_position(125.0), None);
    }

    #[test]
    fn long_touch_is_a_click() {
        let mut input = InputController::new();
        input.touch_start(CELL, Duration::from_millis(0));
        assert_eq!(input.touch_end(CELL, Duration::from_millis(1001)), Some(TouchGesture::Click));

        input.touch_start(CELL, Duration::from_millis(0));
        assert_eq!(input.touch_end(CELL, Duration::from_millis(1000)), Some(TouchGesture::Hover));
    }

    #[test]
    fn touch_end_elsewhere_is_ignored() {
        let mut input = InputController::new();
        input.touch_start(CELL, Duration::ZERO);
        assert_eq!(input.touch_end(HitTarget::Cell { row: 1, column: 1 }, Duration::from_secs(2)), None);
        assert_eq!(input.touch_end(CELL, Duration::from_secs(2)), None);
    }
}
