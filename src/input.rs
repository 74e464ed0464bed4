use crate::chain::Point;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Action {
    Quit,
    ToggleHud,
    /// Pointer position in canvas pixels.
    PointerMoved(Point),
    Resized,
}

/// Center of a terminal cell, in braille sub-pixels.
pub(crate) fn cell_to_canvas(column: u16, row: u16) -> Point {
    Point::new(column as f32 * 2.0 + 1.0, row as f32 * 4.0 + 2.0)
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<Action>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Some(action) = map_event(event::read()?) {
            // Only the latest pointer position matters for the next tick.
            if let (Action::PointerMoved(_), Some(Action::PointerMoved(_))) = (action, out.last()) {
                out.pop();
            }
            out.push(action);
            if out.len() >= 64 {
                break;
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event(ev: Event) -> Option<Action> {
    match ev {
        Event::Key(k) if k.kind == KeyEventKind::Press => match (k.code, k.modifiers) {
            (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
            (KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc, _) => Some(Action::Quit),
            (KeyCode::Char('h') | KeyCode::Char('H'), _) => Some(Action::ToggleHud),
            _ => None,
        },
        Event::Mouse(m) => match m.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_) => {
                Some(Action::PointerMoved(cell_to_canvas(m.column, m.row)))
            }
            _ => None,
        },
        Event::Resize(_, _) => Some(Action::Resized),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, MouseButton, MouseEvent};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn cell_maps_to_pixel_center() {
        assert_eq!(cell_to_canvas(0, 0), Point::new(1.0, 2.0));
        assert_eq!(cell_to_canvas(10, 5), Point::new(21.0, 22.0));
    }

    #[test]
    fn mouse_motion_moves_pointer() {
        for kind in [
            MouseEventKind::Moved,
            MouseEventKind::Drag(MouseButton::Left),
            MouseEventKind::Down(MouseButton::Right),
        ] {
            assert_eq!(
                map_event(mouse(kind, 3, 4)),
                Some(Action::PointerMoved(Point::new(7.0, 18.0)))
            );
        }
        assert_eq!(map_event(mouse(MouseEventKind::ScrollUp, 3, 4)), None);
        assert_eq!(map_event(mouse(MouseEventKind::Up(MouseButton::Left), 3, 4)), None);
    }

    #[test]
    fn quit_keys() {
        assert_eq!(map_event(key(KeyCode::Char('q'), KeyModifiers::NONE)), Some(Action::Quit));
        assert_eq!(map_event(key(KeyCode::Char('Q'), KeyModifiers::SHIFT)), Some(Action::Quit));
        assert_eq!(map_event(key(KeyCode::Esc, KeyModifiers::NONE)), Some(Action::Quit));
        assert_eq!(
            map_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(map_event(key(KeyCode::Char('c'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn hud_toggle_and_resize() {
        assert_eq!(
            map_event(key(KeyCode::Char('h'), KeyModifiers::NONE)),
            Some(Action::ToggleHud)
        );
        assert_eq!(map_event(Event::Resize(100, 40)), Some(Action::Resized));
        assert_eq!(map_event(Event::FocusGained), None);
    }
}
