//! Key and mouse translation for the board.

use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};

use crate::games::puzzle::{BoardLayout, Direction, GestureTracker, Point, SwapRequest};

/// Pointer units per terminal cell; scales the configured drag threshold.
pub const POINTER_UNITS_PER_CELL: f32 = 10.0;

/// Maps arrow keys and vi/WASD letters to cursor moves.
pub fn direction_for(key: KeyCode) -> Option<Direction> {
    match key {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => Some(Direction::Right),
        _ => None,
    }
}

/// Feeds a mouse event to the gesture tracker, returning a swap once a
/// drag completes.
pub fn track_mouse(
    gestures: &mut GestureTracker,
    layout: &BoardLayout,
    mouse: MouseEvent,
) -> Option<SwapRequest> {
    let cell = layout.cell_at(mouse.column, mouse.row);
    let at = Point::new(f32::from(mouse.column), f32::from(mouse.row));
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            match cell {
                Some(cell) => gestures.press(cell, at),
                None => gestures.cancel(),
            }
            None
        }
        MouseEventKind::Up(MouseButton::Left) => gestures.release(cell, at),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_direction_keys() {
        assert_eq!(direction_for(KeyCode::Up), Some(Direction::Up));
        assert_eq!(direction_for(KeyCode::Char('l')), Some(Direction::Right));
        assert_eq!(direction_for(KeyCode::Enter), None);
    }

    #[test]
    fn test_drag_between_cells_swaps() {
        let layout = BoardLayout::new(0, 0, 10, 4, 3, 3);
        let mut gestures = GestureTracker::new(1.0);
        assert_eq!(
            track_mouse(&mut gestures, &layout, mouse(MouseEventKind::Down(MouseButton::Left), 2, 1)),
            None
        );
        assert_eq!(
            track_mouse(&mut gestures, &layout, mouse(MouseEventKind::Up(MouseButton::Left), 25, 1)),
            Some(SwapRequest::new(0, 2))
        );
    }

    #[test]
    fn test_click_without_drag_is_ignored() {
        let layout = BoardLayout::new(0, 0, 10, 4, 3, 3);
        let mut gestures = GestureTracker::new(1.0);
        track_mouse(&mut gestures, &layout, mouse(MouseEventKind::Down(MouseButton::Left), 2, 1));
        assert_eq!(
            track_mouse(&mut gestures, &layout, mouse(MouseEventKind::Up(MouseButton::Left), 2, 1)),
            None
        );
    }
}
