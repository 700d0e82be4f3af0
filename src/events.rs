use crate::geometry::Point;

/// Pointer positions are offsets relative to the wheel origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move(Point),
    Press,
    Release,
    Confirm,
    Switch { reverse: bool },
    Modifier { shift: bool },
    Cancel,
}
