pub use crate::cursor::Cursor;
pub use crate::diff::{Ambiguous, Diff};
pub use crate::highlight::{Highlight, HighlightSrc, StandSq};
pub use crate::history::History;
pub use crate::position::Position;
pub use crate::pretty::Pretty;
pub use crate::replay::Replay;
pub use crate::{Board, BoardCell, Hand, Hands, Move, MoveDrop, MoveNondrop, Piece, Side, Sq};
