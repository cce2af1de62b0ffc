//!===================================================================
//! ハイライト座標
//!
//! 指し手を (移動元, 移動先) の座標の組に変換する。
//! 駒打ちの移動元は駒台上の擬似マスで表す。擬似マスは描画専用の静的な表であり、
//! Sq とは別の型なので盤面に書き込まれることはない。
//!===================================================================

use crate::prelude::*;

/// 駒台上の擬似マス。筋は先手の駒台が 10, 後手の駒台が 11。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct StandSq {
    side: Side,
    pt: Piece,
}

impl StandSq {
    pub const FILE_SENTE: i32 = 10;
    pub const FILE_GOTE: i32 = 11;

    /// side の駒台における pt (成駒ならナマ駒とみなす) の擬似マスを返す。
    ///
    /// ```
    /// # use shogi_replay::prelude::*;
    /// let stand = StandSq::of(Side::Sente, Piece::Pawn);
    /// assert_eq!((stand.file(), stand.rank()), (10, 1));
    /// let stand = StandSq::of(Side::Gote, Piece::Pawn);
    /// assert_eq!((stand.file(), stand.rank()), (11, 9));
    /// ```
    pub fn of(side: Side, pt: Piece) -> Self {
        Self {
            side,
            pt: pt.to_raw(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn piece(&self) -> Piece {
        self.pt
    }

    pub fn file(&self) -> i32 {
        match self.side {
            Side::Sente => Self::FILE_SENTE,
            Side::Gote => Self::FILE_GOTE,
        }
    }

    /// 先手は駒台の上から、後手は下から並ぶ。
    pub fn rank(&self) -> i32 {
        let slot = match self.pt {
            Piece::Pawn => 1,
            Piece::Lance => 2,
            Piece::Knight => 3,
            Piece::Silver => 4,
            Piece::Gold => 5,
            Piece::Bishop => 6,
            Piece::Rook => 7,
            Piece::King => 8,
            _ => unreachable!(),
        };
        match self.side {
            Side::Sente => slot,
            Side::Gote => 10 - slot,
        }
    }
}

/// ハイライトの移動元。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HighlightSrc {
    Board(Sq),
    Stand(StandSq),
}

impl HighlightSrc {
    /// (筋, 段) を返す。駒台なら筋は 10 または 11。
    pub fn file_rank(&self) -> (i32, i32) {
        match self {
            Self::Board(sq) => (sq.file(), sq.rank()),
            Self::Stand(stand) => (stand.file(), stand.rank()),
        }
    }
}

/// 描画層に渡す (移動元, 移動先) の組。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Highlight {
    src: HighlightSrc,
    dst: Sq,
}

impl Highlight {
    pub fn src(&self) -> HighlightSrc {
        self.src
    }

    pub fn dst(&self) -> Sq {
        self.dst
    }
}

pub fn from_nondrop(src: Sq, dst: Sq) -> Highlight {
    Highlight {
        src: HighlightSrc::Board(src),
        dst,
    }
}

pub fn from_drop(pt: Piece, side: Side, dst: Sq) -> Highlight {
    Highlight {
        src: HighlightSrc::Stand(StandSq::of(side, pt)),
        dst,
    }
}

/// side が指した mv のハイライトを返す。
pub fn from_move(mv: &Move, side: Side) -> Highlight {
    match mv {
        Move::Nondrop(nondrop) => from_nondrop(nondrop.src(), nondrop.dst()),
        Move::Drop(drop) => from_drop(drop.pt(), side, drop.dst()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn stand_table() {
        let all: HashSet<_> = Side::iter()
            .flat_map(|side| {
                Piece::iter_hand()
                    .chain(std::iter::once(Piece::King))
                    .map(move |pt| StandSq::of(side, pt))
            })
            .collect();
        // 8 種 * 2 陣営がすべて異なる
        assert_eq!(all.len(), 16);
        for stand in all {
            assert!(stand.file() == 10 || stand.file() == 11);
            assert!((1..=9).contains(&stand.rank()));
        }

        assert_eq!(StandSq::of(Side::Sente, Piece::Rook).rank(), 7);
        assert_eq!(StandSq::of(Side::Gote, Piece::Rook).rank(), 3);
        assert_eq!(StandSq::of(Side::Gote, Piece::King).rank(), 2);
        assert_eq!(
            StandSq::of(Side::Sente, Piece::Dragon),
            StandSq::of(Side::Sente, Piece::Rook)
        );
    }

    #[test]
    fn moves() {
        let mv = Move::from_sfen("7g7f").unwrap();
        let hl = from_move(&mv, Side::Sente);
        assert_eq!(hl.src(), HighlightSrc::Board(Sq::from_file_rank(7, 7)));
        assert_eq!(hl.dst(), Sq::from_file_rank(7, 6));
        // 盤上の移動は手番によらない
        assert_eq!(from_move(&mv, Side::Gote), hl);

        let mv = Move::from_sfen("B*4e").unwrap();
        let hl = from_move(&mv, Side::Gote);
        assert_eq!(hl.src().file_rank(), (11, 4));
        assert_eq!(hl.dst(), Sq::from_file_rank(4, 5));
    }
}
