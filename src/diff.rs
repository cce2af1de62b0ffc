//!===================================================================
//! 局面差分からの指し手推定
//!
//! 指し手表記が得られないとき、前後 2 局面の盤面を比較して直前の指し手を推定する。
//! 差分のあるマスを次の 3 種に分類する:
//!
//! * vacated: 駒あり -> 空き
//! * filled:  空き -> 駒あり
//! * changed: 駒あり -> 別の駒あり (成りも含む)
//!
//! 受理する (vacated, filled, changed) の個数は次の 3 通りのみ:
//!
//! * (1, 1, 0): 駒を取らない移動
//! * (1, 0, 1): 駒を取る移動
//! * (0, 1, 0): 駒打ち
//!
//! それ以外(差分なし、2 手以上離れた局面など)は曖昧として推定しない。
//! 持駒は比較しない。
//!===================================================================

use arrayvec::ArrayVec;
use log::debug;

use crate::highlight::{self, Highlight};
use crate::prelude::*;

/// 推定できなかったことを表す。エラーダイアログではなく「ハイライトなし」として扱うこと。
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("ambiguous diff: vacated={vacated}, filled={filled}, changed={changed}")]
pub struct Ambiguous {
    pub vacated: usize,
    pub filled: usize,
    pub changed: usize,
}

/// 推定された指し手の移動元。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DiffSrc {
    Board(Sq),
    /// 駒打ち。side の駒台から pt を打った。
    Stand(Side, Piece),
}

/// 推定結果。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Diff {
    src: DiffSrc,
    dst: Sq,
    is_promotion: bool,
}

impl Diff {
    pub fn src(&self) -> DiffSrc {
        self.src
    }

    pub fn dst(&self) -> Sq {
        self.dst
    }

    /// 打たれた駒を返す。盤上の移動なら None。
    pub fn dropped(&self) -> Option<Piece> {
        match self.src {
            DiffSrc::Stand(_, pt) => Some(pt),
            DiffSrc::Board(_) => None,
        }
    }

    /// 移動元がナマ駒で移動先が成駒なら true。
    pub fn is_promotion(&self) -> bool {
        self.is_promotion
    }

    /// 等価な指し手を返す。
    /// 玉が盤上に現れた場合のように、持駒にならない駒を打ったことになるなら None。
    pub fn to_move(&self) -> Option<Move> {
        match self.src {
            DiffSrc::Board(src) => Some(Move::nondrop(src, self.dst, self.is_promotion)),
            DiffSrc::Stand(_, pt) if pt.is_hand() => Some(Move::drop(pt, self.dst)),
            DiffSrc::Stand(..) => None,
        }
    }

    pub fn highlight(&self) -> Highlight {
        match self.src {
            DiffSrc::Board(src) => highlight::from_nondrop(src, self.dst),
            DiffSrc::Stand(side, pt) => highlight::from_drop(pt, side, self.dst),
        }
    }
}

/// before から after への差分を 1 手として推定する。
///
/// ```
/// # use shogi_replay::prelude::*;
/// # use shogi_replay::diff;
/// let before = Position::hirate();
/// let after = before.apply(&Move::from_sfen("7g7f").unwrap()).unwrap();
/// let diff = diff::infer(&before, &after).unwrap();
/// assert_eq!(diff.to_move().unwrap().to_sfen(), "7g7f");
/// assert!(diff::infer(&before, &before).is_err());
/// ```
pub fn infer(before: &Position, after: &Position) -> Result<Diff, Ambiguous> {
    let mut vacated = ArrayVec::<[Sq; 81]>::new();
    let mut filled = ArrayVec::<[Sq; 81]>::new();
    let mut changed = ArrayVec::<[Sq; 81]>::new();

    for sq in Sq::iter() {
        let cell_before = before.board()[sq];
        let cell_after = after.board()[sq];
        if cell_before == cell_after {
            continue;
        }
        match (cell_before.is_empty(), cell_after.is_empty()) {
            (false, true) => vacated.push(sq),
            (true, false) => filled.push(sq),
            _ => changed.push(sq),
        }
    }

    let ambiguous = Ambiguous {
        vacated: vacated.len(),
        filled: filled.len(),
        changed: changed.len(),
    };

    let diff = match (vacated.as_slice(), filled.as_slice(), changed.as_slice()) {
        (&[src], &[dst], &[]) | (&[src], &[], &[dst]) => {
            let pt_src = before.board()[src].piece();
            let pt_dst = after.board()[dst].piece();
            let is_promotion = match (pt_src, pt_dst) {
                (Some(pt_src), Some(pt_dst)) => pt_src.is_raw() && pt_dst.is_promoted(),
                _ => false,
            };
            Diff {
                src: DiffSrc::Board(src),
                dst,
                is_promotion,
            }
        }
        (&[], &[dst], &[]) => {
            let cell = after.board()[dst];
            match (cell.side(), cell.piece()) {
                (Some(side), Some(pt)) => Diff {
                    src: DiffSrc::Stand(side, pt.to_raw()),
                    dst,
                    is_promotion: false,
                },
                _ => unreachable!(),
            }
        }
        _ => {
            debug!("{}", ambiguous);
            return Err(ambiguous);
        }
    };

    Ok(diff)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::history::History;

    fn pos(sfen: &str) -> Position {
        Position::from_sfen(sfen).unwrap()
    }

    fn sq(file: i32, rank: i32) -> Sq {
        Sq::from_file_rank(file, rank)
    }

    #[test]
    fn no_change_is_ambiguous() {
        let p = Position::hirate();
        assert_eq!(
            infer(&p, &p),
            Err(Ambiguous {
                vacated: 0,
                filled: 0,
                changed: 0
            })
        );
    }

    #[test]
    fn no_change_random() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let p = Position::random(&mut rng);
            assert!(infer(&p, &p).is_err());
        }
    }

    #[test]
    fn hirate_first_move() {
        let history = History::build(Position::hirate(), &["7g7f", "3c3d"])
            .into_result()
            .unwrap();
        assert_eq!(history.len(), 3);

        let diff = infer(history.get(0).unwrap(), history.get(1).unwrap()).unwrap();
        let mv = Move::from_sfen("7g7f").unwrap();
        assert_eq!(diff.to_move(), Some(mv.clone()));
        assert_eq!(diff.highlight(), highlight::from_move(&mv, Side::Sente));

        let diff = infer(history.get(1).unwrap(), history.get(2).unwrap()).unwrap();
        assert_eq!(diff.src(), DiffSrc::Board(sq(3, 3)));
        assert_eq!(diff.dst(), sq(3, 4));
    }

    #[test]
    fn capture_with_promotion() {
        let before = pos("lnsgkgsnl/1r5b1/pppppp1pp/6p2/9/2P6/PP1PPPPPP/1B5R1/LNSGKGSNL b - 1");
        let mv = Move::from_sfen("8h2b+").unwrap();
        let after = before.apply(&mv).unwrap();

        let diff = infer(&before, &after).unwrap();
        assert_eq!(diff.to_move(), Some(mv));
        assert!(diff.is_promotion());
        assert_eq!(diff.dropped(), None);
    }

    #[test]
    fn promotion_without_capture() {
        let before = pos("4k4/9/9/2P6/9/9/9/9/4K4 b - 1");
        let mv = Move::from_sfen("7d7c+").unwrap();
        let after = before.apply(&mv).unwrap();
        assert_eq!(infer(&before, &after).unwrap().to_move(), Some(mv));
    }

    #[test]
    fn drop() {
        let before = pos("4k4/9/9/9/9/9/9/9/4K4 w b 1");
        let mv = Move::from_sfen("B*4e").unwrap();
        let after = before.apply(&mv).unwrap();

        let diff = infer(&before, &after).unwrap();
        assert_eq!(diff.src(), DiffSrc::Stand(Side::Gote, Piece::Bishop));
        assert_eq!(diff.dropped(), Some(Piece::Bishop));
        assert_eq!(diff.to_move(), Some(mv));
        assert_eq!(diff.highlight().src().file_rank(), (11, 4));
        assert_eq!(diff.highlight().dst(), sq(4, 5));
    }

    #[test]
    fn king_appearing_has_no_move() {
        let before = pos("9/9/9/9/9/9/9/9/4K4 b - 1");
        let after = pos("4k4/9/9/9/9/9/9/9/4K4 w - 1");

        let diff = infer(&before, &after).unwrap();
        assert_eq!(diff.src(), DiffSrc::Stand(Side::Gote, Piece::King));
        assert_eq!(diff.dst(), sq(5, 1));
        assert_eq!(diff.to_move(), None);
        assert_eq!(diff.highlight().src().file_rank(), (11, 2));
    }

    #[test]
    fn three_squares_is_ambiguous() {
        // 7g が空き、7f に駒、3c の歩が金に変化
        let before = pos("lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1");
        let after = pos("lnsgkgsnl/1r5b1/pppppgppp/9/9/2P6/PP1PPPPPP/1B5R1/LNSGKGSNL b - 1");
        assert_eq!(
            infer(&before, &after),
            Err(Ambiguous {
                vacated: 1,
                filled: 1,
                changed: 1
            })
        );
    }

    #[test]
    fn two_plies_apart_is_ambiguous() {
        let history = History::build(Position::hirate(), &["7g7f", "3c3d"])
            .into_result()
            .unwrap();
        let err = infer(history.get(0).unwrap(), history.get(2).unwrap()).unwrap_err();
        assert_eq!((err.vacated, err.filled, err.changed), (2, 2, 0));
    }
}
