use crate::prelude::*;
use crate::sfen;
use crate::{Error, Result};

//--------------------------------------------------------------------
// 局面
//--------------------------------------------------------------------

/// 盤面、両者の持駒、手番の組。
/// 手数は持たない(SFEN の手数フィールドは読み捨てる)。
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Position {
    side: Side,
    board: Board,
    hands: Hands,
}

impl Position {
    pub fn empty() -> Self {
        Self {
            side: Side::Sente,
            board: Board::empty(),
            hands: Hands::empty(),
        }
    }

    pub fn new(side: Side, board: Board, hands: Hands) -> Self {
        Self { side, board, hands }
    }

    pub fn from_sfen(sfen: impl AsRef<str>) -> Result<Self> {
        sfen::sfen_to_position(sfen)
    }

    /// 平手初期局面を返す。
    pub fn hirate() -> Self {
        const BACK: [Piece; 9] = [
            Piece::Lance,
            Piece::Knight,
            Piece::Silver,
            Piece::Gold,
            Piece::King,
            Piece::Gold,
            Piece::Silver,
            Piece::Knight,
            Piece::Lance,
        ];

        let mut board = Board::empty();
        for sq in Sq::iter() {
            board[sq] = match (sq.file(), sq.rank()) {
                (file, 1) => BoardCell::Gote(BACK[(file - 1) as usize]),
                (8, 2) => BoardCell::Gote(Piece::Rook),
                (2, 2) => BoardCell::Gote(Piece::Bishop),
                (_, 3) => BoardCell::Gote(Piece::Pawn),
                (_, 7) => BoardCell::Sente(Piece::Pawn),
                (8, 8) => BoardCell::Sente(Piece::Bishop),
                (2, 8) => BoardCell::Sente(Piece::Rook),
                (file, 9) => BoardCell::Sente(BACK[(file - 1) as usize]),
                _ => BoardCell::Empty,
            };
        }

        Self::new(Side::Sente, board, Hands::empty())
    }

    /// 平手初期局面かどうかを返す。
    pub fn is_hirate(&self) -> bool {
        *self == Self::hirate()
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn hands(&self) -> &Hands {
        &self.hands
    }

    pub fn hand(&self, side: Side) -> &Hand {
        &self.hands[side]
    }

    /// mv を適用した局面を返す。self は変更しない。
    pub fn apply(&self, mv: &Move) -> Result<Self> {
        let mut pos = self.clone();
        pos.do_move(mv)?;
        Ok(pos)
    }

    /// 手番側の指し手として mv を適用する。
    /// 形式は信用するが、局面との整合性(移動元に自駒がある、打つ駒を持っている、打つ先が空き)
    /// はチェックし、破れていれば IllegalApplication を返す。このとき self は変更されない。
    /// 王手放置や二歩などの合法性は見ない。
    pub fn do_move(&mut self, mv: &Move) -> Result<()> {
        match mv {
            Move::Nondrop(nondrop) => {
                let src = nondrop.src();
                let dst = nondrop.dst();

                chk!(
                    self.board[src].is_piece(),
                    Error::illegal_application(mv, "src is empty")
                );
                let pt_src = self.board[src]
                    .piece_of(self.side)
                    .ok_or_else(|| Error::illegal_application(mv, "src is not my piece"))?;
                chk!(
                    !self.board[dst].is_side(self.side),
                    Error::illegal_application(mv, "dst is my piece")
                );
                let pt_dst = if nondrop.is_promotion() {
                    pt_src
                        .to_promoted()
                        .ok_or_else(|| Error::illegal_application(mv, "cannot promote"))?
                } else {
                    pt_src
                };

                // 取った駒はナマ駒に戻して持駒に加える
                if let Some(pt) = self.board[dst].piece_of(self.side.inv()) {
                    let pt = pt.to_raw();
                    chk!(
                        pt.is_hand(),
                        Error::illegal_application(mv, "cannot capture king")
                    );
                    let count = &mut self.hands[self.side][pt];
                    *count = count
                        .checked_add(1)
                        .ok_or_else(|| Error::illegal_application(mv, "hand overflow"))?;
                }

                self.board[src] = BoardCell::Empty;
                self.board[dst] = BoardCell::from_side_pt(self.side, pt_dst);
            }
            Move::Drop(drop) => {
                let pt = drop.pt();
                let dst = drop.dst();

                chk!(
                    self.hand(self.side)[pt] > 0,
                    Error::illegal_application(mv, "not in hand")
                );
                chk!(
                    self.board[dst].is_empty(),
                    Error::illegal_application(mv, "dst is not empty")
                );

                self.board[dst] = BoardCell::from_side_pt(self.side, pt);
                self.hands[self.side][pt] -= 1;
            }
        }

        self.side.toggle();

        Ok(())
    }

    pub fn to_sfen(&self) -> String {
        sfen::position_to_sfen(self).into_owned()
    }

    /// 盤上と持駒にランダムに駒を配置した局面を作る。合法性は考えない。
    #[cfg(test)]
    pub(crate) fn random(rng: &mut impl rand::Rng) -> Self {
        const PIECES: &[Piece] = &[
            Piece::Pawn,
            Piece::Lance,
            Piece::Knight,
            Piece::Silver,
            Piece::Bishop,
            Piece::Rook,
            Piece::Gold,
            Piece::King,
            Piece::ProPawn,
            Piece::ProLance,
            Piece::ProKnight,
            Piece::ProSilver,
            Piece::Horse,
            Piece::Dragon,
        ];
        let side_of = |sente: bool| if sente { Side::Sente } else { Side::Gote };

        let mut board = Board::empty();
        for sq in Sq::iter() {
            if rng.gen_bool(0.4) {
                let pt = PIECES[rng.gen_range(0, PIECES.len())];
                board[sq] = BoardCell::from_side_pt(side_of(rng.gen()), pt);
            }
        }
        let mut hands = Hands::empty();
        for side in Side::iter() {
            for pt in Piece::iter_hand() {
                hands[side][pt] = rng.gen_range(0, 19);
            }
        }

        Self::new(side_of(rng.gen()), board, hands)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn sq(file: i32, rank: i32) -> Sq {
        Sq::from_file_rank(file, rank)
    }

    fn mv(s: &str) -> Move {
        Move::from_sfen(s).unwrap()
    }

    /// side の盤上の駒数 + 持駒数
    fn material(pos: &Position, side: Side) -> usize {
        pos.board().count_side(side) + pos.hand(side).total()
    }

    #[test]
    fn hirate() {
        assert_eq!(Position::hirate().to_sfen(), sfen::SFEN_HIRATE);
        assert!(Position::from_sfen("startpos").unwrap().is_hirate());
    }

    #[test]
    fn nondrop() {
        let pos = Position::hirate();
        let pos = pos.apply(&mv("7g7f")).unwrap();
        assert_eq!(pos.side(), Side::Gote);
        assert!(pos.board()[sq(7, 7)].is_empty());
        assert_eq!(pos.board()[sq(7, 6)], BoardCell::Sente(Piece::Pawn));

        // 角交換
        let pos = pos.apply(&mv("3c3d")).unwrap();
        let pos = pos.apply(&mv("8h2b+")).unwrap();
        assert_eq!(pos.board()[sq(2, 2)], BoardCell::Sente(Piece::Horse));
        assert_eq!(pos.hand(Side::Sente)[Piece::Bishop], 1);
        let pos = pos.apply(&mv("3a2b")).unwrap();
        // 成駒は取られるとナマ駒になる
        assert_eq!(pos.hand(Side::Gote)[Piece::Bishop], 1);
        assert_eq!(pos.board()[sq(2, 2)], BoardCell::Gote(Piece::Silver));
        assert_eq!(
            pos.to_sfen(),
            "lnsgkg1nl/1r5s1/pppppp1pp/6p2/9/2P6/PP1PPPPPP/7R1/LNSGKGSNL b Bb 1"
        );
    }

    #[test]
    fn drop() {
        let pos = Position::from_sfen("4k4/9/9/9/9/9/9/9/4K4 b 2P 1").unwrap();
        let after = pos.apply(&mv("P*5e")).unwrap();
        assert_eq!(after.hand(Side::Sente)[Piece::Pawn], 1);
        assert_eq!(after.board()[sq(5, 5)], BoardCell::Sente(Piece::Pawn));
        assert_eq!(after.side(), Side::Gote);
        assert_eq!(material(&pos, Side::Sente), material(&after, Side::Sente));
    }

    #[test]
    fn drop_without_hand() {
        let pos = Position::hirate();
        let err = pos.apply(&mv("P*5e")).unwrap_err();
        assert!(matches!(err, Error::IllegalApplication(_, _)));
    }

    #[test]
    fn drop_onto_piece() {
        let pos = Position::from_sfen("4k4/9/9/9/9/9/9/9/4K4 b P 1").unwrap();
        let err = pos.apply(&mv("P*5i")).unwrap_err();
        assert!(matches!(err, Error::IllegalApplication(_, _)));
    }

    #[test]
    fn promote_gold() {
        let pos = Position::hirate();
        let err = pos.apply(&mv("6i5h+")).unwrap_err();
        assert!(matches!(err, Error::IllegalApplication(_, _)));
        let err = pos.apply(&mv("5i5h+")).unwrap_err();
        assert!(matches!(err, Error::IllegalApplication(_, _)));
    }

    #[test]
    fn invalid_src() {
        let pos = Position::hirate();
        // 空きマス
        assert!(pos.apply(&mv("5e5d")).is_err());
        // 相手の駒
        assert!(pos.apply(&mv("3c3d")).is_err());
        // 自駒の上
        assert!(pos.apply(&mv("5i4i")).is_err());
        // 失敗しても元の局面は変わらない
        let mut pos2 = pos.clone();
        assert!(pos2.do_move(&mv("6i5h+")).is_err());
        assert_eq!(pos2, pos);
    }

    #[test]
    fn king_capture_rejected() {
        let pos = Position::from_sfen("9/9/9/9/4k4/4R4/9/9/4K4 b - 1").unwrap();
        let err = pos.apply(&mv("5f5e")).unwrap_err();
        assert!(matches!(err, Error::IllegalApplication(_, _)));
    }

    /// 駒を取る指し手では、取られた側の駒が 1 枚だけ取った側に移る。
    #[test]
    fn capture_conservation_random() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut n_checked = 0;
        while n_checked < 300 {
            let pos = Position::random(&mut rng);
            let me = pos.side();
            'search: for src in Sq::iter() {
                for dst in Sq::iter() {
                    if src == dst
                        || !pos.board()[src].is_side(me)
                        || !pos.board()[dst].is_side(me.inv())
                        || pos.board()[dst].piece() == Some(Piece::King)
                    {
                        continue;
                    }
                    let captured = pos.board()[dst].piece().unwrap().to_raw();
                    let after = pos.apply(&Move::nondrop(src, dst, false)).unwrap();
                    assert_eq!(material(&after, me), material(&pos, me) + 1);
                    assert_eq!(material(&after, me.inv()) + 1, material(&pos, me.inv()));
                    assert_eq!(after.hand(me)[captured], pos.hand(me)[captured] + 1);
                    n_checked += 1;
                    break 'search;
                }
            }
        }
    }

    #[test]
    fn drop_invariant_random() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let pos = Position::random(&mut rng);
            let me = pos.side();
            for pt in Piece::iter_hand() {
                let dst = match Sq::iter().find(|&sq| pos.board()[sq].is_empty()) {
                    Some(dst) => dst,
                    None => continue,
                };
                let res = pos.apply(&Move::drop(pt, dst));
                if pos.hand(me)[pt] == 0 {
                    assert!(res.is_err());
                    continue;
                }
                let after = res.unwrap();
                assert_eq!(after.hand(me)[pt] + 1, pos.hand(me)[pt]);
                assert_eq!(after.board()[dst], BoardCell::from_side_pt(me, pt));
            }
        }
    }
}
