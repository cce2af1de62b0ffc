//!===================================================================
//! 局面再生・差分推定エンジン
//!
//! 開始局面と指し手リストから全ての途中局面を再構成し、前後に移動できるようにする。
//! 指し手表記が得られない場合は、2 局面の比較から直前の指し手を推定する。
//!
//! 盤面は 9*9 = 81 マスの平坦な配列。
//! マスは (筋, 段) で表し、配列添字は (筋-1)*9 + (段-1) となる。
//! 筋 1 は右端、段 1 (USI の 'a') は上端(後手側)。
//!
//! 盤上の駒の移動に関する合法性(王手放置、二歩など)はここでは扱わない。
//!===================================================================

#[macro_use]
mod util;

pub mod cursor;
pub mod diff;
pub mod highlight;
pub mod history;
pub mod position;
pub mod prelude;
pub mod pretty;
pub mod replay;
pub mod sfen;

//--------------------------------------------------------------------
// エラー
//--------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed position: {0}")]
    MalformedPosition(String),

    #[error("malformed move token: {0}")]
    MalformedMoveToken(String),

    #[error("illegal application: {1}: {0:?}")]
    IllegalApplication(Move, String),
}

impl Error {
    pub fn malformed_position(msg: impl Into<String>) -> Self {
        Self::MalformedPosition(msg.into())
    }

    pub fn malformed_move_token(msg: impl Into<String>) -> Self {
        Self::MalformedMoveToken(msg.into())
    }

    pub fn illegal_application(mv: &Move, msg: impl Into<String>) -> Self {
        Self::IllegalApplication(mv.clone(), msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

//--------------------------------------------------------------------
// 手番
//--------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Side {
    Sente,
    Gote,
}

impl Side {
    pub fn is_sente(&self) -> bool {
        matches!(self, Self::Sente)
    }

    pub fn is_gote(&self) -> bool {
        matches!(self, Self::Gote)
    }

    /// [Sente, Gote] のイテレータを返す。
    pub fn iter() -> impl Iterator<Item = Self> {
        [Self::Sente, Self::Gote].iter().copied()
    }

    pub fn inv(&self) -> Self {
        match self {
            Self::Sente => Self::Gote,
            Self::Gote => Self::Sente,
        }
    }

    pub fn toggle(&mut self) {
        *self = self.inv();
    }
}

/// 長さ 2 の配列の添字として使えると便利なので
impl<T> std::ops::Index<Side> for [T] {
    type Output = T;

    fn index(&self, side: Side) -> &Self::Output {
        debug_assert_eq!(self.len(), 2);
        &self[side as usize]
    }
}

impl<T> std::ops::IndexMut<Side> for [T] {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        debug_assert_eq!(self.len(), 2);
        &mut self[side as usize]
    }
}

//--------------------------------------------------------------------
// マス
//--------------------------------------------------------------------

/// 盤上のマス。値は (筋-1)*9 + (段-1) で、常に 0..81 に収まる。
/// 駒台の擬似マスは highlight::StandSq で別に表す。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Sq(u8);

impl Sq {
    /// 筋 file, 段 rank のマスを返す。
    /// いずれかが 1..=9 の範囲外なら None を返す。
    pub fn new(file: i32, rank: i32) -> Option<Self> {
        if Self::is_valid_coord(file) && Self::is_valid_coord(rank) {
            Some(Self(((file - 1) * 9 + (rank - 1)) as u8))
        } else {
            None
        }
    }

    /// 範囲チェック済みの座標から作る。定数やテスト用。
    ///
    /// ```
    /// # use shogi_replay::prelude::*;
    /// assert_eq!(Sq::from_file_rank(7, 7).index(), 6 * 9 + 6);
    /// ```
    pub const fn from_file_rank(file: i32, rank: i32) -> Self {
        assert!(1 <= file && file <= 9 && 1 <= rank && rank <= 9);
        Self(((file - 1) * 9 + (rank - 1)) as u8)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        if index < 81 {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    pub fn index(&self) -> usize {
        usize::from(self.0)
    }

    pub fn file(&self) -> i32 {
        i32::from(self.0 / 9) + 1
    }

    pub fn rank(&self) -> i32 {
        i32::from(self.0 % 9) + 1
    }

    fn is_valid_coord(v: i32) -> bool {
        (1..=9).contains(&v)
    }

    /// 全マスを添字の昇順で返す。
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..81).map(Self)
    }
}

//--------------------------------------------------------------------
// 駒
//--------------------------------------------------------------------

/// Pawn..Gold の並びは Hand の添字と一致させている。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Piece {
    Pawn,
    Lance,
    Knight,
    Silver,
    Bishop,
    Rook,
    Gold,
    King,
    ProPawn,
    ProLance,
    ProKnight,
    ProSilver,
    Horse,
    Dragon,
}

impl Piece {
    /// 持駒となりうるかどうかを返す。
    pub fn is_hand(&self) -> bool {
        matches!(
            self,
            Self::Pawn
                | Self::Lance
                | Self::Knight
                | Self::Silver
                | Self::Bishop
                | Self::Rook
                | Self::Gold
        )
    }

    /// ナマ駒かどうかを返す。
    pub fn is_raw(&self) -> bool {
        !self.is_promoted()
    }

    /// 成駒かどうかを返す。
    pub fn is_promoted(&self) -> bool {
        matches!(
            self,
            Self::ProPawn
                | Self::ProLance
                | Self::ProKnight
                | Self::ProSilver
                | Self::Horse
                | Self::Dragon
        )
    }

    pub fn can_promote(&self) -> bool {
        matches!(
            self,
            Self::Pawn | Self::Lance | Self::Knight | Self::Silver | Self::Bishop | Self::Rook
        )
    }

    /// self が成駒なら対応するナマ駒に変換する。
    /// self がナマ駒なら同じ値を返す。
    pub fn to_raw(&self) -> Self {
        match self {
            Self::ProPawn => Self::Pawn,
            Self::ProLance => Self::Lance,
            Self::ProKnight => Self::Knight,
            Self::ProSilver => Self::Silver,
            Self::Horse => Self::Bishop,
            Self::Dragon => Self::Rook,
            pt => *pt,
        }
    }

    /// self がナマ駒なら対応する成駒に変換する。
    /// self が成駒なら同じ値を返す。
    /// self が成れない駒(金、玉)の場合、None を返す。
    pub fn to_promoted(&self) -> Option<Self> {
        match self {
            Self::Pawn => Some(Self::ProPawn),
            Self::Lance => Some(Self::ProLance),
            Self::Knight => Some(Self::ProKnight),
            Self::Silver => Some(Self::ProSilver),
            Self::Bishop => Some(Self::Horse),
            Self::Rook => Some(Self::Dragon),
            Self::Gold | Self::King => None,
            pt => Some(*pt),
        }
    }

    /// 持駒となりうる駒たちを昇順で返す。
    pub fn iter_hand() -> impl Iterator<Item = Self> {
        [
            Self::Pawn,
            Self::Lance,
            Self::Knight,
            Self::Silver,
            Self::Bishop,
            Self::Rook,
            Self::Gold,
        ]
        .iter()
        .copied()
    }
}

//--------------------------------------------------------------------
// 指し手
//--------------------------------------------------------------------

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MoveNondrop {
    src: Sq,
    dst: Sq,
    is_promotion: bool,
}

impl MoveNondrop {
    pub fn new(src: Sq, dst: Sq, is_promotion: bool) -> Self {
        assert_ne!(src, dst);

        Self {
            src,
            dst,
            is_promotion,
        }
    }

    pub fn src(&self) -> Sq {
        self.src
    }

    pub fn dst(&self) -> Sq {
        self.dst
    }

    pub fn is_promotion(&self) -> bool {
        self.is_promotion
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MoveDrop {
    pt: Piece,
    dst: Sq,
}

impl MoveDrop {
    pub fn new(pt: Piece, dst: Sq) -> Self {
        assert!(pt.is_hand());

        Self { pt, dst }
    }

    pub fn pt(&self) -> Piece {
        self.pt
    }

    pub fn dst(&self) -> Sq {
        self.dst
    }
}

/// 指し手。盤上の駒の移動か、持駒を打つかのいずれか。
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Move {
    Nondrop(MoveNondrop),
    Drop(MoveDrop),
}

impl Move {
    pub fn nondrop(src: Sq, dst: Sq, is_promotion: bool) -> Self {
        Self::Nondrop(MoveNondrop::new(src, dst, is_promotion))
    }

    pub fn drop(pt: Piece, dst: Sq) -> Self {
        Self::Drop(MoveDrop::new(pt, dst))
    }

    pub fn from_sfen(sfen: impl AsRef<str>) -> Result<Self> {
        sfen::sfen_to_move(sfen)
    }

    pub fn is_nondrop(&self) -> bool {
        matches!(self, Self::Nondrop(_))
    }

    pub fn is_drop(&self) -> bool {
        matches!(self, Self::Drop(_))
    }

    /// 移動元を返す。駒打ちなら None。
    pub fn src(&self) -> Option<Sq> {
        match self {
            Self::Nondrop(nondrop) => Some(nondrop.src()),
            Self::Drop(_) => None,
        }
    }

    pub fn dst(&self) -> Sq {
        match self {
            Self::Nondrop(nondrop) => nondrop.dst(),
            Self::Drop(drop) => drop.dst(),
        }
    }

    pub fn is_promotion(&self) -> bool {
        match self {
            Self::Nondrop(nondrop) => nondrop.is_promotion(),
            Self::Drop(_) => false,
        }
    }

    pub fn to_sfen(&self) -> String {
        sfen::move_to_sfen(self).into_owned()
    }
}

//--------------------------------------------------------------------
// 盤面
//--------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BoardCell {
    Empty,
    Sente(Piece),
    Gote(Piece),
}

impl BoardCell {
    pub fn from_side_pt(side: Side, pt: Piece) -> Self {
        match side {
            Side::Sente => Self::Sente(pt),
            Side::Gote => Self::Gote(pt),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_sente(&self) -> bool {
        matches!(self, Self::Sente(_))
    }

    pub fn is_gote(&self) -> bool {
        matches!(self, Self::Gote(_))
    }

    pub fn is_side(&self, side: Side) -> bool {
        match side {
            Side::Sente => self.is_sente(),
            Side::Gote => self.is_gote(),
        }
    }

    pub fn is_piece(&self) -> bool {
        !self.is_empty()
    }

    pub fn side(&self) -> Option<Side> {
        match self {
            Self::Sente(_) => Some(Side::Sente),
            Self::Gote(_) => Some(Side::Gote),
            Self::Empty => None,
        }
    }

    pub fn piece(&self) -> Option<Piece> {
        match self {
            Self::Sente(pt) => Some(*pt),
            Self::Gote(pt) => Some(*pt),
            Self::Empty => None,
        }
    }

    pub fn piece_of(&self, side: Side) -> Option<Piece> {
        match (self, side) {
            (Self::Sente(pt), Side::Sente) => Some(*pt),
            (Self::Gote(pt), Side::Gote) => Some(*pt),
            _ => None,
        }
    }
}

/// 81 マスの盤面。1 マスに置ける駒は高々 1 枚で、これは型で保証される。
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Board {
    cells: [BoardCell; 81],
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cells: [BoardCell::Empty; 81],
        }
    }

    /// マスの添字順に並んだ 81 個のセルから盤面を作る。
    /// 個数が 81 でなければ None を返す。
    pub fn from_cells(cells: impl IntoIterator<Item = BoardCell>) -> Option<Self> {
        let mut it = cells.into_iter();
        let cells = array_init::from_iter(it.by_ref())?;
        if it.next().is_some() {
            return None;
        }
        Some(Self { cells })
    }

    pub fn cells(&self) -> &[BoardCell] {
        &self.cells
    }

    /// side の盤上の駒の枚数を返す。
    pub fn count_side(&self, side: Side) -> usize {
        self.cells.iter().filter(|cell| cell.is_side(side)).count()
    }
}

impl std::ops::Index<Sq> for Board {
    type Output = BoardCell;

    fn index(&self, sq: Sq) -> &Self::Output {
        &self.cells[sq.index()]
    }
}

impl std::ops::IndexMut<Sq> for Board {
    fn index_mut(&mut self, sq: Sq) -> &mut Self::Output {
        &mut self.cells[sq.index()]
    }
}

//--------------------------------------------------------------------
// 持駒
//--------------------------------------------------------------------

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Hand([u8; 7]);

impl Hand {
    pub fn empty() -> Self {
        Self([0; 7])
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&count| count == 0)
    }

    /// 持駒の総数を返す。
    pub fn total(&self) -> usize {
        self.0.iter().map(|&count| usize::from(count)).sum()
    }
}

impl std::ops::Index<Piece> for Hand {
    type Output = u8;

    fn index(&self, pt: Piece) -> &Self::Output {
        assert!(pt.is_hand());
        &self.0[pt as usize]
    }
}

impl std::ops::IndexMut<Piece> for Hand {
    fn index_mut(&mut self, pt: Piece) -> &mut Self::Output {
        assert!(pt.is_hand());
        &mut self.0[pt as usize]
    }
}

/// 先手と後手の持駒を束ねたもの。
/// hands[side][pt] のようにアクセスする。
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Hands([Hand; 2]);

impl Hands {
    pub fn empty() -> Self {
        Self([Hand::empty(), Hand::empty()])
    }

    pub fn new(hand_sente: Hand, hand_gote: Hand) -> Self {
        Self([hand_sente, hand_gote])
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|hand| hand.is_empty())
    }
}

impl std::ops::Index<Side> for Hands {
    type Output = Hand;

    fn index(&self, side: Side) -> &Self::Output {
        &self.0[side]
    }
}

impl std::ops::IndexMut<Side> for Hands {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        &mut self.0[side]
    }
}
