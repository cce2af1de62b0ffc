//!===================================================================
//! SFEN
//!
//! 局面文字列 (盤面 手番 持駒 手数) と USI 形式の指し手文字列を扱う。
//! 局面文字列の前には "position", "sfen" を置いてもよく、"startpos" は平手初期局面を表す。
//! 手数は読み捨て、出力時は常に 1 とする。
//!===================================================================

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::SplitAsciiWhitespace;

use itertools::{iproduct, Itertools};

use crate::prelude::*;
use crate::{Error, Result};

pub const SFEN_HIRATE: &str = "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1";

type Tokens<'a> = Peekable<SplitAsciiWhitespace<'a>>;

/// USI の position コマンドの引数をパースし、(開始局面, 指し手トークンたち) を返す。
/// 指し手トークンはパースせずにそのまま返す(History::build に渡す想定)。
///
/// ```
/// # use shogi_replay::sfen;
/// let (pos, tokens) = sfen::sfen_to_kifu("startpos moves 7g7f 3c3d").unwrap();
/// assert_eq!(pos.to_sfen(), sfen::SFEN_HIRATE);
/// assert_eq!(tokens, ["7g7f", "3c3d"]);
/// ```
pub fn sfen_to_kifu(sfen: impl AsRef<str>) -> Result<(Position, Vec<String>)> {
    let sfen = sfen.as_ref();

    let mut it = sfen.split_ascii_whitespace().peekable();
    let pos = take_position(&mut it)?;

    let tokens = match it.next() {
        Some("moves") => it.map(str::to_owned).collect(),
        Some(s) => {
            return Err(Error::malformed_position(format!(
                "\"moves\" expected: {:?}",
                s
            )))
        }
        None => Vec::new(),
    };

    Ok((pos, tokens))
}

pub fn sfen_to_position(sfen: impl AsRef<str>) -> Result<Position> {
    let sfen = sfen.as_ref();

    let mut it = sfen.split_ascii_whitespace().peekable();
    let pos = take_position(&mut it)?;
    if let Some(s) = it.next() {
        return Err(Error::malformed_position(format!(
            "redundant trailing field: {:?}",
            s
        )));
    }

    Ok(pos)
}

fn take_position(it: &mut Tokens) -> Result<Position> {
    if it.peek() == Some(&"position") {
        it.next();
    }

    let first = *it
        .peek()
        .ok_or_else(|| Error::malformed_position("empty"))?;
    match first {
        "startpos" => {
            it.next();
            return sfen_to_position(SFEN_HIRATE);
        }
        "sfen" => {
            it.next();
        }
        _ => {}
    }

    let mut next = || it.next().ok_or_else(|| Error::malformed_position("incomplete"));
    let sfen_board = next()?;
    let sfen_side = next()?;
    let sfen_hands = next()?;

    let board = sfen_to_board(sfen_board)?;
    let side = sfen_to_side(sfen_side)?;
    let hands = sfen_to_hands(sfen_hands)?;

    // 手数は読み捨てる
    if matches!(it.peek(), Some(s) if *s != "moves") {
        it.next();
    }

    Ok(Position::new(side, board, hands))
}

pub fn sfen_to_board(sfen: impl AsRef<str>) -> Result<Board> {
    let sfen = sfen.as_ref();

    let sfen_rows: Vec<_> = sfen.split('/').collect();
    chk!(
        sfen_rows.len() == 9,
        Error::malformed_position("board: row_count != 9")
    );

    // rows[段-1][9-筋]
    let rows = sfen_rows
        .into_iter()
        .map(sfen_to_board_row)
        .collect::<Result<Vec<_>>>()?;

    let cells = Sq::iter().map(|sq| rows[(sq.rank() - 1) as usize][(9 - sq.file()) as usize]);
    Board::from_cells(cells).ok_or_else(|| Error::malformed_position("board: cell count != 81"))
}

fn sfen_to_board_row(sfen: impl AsRef<str>) -> Result<Vec<BoardCell>> {
    let sfen = sfen.as_ref();

    struct State {
        row: Vec<BoardCell>,
        is_promote: bool,
    }
    impl State {
        fn new() -> Self {
            Self {
                row: Vec::with_capacity(9),
                is_promote: false,
            }
        }
        fn eat(&mut self, c: char) -> Result<()> {
            match c {
                '+' => {
                    self.ensure_size_ok(1)?;
                    self.ensure_not_promote()?;
                    self.is_promote = true;
                }
                c if c.is_ascii_digit() => {
                    self.ensure_not_promote()?;
                    let n = usize::from(c as u8 - b'0');
                    self.ensure_size_ok(n)?;
                    self.row.extend(itertools::repeat_n(BoardCell::Empty, n));
                }
                c => {
                    self.ensure_size_ok(1)?;
                    let (side, mut pt) = char_to_side_piece(c).ok_or_else(|| {
                        Error::malformed_position(format!("board_row: invalid char {:?}", c))
                    })?;
                    if self.is_promote {
                        pt = pt.to_promoted().ok_or_else(|| {
                            Error::malformed_position("board_row: cannot promote")
                        })?;
                        self.is_promote = false;
                    }
                    self.row.push(BoardCell::from_side_pt(side, pt));
                }
            }
            Ok(())
        }
        fn ensure_size_ok(&self, n_add: usize) -> Result<()> {
            chk!(
                self.row.len() + n_add <= 9,
                Error::malformed_position("board_row: too long row")
            );
            Ok(())
        }
        fn ensure_not_promote(&self) -> Result<()> {
            chk!(
                !self.is_promote,
                Error::malformed_position("board_row: invalid '+'")
            );
            Ok(())
        }
    }

    let mut state = State::new();
    for c in sfen.chars() {
        state.eat(c)?;
    }
    chk!(
        !state.is_promote,
        Error::malformed_position("board_row: dangling '+'")
    );
    chk!(
        state.row.len() == 9,
        Error::malformed_position("board_row: incomplete row")
    );

    Ok(state.row)
}

pub fn sfen_to_side(sfen: impl AsRef<str>) -> Result<Side> {
    let sfen = sfen.as_ref();

    match sfen {
        "b" => Ok(Side::Sente),
        "w" => Ok(Side::Gote),
        _ => Err(Error::malformed_position(format!(
            "side: invalid side {:?}",
            sfen
        ))),
    }
}

/// 枚数上限チェックは行っていない。
pub fn sfen_to_hands(sfen: impl AsRef<str>) -> Result<Hands> {
    let sfen = sfen.as_ref();

    if sfen == "-" {
        return Ok(Hands::empty());
    }

    struct State {
        hands: Hands,
        count: Option<u8>,
    }
    impl State {
        fn new() -> Self {
            Self {
                hands: Hands::empty(),
                count: None,
            }
        }
        fn eat(&mut self, c: char) -> Result<()> {
            match c {
                c if c.is_ascii_digit() => {
                    let digit = c as u8 - b'0';
                    let count = self
                        .count
                        .unwrap_or(0)
                        .checked_mul(10)
                        .and_then(|n| n.checked_add(digit))
                        .ok_or_else(|| Error::malformed_position("hands: count overflow"))?;
                    self.count = Some(count);
                }
                c => {
                    let (side, pt) = char_to_side_piece(c).ok_or_else(|| {
                        Error::malformed_position(format!("hands: invalid char {:?}", c))
                    })?;
                    chk!(
                        pt.is_hand(),
                        Error::malformed_position("hands: not hand piece")
                    );
                    let count = self.count.take().unwrap_or(1);
                    chk!(count > 0, Error::malformed_position("hands: zero count"));
                    let slot = &mut self.hands[side][pt];
                    *slot = slot
                        .checked_add(count)
                        .ok_or_else(|| Error::malformed_position("hands: count overflow"))?;
                }
            }
            Ok(())
        }
    }

    let mut state = State::new();
    for c in sfen.chars() {
        state.eat(c)?;
    }
    chk!(
        state.count.is_none(),
        Error::malformed_position("hands: redundant trailing count")
    );

    Ok(state.hands)
}

/// USI 形式の指し手文字列をパースする。形式のチェックのみ行い、局面との整合性は見ない。
///
/// ```
/// # use shogi_replay::prelude::*;
/// # use shogi_replay::sfen;
/// let mv = sfen::sfen_to_move("8h2b+").unwrap();
/// assert_eq!(mv, Move::nondrop(Sq::from_file_rank(8, 8), Sq::from_file_rank(2, 2), true));
/// let mv = sfen::sfen_to_move("P*5e").unwrap();
/// assert_eq!(mv, Move::drop(Piece::Pawn, Sq::from_file_rank(5, 5)));
/// assert!(sfen::sfen_to_move("0a1b").is_err());
/// ```
pub fn sfen_to_move(sfen: impl AsRef<str>) -> Result<Move> {
    let sfen = sfen.as_ref().trim();
    let cs: Vec<_> = sfen.chars().collect();
    chk!(
        (4..=5).contains(&cs.len()),
        Error::malformed_move_token(format!("invalid length: {:?}", sfen))
    );
    if cs.len() == 5 {
        chk!(
            cs[4] == '+',
            Error::malformed_move_token(format!("expected '+': {:?}", sfen))
        );
    }

    if cs[1] == '*' {
        chk!(
            cs.len() == 4,
            Error::malformed_move_token(format!("drop cannot promote: {:?}", sfen))
        );
        let pt = match char_to_side_piece(cs[0]) {
            Some((Side::Sente, pt)) if pt.is_hand() => pt,
            _ => {
                return Err(Error::malformed_move_token(format!(
                    "invalid piece: {:?}",
                    sfen
                )))
            }
        };
        let dst = chars_to_sq(cs[2], cs[3])?;
        Ok(Move::drop(pt, dst))
    } else {
        let src = chars_to_sq(cs[0], cs[1])?;
        let dst = chars_to_sq(cs[2], cs[3])?;
        chk!(
            src != dst,
            Error::malformed_move_token(format!("src == dst: {:?}", sfen))
        );
        let is_promote = cs.len() == 5;
        Ok(Move::nondrop(src, dst, is_promote))
    }
}

/// 大文字なら先手、小文字なら後手の駒とみなす。
fn char_to_side_piece(c: char) -> Option<(Side, Piece)> {
    let pt = match c.to_ascii_uppercase() {
        'P' => Piece::Pawn,
        'L' => Piece::Lance,
        'N' => Piece::Knight,
        'S' => Piece::Silver,
        'B' => Piece::Bishop,
        'R' => Piece::Rook,
        'G' => Piece::Gold,
        'K' => Piece::King,
        _ => return None,
    };
    let side = if c.is_ascii_uppercase() {
        Side::Sente
    } else {
        Side::Gote
    };
    Some((side, pt))
}

fn chars_to_sq(cx: char, cy: char) -> Result<Sq> {
    chk!(
        ('1'..='9').contains(&cx),
        Error::malformed_move_token(format!("invalid file: {:?}", cx))
    );
    chk!(
        ('a'..='i').contains(&cy),
        Error::malformed_move_token(format!("invalid rank: {:?}", cy))
    );
    let file = cx as u8 - b'0';
    let rank = cy as u8 - b'a' + 1;
    Ok(Sq::from_file_rank(file.into(), rank.into()))
}

pub fn kifu_to_sfen(pos: &Position, mvs: &[Move]) -> Cow<'static, str> {
    let sfen_pos = position_to_sfen(pos);

    if mvs.is_empty() {
        sfen_pos
    } else {
        [sfen_pos, moves_to_sfen(mvs)].join(" ").into()
    }
}

pub fn position_to_sfen(pos: &Position) -> Cow<'static, str> {
    let sfen_board = board_to_sfen(pos.board());
    let sfen_side = side_to_sfen(pos.side());
    let sfen_hands = hands_to_sfen(pos.hands());

    [sfen_board, sfen_side, sfen_hands, "1".into()]
        .join(" ")
        .into()
}

pub fn board_to_sfen(board: &Board) -> Cow<'static, str> {
    (1..=9)
        .map(|rank| {
            let row = (1..=9)
                .rev()
                .map(|file| board[Sq::from_file_rank(file, rank)]);
            board_row_to_sfen(row)
        })
        .join("/")
        .into()
}

fn board_row_to_sfen(row: impl IntoIterator<Item = BoardCell>) -> Cow<'static, str> {
    struct State {
        sfen: String,
        n_empty: i32,
    }
    impl State {
        fn new() -> Self {
            Self {
                sfen: String::new(),
                n_empty: 0,
            }
        }
        fn eat(&mut self, cell: BoardCell) {
            match cell {
                BoardCell::Empty => {
                    self.n_empty += 1;
                }
                BoardCell::Sente(pt) => {
                    self.flush_emptys();
                    self.sfen.push_str(&piece_to_sfen(pt));
                }
                BoardCell::Gote(pt) => {
                    self.flush_emptys();
                    self.sfen.push_str(&piece_to_sfen(pt).to_ascii_lowercase());
                }
            }
        }
        fn flush_emptys(&mut self) {
            if self.n_empty > 0 {
                self.sfen.push_str(&self.n_empty.to_string());
                self.n_empty = 0;
            }
        }
    }

    let mut state = State::new();
    for cell in row {
        state.eat(cell);
    }
    state.flush_emptys();

    state.sfen.into()
}

pub fn side_to_sfen(side: Side) -> Cow<'static, str> {
    match side {
        Side::Sente => "b".into(),
        Side::Gote => "w".into(),
    }
}

/// R, B, G, S, N, L, P, r, b, g, s, n, l, p の順で出力する。
pub fn hands_to_sfen(hands: &Hands) -> Cow<'static, str> {
    const PIECES: &[Piece] = &[
        Piece::Rook,
        Piece::Bishop,
        Piece::Gold,
        Piece::Silver,
        Piece::Knight,
        Piece::Lance,
        Piece::Pawn,
    ];

    if hands.is_empty() {
        return "-".into();
    }

    let mut sfen = String::new();
    for (side, pt) in iproduct!(&[Side::Sente, Side::Gote], PIECES) {
        let n = hands[*side][*pt];
        if n == 0 {
            continue;
        }
        if n >= 2 {
            sfen.push_str(&n.to_string());
        }
        match side {
            Side::Sente => sfen.push_str(&piece_to_sfen(*pt)),
            Side::Gote => sfen.push_str(&piece_to_sfen(*pt).to_ascii_lowercase()),
        }
    }

    sfen.into()
}

pub fn moves_to_sfen(mvs: &[Move]) -> Cow<'static, str> {
    [
        "moves".into(),
        mvs.iter().map(|mv| move_to_sfen(mv)).join(" "),
    ]
    .join(" ")
    .into()
}

pub fn move_to_sfen(mv: &Move) -> Cow<'static, str> {
    match mv {
        Move::Nondrop(nondrop) => format!(
            "{}{}{}",
            sq_to_sfen(nondrop.src()),
            sq_to_sfen(nondrop.dst()),
            if nondrop.is_promotion() { "+" } else { "" }
        )
        .into(),
        Move::Drop(drop) => {
            format!("{}*{}", piece_to_sfen(drop.pt()), sq_to_sfen(drop.dst())).into()
        }
    }
}

fn piece_to_sfen(pt: Piece) -> Cow<'static, str> {
    match pt {
        Piece::Pawn => "P".into(),
        Piece::Lance => "L".into(),
        Piece::Knight => "N".into(),
        Piece::Silver => "S".into(),
        Piece::Bishop => "B".into(),
        Piece::Rook => "R".into(),
        Piece::Gold => "G".into(),
        Piece::King => "K".into(),
        Piece::ProPawn => "+P".into(),
        Piece::ProLance => "+L".into(),
        Piece::ProKnight => "+N".into(),
        Piece::ProSilver => "+S".into(),
        Piece::Horse => "+B".into(),
        Piece::Dragon => "+R".into(),
    }
}

fn sq_to_sfen(sq: Sq) -> Cow<'static, str> {
    let cx = char::from(sq.file() as u8 + b'0');
    let cy = char::from(sq.rank() as u8 - 1 + b'a');
    format!("{}{}", cx, cy).into()
}
