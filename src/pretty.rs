use std::borrow::Cow;

use itertools::Itertools;

use crate::highlight::{Highlight, HighlightSrc};
use crate::prelude::*;

/// 人間向けの表示。
pub trait Pretty {
    fn pretty(&self) -> Cow<'static, str>;
}

impl Pretty for Side {
    fn pretty(&self) -> Cow<'static, str> {
        match self {
            Side::Sente => "先手".into(),
            Side::Gote => "後手".into(),
        }
    }
}

fn file_to_pretty(file: i32) -> &'static str {
    const STRS: &[&str] = &["１", "２", "３", "４", "５", "６", "７", "８", "９"];
    STRS[file as usize - 1]
}

fn rank_to_pretty(rank: i32) -> &'static str {
    const STRS: &[&str] = &["一", "二", "三", "四", "五", "六", "七", "八", "九"];
    STRS[rank as usize - 1]
}

impl Pretty for Sq {
    /// ```
    /// # use shogi_replay::prelude::*;
    /// assert_eq!(Sq::from_file_rank(7, 6).pretty(), "７六");
    /// assert_eq!(Sq::from_file_rank(1, 9).pretty(), "１九");
    /// ```
    fn pretty(&self) -> Cow<'static, str> {
        format!("{}{}", file_to_pretty(self.file()), rank_to_pretty(self.rank())).into()
    }
}

impl Pretty for Piece {
    fn pretty(&self) -> Cow<'static, str> {
        match self {
            Piece::Pawn => "歩".into(),
            Piece::Lance => "香".into(),
            Piece::Knight => "桂".into(),
            Piece::Silver => "銀".into(),
            Piece::Bishop => "角".into(),
            Piece::Rook => "飛".into(),
            Piece::Gold => "金".into(),
            Piece::King => "玉".into(),
            Piece::ProPawn => "と".into(),
            Piece::ProLance => "杏".into(),
            Piece::ProKnight => "圭".into(),
            Piece::ProSilver => "全".into(),
            Piece::Horse => "馬".into(),
            Piece::Dragon => "龍".into(),
        }
    }
}

impl Pretty for MoveNondrop {
    fn pretty(&self) -> Cow<'static, str> {
        format!(
            "{}{}{}",
            self.src().pretty(),
            self.dst().pretty(),
            if self.is_promotion() { "成" } else { "" }
        )
        .into()
    }
}

impl Pretty for MoveDrop {
    fn pretty(&self) -> Cow<'static, str> {
        format!("{}{}打", self.dst().pretty(), self.pt().pretty()).into()
    }
}

impl Pretty for Move {
    /// ```
    /// # use shogi_replay::prelude::*;
    /// assert_eq!(Move::from_sfen("7g7f").unwrap().pretty(), "７七７六");
    /// assert_eq!(Move::from_sfen("8h2b+").unwrap().pretty(), "８八２二成");
    /// assert_eq!(Move::from_sfen("P*5e").unwrap().pretty(), "５五歩打");
    /// ```
    fn pretty(&self) -> Cow<'static, str> {
        match self {
            Self::Nondrop(nondrop) => nondrop.pretty(),
            Self::Drop(drop) => drop.pretty(),
        }
    }
}

impl Pretty for BoardCell {
    fn pretty(&self) -> Cow<'static, str> {
        match self {
            Self::Empty => " ・".into(),
            Self::Sente(pt) => format!(" {}", pt.pretty()).into(),
            Self::Gote(pt) => format!("v{}", pt.pretty()).into(),
        }
    }
}

impl Pretty for Board {
    /// 上が一段目、左が９筋。
    fn pretty(&self) -> Cow<'static, str> {
        let mut res = String::new();

        for rank in 1..=9 {
            for file in (1..=9).rev() {
                res.push_str(&self[Sq::from_file_rank(file, rank)].pretty());
            }
            res.push('\n');
        }

        res.into()
    }
}

impl Pretty for Hand {
    /// ```
    /// # use shogi_replay::prelude::*;
    /// let pos = Position::from_sfen("4k4/9/9/9/9/9/9/9/4K4 b R2P 1").unwrap();
    /// assert_eq!(pos.hand(Side::Sente).pretty(), "飛 歩2");
    /// assert_eq!(pos.hand(Side::Gote).pretty(), "なし");
    /// ```
    fn pretty(&self) -> Cow<'static, str> {
        const PIECES: &[Piece] = &[
            Piece::Rook,
            Piece::Bishop,
            Piece::Gold,
            Piece::Silver,
            Piece::Knight,
            Piece::Lance,
            Piece::Pawn,
        ];

        if self.is_empty() {
            return "なし".into();
        }

        PIECES
            .iter()
            .filter_map(|&pt| match self[pt] {
                0 => None,
                1 => Some(pt.pretty()),
                n => Some(format!("{}{}", pt.pretty(), n).into()),
            })
            .join(" ")
            .into()
    }
}

impl Pretty for Hands {
    fn pretty(&self) -> Cow<'static, str> {
        format!(
            "\
先手持駒:{}
後手持駒:{}
",
            self[Side::Sente].pretty(),
            self[Side::Gote].pretty()
        )
        .into()
    }
}

impl Pretty for Position {
    fn pretty(&self) -> Cow<'static, str> {
        format!(
            "\
手番:{}
後手持駒:{}
{}先手持駒:{}
{}
",
            self.side().pretty(),
            self.hand(Side::Gote).pretty(),
            self.board().pretty(),
            self.hand(Side::Sente).pretty(),
            self.to_sfen()
        )
        .into()
    }
}

impl Pretty for Highlight {
    /// ```
    /// # use shogi_replay::prelude::*;
    /// # use shogi_replay::highlight;
    /// let hl = highlight::from_move(&Move::from_sfen("B*4e").unwrap(), Side::Gote);
    /// assert_eq!(hl.pretty(), "後手駒台(角) -> ４五");
    /// ```
    fn pretty(&self) -> Cow<'static, str> {
        let src: Cow<'static, str> = match self.src() {
            HighlightSrc::Board(sq) => sq.pretty(),
            HighlightSrc::Stand(stand) => format!(
                "{}駒台({})",
                stand.side().pretty(),
                stand.piece().pretty()
            )
            .into(),
        };
        format!("{} -> {}", src, self.dst().pretty()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board() {
        let pos = Position::hirate();
        let lines: Vec<_> = pos.board().pretty().lines().map(str::to_owned).collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "v香v桂v銀v金v玉v金v銀v桂v香");
        assert_eq!(lines[1], " ・v飛 ・ ・ ・ ・ ・v角 ・");
        assert_eq!(lines[7], " ・ 角 ・ ・ ・ ・ ・ 飛 ・");
    }

    #[test]
    fn position() {
        let pos = Position::from_sfen("4k4/9/9/9/9/9/9/9/4K4 w Gp 1").unwrap();
        let s = pos.pretty();
        assert!(s.starts_with("手番:後手\n後手持駒:歩\n"));
        assert!(s.contains("先手持駒:金\n"));
        assert!(s.ends_with("4k4/9/9/9/9/9/9/9/4K4 w Gp 1\n"));
    }
}
