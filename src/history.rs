//!===================================================================
//! 局面履歴
//!
//! 開始局面に指し手を順に適用し、各手の後の局面を記録する。
//! positions[0] が開始局面、positions[k] が最初の k 手を適用した局面。
//!===================================================================

use log::{trace, warn};

use crate::prelude::*;
use crate::sfen;
use crate::Error;

/// 構築後は変更されない局面列。複数のカーソルで共有するなら Arc に包む。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct History {
    positions: Vec<Position>,
    moves: Vec<Move>,
}

/// 指し手トークンの適用に失敗したことを表す。
/// index は 0 始まり。このとき履歴には開始局面と最初の index 手ぶん、計 index + 1 局面が残る。
#[derive(Debug, thiserror::Error)]
#[error("move #{index} ({token:?}) failed: {source}")]
pub struct BuildFailure {
    pub index: usize,
    pub token: String,
    #[source]
    pub source: Error,
}

/// History::build の結果。
/// 失敗した場合でも、失敗した手の直前までの履歴は得られる。
#[derive(Debug)]
pub struct HistoryBuild {
    pub history: History,
    pub failure: Option<BuildFailure>,
}

impl HistoryBuild {
    /// 途中で失敗していれば Err を返す。
    pub fn into_result(self) -> Result<History, BuildFailure> {
        match self.failure {
            Some(failure) => Err(failure),
            None => Ok(self.history),
        }
    }
}

impl History {
    /// 開始局面のみからなる履歴。
    pub fn new(start: Position) -> Self {
        Self {
            positions: vec![start],
            moves: Vec::new(),
        }
    }

    /// start に tokens を順に適用して履歴を作る。
    /// i 番目のトークンが不正(形式エラー、または局面に適用できない)な場合、
    /// そこで打ち切り、開始局面 + 最初の i 手ぶんの履歴と失敗情報を返す。
    pub fn build<S: AsRef<str>>(start: Position, tokens: &[S]) -> HistoryBuild {
        let mut history = Self::new(start);

        for (index, token) in tokens.iter().enumerate() {
            let token = token.as_ref();
            if let Err(source) = sfen::sfen_to_move(token).and_then(|mv| history.push(mv)) {
                warn!("history truncated at move #{} ({:?}): {}", index, token, source);
                return HistoryBuild {
                    history,
                    failure: Some(BuildFailure {
                        index,
                        token: token.to_owned(),
                        source,
                    }),
                };
            }
        }

        HistoryBuild {
            history,
            failure: None,
        }
    }

    /// パース済みの指し手から履歴を作る。失敗時の扱いは build と同じ。
    pub fn from_moves(start: Position, mvs: &[Move]) -> HistoryBuild {
        let mut history = Self::new(start);

        for (index, mv) in mvs.iter().enumerate() {
            if let Err(source) = history.push(mv.clone()) {
                warn!("history truncated at move #{}: {}", index, source);
                return HistoryBuild {
                    history,
                    failure: Some(BuildFailure {
                        index,
                        token: mv.to_sfen(),
                        source,
                    }),
                };
            }
        }

        HistoryBuild {
            history,
            failure: None,
        }
    }

    fn push(&mut self, mv: Move) -> crate::Result<()> {
        let pos = self.last().apply(&mv)?;
        trace!("ply {}: {} -> {}", self.moves.len() + 1, mv.to_sfen(), pos.to_sfen());
        self.positions.push(pos);
        self.moves.push(mv);
        Ok(())
    }

    /// 局面数 (= 手数 + 1) を返す。常に 1 以上。
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// 開始局面しかなければ true。
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// 最大の手数(最後の局面の添字)を返す。
    pub fn max_ply(&self) -> usize {
        self.moves.len()
    }

    pub fn get(&self, ply: usize) -> Option<&Position> {
        self.positions.get(ply)
    }

    pub fn first(&self) -> &Position {
        &self.positions[0]
    }

    pub fn last(&self) -> &Position {
        &self.positions[self.positions.len() - 1]
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// ply 手目(1 始まり)の指し手を返す。
    pub fn move_at(&self, ply: usize) -> Option<&Move> {
        ply.checked_sub(1).and_then(|i| self.moves.get(i))
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build() {
        let history = History::build(Position::hirate(), &["7g7f", "3c3d"])
            .into_result()
            .unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history.max_ply(), 2);
        assert_eq!(history.first(), &Position::hirate());
        assert_eq!(
            history.last().to_sfen(),
            "lnsgkgsnl/1r5b1/pppppp1pp/6p2/9/2P6/PP1PPPPPP/1B5R1/LNSGKGSNL b - 1"
        );
        assert_eq!(history.move_at(0), None);
        assert_eq!(history.move_at(1).unwrap().to_sfen(), "7g7f");
        assert_eq!(history.move_at(3), None);
    }

    #[test]
    fn empty_moves() {
        let tokens: [&str; 0] = [];
        let history = History::build(Position::hirate(), &tokens)
            .into_result()
            .unwrap();
        assert_eq!(history.len(), 1);
        assert!(history.is_empty());
    }

    #[test]
    fn malformed_token_truncates() {
        let build = History::build(Position::hirate(), &["7g7f", "3c3x", "2g2f"]);
        let failure = build.failure.unwrap();
        assert_eq!(failure.index, 1);
        assert_eq!(failure.token, "3c3x");
        assert!(matches!(failure.source, Error::MalformedMoveToken(_)));
        assert_eq!(build.history.len(), 2);
    }

    #[test]
    fn illegal_application_truncates() {
        let build = History::build(Position::hirate(), &["7g7f", "3c3d", "P*5e"]);
        let failure = build.failure.unwrap();
        assert_eq!(failure.index, 2);
        assert!(matches!(failure.source, Error::IllegalApplication(_, _)));
        assert_eq!(build.history.len(), failure.index + 1);
        assert_eq!(build.history.moves().len(), 2);
    }

    #[test]
    fn from_moves_matches_build() {
        let tokens = ["7g7f", "3c3d", "8h2b+", "3a2b", "B*4e", "B*8e", "4e3d", "8e7f"];
        let mvs: Vec<_> = tokens.iter().map(|t| Move::from_sfen(t).unwrap()).collect();
        let h1 = History::build(Position::hirate(), &tokens)
            .into_result()
            .unwrap();
        let h2 = History::from_moves(Position::hirate(), &mvs)
            .into_result()
            .unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), tokens.len() + 1);
        assert_eq!(
            h1.last().to_sfen(),
            "lnsgkg1nl/1r5s1/pppppp1pp/6B2/9/2b6/PP1PPPPPP/7R1/LNSGKGSNL b Pp 1"
        );
    }
}
