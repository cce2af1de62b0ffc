//!===================================================================
//! 読み筋・棋譜の再生
//!
//! 基準局面と指し手リストから履歴を作り、カーソルで前後に移動しながら
//! 現局面・表示用の指し手文字列・ハイライトを取り出す。
//!===================================================================

use std::sync::Arc;

use log::debug;

use crate::cursor::Cursor;
use crate::diff;
use crate::highlight::{self, Highlight};
use crate::history::{BuildFailure, History};
use crate::prelude::*;
use crate::sfen;

#[derive(Debug)]
pub struct Replay {
    cursor: Cursor,
    failure: Option<BuildFailure>,
    last_move: Option<Move>,
    prev_position: Option<Position>,
    labels: Vec<String>,
}

impl Replay {
    /// base に tokens を適用して再生を始める。カーソルは基準局面を指す。
    /// 不正なトークンがあればそこで打ち切り、failure() で参照できるようにする。
    pub fn new<S: AsRef<str>>(base: Position, tokens: &[S]) -> Self {
        let build = History::build(base, tokens);
        Self {
            cursor: Cursor::new(Arc::new(build.history)),
            failure: build.failure,
            last_move: None,
            prev_position: None,
            labels: Vec::new(),
        }
    }

    /// USI の position コマンドの引数 ("startpos moves ..." など) から作る。
    pub fn from_sfen(sfen: impl AsRef<str>) -> crate::Result<Self> {
        let (base, tokens) = sfen::sfen_to_kifu(sfen)?;
        Ok(Self::new(base, &tokens))
    }

    /// 基準局面に至った指し手を設定する。基準局面のハイライトに使う。
    pub fn with_last_move(mut self, mv: Move) -> Self {
        self.last_move = Some(mv);
        self
    }

    /// 基準局面の 1 手前の局面を設定する。指し手が不明なとき、差分からハイライトを推定する。
    pub fn with_prev_position(mut self, pos: Position) -> Self {
        self.prev_position = Some(pos);
        self
    }

    /// "▲７六歩(77)△３四歩(33)" のような表示用の読み筋を設定する。
    pub fn set_move_labels(&mut self, text: impl AsRef<str>) {
        self.labels = split_move_labels(text.as_ref());
        debug!("parsed {} move labels", self.labels.len());
    }

    pub fn failure(&self) -> Option<&BuildFailure> {
        self.failure.as_ref()
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn history(&self) -> &Arc<History> {
        self.cursor.history()
    }

    pub fn base(&self) -> &Position {
        self.history().first()
    }

    pub fn ply(&self) -> usize {
        self.cursor.ply()
    }

    pub fn max_ply(&self) -> usize {
        self.cursor.max_ply()
    }

    pub fn go_first(&mut self) {
        self.cursor.go_first();
    }

    pub fn go_last(&mut self) {
        self.cursor.go_last();
    }

    pub fn go_back(&mut self) -> bool {
        self.cursor.go_back()
    }

    pub fn go_forward(&mut self) -> bool {
        self.cursor.go_forward()
    }

    pub fn go_to(&mut self, ply: usize) {
        self.cursor.go_to(ply);
    }

    pub fn position(&self) -> &Position {
        self.cursor.position()
    }

    pub fn is_sente_turn(&self) -> bool {
        self.position().side().is_sente()
    }

    /// 現局面に至った指し手の表示用文字列を返す。
    /// 読み筋の表示文字列があればそれを、なければ USI 形式を返す。開始局面なら None。
    pub fn current_move_text(&self) -> Option<String> {
        let mv = self.cursor.current_move()?;
        let label = self.labels.get(self.ply() - 1).filter(|label| !label.is_empty());
        Some(label.cloned().unwrap_or_else(|| mv.to_sfen()))
    }

    /// 現局面のハイライトを返す。
    pub fn highlight(&self) -> Option<Highlight> {
        match (self.cursor.current_move(), self.cursor.current_mover()) {
            (Some(mv), Some(side)) => Some(highlight::from_move(mv, side)),
            _ => self.base_highlight(),
        }
    }

    /// 基準局面のハイライト。
    /// 直前の指し手 > 1 手前の局面との差分 > 手順の初手 の順に試す。
    fn base_highlight(&self) -> Option<Highlight> {
        let base = self.base();

        if let Some(mv) = &self.last_move {
            return Some(highlight::from_move(mv, base.side().inv()));
        }

        if let Some(prev) = &self.prev_position {
            match diff::infer(prev, base) {
                Ok(diff) => return Some(diff.highlight()),
                Err(e) => debug!("base highlight: {}", e),
            }
        }

        // 根拠のない推測なので平手初期局面に限る
        let mv = self.history().move_at(1)?;
        if !base.is_hirate() {
            debug!("base highlight: no usable move for base position");
            return None;
        }
        debug!("base highlight: using the first move {}", mv.to_sfen());
        Some(highlight::from_move(mv, base.side()))
    }
}

/// 手番記号 ▲, △ で区切られた読み筋を 1 手ずつに分割する。
///
/// ```
/// # use shogi_replay::replay::split_move_labels;
/// assert_eq!(
///     split_move_labels("△３四歩(33)▲２六歩(27) △８四歩(83)"),
///     ["△３四歩(33)", "▲２六歩(27)", "△８四歩(83)"]
/// );
/// ```
pub fn split_move_labels(text: &str) -> Vec<String> {
    let is_mark = |c: char| c == '▲' || c == '△';

    let starts: Vec<_> = text.match_indices(is_mark).map(|(i, _)| i).collect();
    let ends = starts.iter().skip(1).copied().chain(std::iter::once(text.len()));

    starts
        .iter()
        .zip(ends)
        .map(|(&start, end)| text[start..end].trim())
        .filter(|label| label.chars().count() > 1)
        .map(str::to_owned)
        .collect()
}
