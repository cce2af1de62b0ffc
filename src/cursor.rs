//!===================================================================
//! 履歴上のカーソル
//!
//! 手数 ply は常に 0..=history.max_ply() に収まる。範囲外への移動要求は黙って丸める。
//!===================================================================

use std::sync::Arc;

use crate::history::History;
use crate::prelude::*;

#[derive(Clone, Debug)]
pub struct Cursor {
    history: Arc<History>,
    ply: usize,
}

impl Cursor {
    /// 開始局面を指すカーソルを作る。
    pub fn new(history: Arc<History>) -> Self {
        Self { history, ply: 0 }
    }

    pub fn history(&self) -> &Arc<History> {
        &self.history
    }

    pub fn ply(&self) -> usize {
        self.ply
    }

    pub fn max_ply(&self) -> usize {
        self.history.max_ply()
    }

    pub fn go_first(&mut self) {
        self.ply = 0;
    }

    pub fn go_last(&mut self) {
        self.ply = self.max_ply();
    }

    /// 1 手戻る。戻れたら true を返す。
    pub fn go_back(&mut self) -> bool {
        if self.ply > 0 {
            self.ply -= 1;
            true
        } else {
            false
        }
    }

    /// 1 手進む。進めたら true を返す。
    pub fn go_forward(&mut self) -> bool {
        if self.ply < self.max_ply() {
            self.ply += 1;
            true
        } else {
            false
        }
    }

    /// ply 手目へ移動する。範囲外なら最後の局面に丸める。
    pub fn go_to(&mut self, ply: usize) {
        self.ply = ply.min(self.max_ply());
    }

    pub fn position(&self) -> &Position {
        &self.history.positions()[self.ply]
    }

    /// 現局面に至った指し手を返す。開始局面なら None。
    pub fn current_move(&self) -> Option<&Move> {
        self.history.move_at(self.ply)
    }

    /// 現局面に至った指し手を指した側を返す。開始局面なら None。
    pub fn current_mover(&self) -> Option<Side> {
        self.ply
            .checked_sub(1)
            .map(|prev| self.history.positions()[prev].side())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn history(tokens: &[&str]) -> Arc<History> {
        Arc::new(
            History::build(Position::hirate(), tokens)
                .into_result()
                .unwrap(),
        )
    }

    #[test]
    fn navigation() {
        let mut cursor = Cursor::new(history(&["7g7f", "3c3d", "2g2f"]));
        assert_eq!(cursor.ply(), 0);
        assert!(cursor.current_move().is_none());
        assert!(cursor.current_mover().is_none());

        assert!(!cursor.go_back());
        assert_eq!(cursor.ply(), 0);

        assert!(cursor.go_forward());
        assert_eq!(cursor.current_move().unwrap().to_sfen(), "7g7f");
        assert_eq!(cursor.current_mover(), Some(Side::Sente));
        assert_eq!(cursor.position().side(), Side::Gote);

        cursor.go_last();
        assert_eq!(cursor.ply(), 3);
        assert!(!cursor.go_forward());
        assert_eq!(cursor.ply(), 3);
        assert_eq!(cursor.current_move().unwrap().to_sfen(), "2g2f");

        assert!(cursor.go_back());
        assert_eq!(cursor.current_mover(), Some(Side::Gote));

        cursor.go_to(100);
        assert_eq!(cursor.ply(), 3);
        cursor.go_to(1);
        assert_eq!(cursor.ply(), 1);

        cursor.go_first();
        for _ in 0..5 {
            cursor.go_back();
        }
        assert_eq!(cursor.ply(), 0);
        assert_eq!(cursor.position(), &Position::hirate());
    }

    #[test]
    fn single_position() {
        let mut cursor = Cursor::new(history(&[]));
        assert!(!cursor.go_forward());
        assert!(!cursor.go_back());
        cursor.go_last();
        assert_eq!(cursor.ply(), 0);
    }

    #[test]
    fn random_walk_stays_in_bounds() {
        let h = history(&["7g7f", "3c3d", "8h2b+", "3a2b", "B*4e"]);
        let mut rng = StdRng::seed_from_u64(5);
        let mut cursor = Cursor::new(Arc::clone(&h));
        for _ in 0..1000 {
            let before = cursor.ply();
            let moved = if rng.gen() {
                cursor.go_forward()
            } else {
                cursor.go_back()
            };
            assert!(cursor.ply() < h.len());
            assert_eq!(moved, cursor.ply() != before);
        }
    }

    #[test]
    fn cursors_share_history() {
        let h = history(&["7g7f", "3c3d"]);
        let mut c1 = Cursor::new(Arc::clone(&h));
        let c2 = Cursor::new(Arc::clone(&h));
        c1.go_last();
        assert_eq!(c1.ply(), 2);
        assert_eq!(c2.ply(), 0);
        assert!(Arc::ptr_eq(c1.history(), c2.history()));
    }
}
