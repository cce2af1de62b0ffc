//! 2 局面の差分から直前の指し手を推定する

use env_logger::{Builder, Env, Target};
use structopt::StructOpt;

use shogi_replay::diff;
use shogi_replay::prelude::*;

#[derive(Debug, StructOpt)]
struct Opt {
    /// 前の局面 (SFEN)
    before: String,

    /// 後の局面 (SFEN)
    after: String,
}

fn main() -> eyre::Result<()> {
    Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Stderr)
        .init();

    let opt = Opt::from_args();

    let before = Position::from_sfen(&opt.before)?;
    let after = Position::from_sfen(&opt.after)?;

    match diff::infer(&before, &after) {
        Ok(diff) => {
            let (sfen, pretty) = match diff.to_move() {
                Some(mv) => (mv.to_sfen(), mv.pretty().into_owned()),
                None => ("-".to_owned(), "-".to_owned()),
            };
            println!("{}\t{}\t{}", sfen, pretty, diff.highlight().pretty());
        }
        Err(ambiguous) => {
            println!(
                "ambiguous\tvacated={}\tfilled={}\tchanged={}",
                ambiguous.vacated, ambiguous.filled, ambiguous.changed
            );
        }
    }

    Ok(())
}
