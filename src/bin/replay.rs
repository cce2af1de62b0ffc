//! 局面と指し手リストを再生し、各局面とハイライトを表示する

use env_logger::{Builder, Env, Target};
use itertools::Itertools;
use structopt::StructOpt;

use shogi_replay::prelude::*;
use shogi_replay::sfen;

#[derive(Clone, Copy, Debug, Eq, PartialEq, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "snake_case")]
enum Format {
    Pretty,
    Sfen,
}

#[derive(Debug, StructOpt)]
struct Opt {
    #[structopt(long, default_value = "pretty")]
    format: Format,

    /// 開始局面に至った指し手 (USI 形式)
    #[structopt(long)]
    last_move: Option<String>,

    /// 開始局面の 1 手前の局面 (SFEN)
    #[structopt(long)]
    prev: Option<String>,

    /// 表示用の読み筋 ("▲７六歩△３四歩" など)
    #[structopt(long)]
    labels: Option<String>,

    /// "startpos moves 7g7f 3c3d" など
    #[structopt(required = true)]
    position: Vec<String>,
}

fn print_ply(replay: &Replay, format: Format) {
    let pos = replay.position();
    let mv = replay.current_move_text().unwrap_or_default();
    let hl = replay
        .highlight()
        .map_or_else(|| "-".to_owned(), |hl| hl.pretty().into_owned());

    match format {
        Format::Pretty => {
            println!("# {} {}", replay.ply(), mv);
            println!("ハイライト:{}", hl);
            print!("{}", pos.pretty());
            println!();
        }
        Format::Sfen => {
            println!("{}\t{}\t{}\t{}", replay.ply(), mv, hl, sfen::position_to_sfen(pos));
        }
    }
}

fn main() -> eyre::Result<()> {
    Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Stderr)
        .init();

    let opt = Opt::from_args();

    let mut replay = Replay::from_sfen(opt.position.iter().join(" "))?;
    if let Some(last_move) = &opt.last_move {
        replay = replay.with_last_move(Move::from_sfen(last_move)?);
    }
    if let Some(prev) = &opt.prev {
        replay = replay.with_prev_position(Position::from_sfen(prev)?);
    }
    if let Some(labels) = &opt.labels {
        replay.set_move_labels(labels);
    }

    if let Some(failure) = replay.failure() {
        eprintln!("history truncated after {} plies: {}", replay.max_ply(), failure);
    }

    replay.go_first();
    loop {
        print_ply(&replay, opt.format);
        if !replay.go_forward() {
            break;
        }
    }

    Ok(())
}
