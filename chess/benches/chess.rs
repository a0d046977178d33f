use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kibitzer::{
    eval::{self, Planning},
    movegen, Engine, Position, Rules, SearchConfig,
};

const POSITIONS: [(&str, &str); 8] = [
    (
        "initial",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    ),
    (
        "sicilian",
        "r1b1k2r/2qnbppp/p2ppn2/1p4B1/3NPPP1/2N2Q2/PPP4P/2KR1B1R w kq - 0 11",
    ),
    (
        "middle",
        "1rq1r1k1/1p3ppp/pB3n2/3ppP2/Pbb1P3/1PN2B2/2P2QPP/R1R4K w - - 1 21",
    ),
    (
        "open_position",
        "4r1k1/3R1ppp/8/5P2/p7/6PP/4pK2/1rN1B3 w - - 4 43",
    ),
    ("queen", "6K1/8/8/1k3q2/3Q4/8/8/8 w - - 0 1"),
    ("pawn_race", "8/8/6k1/PK6/8/8/8/8 w - - 0 1"),
    (
        "pawn_promote",
        "8/PPPPPPPP/8/2k1K3/8/8/pppppppp/8 w - - 0 1",
    ),
    (
        "max",
        "3Q4/1Q4Q1/4Q3/2Q4R/Q4Q2/3Q4/NR4Q1/kN1BB1K1 w - - 0 1",
    ),
];

fn positions() -> impl Iterator<Item = (&'static str, Position)> {
    POSITIONS
        .iter()
        .map(|&(name, fen)| (name, Position::from_fen(fen).unwrap()))
}

fn bench_gen_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("gen_moves");
    for (name, pos) in positions() {
        group.bench_function(name, |b| {
            b.iter(|| black_box(movegen::pseudo_moves(&pos).len()))
        });
    }
}

fn bench_make_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("make_move");
    for (name, mut pos) in positions() {
        let moves = movegen::pseudo_moves(&pos);
        group.bench_function(name, |b| {
            b.iter(|| {
                for &mv in &moves {
                    let detail = pos.make_move(mv);
                    pos.unmake_move(mv, detail);
                }
            })
        });
    }
}

fn bench_hash_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_update");
    for (name, pos) in positions() {
        let moves = movegen::pseudo_moves(&pos);
        let hash = pos.hash64();
        group.bench_function(name, |b| {
            b.iter(|| {
                for &mv in &moves {
                    black_box(pos.hash64_update(hash, mv));
                }
            })
        });
    }
}

fn bench_legal_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("legal_moves");
    for (name, pos) in positions() {
        group.bench_function(name, |b| b.iter(|| black_box(pos.legal_moves().len())));
    }
}

fn bench_status(c: &mut Criterion) {
    let mut group = c.benchmark_group("status");
    for (name, pos) in positions() {
        group.bench_function(name, |b| b.iter(|| black_box(pos.status())));
    }
}

fn bench_evaluate_leaf(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_leaf");
    for (name, mut pos) in positions() {
        let planning = Planning::new(&pos);
        group.bench_function(name, |b| {
            b.iter(|| black_box(eval::evaluate_leaf(&mut pos, &planning)))
        });
    }
}

fn bench_enprise(c: &mut Criterion) {
    let mut group = c.benchmark_group("enprise");
    for (name, pos) in positions() {
        group.bench_function(name, |b| {
            b.iter(|| black_box(eval::enprise(&pos, pos.side())))
        });
    }
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);
    for (name, pos) in positions() {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut engine =
                    Engine::with_rules(Rules::from_position(pos.clone()), SearchConfig::default());
                black_box(engine.calculate_fixed_depth(4, 2))
            })
        });
    }
}

criterion_group!(
    chess,
    bench_gen_moves,
    bench_make_move,
    bench_hash_update,
    bench_legal_moves,
    bench_status,
    bench_evaluate_leaf,
    bench_enprise,
    bench_search,
);

criterion_main!(chess);
