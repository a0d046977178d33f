use std::path::Path;
use std::{env, io};

use rand_core::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

pub fn default_gen() -> impl RngCore {
    Xoshiro256PlusPlus::seed_from_u64(0x800D_BA5E_5EED_1234_u64)
}

/// Directions are given as `(delta_file, delta_rank)`, where positive `delta_rank` points
/// towards rank 8.
mod dirs {
    pub const WEST: (isize, isize) = (-1, 0);
    pub const EAST: (isize, isize) = (1, 0);
    pub const SOUTH: (isize, isize) = (0, -1);
    pub const NORTH: (isize, isize) = (0, 1);
    pub const SOUTH_WEST: (isize, isize) = (-1, -1);
    pub const NORTH_WEST: (isize, isize) = (-1, 1);
    pub const NORTH_EAST: (isize, isize) = (1, 1);
    pub const SOUTH_EAST: (isize, isize) = (1, -1);

    pub const ORTHOGONAL: [(isize, isize); 4] = [WEST, EAST, SOUTH, NORTH];
    pub const DIAGONAL: [(isize, isize); 4] = [SOUTH_WEST, NORTH_WEST, NORTH_EAST, SOUTH_EAST];
    pub const QUEEN: [(isize, isize); 8] = [
        WEST, EAST, SOUTH, NORTH, SOUTH_WEST, NORTH_WEST, NORTH_EAST, SOUTH_EAST,
    ];
    pub const KNIGHT: [(isize, isize); 8] = [
        (-2, -1),
        (-2, 1),
        (-1, -2),
        (-1, 2),
        (2, -1),
        (2, 1),
        (1, -2),
        (1, 2),
    ];
    pub const KING: [(isize, isize); 8] = [
        SOUTH_WEST, NORTH_WEST, SOUTH_EAST, NORTH_EAST, WEST, EAST, SOUTH, NORTH,
    ];
}

mod geom {
    use kibitzer_base::types::Coord;

    pub fn step(c: Coord, (df, dr): (isize, isize)) -> Option<Coord> {
        // Rank indices grow towards rank 1
        c.shift(df, -dr)
    }

    pub fn ray(c: Coord, dir: (isize, isize)) -> Vec<Coord> {
        let mut res = Vec::new();
        let mut cur = c;
        while let Some(next) = step(cur, dir) {
            res.push(next);
            cur = next;
        }
        res
    }

    pub fn rays(c: Coord, dirs: &[(isize, isize)]) -> Vec<Vec<Coord>> {
        dirs.iter()
            .map(|&d| ray(c, d))
            .filter(|r| !r.is_empty())
            .collect()
    }

    pub fn steps(c: Coord, dirs: &[(isize, isize)]) -> Vec<Coord> {
        dirs.iter().filter_map(|&d| step(c, d)).collect()
    }
}

mod zobrist {
    use std::io::{self, BufWriter, Write};
    use std::{fs, path::Path};

    use kibitzer_base::types::Cell;
    use rand_core::RngCore;

    struct Zobrist {
        keys32: [[u32; 64]; Cell::MAX_INDEX],
        keys64: [[u64; 64]; Cell::MAX_INDEX],
    }

    impl Zobrist {
        fn generate<R: RngCore>(gen: &mut R) -> Zobrist {
            // Empty cells get their own keys, so the hash covers every square
            let mut keys32 = [[0_u32; 64]; Cell::MAX_INDEX];
            for sub in keys32.iter_mut() {
                for x in sub {
                    *x = gen.next_u32();
                }
            }
            let mut keys64 = [[0_u64; 64]; Cell::MAX_INDEX];
            for sub in keys64.iter_mut() {
                for x in sub {
                    *x = gen.next_u64();
                }
            }
            Zobrist { keys32, keys64 }
        }

        fn generate_default() -> Zobrist {
            Self::generate(&mut super::default_gen())
        }

        fn output<W: Write>(&self, w: &mut W) -> io::Result<()> {
            writeln!(w, "static KEYS32: [[u32; 64]; Cell::MAX_INDEX] = [")?;
            for (i, sub) in self.keys32.iter().enumerate() {
                writeln!(w, "    /*{:2}*/ [", i)?;
                for (i, hsh) in sub.iter().enumerate() {
                    writeln!(w, "        /*{:2}*/ {:#x},", i, hsh)?;
                }
                writeln!(w, "    ],")?;
            }
            writeln!(w, "];\n")?;

            writeln!(w, "static KEYS64: [[u64; 64]; Cell::MAX_INDEX] = [")?;
            for (i, sub) in self.keys64.iter().enumerate() {
                writeln!(w, "    /*{:2}*/ [", i)?;
                for (i, hsh) in sub.iter().enumerate() {
                    writeln!(w, "        /*{:2}*/ {:#x},", i, hsh)?;
                }
                writeln!(w, "    ],")?;
            }
            writeln!(w, "];")?;

            Ok(())
        }
    }

    pub fn gen(out_path: &Path) -> io::Result<()> {
        Zobrist::generate_default().output(&mut BufWriter::new(&fs::File::create(out_path)?))?;
        Ok(())
    }
}

mod tables {
    use std::io::{self, BufWriter, Write};
    use std::{fs, path::Path};

    use kibitzer_base::geometry;
    use kibitzer_base::types::{Color, Coord, Piece};

    use super::dirs;
    use super::geom;

    fn bit(p: Piece) -> u8 {
        1 << p as u8
    }

    fn write_coords<W: Write>(w: &mut W, cs: &[Coord]) -> io::Result<()> {
        write!(w, "&[")?;
        for (i, c) in cs.iter().enumerate() {
            if i != 0 {
                write!(w, ", ")?;
            }
            write!(w, "c({})", c.index())?;
        }
        write!(w, "]")
    }

    fn print_steps<W: Write>(
        w: &mut W,
        name: &str,
        f: impl Fn(Coord) -> Vec<Coord>,
    ) -> io::Result<()> {
        writeln!(w, "pub static {}: [&[Coord]; 64] = [", name)?;
        for c in Coord::iter() {
            write!(w, "    /*{}*/ ", c)?;
            write_coords(w, &f(c))?;
            writeln!(w, ",")?;
        }
        writeln!(w, "];\n")
    }

    fn print_rays<W: Write>(
        w: &mut W,
        name: &str,
        f: impl Fn(Coord) -> Vec<Vec<Coord>>,
    ) -> io::Result<()> {
        writeln!(w, "pub static {}: [&[&[Coord]]; 64] = [", name)?;
        for c in Coord::iter() {
            writeln!(w, "    /*{}*/ &[", c)?;
            for ray in f(c) {
                write!(w, "        ")?;
                write_coords(w, &ray)?;
                writeln!(w, ",")?;
            }
            writeln!(w, "    ],")?;
        }
        writeln!(w, "];\n")
    }

    fn pawn_captures(c: Coord, color: Color) -> Vec<Coord> {
        let dr = match color {
            Color::White => 1,
            Color::Black => -1,
        };
        if c.rank() == geometry::castling_rank(color.inv()) {
            return Vec::new();
        }
        geom::steps(c, &[(-1, dr), (1, dr)])
    }

    fn pawn_advances(c: Coord, color: Color) -> Vec<Coord> {
        let dr = match color {
            Color::White => 1,
            Color::Black => -1,
        };
        if c.rank() == geometry::castling_rank(color.inv()) {
            return Vec::new();
        }
        let mut res = geom::steps(c, &[(0, dr)]);
        if c.rank() == geometry::double_move_src_rank(color) {
            res.extend(geom::step(res[0], (0, dr)));
        }
        res
    }

    /// Squares from which a pawn of color `attacker` hits a piece standing on `c`.
    fn pawn_attackers(c: Coord, attacker: Color) -> Vec<Coord> {
        let dr = match attacker {
            Color::White => -1,
            Color::Black => 1,
        };
        geom::steps(c, &[(-1, dr), (1, dr)])
    }

    /// Queen rays leaving a piece of color `target`, where each square carries the set of
    /// enemy pieces that would attack the target from there with nothing in between.
    fn attack_rays(c: Coord, target: Color) -> Vec<Vec<(Coord, u8)>> {
        let pawn_dr = match target {
            Color::White => 1,
            Color::Black => -1,
        };
        let mut res = Vec::new();
        for &dir in &dirs::QUEEN {
            let diagonal = dir.0 != 0 && dir.1 != 0;
            let slider = if diagonal {
                bit(Piece::Bishop) | bit(Piece::Queen)
            } else {
                bit(Piece::Rook) | bit(Piece::Queen)
            };
            let ray: Vec<_> = geom::ray(c, dir)
                .into_iter()
                .enumerate()
                .map(|(i, sq)| {
                    let mut mask = slider;
                    if i == 0 {
                        mask |= bit(Piece::King);
                        if diagonal && dir.1 == pawn_dr {
                            mask |= bit(Piece::Pawn);
                        }
                    }
                    (sq, mask)
                })
                .collect();
            if !ray.is_empty() {
                res.push(ray);
            }
        }
        res
    }

    fn print_attack_rays<W: Write>(w: &mut W, name: &str, target: Color) -> io::Result<()> {
        writeln!(w, "pub static {}: [&[&[(Coord, u8)]]; 64] = [", name)?;
        for c in Coord::iter() {
            writeln!(w, "    /*{}*/ &[", c)?;
            for ray in attack_rays(c, target) {
                write!(w, "        &[")?;
                for (i, (sq, mask)) in ray.iter().enumerate() {
                    if i != 0 {
                        write!(w, ", ")?;
                    }
                    write!(w, "(c({}), {:#04x})", sq.index(), mask)?;
                }
                writeln!(w, "],")?;
            }
            writeln!(w, "    ],")?;
        }
        writeln!(w, "];\n")
    }

    /// Squares a knight's jump or two straight steps towards the centre, which are
    /// comfortable posts for a king in the ending.
    fn good_king_positions(c: Coord) -> Vec<Coord> {
        let mut res = Vec::new();
        for df in [-2, 2] {
            for dr in [-1, 0, 1] {
                res.extend(geom::step(c, (df, dr)));
            }
        }
        for dr in [-2, 2] {
            for df in [-1, 0, 1] {
                res.extend(geom::step(c, (df, dr)));
            }
        }
        res
    }

    pub fn gen(out_path: &Path) -> io::Result<()> {
        let f = fs::File::create(out_path)?;
        let mut w = BufWriter::new(&f);

        print_rays(&mut w, "QUEEN_RAYS", |c| geom::rays(c, &dirs::QUEEN))?;
        print_rays(&mut w, "ROOK_RAYS", |c| geom::rays(c, &dirs::ORTHOGONAL))?;
        print_rays(&mut w, "BISHOP_RAYS", |c| geom::rays(c, &dirs::DIAGONAL))?;
        print_steps(&mut w, "KNIGHT_STEPS", |c| geom::steps(c, &dirs::KNIGHT))?;
        print_steps(&mut w, "KING_STEPS", |c| geom::steps(c, &dirs::KING))?;
        print_steps(&mut w, "WHITE_PAWN_CAPTURES", |c| {
            pawn_captures(c, Color::White)
        })?;
        print_steps(&mut w, "WHITE_PAWN_ADVANCES", |c| {
            pawn_advances(c, Color::White)
        })?;
        print_steps(&mut w, "BLACK_PAWN_CAPTURES", |c| {
            pawn_captures(c, Color::Black)
        })?;
        print_steps(&mut w, "BLACK_PAWN_ADVANCES", |c| {
            pawn_advances(c, Color::Black)
        })?;
        print_steps(&mut w, "BLACK_PAWNS_ATTACKING_WHITE", |c| {
            pawn_attackers(c, Color::Black)
        })?;
        print_steps(&mut w, "WHITE_PAWNS_ATTACKING_BLACK", |c| {
            pawn_attackers(c, Color::White)
        })?;
        print_attack_rays(&mut w, "ATTACKS_ON_WHITE", Color::White)?;
        print_attack_rays(&mut w, "ATTACKS_ON_BLACK", Color::Black)?;
        print_steps(&mut w, "GOOD_KING_POSITIONS", good_king_positions)?;

        Ok(())
    }
}

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = env::var("OUT_DIR").map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    zobrist::gen(&Path::new(&out_dir).join("zobrist.rs"))?;
    tables::gen(&Path::new(&out_dir).join("tables.rs"))?;

    Ok(())
}
