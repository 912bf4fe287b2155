//! Text board for terminal viewers.
//!
//! The board is drawn from the viewer's side: their back rank sits at the
//! bottom, with files mirrored for black. Squares are shaded with ANSI
//! background colours; a1 is always dark whichever way the board faces.

use shakmaty::{Color, File, Piece, Rank, Role, Square};

use crate::position::Position;

pub const RESET: &str = "\x1b[0m";
pub const BG_DARK: &str = "\x1b[40m";
pub const BG_LIGHT: &str = "\x1b[100m";
pub const FG_WHITE_PIECE: &str = "\x1b[38;5;218m";
pub const FG_BLACK_PIECE: &str = "\x1b[38;5;208m";

const BORDER: &str = "   +--------------------------------+";
const FILE_LABELS: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    Dark,
    Light,
}

/// Shade of the square at zero-based `file` and `rank`.
pub fn shade(file: u32, rank: u32) -> Shade {
    if (file + rank) % 2 == 0 {
        Shade::Dark
    } else {
        Shade::Light
    }
}

pub fn glyph(piece: Piece) -> char {
    match (piece.color, piece.role) {
        (Color::White, Role::King) => '♔',
        (Color::White, Role::Queen) => '♕',
        (Color::White, Role::Rook) => '♖',
        (Color::White, Role::Bishop) => '♗',
        (Color::White, Role::Knight) => '♘',
        (Color::White, Role::Pawn) => '♙',
        (Color::Black, Role::King) => '♚',
        (Color::Black, Role::Queen) => '♛',
        (Color::Black, Role::Rook) => '♜',
        (Color::Black, Role::Bishop) => '♝',
        (Color::Black, Role::Knight) => '♞',
        (Color::Black, Role::Pawn) => '♟',
    }
}

/// Draw `position` as seen by the player of `orientation`.
pub fn render(position: &Position, orientation: Color) -> String {
    let (ranks, files): (Vec<u32>, Vec<u32>) = match orientation {
        Color::White => ((0..8).rev().collect(), (0..8).collect()),
        Color::Black => ((0..8).collect(), (0..8).rev().collect()),
    };

    let mut board = String::new();
    board.push_str(BORDER);
    board.push('\n');

    for &rank in &ranks {
        board.push_str(&format!(" {} |", rank + 1));
        for &file in &files {
            let square = Square::from_coords(File::new(file), Rank::new(rank));
            board.push_str(&cell(position.piece_at(square), shade(file, rank)));
        }
        board.push_str("|\n");
    }

    board.push_str(BORDER);
    board.push('\n');
    board.push_str("    ");
    for &file in &files {
        board.push_str(&format!(" {}  ", FILE_LABELS[file as usize]));
    }
    board.push('\n');

    board
}

fn cell(piece: Option<Piece>, shade: Shade) -> String {
    let bg = match shade {
        Shade::Dark => BG_DARK,
        Shade::Light => BG_LIGHT,
    };
    match piece {
        None => format!("{bg}    {RESET}"),
        Some(piece) => {
            let fg = match piece.color {
                Color::White => FG_WHITE_PIECE,
                Color::Black => FG_BLACK_PIECE,
            };
            format!("{bg}{fg} {}  {RESET}", glyph(piece))
        }
    }
}
