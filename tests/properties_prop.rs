//! Property tests for shapes, placement, line clears and the engine loop.

use proptest::prelude::*;

use tetromino::core::{Board, GameConfig, GameState, Piece, Shape, TickOutcome};
use tetromino::types::{InputEvent, EMPTY};

fn arb_shape() -> impl Strategy<Value = Shape> {
    (1usize..=4, 1usize..=4)
        .prop_flat_map(|(w, h)| (Just(w), Just(h), prop::collection::vec(any::<bool>(), w * h)))
        .prop_filter("needs an occupied cell", |(_, _, cells)| cells.iter().any(|&c| c))
        .prop_map(|(w, h, cells)| Shape::new(w, h, cells, 0xabcdef).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn four_rotations_are_identity(shape in arb_shape()) {
        let left = shape.rotated_left().rotated_left().rotated_left().rotated_left();
        let right = shape.rotated_right().rotated_right().rotated_right().rotated_right();
        prop_assert_eq!(&left, &shape);
        prop_assert_eq!(&right, &shape);
    }

    #[test]
    fn opposite_rotations_cancel(shape in arb_shape()) {
        prop_assert_eq!(&shape.rotated_left().rotated_right(), &shape);
        prop_assert_eq!(&shape.rotated_right().rotated_left(), &shape);
        prop_assert_eq!(shape.rotated_left().occupied().count(), shape.occupied().count());
    }

    #[test]
    fn empty_board_placement_is_a_bounds_check(
        shape in arb_shape(),
        x in -6i32..16,
        y in -6i32..26,
    ) {
        let board = Board::new(10, 20);
        let cx = x as f64 + shape.width() as f64 / 2.0;
        let cy = y as f64 + shape.height() as f64 / 2.0;
        let piece = Piece::new(10, 20, &shape).with_center(cx, cy);
        prop_assert_eq!(piece.position(), (x, y));

        let fits = x >= 0
            && x + shape.width() as i32 <= 10
            && y + shape.height() as i32 <= 20;
        prop_assert_eq!(board.can_place(&piece), fits);
    }

    #[test]
    fn placement_matches_a_cell_by_cell_check(
        filled in prop::collection::vec(any::<bool>(), 200),
        shape in arb_shape(),
        turns in 0usize..4,
        x in -4i32..14,
        y in -4i32..24,
    ) {
        let mut board = Board::new(10, 20);
        for (i, &f) in filled.iter().enumerate() {
            if f {
                board.set((i % 10) as i32, (i / 10) as i32, 0x00ff00);
            }
        }
        let shape = (0..turns).fold(shape, |s, _| s.rotated_right());
        let (w, h) = (shape.width() as i32, shape.height() as i32);
        let piece = Piece::new(10, 20, &shape)
            .with_center(x as f64 + w as f64 / 2.0, y as f64 + h as f64 / 2.0);

        // Rows above the board are empty; inside it, any shared cell collides.
        let in_bounds = x >= 0 && x + w <= 10 && y + h <= 20;
        let fits = in_bounds
            && !shape.occupied().any(|(sx, sy)| {
                let (bx, by) = (x + sx as i32, y + sy as i32);
                by >= 0 && filled[(by * 10 + bx) as usize]
            });
        prop_assert_eq!(board.can_place(&piece), fits);
    }

    #[test]
    fn clear_lines_removes_exactly_the_full_rows(full in prop::collection::vec(any::<bool>(), 20)) {
        let mut board = Board::new(10, 20);
        for (y, &is_full) in full.iter().enumerate() {
            for x in 0..10 {
                // Partial rows keep one gap and a row-specific color.
                if is_full || x != y % 10 {
                    board.set(x as i32, y as i32, y as u32 + 1);
                }
            }
        }

        let expected = full.iter().filter(|&&f| f).count() as u32;
        prop_assert_eq!(board.clear_lines(), expected);

        let survivors: Vec<usize> = (0..20).filter(|&y| !full[y]).collect();
        let offset = 20 - survivors.len();
        for y in 0..offset {
            for x in 0..10 {
                prop_assert_eq!(board.get(x, y as i32), Some(EMPTY));
            }
        }
        for (i, &src) in survivors.iter().enumerate() {
            let y = (offset + i) as i32;
            for x in 0..10 {
                let want = if x as usize == src % 10 { EMPTY } else { src as u32 + 1 };
                prop_assert_eq!(board.get(x, y), Some(want));
            }
        }
    }

    #[test]
    fn random_play_keeps_the_piece_on_the_board(
        seed in any::<u32>(),
        inputs in prop::collection::vec(0u8..32, 1..400),
    ) {
        let mut game = GameState::new(GameConfig::default(), seed).unwrap();
        game.start();
        for bits in inputs {
            game.set_input_event(InputEvent::from_bits_truncate(bits));
            let outcome = game.tick(100);
            if outcome == TickOutcome::GameOver {
                prop_assert!(game.current().is_none());
                break;
            }
            let piece = game.current().unwrap();
            prop_assert!(game.board().can_place(piece));
            prop_assert_eq!(game.view_board().len(), 200);
        }
    }
}
