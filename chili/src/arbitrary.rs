use crate::{Board, Side, Square, NUM_SQUARES};

impl quickcheck::Arbitrary for Side {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        *g.choose(&[Side::Black, Side::White]).unwrap()
    }
}

impl quickcheck::Arbitrary for Square {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        Square::from_index(usize::arbitrary(g) % NUM_SQUARES)
    }
}

impl quickcheck::Arbitrary for Board {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        // Leave about a third of the squares empty so that pieces can move.
        let mut board = Board::empty();
        for sq in Square::all() {
            let occupant = match u8::arbitrary(g) % 3 {
                0 => None,
                1 => Some(Side::Black),
                _ => Some(Side::White),
            };
            board.set(sq, occupant);
        }
        board
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        // Shrink by emptying one occupied square at a time.
        let board = *self;
        Box::new(board.occupied().into_iter().map(move |sq| {
            let mut smaller = board;
            smaller.set(sq, None);
            smaller
        }))
    }
}
