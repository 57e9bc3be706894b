/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, z)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Moore neighborhood, used for mine counts, flood fill and chording.
const MOORE: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Orthogonal neighborhood, used only for the walkability check at generation time.
const ORTHOGONAL: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (isize, isize), bounds: Coord2) -> Option<Coord2> {
    let (x, z) = coords;
    let (dx, dz) = delta;
    let (max_x, max_z) = bounds;

    let next_x = x.checked_add_signed(dx.try_into().ok()?)?;
    if next_x >= max_x {
        return None;
    }

    let next_z = z.checked_add_signed(dz.try_into().ok()?)?;
    if next_z >= max_z {
        return None;
    }

    Some((next_x, next_z))
}

/// Iterates the in-bounds neighbors of a cell. Edge neighbors are absent, never wrapped.
#[derive(Debug, Clone)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    displacements: &'static [(isize, isize)],
    index: u8,
}

impl NeighborIter {
    /// Up to 8 horizontally, vertically and diagonally adjacent cells.
    pub fn moore(center: Coord2, bounds: Coord2) -> Self {
        Self::with_displacements(center, bounds, &MOORE)
    }

    /// Up to 4 horizontally and vertically adjacent cells.
    pub fn orthogonal(center: Coord2, bounds: Coord2) -> Self {
        Self::with_displacements(center, bounds, &ORTHOGONAL)
    }

    fn with_displacements(
        center: Coord2,
        bounds: Coord2,
        displacements: &'static [(isize, isize)],
    ) -> Self {
        Self {
            center,
            bounds,
            displacements,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let delta = *self.displacements.get(usize::from(self.index))?;
            self.index += 1;

            if let Some(next_item) = apply_delta(self.center, delta, self.bounds) {
                return Some(next_item);
            }
        }
    }
}
