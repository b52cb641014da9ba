use std::sync::LazyLock;

use crate::voxel::{offset_cell, Cell, DistanceGrid};

/// Constraint on one cell of a [`GridTemplate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mask {
    /// The cell does not take part in the match.
    Ignore,
    /// The cell must hold a voxel.
    Filled,
    /// The cell must be empty.
    Empty,
    /// At least one of the `AnyOf` cells must hold a voxel, unless all of them do.
    AnyOf,
}

use Mask::{AnyOf as X, Empty as W, Filled as B, Ignore as I};

/// The three diagonal reflections used to extend the base library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reflection {
    /// Swaps the `x` and `z` axes.
    SwapXZ,
    /// Reflects across the anti-diagonal of the `y`-`z` plane.
    AntiDiagonalYZ,
    /// Reflects across the anti-diagonal of the `x`-`y` plane.
    AntiDiagonalXY,
}

impl Reflection {
    pub const ALL: [Self; 3] = [Self::SwapXZ, Self::AntiDiagonalYZ, Self::AntiDiagonalXY];
}

/// Coordinate plane a template is mirrored over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorPlane {
    /// Flips `z`.
    XY,
    /// Flips `y`.
    XZ,
    /// Flips `x`.
    YZ,
}

/// The eight thinning directions, named up/down, north/south, east/west
/// after the octant a set peels away from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Usw,
    Use,
    Unw,
    Une,
    Dsw,
    Dse,
    Dnw,
    Dne,
}

impl Direction {
    /// Order in which the sets are applied within one thinning cycle.
    pub const THINNING_ORDER: [Self; 8] = [
        Self::Usw,
        Self::Dne,
        Self::Use,
        Self::Dnw,
        Self::Une,
        Self::Dsw,
        Self::Unw,
        Self::Dse,
    ];

    fn slot(self) -> usize {
        match self {
            Self::Usw => 0,
            Self::Use => 1,
            Self::Unw => 2,
            Self::Une => 3,
            Self::Dsw => 4,
            Self::Dse => 5,
            Self::Dnw => 6,
            Self::Dne => 7,
        }
    }
}

/// A 3x3x3 hit-and-miss pattern centred on a voxel, indexed `[x][y][z]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridTemplate {
    mask: [[[Mask; 3]; 3]; 3],
}

impl GridTemplate {
    #[must_use]
    pub const fn new(mask: [[[Mask; 3]; 3]; 3]) -> Self {
        Self { mask }
    }

    /// Matches a lone voxel with no occupied neighbour.
    #[must_use]
    pub const fn neighbor_less() -> Self {
        Self::new([[[W; 3]; 3], [[W; 3], [W, B, W], [W; 3]], [[W; 3]; 3]])
    }

    #[must_use]
    pub fn mask(&self) -> &[[[Mask; 3]; 3]; 3] {
        &self.mask
    }

    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Mask {
        self.mask[x][y][z]
    }

    fn map(&self, source: impl Fn(usize, usize, usize) -> (usize, usize, usize)) -> Self {
        let mut mask = [[[I; 3]; 3]; 3];
        for (x, plane) in mask.iter_mut().enumerate() {
            for (y, row) in plane.iter_mut().enumerate() {
                for (z, cell) in row.iter_mut().enumerate() {
                    let (sx, sy, sz) = source(x, y, z);
                    *cell = self.mask[sx][sy][sz];
                }
            }
        }
        Self { mask }
    }

    #[must_use]
    pub fn reflect(&self, reflection: Reflection) -> Self {
        match reflection {
            Reflection::SwapXZ => self.map(|x, y, z| (z, y, x)),
            Reflection::AntiDiagonalYZ => self.map(|x, y, z| (x, 2 - z, 2 - y)),
            Reflection::AntiDiagonalXY => self.map(|x, y, z| (2 - y, 2 - x, z)),
        }
    }

    #[must_use]
    pub fn mirror(&self, plane: MirrorPlane) -> Self {
        match plane {
            MirrorPlane::XY => self.map(|x, y, z| (x, y, 2 - z)),
            MirrorPlane::XZ => self.map(|x, y, z| (x, 2 - y, z)),
            MirrorPlane::YZ => self.map(|x, y, z| (2 - x, y, z)),
        }
    }

    /// Tests the template against the neighbourhood of `centre`.
    ///
    /// A voxel counts as filled when its distance value is nonzero. Cells
    /// outside the lattice read as empty.
    #[must_use]
    pub fn matches(&self, field: &DistanceGrid, centre: Cell) -> bool {
        let Some([ox, oy, oz]) = offset_cell(centre, [-1, -1, -1]) else {
            return false;
        };

        let mut any_of_present = false;
        let mut any_of_filled = false;
        for (x, plane) in self.mask.iter().enumerate() {
            for (y, row) in plane.iter().enumerate() {
                for (z, mask) in row.iter().enumerate() {
                    if *mask == I {
                        continue;
                    }
                    let filled = field.is_set([ox + x, oy + y, oz + z]);
                    match (*mask, filled) {
                        (W, true) | (B, false) => return false,
                        (X, true) => any_of_filled = true,
                        (X, false) => any_of_present = true,
                        _ => {}
                    }
                }
            }
        }
        !any_of_present || any_of_filled
    }
}

/// Base patterns of the up-south-west set before reflection.
const BASE_TEMPLATES: [[[[Mask; 3]; 3]; 3]; 7] = [
    [
        [[W, W, W], [W, W, W], [W, W, W]],
        [[W, X, X], [W, B, X], [W, W, W]],
        [[W, X, B], [W, X, X], [W, W, W]],
    ],
    [
        [[W, W, W], [W, W, W], [W, W, W]],
        [[X, X, X], [X, B, X], [W, W, W]],
        [[X, B, X], [X, X, X], [W, W, W]],
    ],
    [
        [[X, X, X], [X, X, X], [W, W, W]],
        [[X, B, X], [X, B, X], [W, W, W]],
        [[X, X, X], [X, X, X], [W, W, W]],
    ],
    [
        [[W, W, I], [W, W, I], [W, W, W]],
        [[W, W, B], [W, B, I], [W, W, W]],
        [[I, B, I], [I, I, I], [W, W, W]],
    ],
    [
        [[I, I, I], [I, I, I], [W, W, I]],
        [[I, B, I], [I, B, B], [W, W, I]],
        [[I, I, I], [I, I, I], [W, W, I]],
    ],
    [
        [[I, I, I], [I, I, I], [W, W, I]],
        [[I, B, I], [I, B, B], [W, W, I]],
        [[I, I, I], [I, B, I], [I, I, I]],
    ],
    [
        [[I, I, I], [I, I, I], [W, W, W]],
        [[I, B, I], [I, B, I], [W, W, W]],
        [[I, I, I], [I, I, B], [W, W, B]],
    ],
];

/// Extends `base` with every distinct diagonal reflection of its members.
#[must_use]
pub fn generate_reflections(base: &[GridTemplate]) -> Vec<GridTemplate> {
    let mut out = base.to_vec();
    for template in base {
        for reflection in Reflection::ALL {
            let reflected = template.reflect(reflection);
            if !out.contains(&reflected) {
                out.push(reflected);
            }
        }
    }
    out
}

fn mirror_all(set: &[GridTemplate], plane: MirrorPlane) -> Vec<GridTemplate> {
    set.iter().map(|t| t.mirror(plane)).collect()
}

/// The eight direction sets, built once per process.
struct TemplateLibrary {
    sets: [Vec<GridTemplate>; 8],
}

impl TemplateLibrary {
    fn build() -> Self {
        let base: Vec<GridTemplate> = BASE_TEMPLATES.iter().map(|m| GridTemplate::new(*m)).collect();
        let usw = generate_reflections(&base);
        let use_ = mirror_all(&usw, MirrorPlane::YZ);
        let unw = mirror_all(&usw, MirrorPlane::XY);
        let une = mirror_all(&unw, MirrorPlane::YZ);
        let dsw = mirror_all(&usw, MirrorPlane::XZ);
        let dse = mirror_all(&dsw, MirrorPlane::YZ);
        let dnw = mirror_all(&dsw, MirrorPlane::XY);
        let dne = mirror_all(&dnw, MirrorPlane::YZ);
        Self {
            sets: [usw, use_, unw, une, dsw, dse, dnw, dne],
        }
    }
}

static LIBRARY: LazyLock<TemplateLibrary> = LazyLock::new(TemplateLibrary::build);

/// Templates that mark a voxel removable when thinning towards `direction`.
#[must_use]
pub fn templates(direction: Direction) -> &'static [GridTemplate] {
    &LIBRARY.sets[direction.slot()]
}
