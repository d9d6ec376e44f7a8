/// Cube faces in atlas/texture order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    Back = 0,
    Front = 1,
    Top = 2,
    Bottom = 3,
    Left = 4,
    Right = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Back,
        Face::Front,
        Face::Top,
        Face::Bottom,
        Face::Left,
        Face::Right,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(i: usize) -> Face {
        match i {
            0 => Face::Back,
            1 => Face::Front,
            2 => Face::Top,
            3 => Face::Bottom,
            4 => Face::Left,
            _ => Face::Right,
        }
    }

    /// Offset to the neighbouring cell across this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::Back => (0, 0, -1),
            Face::Front => (0, 0, 1),
            Face::Top => (0, 1, 0),
            Face::Bottom => (0, -1, 0),
            Face::Left => (-1, 0, 0),
            Face::Right => (1, 0, 0),
        }
    }
}
