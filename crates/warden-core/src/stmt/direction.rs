#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn from_desc(desc: bool) -> Direction {
        if desc {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }

    pub fn is_desc(self) -> bool {
        matches!(self, Direction::Desc)
    }
}
