use std::fmt;

/// Signed table reference shared by parent imports, export classes and file data
///
/// On disk it is a single `i32`: `0` is no reference, a negative value `v`
/// points at import `-v - 1`, and a positive value is carried through as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PackageIndex {
    #[default]
    None,
    /// Positive value stored directly
    Direct(i32),
    /// Zero-based position in the Import Table
    Import(usize),
}

impl PackageIndex {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::None,
            v if v > 0 => Self::Direct(v),
            // -(v + 1) never overflows for negative v
            v => Self::Import((-(v + 1)) as usize),
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Direct(v) => v,
            Self::Import(index) => -(index as i32) - 1,
        }
    }

    /// Reference to import `index`
    pub fn import(index: usize) -> Self {
        Self::Import(index)
    }

    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Import Table position, if this is an import reference
    pub fn as_import(self) -> Option<usize> {
        match self {
            Self::Import(index) => Some(index),
            _ => None,
        }
    }
}

impl fmt::Display for PackageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Direct(v) => write!(f, "{}", v),
            Self::Import(index) => write!(f, "import[{}]", index),
        }
    }
}
