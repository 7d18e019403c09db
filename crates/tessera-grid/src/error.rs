//! Grid construction errors.

use std::error::Error;
use std::fmt;

/// Errors detected when constructing a grid geometry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// Either dimension is zero.
    EmptyGrid,
    /// A dimension exceeds the per-axis maximum.
    DimensionTooLarge {
        /// Which axis ("rows" or "cols").
        name: &'static str,
        /// The rejected value.
        value: u32,
        /// The per-axis maximum.
        max: u32,
    },
    /// The total cell count exceeds `u32::MAX`.
    CellCountOverflow {
        /// The overflowing product `rows * cols`.
        cells: u64,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "grid has zero cells"),
            Self::DimensionTooLarge { name, value, max } => {
                write!(f, "{name} = {value} exceeds maximum of {max}")
            }
            Self::CellCountOverflow { cells } => {
                write!(f, "cell count {cells} exceeds u32::MAX")
            }
        }
    }
}

impl Error for GridError {}
