/// Errors raised while building a height field or a green session.
///
/// Everything past construction degrades to documented fallbacks instead of
/// failing, so this enum stays small.
#[derive(Debug, Clone, PartialEq)]
pub enum TerrainError {
    /// The grid needs at least one row and one column of cells.
    InvalidGrid { rows: usize, cols: usize },
    /// Physical size must be positive and finite.
    InvalidExtent { width: f32, depth: f32 },
    /// A heights buffer does not match the grid's vertex count.
    HeightCountMismatch { expected: usize, actual: usize },
    InvalidConfig(String),
}

impl std::fmt::Display for TerrainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerrainError::InvalidGrid { rows, cols } => {
                write!(f, "Invalid grid: {} rows x {} cols", rows, cols)
            }
            TerrainError::InvalidExtent { width, depth } => {
                write!(f, "Invalid field extent: {} x {}", width, depth)
            }
            TerrainError::HeightCountMismatch { expected, actual } => write!(
                f,
                "Height count mismatch: expected {} vertices, got {}",
                expected, actual
            ),
            TerrainError::InvalidConfig(message) => write!(f, "Invalid config: {}", message),
        }
    }
}

impl std::error::Error for TerrainError {}

pub type Result<T> = std::result::Result<T, TerrainError>;
