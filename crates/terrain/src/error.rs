use foundation::bounds::Sector;

#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    EmptyDensity { rows: usize, columns: usize },
    InvalidSector(Sector),
    PostCountMismatch { expected: usize, actual: usize },
    NonFiniteElevation { index: usize },
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::EmptyDensity { rows, columns } => {
                write!(f, "terrain grid needs at least one cell: rows={rows} columns={columns}")
            }
            GridError::InvalidSector(s) => write!(
                f,
                "invalid terrain sector: lat {}..{} lon {}..{}",
                s.min_lat, s.max_lat, s.min_lon, s.max_lon
            ),
            GridError::PostCountMismatch { expected, actual } => {
                write!(f, "elevation post count mismatch: expected={expected} actual={actual}")
            }
            GridError::NonFiniteElevation { index } => {
                write!(f, "elevation post {index} is not finite")
            }
        }
    }
}

impl std::error::Error for GridError {}
