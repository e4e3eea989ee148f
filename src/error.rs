use crate::datasource::DataSourceError;

/// Errors surfaced to the caller of a most-active query
#[derive(Debug)]
pub enum ActivityError {
    /// The requested day is not a valid `YYYY-MM-DD` calendar date
    InvalidInput(String),
    DataSource(DataSourceError),
}

impl From<DataSourceError> for ActivityError {
    fn from(err: DataSourceError) -> Self {
        ActivityError::DataSource(err)
    }
}

impl std::fmt::Display for ActivityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityError::InvalidInput(day) => write!(f, "Cannot parse date: {}", day),
            ActivityError::DataSource(e) => write!(f, "Data source error: {}", e),
        }
    }
}

impl std::error::Error for ActivityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ActivityError::InvalidInput(_) => None,
            ActivityError::DataSource(e) => Some(e),
        }
    }
}
