use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("invalid code length {length}; expected {min}..={max}")]
    InvalidLength { length: usize, min: usize, max: usize },
    #[error("invalid prefix '{0}': must be at most 16 alphanumeric characters, hyphens, or underscores")]
    InvalidPrefix(String),
}
