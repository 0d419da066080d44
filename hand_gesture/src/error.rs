use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandmarkError {
    #[error("expected {expected} landmarks, got {got}")]
    WrongCount { expected: usize, got: usize },

    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

pub type Result<T> = std::result::Result<T, LandmarkError>;
