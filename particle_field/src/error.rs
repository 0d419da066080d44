use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("field would contain no particles")]
    EmptyField,

    #[error("{base_count} base particles plus {images} images exceeds the {limit} particle limit")]
    TooManyParticles { base_count: usize, images: usize, limit: usize },

    #[error("invalid field parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f32 },
}

pub type Result<T> = std::result::Result<T, FieldError>;
