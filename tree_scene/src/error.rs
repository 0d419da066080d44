use thiserror::Error;

use hand_gesture::LandmarkError;
use particle_field::FieldError;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("window error: {0}")]
    Window(String),

    #[error("landmark provider failed to start: {0}")]
    ProviderInit(String),

    #[error("landmark detection failed: {0}")]
    Detection(String),

    #[error("image {reference:?} unavailable: {reason}")]
    Image { reference: String, reason: String },

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Landmarks(#[from] LandmarkError),
}

pub type Result<T> = std::result::Result<T, SceneError>;
