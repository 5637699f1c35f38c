use serde::{Deserialize, Serialize};

use super::ObjectId;

/// Reference to a stored image. The bytes live in the image store; only identity and metadata are kept here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: ObjectId,
    pub title: String,
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInput {
    pub title: String,
    pub file: String,
}
