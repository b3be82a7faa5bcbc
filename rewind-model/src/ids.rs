use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Strongly typed ID for viewers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ViewerID(pub Uuid);

impl Default for ViewerID {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerID {
    pub fn new() -> Self {
        ViewerID(Uuid::now_v7())
    }

    pub fn from_string(id: &str) -> Result<Self, ModelError> {
        let uuid = id
            .parse()
            .map_err(|_| ModelError::InvalidId(format!("viewer id `{id}` is not a uuid")))?;
        Ok(ViewerID(uuid))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for ViewerID {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for ViewerID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly typed ID for catalog videos
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VideoID(pub Uuid);

impl Default for VideoID {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoID {
    pub fn new() -> Self {
        VideoID(Uuid::now_v7())
    }

    pub fn from_string(id: &str) -> Result<Self, ModelError> {
        let uuid = id
            .parse()
            .map_err(|_| ModelError::InvalidId(format!("video id `{id}` is not a uuid")))?;
        Ok(VideoID(uuid))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for VideoID {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for VideoID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
