use thiserror::Error;

use crate::facility::FacilityLevel;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum FacilityError {
    #[error("facility path sets {level} without its parent {missing}")]
    PathGap {
        level: FacilityLevel,
        missing: FacilityLevel,
    },
}

pub type FacilityResult<T> = Result<T, FacilityError>;
