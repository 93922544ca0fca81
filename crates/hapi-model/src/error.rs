use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("admin level {0} not one of 'national', 'adminone', 'admintwo'")]
    InvalidGranularity(String),
    #[error("admin level {0} not one of '1', '2'")]
    InvalidAdminLevel(String),
    #[error("HXL tag {0} not in valid format")]
    InvalidHxlTag(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
