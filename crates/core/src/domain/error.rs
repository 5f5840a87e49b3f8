// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("argument list is empty")]
    EmptyArgv,
}

pub type Result<T> = std::result::Result<T, DomainError>;
