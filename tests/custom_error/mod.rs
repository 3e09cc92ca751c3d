#[derive(Debug, thiserror::Error)]
#[error("custom error occurred: {0}")]
pub struct CustomError(pub &'static str);
