use thiserror::Error;

#[derive(Error, Debug)]
pub enum VellumError {
    /// Byte sink failed while dumping a range.
    #[error("sink error: {0}")]
    Sink(#[from] std::io::Error),
}
