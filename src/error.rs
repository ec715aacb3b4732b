use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// `backward` was called on a layer whose forward cache is empty.
    #[error("backward called on {layer} layer before any forward pass")]
    UnpreparedLayer { layer: &'static str },

    #[error("shape mismatch in {operation}: {left:?} and {right:?}")]
    ShapeMismatch {
        operation: &'static str,
        left: Vec<usize>,
        right: Vec<usize>,
    },

    #[error("empty batch reached {operation}")]
    EmptyBatch { operation: &'static str },

    #[error("snapshot entry {index} does not fit the {layer} layer at that position")]
    SnapshotMismatch { index: usize, layer: &'static str },

    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn shape_mismatch(operation: &'static str, left: &[usize], right: &[usize]) -> Self {
        Self::ShapeMismatch {
            operation,
            left: left.to_vec(),
            right: right.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_names_both_shapes() {
        let err = Error::shape_mismatch("dense forward", &[2, 3], &[4, 5]);
        assert_eq!(
            "shape mismatch in dense forward: [2, 3] and [4, 5]",
            err.to_string()
        );
    }
}
