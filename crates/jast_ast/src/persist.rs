//! Whole-tree save and restore.
//!
//! Trees are stored as JSON. The format follows the node definitions of the
//! running build; restoring data written by a build with different node
//! definitions is not supported.

use crate::node::AstNode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to encode tree: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode tree: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Serialize `node` and everything below it.
pub fn save<T: AstNode>(node: &T) -> Result<String, PersistError> {
    serde_json::to_string(node).map_err(PersistError::Encode)
}

/// Rebuild a tree previously written by [`save`].
///
/// Long operator chains nest deeper than `serde_json`'s default limit, so
/// the limit is lifted and the stack is grown on demand instead.
pub fn restore<T: AstNode>(data: &str) -> Result<T, PersistError> {
    let mut deserializer = serde_json::Deserializer::from_str(data);
    deserializer.disable_recursion_limit();
    let node = T::deserialize(serde_stacker::Deserializer::new(&mut deserializer)).map_err(PersistError::Decode)?;
    deserializer.end().map_err(PersistError::Decode)?;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::*;
    use jast_core::Position;

    #[test]
    fn test_restore_keeps_structure_and_positions() {
        let import = Import {
            path: "java.util".into(),
            r#static: false,
            wildcard: true,
            position: Some(Position::new(1, 1)),
        };
        let data = save(&import).unwrap();
        assert!(data.contains("\"static\":false"));
        let back: Import = restore(&data).unwrap();
        assert_eq!(back, import);
        assert_eq!(back.position, Some(Position::new(1, 1)));
    }

    #[test]
    fn test_restore_rejects_trailing_data() {
        let data = save(&InferredFormalParameter { name: "x".into(), position: None }).unwrap();
        let result = restore::<InferredFormalParameter>(&format!("{data} {data}"));
        assert!(matches!(result, Err(PersistError::Decode(_))));
    }

    #[test]
    fn test_restore_wrong_kind_fails() {
        let data = save(&InferredFormalParameter { name: "x".into(), position: None }).unwrap();
        assert!(matches!(restore::<Import>(&data), Err(PersistError::Decode(_))));
    }
}
