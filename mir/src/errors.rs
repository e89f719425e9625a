//! Erasure failures. Terms are carried pre-rendered so the error is `Send`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EraseError {
    #[error("Unbound reference: '{0}'.")]
    UnboundReference(String),
    #[error("Unbound variable: '{0}'.")]
    UnboundVariable(String),
    #[error("Non-function application: {0}")]
    NonFunctionApplication(String),
    #[error("Lambda has a non-function type: {0}")]
    LambdaNotFunction(String),
    #[error("Can't infer: {0}")]
    CannotInfer(String),
    #[error("Unknown main definition: '{0}'.")]
    UnknownMain(String),
    #[error("In definition '{name}': {source}")]
    InDefinition {
        name: String,
        source: Box<EraseError>,
    },
}

impl EraseError {
    pub fn in_definition(self, name: &str) -> Self {
        EraseError::InDefinition {
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// The failure itself, without the definitions it was raised in.
    pub fn root(&self) -> &EraseError {
        match self {
            EraseError::InDefinition { source, .. } => source.root(),
            other => other,
        }
    }
}
