use thiserror::Error;

use crate::types::IdentityType;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("unknown identity type '{0}'")]
    UnknownType(String),

    #[error("unknown wire variant '{0}'")]
    UnknownVariant(String),

    #[error("unknown identity schema '{0}'")]
    UnknownSchema(String),

    #[error("identity type {kind} is not supported here, expected one of: {allowed}")]
    UnsupportedType { kind: IdentityType, allowed: String },

    #[error("at most one `identity` block may be specified, got {0}")]
    TooManyBlocks(usize),

    #[error("`identity_ids` can only be specified when `type` includes `UserAssigned`")]
    IdentityIdsNotAllowed,

    #[error("`identity_ids` must be specified when `type` includes `UserAssigned`")]
    IdentityIdsRequired,

    #[error("`{field}` must be empty when `type` is {kind}")]
    Inconsistent { field: &'static str, kind: IdentityType },

    #[error("decoding {variant} payload: {source}")]
    Decode {
        variant: String,
        #[source]
        source: serde_json::Error,
    },
}
