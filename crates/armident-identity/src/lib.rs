pub mod error;
pub mod schema;
pub mod types;
pub mod wire;


pub use error::IdentityError;
pub use schema::{IdentityBlock, SchemaKind};
pub use types::{expand_optional, ExpandedConfig, Identity, IdentityType};
pub use wire::{
    normalize_json, SystemAssignedIdentity, SystemUserAssignedIdentityList,
    SystemUserAssignedIdentityMap, UserAssignedIdentityDetails, UserAssignedIdentityList,
    UserAssignedIdentityMap, UserAssignedIdentityReference, WireIdentity, WireVariant,
};
