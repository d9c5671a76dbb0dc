pub mod resolver;
pub mod table;

pub use crate::resolver::IdentityResolver;
pub use crate::table::{AliasEntry, AliasTable, CanonicalIdentity};
