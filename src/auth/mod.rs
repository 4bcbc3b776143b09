pub(crate) mod extractors;
pub mod identity;

pub use extractors::BearerToken;
pub use identity::{IdentityProvider, SupabaseIdentity};
