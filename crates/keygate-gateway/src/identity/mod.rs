//! Identity layer: the external identity-store contract, an in-memory store,
//! and the resolver that turns credentials into typed principals.

pub mod memory;
pub mod resolver;
pub mod store;

pub use memory::InMemoryIdentityStore;
pub use resolver::{IdentityResolver, ResolveError};
pub use store::{ApiKeyRecord, IdentityStore, SessionRecord, StoreError, UserRecord};
