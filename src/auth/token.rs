//! Token secrets and the access/refresh pair persisted by token stores.

pub mod pair;
pub mod secret;
