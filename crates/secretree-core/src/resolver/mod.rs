//! Secret resolution pipeline
//!
//! Stages, in order:
//! 1. schema walk (see `crate::schema`)
//! 2. `skip_keys` drops paths an earlier layer already populated
//! 3. `fetch_secrets` looks up each remaining secret through a `WorkerPool`
//! 4. `KeyRemapper` rewrites resolved paths
//! 5. `unflatten` expands the flat paths into a nested tree
//!
//! `SecretResolver` runs all of them for one schema.

mod fetch;
mod merge;
mod remap;
mod secret_resolver;
mod skip;

pub use fetch::{fetch_secrets, FlatValues};
pub use merge::{deep_merge, flatten, unflatten};
pub use remap::KeyRemapper;
pub use secret_resolver::{SecretResolver, DEFAULT_DELIMITER};
pub use skip::skip_keys;
