//! Concurrent fetcher

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{FetchFailure, FetchFailures};
use crate::pool::WorkerPool;
use crate::schema::SecretRequests;
use crate::secrets::SecretStore;

/// Configuration path to resolved secret value
pub type FlatValues = BTreeMap<String, String>;

/// Fetch every requested secret through the pool
///
/// Issues exactly one store call per request. A failure never cancels the
/// other lookups; once all of them have finished, any failures are returned
/// together and no values are.
pub fn fetch_secrets(
    store: &dyn SecretStore,
    project: &str,
    requests: &SecretRequests,
    pool: &WorkerPool,
) -> Result<FlatValues, FetchFailures> {
    let jobs: Vec<(&String, &String)> = requests.iter().collect();
    debug!(store = store.name(), project, count = jobs.len(), "fetching secrets");

    let outcomes = pool.run(jobs, |(path, identifier)| {
        let outcome = store.fetch_string(project, identifier);
        (path, identifier, outcome)
    });

    let mut values = FlatValues::new();
    let mut failures = Vec::new();
    for (path, identifier, outcome) in outcomes {
        match outcome {
            Ok(value) => {
                values.insert(path.clone(), value);
            }
            Err(error) => {
                warn!(secret = %identifier, path = %path, error = %error, "failed to fetch secret");
                failures.push(FetchFailure {
                    identifier: identifier.clone(),
                    path: path.clone(),
                    error,
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(values)
    } else {
        Err(FetchFailures::new(failures))
    }
}
