//! Skip filter

use std::collections::BTreeSet;

use tracing::debug;

use crate::schema::SecretRequests;

/// Drop every request whose configuration path is already populated
pub fn skip_keys(mut requests: SecretRequests, skip: &BTreeSet<String>) -> SecretRequests {
    if skip.is_empty() {
        return requests;
    }
    let before = requests.len();
    requests.retain(|path, _| !skip.contains(path));
    debug!(skipped = before - requests.len(), remaining = requests.len(), "applied skip keys");
    requests
}
