use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use secretree_core::rpc::list_rpc_endpoints;
use secretree_core::{
    create_secret_store, get_rpc_endpoint, list_secret_stores, skip_keys, walk, ChainSecretStore,
    KeyRemapper, RpcSecretStore, SchemaDocument, SecretResolver, SecretStore,
};

use crate::cli::{DiscoverOpts, OutputFormat, ResolveOpts};

/// Build the store the resolve command fetches from
pub fn select_store(opts: &ResolveOpts) -> Result<Arc<dyn SecretStore>> {
    if let Some(socket) = &opts.socket {
        let token = opts
            .token
            .as_deref()
            .ok_or_else(|| anyhow!("--socket requires --token (or SECRETREE_RPC_TOKEN)"))?;
        debug!(socket = %socket.display(), "using RPC secret provider");
        return Ok(Arc::new(RpcSecretStore::from_parts(
            "socket",
            socket.to_string_lossy(),
            token,
        )));
    }

    let mut stores = opts
        .stores
        .iter()
        .map(|name| store_by_name(name))
        .collect::<Result<Vec<_>>>()?;

    match stores.len() {
        0 => bail!("no secret store selected"),
        1 => Ok(stores.remove(0)),
        _ => Ok(Arc::new(ChainSecretStore::new(stores))),
    }
}

fn store_by_name(name: &str) -> Result<Arc<dyn SecretStore>> {
    if let Some(endpoint) = name.strip_prefix("rpc:") {
        let endpoint = get_rpc_endpoint(endpoint)
            .ok_or_else(|| anyhow!("unknown RPC endpoint '{}'", endpoint))?;
        return Ok(Arc::new(RpcSecretStore::new(&endpoint)));
    }
    create_secret_store(name)
        .ok_or_else(|| anyhow!("unknown secret store '{}' (see `secretree stores`)", name))
}

fn load_schema(opts_schema: &std::path::Path) -> Result<SchemaDocument> {
    SchemaDocument::from_path(opts_schema)
        .with_context(|| format!("could not read schema {}", opts_schema.display()))
}

/// Resolve the schema and render the nested tree
pub fn resolve(opts: &ResolveOpts, store: Arc<dyn SecretStore>) -> Result<String> {
    let schema = load_schema(&opts.schema)?;

    let mut resolver = SecretResolver::new(store, opts.project.as_str())
        .with_delimiter(opts.delimiter.as_str())
        .with_concurrency(opts.concurrency)
        .with_skip_keys(opts.skip.iter().cloned());
    if opts.lowercase_keys {
        resolver = resolver.with_remapper(KeyRemapper::lowercase());
    }

    let tree = resolver.resolve(&schema)?;
    render(&Value::Object(tree), opts.format)
}

/// Render the secret requests of a schema
pub fn discover(opts: &DiscoverOpts) -> Result<String> {
    let schema = load_schema(&opts.schema)?;
    let skip: BTreeSet<String> = opts.skip.iter().cloned().collect();
    let requests = skip_keys(walk(&schema, &opts.delimiter)?, &skip);
    render(&requests, opts.format)
}

/// One line per registered store and RPC endpoint
pub fn stores() -> String {
    let mut lines: Vec<String> = list_secret_stores()
        .into_iter()
        .map(|(name, description)| format!("{:<12} {}", name, description))
        .collect();
    for endpoint in list_rpc_endpoints() {
        lines.push(format!("{:<12} RPC secret provider", format!("rpc:{}", endpoint)));
    }
    lines.join("\n")
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    })
}
