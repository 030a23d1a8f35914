//! Resolve command - look up the remote digest of a single image

use anyhow::{Context, Result};
use serde::Serialize;
use tagwatch_image::{DigestSource, ImageReference, RegistryClient, RegistryFamily};

use crate::cli::{FormatArg, GlobalOpts, ResolveArgs};
use crate::commands::load_config;
use crate::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Resolution {
    reference: String,
    registry: String,
    family: RegistryFamily,
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<DigestSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn run(args: ResolveArgs, global: &GlobalOpts) -> Result<()> {
    let mut config = load_config(global)?;
    if let Some(timeout) = args.timeout {
        config.network.request_timeout_secs = timeout;
    }

    let client = RegistryClient::with_settings(config.registry_settings())
        .context("Failed to create registry client")?;

    let reference = ImageReference::parse(&args.image);
    let family = RegistryFamily::of(&reference);

    let token = client.obtain_token(&family, &reference.repository).await;
    let resolved = client
        .resolve_digest(&family, &reference.repository, &reference.tag, token.as_ref())
        .await;

    let resolution = Resolution {
        reference: reference.to_string(),
        registry: reference.registry.clone(),
        family,
        authenticated: token.is_some(),
        token_scope: token.as_ref().map(|t| t.scope().to_string()),
        digest: resolved.as_ref().ok().map(|r| r.digest.to_string()),
        source: resolved.as_ref().ok().map(|r| r.source),
        error: resolved.as_ref().err().map(|e| e.to_string()),
    };

    match args.format {
        FormatArg::Json => println!("{}", serde_json::to_string_pretty(&resolution)?),
        FormatArg::Yaml => print!("{}", serde_yaml_ng::to_string(&resolution)?),
        FormatArg::Human => print_human(&resolution),
    }

    resolved
        .map(|_| ())
        .with_context(|| format!("Could not resolve {}", resolution.reference))
}

fn print_human(resolution: &Resolution) {
    output::header(&resolution.reference);
    output::kv("Family", &resolution.family.to_string());
    let token = match &resolution.token_scope {
        Some(scope) => format!("obtained for {}", scope),
        None => "none (anonymous)".to_string(),
    };
    output::kv("Token", &token);

    if let Some(digest) = &resolution.digest {
        output::kv("Digest", digest);
    }
    if let Some(source) = resolution.source {
        output::kv("Source", &source.to_string());
        if !source.is_authoritative() {
            output::warning(
                "Digest computed from the manifest body; it may differ from the registry's own",
            );
        }
    }
}
