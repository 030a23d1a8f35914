//! Parse command - show how a reference is split

use anyhow::Result;
use serde::Serialize;
use tagwatch_image::{ImageReference, RegistryFamily};

use crate::cli::ParseArgs;
use crate::output;

#[derive(Serialize)]
struct ParsedReference<'a> {
    input: &'a str,
    registry: &'a str,
    repository: &'a str,
    tag: &'a str,
    family: &'static str,
    scope: String,
    normalized: String,
}

pub fn run(args: ParseArgs) -> Result<()> {
    let reference = ImageReference::parse(&args.image);
    let family = RegistryFamily::of(&reference);

    if args.json {
        let parsed = ParsedReference {
            input: &args.image,
            registry: &reference.registry,
            repository: &reference.repository,
            tag: &reference.tag,
            family: family.name(),
            scope: reference.pull_scope(),
            normalized: reference.to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(());
    }

    output::header(&reference.to_string());
    output::kv("Registry", &reference.registry);
    output::kv("Repository", &reference.repository);
    output::kv("Tag", &reference.tag);
    output::kv("Family", &family.to_string());
    output::kv("Scope", &reference.pull_scope());

    Ok(())
}
