//! Implementation of the `taskgate schema` subcommands.

use crate::cli::SchemaValidateArgs;
use crate::context::require_initialized_project;
use crate::error::Result;
use crate::infer;
use crate::schema::Schema;

/// Execute `taskgate schema show`: print the effective schema.
pub fn cmd_schema_show() -> Result<()> {
    let ctx = require_initialized_project()?;
    let config = ctx.load_config()?;

    match config.schema()? {
        Some(schema) => print!("{}", schema.to_yaml()?),
        None => {
            println!("# built-in default (no schema configured)");
            print!("{}", Schema::builtin_default().to_yaml()?);
        }
    }
    Ok(())
}

/// Execute `taskgate schema validate`.
///
/// Fails with the schema-invalid exit code when the configured schema does
/// not compile. A low match rate is reported, not treated as failure.
pub fn cmd_schema_validate(args: SchemaValidateArgs) -> Result<()> {
    let ctx = require_initialized_project()?;
    let mut config = ctx.load_config()?;
    let schema = config.schema()?.unwrap_or_else(Schema::builtin_default);
    let text = ctx.read_task_file(&config)?;

    let inference = infer::revalidate(&schema, &text)?;

    println!("Schema is valid.");
    println!(
        "Recovered {} of {} task ids ({:.0}%), confidence {:.1}.",
        inference.recovered_ids.len(),
        inference.detected_ids.len(),
        inference.match_rate * 100.0,
        inference.schema.confidence
    );
    let missing: Vec<&String> = inference
        .detected_ids
        .iter()
        .filter(|id| !inference.recovered_ids.contains(id))
        .collect();
    if !missing.is_empty() {
        println!(
            "Not parsed as tasks: {}",
            missing
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    if args.write {
        config.set_schema(&inference.schema)?;
        config.save(ctx.config_path())?;
        println!("Updated {}", ctx.config_path().display());
    }

    Ok(())
}
