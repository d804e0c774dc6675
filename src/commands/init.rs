//! Implementation of the `taskgate init` command.
//!
//! Creates `.taskgate/` with a config. If the checklist already exists, a
//! schema is inferred from it and stored so that later invocations parse the
//! project's own layout instead of the built-in one.
//!
//! Idempotent: an existing config is left alone unless `--force` is given.

use crate::cli::InitArgs;
use crate::config::Config;
use crate::context::resolve_context;
use crate::error::{Result, TaskgateError};
use crate::infer;

/// Execute the `taskgate init` command.
pub fn cmd_init(args: InitArgs) -> Result<()> {
    let ctx = resolve_context()?;
    let config_path = ctx.config_path();

    if config_path.exists() && !args.force {
        println!("taskgate already initialized.");
        println!();
        println!("Config: {}", config_path.display());
        println!("Use `taskgate init --force` to recreate it.");
        return Ok(());
    }

    std::fs::create_dir_all(&ctx.state_dir).map_err(|e| TaskgateError::io(&ctx.state_dir, e))?;

    let mut config = Config {
        task_file: args.task_file,
        ..Config::default()
    };
    config.validate()?;

    let task_file = ctx.task_file_path(&config);
    let inferred = if task_file.exists() {
        let text = ctx.read_task_file(&config)?;
        let inference = infer::infer_with_report(&text);
        let summary = format!(
            "{} (confidence {:.1}, {} of {} ids recovered)",
            inference.schema.format_type,
            inference.schema.confidence,
            inference.recovered_ids.len(),
            inference.detected_ids.len()
        );
        config.set_schema(&inference.schema)?;
        Some(summary)
    } else {
        None
    };

    config.save(&config_path)?;

    println!("Initialized taskgate.");
    println!();
    println!("State directory: {}", ctx.state_dir.display());
    println!("Checklist:       {}", config.task_file);
    match inferred {
        Some(summary) => println!("Schema:          inferred, {}", summary),
        None => println!("Schema:          built-in default (checklist not found yet)"),
    }
    println!();
    println!("Declare work with `taskgate scope set <TASK-ID>`.");

    Ok(())
}
