//! Implementation of the `taskgate infer` command.

use crate::cli::InferArgs;
use crate::context::resolve_context;
use crate::error::{Result, TaskgateError};
use crate::infer;

/// Execute the `taskgate infer` command.
///
/// Prints the inferred schema as YAML on stdout and a short report on
/// stderr. With `--write` the schema is stored in the project config.
pub fn cmd_infer(args: InferArgs) -> Result<()> {
    let sample =
        std::fs::read_to_string(&args.file).map_err(|e| TaskgateError::io(&args.file, e))?;
    let inference = infer::infer_with_report(&sample);

    print!("{}", inference.schema.to_yaml()?);

    eprintln!(
        "format: {}  confidence: {:.2}  match rate: {:.0}% ({} of {} ids)",
        inference.schema.format_type,
        inference.schema.confidence,
        inference.match_rate * 100.0,
        inference.recovered_ids.len(),
        inference.detected_ids.len()
    );

    if args.write {
        let ctx = resolve_context()?;
        let mut config = ctx.load_config()?;
        config.set_schema(&inference.schema)?;
        config.save(ctx.config_path())?;
        eprintln!("Stored schema in {}", ctx.config_path().display());
    }

    Ok(())
}
