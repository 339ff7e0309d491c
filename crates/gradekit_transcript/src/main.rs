use anyhow::{Context, Result};
use clap::Parser;

use gradekit_log::{derive_level_from_verbosity, init_logging};
use gradekit_transcript::{CliArgs, convert};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(derive_level_from_verbosity(args.verbose))
        .context("Failed to initialize logging")?;

    let options = args.to_convert_options();
    let report = convert(&options).with_context(|| {
        format!(
            "Export {} -> {} failed",
            options.path_file_in.display(),
            options.path_file_out.display()
        )
    })?;

    println!("{}", report.format_confirmation());
    Ok(())
}
