use anyhow::Result;
use clap::Parser;
use console::style;
use std::time::Instant;

use image_enhancer::cli::Args;
use image_enhancer::image_processing::{BatchOutcome, BatchRunner, BatchSummary};
use image_enhancer::json_output::JsonMessage;
use image_enhancer::utils::{
    create_progress_bar, error_println, format_duration, validate_inputs, verbose_println,
    warn_println,
};

fn print_configuration(args: &Args, runner: &BatchRunner) {
    let config = runner.config();
    println!("{}", style("Configuration:").bold());
    println!("  Inputs: {:?}", args.input_paths);
    println!("  Output directory: {}", config.output_dir.display());
    println!("  Enhancement: {}", runner.enhancer());
    println!("  Output naming: {}", config.naming);
    println!("  Recursive scan: {}", args.recursive);
    println!("  Parallel jobs: {}", config.jobs);
    if config.dry_run {
        println!("  Dry run mode: enabled (simulation only - no files will be created)");
    }
    println!();
}

fn styled_status_line(outcome: &BatchOutcome) -> String {
    let line = outcome.status_line();
    match outcome {
        BatchOutcome::Succeeded { note: None, .. } => style(line).green().to_string(),
        BatchOutcome::Succeeded { .. } | BatchOutcome::Skipped { .. } => {
            style(line).yellow().to_string()
        }
        BatchOutcome::Failed { .. } => style(line).red().to_string(),
    }
}

fn print_summary(summary: &BatchSummary, args: &Args) {
    let header = if args.dry_run {
        style("Dry Run Results Summary:").bold().cyan()
    } else {
        style("Results Summary:").bold().green()
    };
    println!("{}", header);

    let processed_label = if args.dry_run {
        "Would be processed"
    } else {
        "Successfully processed"
    };
    println!(
        "  {}: {}",
        processed_label,
        style(summary.succeeded).bold().green()
    );
    if summary.skipped > 0 {
        println!(
            "  Skipped (not readable as images): {}",
            style(summary.skipped).bold().yellow()
        );
    }
    if summary.failed > 0 {
        println!("  Failed: {}", style(summary.failed).bold().red());
    }
    println!("  Success rate: {:.1}%", summary.success_rate());

    println!();
    println!("{}", style("Performance:").bold().blue());
    println!(
        "  Total processing time: {}",
        style(format_duration(summary.total_duration)).bold()
    );
    println!(
        "  Average time per image: {}",
        style(format_duration(summary.average_duration())).dim()
    );

    println!();
    let location_label = if args.dry_run {
        "Would be saved to"
    } else {
        "Output directory"
    };
    println!("  {}: {}", location_label, args.output_dir.display());
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    let mut args = Args::parse();
    args.load_and_merge_config()?;

    let json_mode = args.json_progress;

    if !json_mode {
        println!("{}", style("Image Enhancer").bold().blue());
        println!("{}", style("Batch local contrast and saturation enhancement").dim());
        println!();
    }

    if let Err(e) = validate_inputs(&args) {
        if json_mode {
            JsonMessage::error(e.to_string());
        } else {
            error_println(&e.to_string());
        }
        std::process::exit(2);
    }

    if !json_mode {
        for warning in args.parameter_warnings() {
            warn_println(&warning);
        }
    }

    let runner = BatchRunner::new(args.enhancer(), args.batch_config());
    if args.verbose && !json_mode {
        print_configuration(&args, &runner);
    }

    let input = args.input_spec();
    let progress_bar = if json_mode {
        None
    } else {
        let pb = create_progress_bar(0);
        pb.set_message("Enhancing images");
        Some(pb)
    };

    let result = runner.run_with_progress(&input, |outcome, done, total| {
        if json_mode {
            JsonMessage::outcome(outcome);
            JsonMessage::progress(done, total, format!("Processed {}", outcome.source().display()));
        } else if let Some(pb) = &progress_bar {
            pb.set_length(total as u64);
            pb.println(styled_status_line(outcome));
            pb.set_position(done as u64);
        }
    });

    let outcomes = match result {
        Ok(outcomes) => outcomes,
        Err(e) => {
            if let Some(pb) = &progress_bar {
                pb.finish_and_clear();
            }
            if json_mode {
                JsonMessage::error(e.to_string());
            } else {
                error_println(&e.to_string());
            }
            std::process::exit(1);
        }
    };

    if let Some(pb) = &progress_bar {
        pb.finish_with_message("Processing complete");
        println!();
    }

    let summary = BatchSummary::from_outcomes(&outcomes, start_time.elapsed());
    if json_mode {
        JsonMessage::summary(&summary);
    } else {
        verbose_println(
            args.verbose,
            &format!("Batch finished in {}", format_duration(summary.total_duration)),
        );
        print_summary(&summary, &args);
    }

    Ok(())
}
