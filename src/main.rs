/*
    Project: logsift
    Context: Parallel boolean-expression log filter for plain and gzip
    compressed, multi-line, timestamped log records.

    Architecture:
    1. CLI Parsing (Clap)
    2. Configuration Builder (merges CLI with optional config file)
    3. Orchestrator (scan -> fan out -> aggregate -> write)
    4. Exit code mapping
*/

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

use logsift::cli::Cli;
use logsift::config::AppConfig;
use logsift::pipeline::Orchestrator;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let config = match AppConfig::from_cli(cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("logsift: {err}");
            return ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1));
        }
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&interrupted);
    if let Err(err) = ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    }) {
        log::warn!("could not install Ctrl-C handler: {err}");
    }

    let show_stats = config.output.show_stats;
    let orchestrator = Orchestrator::new(config);

    match orchestrator.run(&interrupted) {
        Ok(outcome) => {
            if let Some(summary) = outcome.dry_run_summary {
                println!(
                    "{} file(s) eligible, {} skipped, {} scanned",
                    summary.eligible, summary.skipped, summary.total
                );
                for (reason, count) in &summary.by_reason {
                    println!("  {reason}: {count}");
                }
            } else if show_stats {
                print_stats(&outcome.stats);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("logsift: {err}");
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}

fn print_stats(stats: &logsift::stats::ProcessingStats) {
    println!("files scanned:    {}", stats.files_scanned);
    println!("files processed:  {}", stats.files_processed);
    println!("files skipped:    {}", stats.files_skipped);
    for (reason, count) in &stats.skip_reasons {
        println!("  {reason}: {count}");
    }
    println!("records total:    {}", stats.records_total);
    println!("records matched:  {}", stats.records_matched);
    println!("records skipped:  {}", stats.records_skipped);
    println!("bytes processed:  {}", stats.total_bytes_processed);
    println!("duration:         {:.2}s", stats.duration().as_secs_f64());
    println!("throughput:       {:.0} records/s", stats.records_per_second());
}

fn init_logging(quiet: bool, verbose: u8) {
    let level = if quiet {
        log::LevelFilter::Error
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new().filter_level(level).init();
}
