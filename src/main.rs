use clap::Parser;
use mediaconv::args::Args;
use mediaconv::config::ConvertConfig;
use mediaconv::processor::{Processor, RunOutcome};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Parse and validate command line arguments
    let args = Args::parse();
    args.validate()?;

    let processor = Processor::new(args.input_dir, args.output_dir, ConvertConfig::default());

    match processor.run(args.console)? {
        RunOutcome::Completed { log_path, .. } => {
            println!();
            println!(
                "Conversion complete. Log file saved to \"{}\".",
                log_path.display()
            );
        }
        RunOutcome::NothingToDo => {
            println!("No matching files found in directory.");
        }
    }

    Ok(())
}
