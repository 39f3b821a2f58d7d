use clap::Parser;
use daily_stresscheck::{
    read_bulk, telemetry, validate_form, Error, LabelMapping, Scorer, Stress, QUESTIONS,
};
use std::fs::File;
use std::io::BufReader;

/// Scores every row of a CSV file of answers.
#[derive(Parser)]
struct Args {
    path: String,
    /// Match pressure and difficulty answers against the options actually offered
    #[arg(long)]
    corrected_labels: bool,
    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    telemetry::init(&args.log_level)?;

    let scorer = Scorer::new(if args.corrected_labels {
        LabelMapping::Corrected
    } else {
        LabelMapping::Legacy
    });
    let reader = BufReader::new(File::open(&args.path)?);
    for row in read_bulk(reader) {
        match row {
            Ok((id, answers)) => {
                let assessment = scorer.assess(&answers);
                let validation = validate_form(&QUESTIONS, &answers);
                println!(
                    "id = {}, score = {}, category = {}, complete = {}",
                    id,
                    assessment.score(),
                    assessment.category(),
                    validation.is_valid()
                );
                if !validation.is_valid() {
                    tracing::warn!(%id, missing = ?validation.missing_fields, "incomplete answers");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "unreadable row");
            }
        }
    }
    Ok(())
}
