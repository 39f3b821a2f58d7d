use std::fs::File;
use std::io::{stdin, stdout, BufReader};
use std::path::PathBuf;

use clap::Parser;
use daily_stresscheck::{
    is_active, telemetry, validate_field, validate_form, AnswerValue, Answers, ChoiceOption, Error,
    FieldError, LabelMapping, Probabilities, Question, QuestionKind, ResultPage, Schema, Scorer,
    Stress, StressCategory, QUESTIONS,
};

#[derive(Parser)]
#[command(about = "Daily stress check-in", version)]
struct Args {
    /// Score a JSON object of answers instead of asking interactively
    #[arg(long)]
    answers: Option<PathBuf>,
    /// Match pressure and difficulty answers against the options actually offered
    #[arg(long)]
    corrected_labels: bool,
    /// Prediction percentages to show, as low,medium,high
    #[arg(long)]
    probabilities: Option<Probabilities>,
    /// Print the result page as JSON
    #[arg(long)]
    json: bool,
    /// Print the questionnaire as JSON and exit
    #[arg(long)]
    dump_schema: bool,
    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, thiserror::Error)]
enum Rejected {
    #[error("{0}")]
    Field(#[from] FieldError),
    #[error("Choose one of the numbers shown.")]
    Choice,
    #[error("Answer y or n.")]
    YesNo,
    #[error("{0}")]
    Answer(#[from] Error),
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    telemetry::init(&args.log_level)?;

    if args.dump_schema {
        serde_json::to_writer_pretty(stdout().lock(), &*QUESTIONS)?;
        println!();
        return Ok(());
    }

    let answers = match &args.answers {
        Some(path) => Answers::load(&QUESTIONS, BufReader::new(File::open(path)?))?,
        None => ask(&QUESTIONS)?,
    };

    let validation = validate_form(&QUESTIONS, &answers);
    if !validation.is_valid() {
        return Err(Error::NotFulfilled {
            missing: validation.missing_fields,
        });
    }

    let mapping = if args.corrected_labels {
        LabelMapping::Corrected
    } else {
        LabelMapping::Legacy
    };
    let assessment = Scorer::new(mapping).assess(&answers);
    let page = ResultPage::new(assessment.category(), assessment.score(), args.probabilities);

    if args.json {
        serde_json::to_writer_pretty(stdout().lock(), &page)?;
        println!();
    } else {
        print_page(&page);
    }
    Ok(())
}

fn ask(schema: &Schema) -> Result<Answers, Error> {
    let mut buffer = String::new();
    let mut answers = Answers::initial(schema);

    for section in &schema.sections {
        println!("{} {}", section.icon, section.title);
        for question in &section.questions {
            if !is_active(question, &answers) {
                continue;
            }
            print_question(question, &answers);
            loop {
                println!();
                buffer.clear();
                if stdin().read_line(&mut buffer)? == 0 {
                    return Err(Error::NotFulfilled {
                        missing: validate_form(schema, &answers).missing_fields,
                    });
                }
                match store_answer(schema, question, buffer.trim(), &mut answers) {
                    Ok(()) => break,
                    Err(rejected) => print!("{}", rejected),
                }
            }
            println!();
        }
    }
    Ok(answers)
}

fn print_question(question: &Question, answers: &Answers) {
    println!("{}", question.label);
    if let Some(sublabel) = &question.sublabel {
        println!("{}", sublabel);
    }
    match &question.kind {
        QuestionKind::Number(domain) | QuestionKind::Range(domain) => {
            let current = answers.get(&question.id).as_number().unwrap_or(domain.default);
            print!("  {} - {} (Enter keeps {})", domain.min, domain.max, current);
        }
        QuestionKind::YesNo => print!("  y / n"),
        QuestionKind::MultiSelect { options } => {
            for (index, option) in options.iter().enumerate() {
                print!("  {} => {}", index + 1, option.label());
            }
            print!("  (comma separated)");
        }
        QuestionKind::Radio { options }
        | QuestionKind::RadioList { options }
        | QuestionKind::RadioChip { options } => {
            for (index, option) in options.iter().enumerate() {
                print!("  {} => {}", index + 1, option.label());
            }
        }
    }
}

fn store_answer(
    schema: &Schema,
    question: &Question,
    input: &str,
    answers: &mut Answers,
) -> Result<(), Rejected> {
    let value = match &question.kind {
        QuestionKind::Number(domain) | QuestionKind::Range(domain) => {
            if input.is_empty() {
                answers.get(&question.id).clone()
            } else {
                validate_field(question, &AnswerValue::from(input))?;
                AnswerValue::Number(domain.commit(input))
            }
        }
        QuestionKind::YesNo => match input.to_ascii_lowercase().as_str() {
            "" => AnswerValue::Null,
            "y" | "yes" => AnswerValue::Bool(true),
            "n" | "no" => AnswerValue::Bool(false),
            _ => return Err(Rejected::YesNo),
        },
        QuestionKind::MultiSelect { options } => {
            answers.insert(schema, &question.id, AnswerValue::List(Vec::new()))?;
            for part in input.split(',').map(str::trim).filter(|part| !part.is_empty()) {
                let option = pick(options.as_slice(), part).ok_or(Rejected::Choice)?;
                answers.toggle(schema, &question.id, option)?;
            }
            answers.get(&question.id).clone()
        }
        QuestionKind::Radio { options }
        | QuestionKind::RadioList { options }
        | QuestionKind::RadioChip { options } => {
            if input.is_empty() {
                AnswerValue::Null
            } else {
                let option = pick(options.as_slice(), input).ok_or(Rejected::Choice)?;
                AnswerValue::from(option)
            }
        }
    };
    validate_field(question, &value)?;
    answers.insert(schema, &question.id, value)?;
    Ok(())
}

// The option itself wins over the 1-based number shown, so commute chips
// like `15` are taken literally.
fn pick<'a>(options: &'a [ChoiceOption], input: &str) -> Option<&'a str> {
    options
        .iter()
        .find(|option| option.value() == input || option.label() == input)
        .or_else(|| {
            let index = input.parse::<usize>().ok()?.checked_sub(1)?;
            options.get(index)
        })
        .map(|option| option.value())
}

fn print_page(page: &ResultPage) {
    println!("Your Stress Level Today: {}", page.content.level);
    println!("{}", page.content.message);
    println!("{}", page.content.description);

    if let Some(probabilities) = &page.probabilities {
        println!();
        println!("Prediction Confidence");
        for category in StressCategory::ALL {
            let marker = if page.highlighted == Some(category) { "*" } else { " " };
            let width = (probabilities.width(category) / 5.0).round() as usize;
            println!(
                "{} {:<6} {:>6}% {}",
                marker,
                category.as_str(),
                probabilities.get(category),
                "#".repeat(width)
            );
        }
    }

    println!();
    println!("Gentle Suggestions");
    for suggestion in page.content.suggestions {
        println!("  {} {}: {}", suggestion.icon, suggestion.title, suggestion.description);
    }
}
