//! Batch input: one questionnaire per CSV row.
//!
//! The header names question ids, plus an optional `id` column for the
//! respondent. Empty cells are null, multi-select cells are `;`-separated,
//! yes/no cells take `true`/`false`/`yes`/`no`. Columns absent from the
//! file keep the question's default.

use std::io;

use csv::StringRecord;

use crate::answers::{AnswerValue, Answers};
use crate::schema::{parse_number, Question, QuestionKind, Schema, QUESTIONS};
use crate::Error;

pub struct BulkRows<'a, R> {
    reader: csv::Reader<R>,
    schema: &'a Schema,
    headers: Option<StringRecord>,
    record: StringRecord,
    row: usize,
    done: bool,
}

/// Reads rows against the standard questionnaire.
pub fn read_bulk<R: io::Read>(reader: R) -> BulkRows<'static, R> {
    read_bulk_with(&QUESTIONS, reader)
}

pub fn read_bulk_with<R: io::Read>(schema: &Schema, reader: R) -> BulkRows<'_, R> {
    BulkRows {
        reader: csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader),
        schema,
        headers: None,
        record: StringRecord::new(),
        row: 0,
        done: false,
    }
}

impl<R: io::Read> BulkRows<'_, R> {
    fn check_headers(&mut self) -> Result<(), Error> {
        if self.headers.is_some() {
            return Ok(());
        }
        let headers = self.reader.headers()?.clone();
        for name in headers.iter().filter(|&name| name != "id") {
            if self.schema.question(name).is_none() {
                return Err(Error::IllegalQuestion(name.to_owned()));
            }
        }
        self.headers = Some(headers);
        Ok(())
    }

    fn next_row(&mut self) -> Result<Option<(String, Answers)>, Error> {
        self.check_headers()?;
        let more = self.reader.read_record(&mut self.record);
        self.row += 1;
        if !more? {
            return Ok(None);
        }
        let mut id = self.row.to_string();
        let mut answers = Answers::initial(self.schema);
        for (name, cell) in self.headers.iter().flatten().zip(self.record.iter()) {
            if name == "id" {
                if !cell.is_empty() {
                    id = cell.to_owned();
                }
                continue;
            }
            let question = self
                .schema
                .question(name)
                .ok_or_else(|| Error::IllegalQuestion(name.to_owned()))?;
            let value = parse_cell(question, cell)?;
            answers.put(&question.id, value);
        }
        Ok(Some((id, answers)))
    }
}

impl<R: io::Read> Iterator for BulkRows<'_, R> {
    type Item = Result<(String, Answers), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                // Header and I/O failures end the batch; a bad row does not.
                let fatal = match &error {
                    Error::Csv(csv_error) => csv_error.is_io_error() || self.headers.is_none(),
                    _ => self.headers.is_none(),
                };
                if fatal {
                    self.done = true;
                }
                tracing::debug!(row = self.row, %error, "skipping csv row");
                Some(Err(error))
            }
        }
    }
}

fn parse_cell(question: &Question, cell: &str) -> Result<AnswerValue, Error> {
    if cell.is_empty() {
        return Ok(AnswerValue::Null);
    }
    let value = match &question.kind {
        QuestionKind::Number(_) | QuestionKind::Range(_) => parse_number(cell)
            .map(AnswerValue::Number)
            .unwrap_or_else(|| AnswerValue::Text(cell.to_owned())),
        QuestionKind::YesNo => match cell.to_ascii_lowercase().as_str() {
            "true" | "yes" => AnswerValue::Bool(true),
            "false" | "no" => AnswerValue::Bool(false),
            _ => {
                return Err(Error::IllegalAnswer {
                    id: question.id.clone(),
                    expected: question.kind.name(),
                })
            }
        },
        QuestionKind::MultiSelect { .. } => AnswerValue::List(
            cell.split(';')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_owned)
                .collect(),
        ),
        QuestionKind::Radio { .. }
        | QuestionKind::RadioList { .. }
        | QuestionKind::RadioChip { .. } => AnswerValue::Text(cell.to_owned()),
    };
    Ok(value)
}
