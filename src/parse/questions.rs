//! Recovers question blocks from the questionnaire sheet.
//!
//! The sheet is scanned top to bottom through two tracked columns. The first
//! holds section labels, single-letter question ids, and option scores; the
//! second holds question text and option labels. A question row switches the
//! scanner into option collection, which consumes the following `3`/`2`/`1`
//! rows and hands the first non-option row back to the section/question scan.

use std::collections::HashSet;
use std::io::{Read, Seek};

use calamine::{DataType, Range, Xlsx};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ToolError};
use crate::io::sheet::{self, Cell};
use crate::layout::WorkbookLayout;
use crate::model::{Question, QuestionOption};

/// Scores every question must offer, best first.
pub const SCORES: [u8; 3] = [3, 2, 1];

/// Word used as a column caption above option rows; never a section label.
const ANSWER_CAPTION: &str = "respuesta";

/// A questionnaire row seen through the two tracked columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedRow {
    /// Zero-based sheet row, kept for diagnostics.
    pub row: u32,
    /// First tracked column: section label, question id, or score.
    pub key: Cell,
    /// Second tracked column: question text or option label.
    pub text: Cell,
}

impl TrackedRow {
    /// Row at zero-based `row` with its two tracked cells.
    pub fn new(row: u32, key: Cell, text: Cell) -> Self {
        Self { row, key, text }
    }

    /// Label of a section header row, if this row is one.
    ///
    /// A header has a string in the key column that is not a question id and
    /// no question text beside it. The answer caption is not a header.
    fn section_label(&self) -> Option<String> {
        if !self.key.is_text() {
            return None;
        }
        let label = self.key.trimmed();
        if is_question_id(&label) || looks_like_question(&self.text.trimmed()) {
            return None;
        }
        if label.is_empty() || label.to_lowercase() == ANSWER_CAPTION {
            return None;
        }
        Some(label)
    }

    /// `(id, text)` when this row opens a question block.
    fn question_start(&self) -> Option<(String, String)> {
        let id = self.key.trimmed();
        let text = self.text.trimmed();
        (is_question_id(&id) && looks_like_question(&text)).then_some((id, text))
    }

    /// The option carried by this row, if it is a scored option row.
    fn option(&self) -> Option<QuestionOption> {
        let score = self.key.as_integer()?;
        let score = SCORES.into_iter().find(|&candidate| i64::from(candidate) == score)?;
        let label = self.text.trimmed();
        (!label.is_empty()).then(|| QuestionOption::new(score, label))
    }
}

/// A question id is exactly one alphabetic character.
pub fn is_question_id(value: &str) -> bool {
    let mut chars = value.chars();
    matches!((chars.next(), chars.next()), (Some(ch), None) if ch.is_alphabetic())
}

/// Question text carries a question mark and is longer than ten characters.
pub fn looks_like_question(value: &str) -> bool {
    (value.contains('¿') || value.contains('?')) && value.chars().count() > 10
}

/// Section context threaded through the scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseContext {
    section: String,
}

impl ParseContext {
    /// Current section label; empty before the first header.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Returns the context that applies after `row` has been seen.
    fn observe(self, row: &TrackedRow) -> Self {
        match row.section_label() {
            Some(section) => {
                debug!(row = row.row + 1, %section, "section header");
                Self { section }
            }
            None => self,
        }
    }
}

/// A question whose option rows are still being read.
#[derive(Debug)]
struct PendingQuestion {
    id: String,
    section: String,
    text: String,
    options: Vec<QuestionOption>,
}

impl PendingQuestion {
    fn finish(self) -> Question {
        let options = normalize_options(&self.id, self.options);
        Question {
            id: self.id,
            section: self.section,
            text: self.text,
            options,
        }
    }
}

#[derive(Debug)]
enum ScanState {
    Scanning,
    CollectingOptions(PendingQuestion),
}

/// Orders options `3, 2, 1`, keeping the first option seen for each score and
/// synthesizing placeholders for scores the sheet did not provide.
pub fn normalize_options(question_id: &str, options: Vec<QuestionOption>) -> Vec<QuestionOption> {
    let mut by_score: [Option<QuestionOption>; 3] = [None, None, None];
    for option in options {
        let Some(index) = SCORES.iter().position(|&score| score == option.score) else {
            warn!(question = question_id, score = option.score, "option score out of range ignored");
            continue;
        };
        let slot = &mut by_score[index];
        if slot.is_some() {
            warn!(question = question_id, score = option.score, "duplicate option score ignored");
            continue;
        }
        *slot = Some(option);
    }

    SCORES
        .into_iter()
        .zip(by_score)
        .map(|(score, option)| {
            option.unwrap_or_else(|| {
                warn!(question = question_id, score, "option missing, using placeholder");
                QuestionOption::placeholder(score)
            })
        })
        .collect()
}

/// Runs the block scanner over `rows`, returning questions in sheet order.
pub fn parse_questions(rows: &[TrackedRow]) -> Vec<Question> {
    let mut questions: Vec<Question> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut push = |question: Question| {
        if seen_ids.insert(question.id.clone()) {
            questions.push(question);
        } else {
            warn!(question = %question.id, "duplicate question id ignored");
        }
    };

    let mut context = ParseContext::default();
    let mut state = ScanState::Scanning;
    let mut cursor = 0;

    while let Some(row) = rows.get(cursor) {
        state = match state {
            ScanState::Scanning => {
                context = context.observe(row);
                cursor += 1;
                match row.question_start() {
                    Some((id, text)) => {
                        debug!(row = row.row + 1, question = %id, "question row");
                        ScanState::CollectingOptions(PendingQuestion {
                            id,
                            section: context.section().to_string(),
                            text,
                            options: Vec::new(),
                        })
                    }
                    None => ScanState::Scanning,
                }
            }
            ScanState::CollectingOptions(mut pending) => match row.option() {
                Some(option) => {
                    pending.options.push(option);
                    cursor += 1;
                    ScanState::CollectingOptions(pending)
                }
                // The row is rescanned as a possible header or question.
                None => {
                    push(pending.finish());
                    ScanState::Scanning
                }
            },
        };
    }

    if let ScanState::CollectingOptions(pending) = state {
        push(pending.finish());
    }

    questions
}

/// Projects every row of `range` onto the tracked columns.
pub fn tracked_rows(range: &Range<DataType>, layout: &WorkbookLayout) -> Vec<TrackedRow> {
    let (Some((first, _)), Some((last, _))) = (range.start(), range.end()) else {
        return Vec::new();
    };
    (first..=last)
        .map(|row| {
            TrackedRow::new(
                row,
                sheet::cell_at(range, row, layout.id_column),
                sheet::cell_at(range, row, layout.text_column),
            )
        })
        .collect()
}

/// Reads the mandatory questionnaire sheet.
///
/// Fails with [`ToolError::MissingSheet`] when the sheet is absent and with
/// [`ToolError::EmptyQuestionnaire`] when no question block is recognised.
#[instrument(level = "info", skip_all, fields(sheet = %layout.questionnaire_sheet))]
pub fn read_questions<R: Read + Seek>(
    workbook: &mut Xlsx<R>,
    layout: &WorkbookLayout,
) -> Result<Vec<Question>> {
    let range = sheet::read_range(workbook, &layout.questionnaire_sheet)?
        .ok_or_else(|| ToolError::MissingSheet(layout.questionnaire_sheet.clone()))?;

    let questions = parse_questions(&tracked_rows(&range, layout));
    if questions.is_empty() {
        return Err(ToolError::EmptyQuestionnaire(layout.questionnaire_sheet.clone()));
    }

    info!(question_count = questions.len(), "questions parsed");
    Ok(questions)
}
