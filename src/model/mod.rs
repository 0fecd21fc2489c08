use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Identifier assigned to a question. Always a single alphabetic character
/// once it leaves the questionnaire parser.
pub type QuestionId = String;

/// One selectable answer to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionOption {
    /// Score awarded for the option: 3 is the best practice, 1 the worst.
    pub score: u8,
    /// Display label.
    pub label: String,
}

impl QuestionOption {
    pub fn new(score: u8, label: impl Into<String>) -> Self {
        Self {
            score,
            label: label.into(),
        }
    }

    /// Placeholder used when the workbook omits the option for `score`.
    pub fn placeholder(score: u8) -> Self {
        Self::new(score, format!("Opción {score}"))
    }
}

/// A scored question together with the section it was found under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: QuestionId,
    /// Label of the closest preceding section header, or empty.
    pub section: String,
    pub text: String,
    /// Exactly three options ordered by score descending.
    pub options: Vec<QuestionOption>,
}

/// Score cut-offs separating the three levels.
///
/// Totals up to `level1_max` fall in level 1, totals up to `level2_max` in
/// level 2, anything above in level 3. The ordering of the two values is not
/// enforced; see [`ThresholdSet::is_ordered`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdSet {
    pub level1_max: i64,
    pub level2_max: i64,
}

impl ThresholdSet {
    pub const fn new(level1_max: i64, level2_max: i64) -> Self {
        Self {
            level1_max,
            level2_max,
        }
    }

    /// Whether the cut-offs describe three non-empty bands.
    pub fn is_ordered(&self) -> bool {
        self.level1_max < self.level2_max
    }
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self::new(15, 23)
    }
}

/// One of the three maturity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LevelKey {
    #[serde(rename = "Nivel 1")]
    Level1,
    #[serde(rename = "Nivel 2")]
    Level2,
    #[serde(rename = "Nivel 3")]
    Level3,
}

impl LevelKey {
    pub const ALL: [LevelKey; 3] = [LevelKey::Level1, LevelKey::Level2, LevelKey::Level3];

    /// Name of the sheet holding the level narrative.
    pub fn sheet_name(self) -> &'static str {
        match self {
            LevelKey::Level1 => "Nivel 1",
            LevelKey::Level2 => "Nivel 2",
            LevelKey::Level3 => "Nivel 3",
        }
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// Narrative content of a level. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Level {
    /// Title found under the `NIVEL` key.
    pub title: String,
    pub definition: String,
    pub characteristics: String,
    /// Suggested learning route.
    pub route: String,
}

impl Level {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.definition.is_empty()
            && self.characteristics.is_empty()
            && self.route.is_empty()
    }
}

/// Canonical recommendation column names.
pub const RECOMMENDATION_COLUMNS: [&str; 5] = [
    "barrera",
    "concepto",
    "sintomas",
    "indicadores",
    "recomendaciones",
];

/// A single row of the recommendations sheet keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecommendationRow {
    pub values: BTreeMap<String, String>,
}

impl RecommendationRow {
    /// Value stored under `column`, or an empty string.
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or_default()
    }
}

/// Recommendations sheet with headers mapped onto canonical names where possible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecommendationTable {
    /// Column names in sheet order.
    pub columns: Vec<String>,
    pub rows: Vec<RecommendationRow>,
}

/// The complete normalized output of ingesting a questionnaire workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataBundle {
    instructions: String,
    questions: Vec<Question>,
    thresholds: ThresholdSet,
    levels: BTreeMap<LevelKey, Level>,
    recommendations: RecommendationTable,
}

impl DataBundle {
    pub fn new(
        instructions: String,
        questions: Vec<Question>,
        thresholds: ThresholdSet,
        levels: BTreeMap<LevelKey, Level>,
        recommendations: RecommendationTable,
    ) -> Self {
        Self {
            instructions,
            questions,
            thresholds,
            levels,
            recommendations,
        }
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Distinct non-empty section labels in order of first appearance.
    pub fn sections(&self) -> Vec<&str> {
        let mut sections: Vec<&str> = Vec::new();
        for question in &self.questions {
            let section = question.section.as_str();
            if !section.is_empty() && !sections.contains(&section) {
                sections.push(section);
            }
        }
        sections
    }

    pub fn thresholds(&self) -> ThresholdSet {
        self.thresholds
    }

    pub fn levels(&self) -> &BTreeMap<LevelKey, Level> {
        &self.levels
    }

    /// Narrative for `key`; an empty level if the sheet contributed nothing.
    pub fn level(&self, key: LevelKey) -> &Level {
        static EMPTY: Level = Level {
            title: String::new(),
            definition: String::new(),
            characteristics: String::new(),
            route: String::new(),
        };
        self.levels.get(&key).unwrap_or(&EMPTY)
    }

    pub fn recommendations(&self) -> &RecommendationTable {
        &self.recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, section: &str) -> Question {
        Question {
            id: id.to_string(),
            section: section.to_string(),
            text: "¿Pregunta de prueba?".to_string(),
            options: vec![
                QuestionOption::placeholder(3),
                QuestionOption::placeholder(2),
                QuestionOption::placeholder(1),
            ],
        }
    }

    #[test]
    fn sections_are_distinct_in_first_appearance_order() {
        let bundle = DataBundle::new(
            String::new(),
            vec![
                question("A", "Trato igualitario"),
                question("B", ""),
                question("C", "Lenguaje"),
                question("D", "Trato igualitario"),
            ],
            ThresholdSet::default(),
            BTreeMap::new(),
            RecommendationTable::default(),
        );

        assert_eq!(bundle.sections(), vec!["Trato igualitario", "Lenguaje"]);
        assert_eq!(bundle.question("C").map(|q| q.section.as_str()), Some("Lenguaje"));
        assert!(bundle.level(LevelKey::Level2).is_empty());
    }

    #[test]
    fn thresholds_report_ordering() {
        assert!(ThresholdSet::default().is_ordered());
        assert!(!ThresholdSet::new(20, 20).is_ordered());
        assert!(!ThresholdSet::new(23, 15).is_ordered());
    }

    #[test]
    fn level_keys_serialize_as_sheet_names() {
        let json = serde_json::to_value(LevelKey::Level3).unwrap();
        assert_eq!(json, serde_json::json!("Nivel 3"));
    }
}
