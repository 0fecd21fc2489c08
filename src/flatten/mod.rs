use crate::model::{DataBundle, LevelKey};

/// Sheet listing the instruction lines.
pub const INSTRUCTIONS_SHEET: &str = "Instrucciones";
/// Sheet listing one row per question option.
pub const QUESTIONS_SHEET: &str = "Preguntas";
/// Sheet holding the two score thresholds.
pub const THRESHOLDS_SHEET: &str = "Umbrales";
/// Sheet holding one row per level.
pub const LEVELS_SHEET: &str = "Niveles";
/// Sheet holding the normalized recommendations.
pub const RECOMMENDATIONS_SHEET: &str = "Recomendaciones";

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    fn new(sheet_name: &str, columns: &[&str]) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// Represents all tables required to materialise the Excel workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

/// Flattens a bundle into the normalized export layout: one table per
/// concern, every cell rendered as text.
pub fn build_workbook(bundle: &DataBundle) -> WorkbookData {
    WorkbookData {
        tables: vec![
            instructions_table(bundle),
            questions_table(bundle),
            thresholds_table(bundle),
            levels_table(bundle),
            recommendations_table(bundle),
        ],
    }
}

fn instructions_table(bundle: &DataBundle) -> SheetTable {
    let mut table = SheetTable::new(INSTRUCTIONS_SHEET, &["instruccion"]);
    table.rows = bundle
        .instructions()
        .lines()
        .map(|line| vec![line.to_string()])
        .collect();
    table
}

fn questions_table(bundle: &DataBundle) -> SheetTable {
    let mut table = SheetTable::new(
        QUESTIONS_SHEET,
        &["id", "seccion", "pregunta", "puntaje", "opcion"],
    );
    for question in bundle.questions() {
        for option in &question.options {
            table.rows.push(vec![
                question.id.clone(),
                question.section.clone(),
                question.text.clone(),
                option.score.to_string(),
                option.label.clone(),
            ]);
        }
    }
    table
}

fn thresholds_table(bundle: &DataBundle) -> SheetTable {
    let thresholds = bundle.thresholds();
    let mut table = SheetTable::new(THRESHOLDS_SHEET, &["nivel_1_max", "nivel_2_max"]);
    table.rows.push(vec![
        thresholds.level1_max.to_string(),
        thresholds.level2_max.to_string(),
    ]);
    table
}

fn levels_table(bundle: &DataBundle) -> SheetTable {
    let mut table = SheetTable::new(
        LEVELS_SHEET,
        &["nivel", "titulo", "definicion", "caracteristicas", "ruta"],
    );
    for key in LevelKey::ALL {
        let level = bundle.level(key);
        table.rows.push(vec![
            key.to_string(),
            level.title.clone(),
            level.definition.clone(),
            level.characteristics.clone(),
            level.route.clone(),
        ]);
    }
    table
}

fn recommendations_table(bundle: &DataBundle) -> SheetTable {
    let recommendations = bundle.recommendations();
    SheetTable {
        sheet_name: RECOMMENDATIONS_SHEET.to_string(),
        columns: recommendations.columns.clone(),
        rows: recommendations
            .rows
            .iter()
            .map(|row| {
                recommendations
                    .columns
                    .iter()
                    .map(|column| row.get(column).to_string())
                    .collect()
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::model::{
        Level, Question, QuestionOption, RecommendationRow, RecommendationTable, ThresholdSet,
    };

    fn bundle() -> DataBundle {
        let mut levels = BTreeMap::new();
        levels.insert(
            LevelKey::Level2,
            Level {
                title: "Intermedio".to_string(),
                ..Level::default()
            },
        );
        let mut row = RecommendationRow::default();
        row.values.insert("barrera".to_string(), "Prejuicio".to_string());

        DataBundle::new(
            "Línea 1\nLínea 2".to_string(),
            vec![Question {
                id: "A".to_string(),
                section: "Trato igualitario".to_string(),
                text: "¿Pregunta de prueba?".to_string(),
                options: vec![
                    QuestionOption::new(3, "Alta"),
                    QuestionOption::placeholder(2),
                    QuestionOption::new(1, "Baja"),
                ],
            }],
            ThresholdSet::new(14, 22),
            levels,
            RecommendationTable {
                columns: vec!["barrera".to_string(), "fuente".to_string()],
                rows: vec![row],
            },
        )
    }

    #[test]
    fn bundle_flattens_into_one_table_per_concern() {
        let workbook = build_workbook(&bundle());
        let names: Vec<&str> = workbook
            .tables
            .iter()
            .map(|table| table.sheet_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                INSTRUCTIONS_SHEET,
                QUESTIONS_SHEET,
                THRESHOLDS_SHEET,
                LEVELS_SHEET,
                RECOMMENDATIONS_SHEET
            ]
        );

        let questions = &workbook.tables[1];
        assert_eq!(questions.rows.len(), 3);
        assert_eq!(questions.rows[1][3], "2");
        assert_eq!(questions.rows[1][4], "Opción 2");

        assert_eq!(workbook.tables[2].rows, vec![vec!["14", "22"]]);

        let levels = &workbook.tables[3];
        assert_eq!(levels.rows.len(), 3);
        assert_eq!(levels.rows[1][0], "Nivel 2");
        assert_eq!(levels.rows[1][1], "Intermedio");
        assert_eq!(levels.rows[0][1], "");

        assert_eq!(workbook.tables[4].rows, vec![vec!["Prejuicio", ""]]);
    }
}
