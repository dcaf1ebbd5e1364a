//! Structured query results
//!
//! The evaluator returns rows of typed fields; turning them into text is
//! left to [`ResultRow`]'s `Display` impl and the result sink.

use serde::Serialize;
use std::fmt;

/// Identifies one of the four fixed queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryKind {
    /// Authors and reviewer of a paper
    Q1,
    /// Papers of a conference
    Q2,
    /// Papers of an author
    Q3,
    /// Journal papers whose author is a friend of its reviewer
    Q4,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            QueryKind::Q1 => "Q1",
            QueryKind::Q2 => "Q2",
            QueryKind::Q3 => "Q3",
            QueryKind::Q4 => "Q4",
        };
        f.write_str(tag)
    }
}

/// One column of a result row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Field {
    /// A single value, printed as-is
    Value(String),
    /// A list of values, printed as `(a,b,c)`
    List(Vec<String>),
}

impl Field {
    pub fn value(v: impl Into<String>) -> Self {
        Field::Value(v.into())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Value(v) => f.write_str(v),
            Field::List(items) => write!(f, "({})", items.join(",")),
        }
    }
}

/// Ordered fields of one result row; displayed comma-separated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub fields: Vec<Field>,
}

impl ResultRow {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }
}

impl fmt::Display for ResultRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}

/// The rows one query invocation produced; never empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryOutcome {
    pub kind: QueryKind,
    pub rows: Vec<ResultRow>,
    /// The root lookup found nothing, or no pattern matched; `rows` then
    /// holds the empty-result marker row
    pub empty: bool,
}

impl QueryOutcome {
    pub fn new(kind: QueryKind, rows: Vec<ResultRow>) -> Self {
        Self { kind, rows, empty: false }
    }

    pub fn no_match(kind: QueryKind, marker: ResultRow) -> Self {
        Self {
            kind,
            rows: vec![marker],
            empty: true,
        }
    }

    /// Rows rendered as `"<Qn>: <row>"`, the form written to the result log
    pub fn lines(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| format!("{}: {}", self.kind, row))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_display() {
        let row = ResultRow::new(vec![
            Field::value("P"),
            Field::List(vec!["A".into(), "B".into()]),
            Field::value("R"),
        ]);
        assert_eq!(row.to_string(), "P,(A,B),R");
    }

    #[test]
    fn test_empty_list_display() {
        let row = ResultRow::new(vec![Field::value("NoSuchConf"), Field::List(vec![])]);
        assert_eq!(row.to_string(), "NoSuchConf,()");
    }

    #[test]
    fn test_blank_values_display() {
        let row = ResultRow::new(vec![Field::value(""), Field::value(""), Field::value("")]);
        assert_eq!(row.to_string(), ",,");
    }

    #[test]
    fn test_outcome_lines_are_tagged() {
        let outcome = QueryOutcome::new(
            QueryKind::Q4,
            vec![
                ResultRow::new(vec![Field::value("P2"), Field::value("A2"), Field::value("R2")]),
                ResultRow::new(vec![Field::value("P3"), Field::value("A3"), Field::value("R3")]),
            ],
        );
        assert_eq!(outcome.lines(), vec!["Q4: P2,A2,R2", "Q4: P3,A3,R3"]);
        assert!(!outcome.empty);
    }
}
