//! Field schemas shared by every feature vector in a run

use std::fmt;
use std::sync::Arc;

use clap::ValueEnum;
use serde::Deserialize;

/// Fields of the writing-portfolio dataset, in file column order
pub const PORTFOLIO_FIELDS: [&str; 15] = [
    "Minnesota Credits",
    "International",
    "Birth Year",
    "HS Rank",
    "Verbal SAT",
    "Math SAT",
    "ACT Composite",
    "Cumulative GPA",
    "Number of Essays",
    "Abroad Credits",
    "AP Credits",
    "CS Credits",
    "English Credits",
    "Science Credits",
    "Writing Credits",
];

/// Fields of the generic two-dimensional dataset
pub const GENERIC_FIELDS: [&str; 2] = ["X", "Y"];

/// Which dataset layout a schema describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// 15-field writing-portfolio records, tab separated, standardized
    Portfolio,
    /// `X`/`Y` records with a leading row label, space separated
    Generic,
    /// Caller-supplied field list
    #[value(skip)]
    Custom,
}

/// Ordered, fixed set of field names
///
/// Cloning is cheap: the names are shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Schema {
    kind: SchemaKind,
    fields: Arc<[String]>,
}

impl Schema {
    /// The 15-field writing-portfolio schema
    pub fn portfolio() -> Self {
        Self::from_names(SchemaKind::Portfolio, &PORTFOLIO_FIELDS)
    }

    /// The two-field `{X, Y}` schema
    pub fn generic() -> Self {
        Self::from_names(SchemaKind::Generic, &GENERIC_FIELDS)
    }

    /// Build the built-in schema for `kind`
    pub fn for_kind(kind: SchemaKind) -> crate::Result<Self> {
        match kind {
            SchemaKind::Portfolio => Ok(Self::portfolio()),
            SchemaKind::Generic => Ok(Self::generic()),
            SchemaKind::Custom => anyhow::bail!("custom schemas must be built with Schema::custom"),
        }
    }

    /// Build a schema from arbitrary field names
    pub fn custom<I, S>(names: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = names.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            anyhow::bail!("a schema needs at least one field");
        }
        for (i, name) in fields.iter().enumerate() {
            if fields[..i].contains(name) {
                anyhow::bail!("duplicate field name in schema: {}", name);
            }
        }
        Ok(Self {
            kind: SchemaKind::Custom,
            fields: fields.into(),
        })
    }

    fn from_names(kind: SchemaKind, names: &[&str]) -> Self {
        Self {
            kind,
            fields: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of `field` in the schema
    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    /// Whether the built-in dataset for this schema is standardized by default
    pub fn standardize_by_default(&self) -> bool {
        self.kind == SchemaKind::Portfolio
    }

    /// Default column delimiter of the dataset files for this schema
    pub fn default_delimiter(&self) -> u8 {
        match self.kind {
            SchemaKind::Generic => b' ',
            SchemaKind::Portfolio | SchemaKind::Custom => b'\t',
        }
    }

    /// Whether records start with a row label column that is not a field
    pub fn has_row_label(&self) -> bool {
        self.kind == SchemaKind::Generic
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaKind::Portfolio => write!(f, "portfolio"),
            SchemaKind::Generic => write!(f, "generic"),
            SchemaKind::Custom => write!(f, "custom"),
        }
    }
}
