//! Tagged value model: the currency between raw tokens, actions, and the
//! renderer.
//!
//! A `Value` is produced by coercing a raw token against an [`ArgType`], is
//! what every action receives and returns, and is what the renderer finally
//! displays. Keeping one tagged union for all three roles is what lets a
//! modifying param replace a command's argument list with something of a
//! different shape.

use tally_types::error::{Result, TallyError};

/// A dynamically-typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    /// An ordered sequence. Flattens into an argument list when a modifying
    /// param hands it to the next consumer.
    List(Vec<Value>),
    /// Tabular output. Never produced by coercion, only by help/rendering
    /// actions.
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl Value {
    /// Convert this value into a positional-argument list.
    ///
    /// A `List` flattens into its elements; any other value becomes a
    /// single-element list.
    pub fn into_args(self) -> Vec<Value> {
        match self {
            Value::List(values) => values,
            other => vec![other],
        }
    }

    /// Read this value as an integer.
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(n) => Ok(*n),
            other => Err(TallyError::Domain(format!("expected an integer, got {other}"))),
        }
    }

    /// Read this value as a float. Integers widen.
    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Int(n) => Ok(*n as f64),
            Value::Float(f) => Ok(*f),
            other => Err(TallyError::Domain(format!("expected a number, got {other}"))),
        }
    }
}

/// Read a whole argument slice as integers.
pub fn as_ints(args: &[Value]) -> Result<Vec<i64>> {
    args.iter().map(Value::as_int).collect()
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<Vec<i64>> for Value {
    fn from(numbers: Vec<i64>) -> Self {
        Value::List(numbers.into_iter().map(Value::Int).collect())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            },
            Value::Table { headers, rows } => {
                write!(f, "{}", headers.join(" | "))?;
                for row in rows {
                    write!(f, "\n{}", row.join(" | "))?;
                }
                Ok(())
            },
        }
    }
}

/// Declared type of one positional or param argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Int,
    Float,
    Str,
}

impl ArgType {
    /// Type name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ArgType::Int => "int",
            ArgType::Float => "float",
            ArgType::Str => "str",
        }
    }

    /// Coerce a raw token into a typed value.
    ///
    /// `usage` is the owning command's or param's usage string, carried into
    /// the error so the user sees what was expected where.
    pub fn coerce(self, raw: &str, usage: &str) -> Result<Value> {
        let fail = || TallyError::Coercion {
            raw: raw.to_string(),
            expected: self.name(),
            usage: usage.to_string(),
        };
        match self {
            ArgType::Int => raw.parse::<i64>().map(Value::Int).map_err(|_| fail()),
            ArgType::Float => raw.parse::<f64>().map(Value::Float).map_err(|_| fail()),
            ArgType::Str => Ok(Value::Str(raw.to_string())),
        }
    }
}

/// Comma-joined type names for error messages, e.g. "int, int".
pub(crate) fn type_names(types: &[ArgType]) -> String {
    types
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}
