//! SQL text builders used by the convenience methods of
//! [`DbClient`](crate::DbClient).
//!
//! The builders only assemble text; values are rendered inline. Predicates
//! are ANDed together in the order they were added.

use core::fmt::{Display, Formatter, Result};

/// A value rendered into a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    /// Rendered with two decimals, as every TPC-C money/tax column is.
    Float(f64),
    /// Single-quoted, embedded quotes doubled.
    Text(String),
    /// A column reference or arithmetic expression, rendered verbatim.
    Expr(String),
}

impl SqlValue {
    /// Shorthand for [`SqlValue::Expr`].
    #[must_use]
    pub fn expr(expr: impl Into<String>) -> Self {
        Self::Expr(expr.into())
    }
}

impl Display for SqlValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:.2}"),
            Self::Text(value) => write!(f, "'{}'", value.replace('\'', "''")),
            Self::Expr(value) => f.write_str(value),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Comparison operator of a predicate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Op {
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        })
    }
}

/// A `(column, operator, value)` triple.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub op: Op,
    pub value: SqlValue,
}

impl Predicate {
    #[must_use]
    pub fn new(column: impl Into<String>, op: Op, value: impl Into<SqlValue>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::new(column, Op::Eq, value)
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}{}{}", self.column, self.op, self.value)
    }
}

fn write_where(f: &mut Formatter<'_>, predicates: &[Predicate]) -> Result {
    for (i, predicate) in predicates.iter().enumerate() {
        f.write_str(if i == 0 { " where " } else { " and " })?;
        write!(f, "{predicate}")?;
    }
    Ok(())
}

/// Sort direction of `ORDER BY`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// `select <columns> from <tables> [where ...] [order by ...] ;`
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    tables: Vec<String>,
    columns: Vec<String>,
    predicates: Vec<Predicate>,
    order_by: Option<(String, Order)>,
}

impl Select {
    /// Select every column of `table`.
    #[must_use]
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            tables: vec![table.into()],
            columns: Vec::new(),
            predicates: Vec::new(),
            order_by: None,
        }
    }

    /// Add another table to the `from` list (cross join, filtered by the
    /// predicates).
    #[must_use]
    pub fn join(mut self, table: impl Into<String>) -> Self {
        self.tables.push(table.into());
        self
    }

    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Shorthand for an equality predicate.
    #[must_use]
    pub fn eq(self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.filter(Predicate::eq(column, value))
    }

    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order_by = Some((column.into(), order));
        self
    }
}

impl Display for Select {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str("select ")?;
        if self.columns.is_empty() {
            f.write_str("*")?;
        } else {
            f.write_str(&self.columns.join(","))?;
        }
        write!(f, " from {}", self.tables.join(","))?;
        write_where(f, &self.predicates)?;
        if let Some((column, order)) = &self.order_by {
            let order = match order {
                Order::Asc => "asc",
                Order::Desc => "desc",
            };
            write!(f, " order by {column} {order}")?;
        }
        f.write_str(";")
    }
}

/// `insert into <table> values (...);`
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    table: String,
    values: Vec<SqlValue>,
}

impl Insert {
    #[must_use]
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<SqlValue>) -> Self {
        self.values.push(value.into());
        self
    }
}

impl Display for Insert {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "insert into {} values (", self.table)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(");")
    }
}

/// `update <table> set c=v,... [where ...];`
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    table: String,
    assignments: Vec<(String, SqlValue)>,
    predicates: Vec<Predicate>,
}

impl Update {
    #[must_use]
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            assignments: Vec::new(),
            predicates: Vec::new(),
        }
    }

    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.assignments.push((column.into(), value.into()));
        self
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    #[must_use]
    pub fn eq(self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.filter(Predicate::eq(column, value))
    }
}

impl Display for Update {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "update {} set ", self.table)?;
        for (i, (column, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{column}={value}")?;
        }
        write_where(f, &self.predicates)?;
        f.write_str(";")
    }
}

/// `delete from <table> [where ...];`
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    table: String,
    predicates: Vec<Predicate>,
}

impl Delete {
    #[must_use]
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            predicates: Vec::new(),
        }
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    #[must_use]
    pub fn eq(self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.filter(Predicate::eq(column, value))
    }
}

impl Display for Delete {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "delete from {}", self.table)?;
        write_where(f, &self.predicates)?;
        f.write_str(";")
    }
}
