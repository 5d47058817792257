use core::fmt::{Display, Formatter};

/// Protocol-layer state of a single command execution.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ServerState {
    /// The command was executed and the response decoded.
    Ok,
    /// The connection is lost or was never established.
    Down,
    /// The server reported a transactional abort and rolled back.
    Abort,
    /// Malformed or unexpected response, or a client-side exception.
    Error,
}

impl Display for ServerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Ok => "OK",
            Self::Down => "DOWN",
            Self::Abort => "ABORT",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// A single decoded row of cell strings.
pub type Row = Vec<String>;

/// Outcome of one command execution.
///
/// Constructed once per command and never mutated afterwards, apart from
/// attaching the statement that produced it. An `Ok` result carries rows
/// whose width matches `columns`; `Abort`, `Error` and `Down` results carry
/// no rows.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    state: ServerState,
    columns: Vec<String>,
    rows: Vec<Row>,
    raw: String,
    sql: Option<String>,
}

impl QueryResult {
    /// A tabular (or empty) successful result.
    #[must_use]
    pub fn ok(columns: Vec<String>, rows: Vec<Row>, raw: impl Into<String>) -> Self {
        debug_assert!(
            rows.iter().all(|row| row.len() == columns.len()),
            "row width must match the header"
        );
        Self {
            state: ServerState::Ok,
            columns,
            rows,
            raw: raw.into(),
            sql: None,
        }
    }

    /// A successful result with no table, as returned by DDL/DML/TCL.
    #[must_use]
    pub fn empty(raw: impl Into<String>) -> Self {
        Self::ok(Vec::new(), Vec::new(), raw)
    }

    #[must_use]
    pub fn down(raw: impl Into<String>) -> Self {
        Self::failed(ServerState::Down, raw)
    }

    #[must_use]
    pub fn abort(raw: impl Into<String>) -> Self {
        Self::failed(ServerState::Abort, raw)
    }

    #[must_use]
    pub fn error(raw: impl Into<String>) -> Self {
        Self::failed(ServerState::Error, raw)
    }

    fn failed(state: ServerState, raw: impl Into<String>) -> Self {
        Self {
            state,
            columns: Vec::new(),
            rows: Vec::new(),
            raw: raw.into(),
            sql: None,
        }
    }

    /// Attach the statement that produced this result.
    #[must_use]
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }

    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.state == ServerState::Ok
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// The unparsed protocol payload.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn sql(&self) -> Option<&str> {
        self.sql.as_deref()
    }

    /// `true` for a successful result without data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_ok() && self.rows.is_empty()
    }

    #[must_use]
    pub fn first_row(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Cell `column` of the first row, if present.
    #[must_use]
    pub fn scalar(&self, column: usize) -> Option<&str> {
        self.first_row()
            .and_then(|row| row.get(column))
            .map(String::as_str)
    }
}

impl Display for QueryResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({} rows)", self.state, self.rows.len())?;
        if let Some(sql) = &self.sql {
            write!(f, " for `{sql}`")?;
        }
        if !self.is_ok() && !self.raw.is_empty() {
            write!(f, ": {}", self.raw.trim_end())?;
        }
        Ok(())
    }
}
