//! SQLite backend for the query path.
//!
//! [`SqliteRangeQuery`] holds one read-only connection and runs each range
//! query inside a transaction that is rolled back afterwards. Rows come back
//! as loosely typed [`Value`]s; the column contract is checked by the caller.

use crate::query::{QueryError, QueryRows, RangeQuery, Value};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::sync::Mutex;
use std::time::Duration;

/// How long a query waits on a locked database before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// RangeQuery backed by rusqlite (bundled SQLite).
///
/// `start` and `end` are bound as RFC 3339 UTC text (`2024-01-05T10:00:00Z`)
/// to as many of the first two parameters as the statement declares.
#[derive(Debug)]
pub struct SqliteRangeQuery {
    conn: Mutex<Connection>,
}

impl SqliteRangeQuery {
    /// Open the database named by `dsn` (a path or `file:` URI) read-only.
    pub fn open(dsn: &str) -> Result<Self, QueryError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(dsn, flags)
            .map_err(|e| QueryError::Connection(e.to_string()))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| QueryError::Connection(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already-open connection (useful in tests).
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl RangeQuery for SqliteRangeQuery {
    fn fetch(
        &self,
        sql: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<QueryRows, QueryError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| QueryError::Query(e.to_string()))?;

        // Never committed: the statement only ever sees a read transaction.
        let tx = conn
            .transaction()
            .map_err(|e| QueryError::Query(e.to_string()))?;

        let result = {
            let mut stmt = tx
                .prepare(sql)
                .map_err(|e| QueryError::Query(e.to_string()))?;

            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(String::from)
                .collect();

            let bounds = [
                start.to_rfc3339_opts(SecondsFormat::Secs, true),
                end.to_rfc3339_opts(SecondsFormat::Secs, true),
            ];
            for (i, bound) in bounds.iter().take(stmt.parameter_count()).enumerate() {
                stmt.raw_bind_parameter(i + 1, bound)
                    .map_err(|e| QueryError::Query(e.to_string()))?;
            }

            let mut rows = stmt.raw_query();
            let mut out = Vec::new();
            while let Some(row) = rows.next().map_err(|e| QueryError::Query(e.to_string()))? {
                let values = (0..columns.len())
                    .map(|idx| row_value_at(row, idx))
                    .collect::<Result<Vec<_>, _>>()?;
                out.push(values);
            }

            QueryRows { columns, rows: out }
        };

        tx.rollback()
            .map_err(|e| QueryError::Query(e.to_string()))?;
        Ok(result)
    }
}

/// Extract a Value from a rusqlite row at a given column index.
fn row_value_at(row: &rusqlite::Row<'_>, idx: usize) -> Result<Value, QueryError> {
    let value = row
        .get_ref(idx)
        .map_err(|e| QueryError::Query(e.to_string()))?;
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn seeded() -> SqliteRangeQuery {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE hits (ts TEXT NOT NULL, n INTEGER NOT NULL);
             INSERT INTO hits VALUES ('2024-01-05T10:00:00Z', 3);
             INSERT INTO hits VALUES ('2024-01-05T10:01:00Z', 4);
             INSERT INTO hits VALUES ('2024-02-20T00:00:00Z', 9);",
        )
        .unwrap();
        SqliteRangeQuery::from_connection(conn)
    }

    fn range() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn binds_range_and_reads_columns() {
        let (start, end) = range();
        let rows = seeded()
            .fetch(
                "SELECT ts AS time, n AS value FROM hits WHERE ts >= ?1 AND ts < ?2 ORDER BY ts",
                start,
                end,
            )
            .unwrap();

        assert_eq!(rows.columns, vec!["time".to_string(), "value".to_string()]);
        assert_eq!(
            rows.rows,
            vec![
                vec![Value::Text("2024-01-05T10:00:00Z".to_string()), Value::Integer(3)],
                vec![Value::Text("2024-01-05T10:01:00Z".to_string()), Value::Integer(4)],
            ]
        );
    }

    #[test]
    fn statements_without_parameters_are_allowed() {
        let (start, end) = range();
        let rows = seeded()
            .fetch("SELECT ts AS time, n AS value FROM hits", start, end)
            .unwrap();
        assert_eq!(rows.rows.len(), 3);
    }

    #[test]
    fn writes_are_rolled_back() {
        let (start, end) = range();
        let backend = seeded();
        backend
            .fetch("INSERT INTO hits VALUES (?1, 1) RETURNING ts AS time, n AS value", start, end)
            .unwrap();
        let rows = backend
            .fetch("SELECT ts AS time, n AS value FROM hits", start, end)
            .unwrap();
        assert_eq!(rows.rows.len(), 3);
    }

    #[test]
    fn bad_sql_is_a_query_error() {
        let (start, end) = range();
        assert!(matches!(
            seeded().fetch("SELEKT nothing", start, end).unwrap_err(),
            QueryError::Query(_)
        ));
    }

    #[test]
    fn missing_database_is_a_connection_error() {
        assert!(matches!(
            SqliteRangeQuery::open("/nonexistent/grapher/hits.db").unwrap_err(),
            QueryError::Connection(_)
        ));
    }
}
