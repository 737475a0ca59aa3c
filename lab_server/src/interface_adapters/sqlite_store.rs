use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool};

use crate::domain::entities::{DATE_FORMAT, SessionRecord, SessionStatus, TIME_FORMAT};
use crate::domain::errors::StoreError;
use crate::domain::ports::SessionStore;

const INSERT_COLUMNS: &str =
    "session_id, register_no, name, department, system_no, in_time, in_date, status";

const SELECT_COLUMNS: &str = r#"
    SELECT session_id, register_no, name, department, system_no,
           in_date, in_time, out_date, out_time, status
    FROM logs
"#;

// SQLite-backed session store. The file lock serializes writers.
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Waits for in-flight queries and closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn insert(&self, record: SessionRecord) -> Result<(), StoreError> {
        let sql = format!("INSERT INTO logs ({INSERT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)");
        bind_record(sqlx::query(&sql), &record)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert_unless_active(&self, record: SessionRecord) -> Result<bool, StoreError> {
        // A single statement, so the existence check runs under the write lock.
        let sql = format!(
            "INSERT INTO logs ({INSERT_COLUMNS}) \
             SELECT ?, ?, ?, ?, ?, ?, ?, ? \
             WHERE NOT EXISTS ( \
                 SELECT 1 FROM logs WHERE register_no = ? AND status = 'active' \
             )"
        );
        let result = bind_record(sqlx::query(&sql), &record)
            .bind(&record.register_no)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_active_by_id(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let sql = format!("{SELECT_COLUMNS} WHERE session_id = ? AND status = 'active'");
        let row = sqlx::query(&sql)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row).transpose()
    }

    async fn complete(
        &self,
        session_id: &str,
        checked_out_at: NaiveDateTime,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE logs
            SET out_time = ?, out_date = ?, status = 'completed'
            WHERE session_id = ? AND status = 'active'
            "#,
        )
        .bind(checked_out_at.format(TIME_FORMAT).to_string())
        .bind(checked_out_at.format(DATE_FORMAT).to_string())
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY id DESC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(map_row).collect()
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError(err.to_string())
    }
}

fn bind_record<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    record: &'q SessionRecord,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    query
        .bind(&record.session_id)
        .bind(&record.register_no)
        .bind(&record.name)
        .bind(&record.department)
        .bind(&record.system_no)
        .bind(record.checked_in_at.format(TIME_FORMAT).to_string())
        .bind(record.checked_in_at.format(DATE_FORMAT).to_string())
        .bind(record.status.as_str())
}

fn map_row(row: &SqliteRow) -> Result<SessionRecord, StoreError> {
    let in_date: String = row.try_get("in_date")?;
    let in_time: String = row.try_get("in_time")?;
    let out_date: Option<String> = row.try_get("out_date")?;
    let out_time: Option<String> = row.try_get("out_time")?;
    let status: String = row.try_get("status")?;

    let checked_out_at = match (out_date, out_time) {
        (Some(date), Some(time)) => Some(join_timestamp(&date, &time)?),
        _ => None,
    };

    Ok(SessionRecord {
        session_id: row.try_get("session_id")?,
        register_no: row.try_get("register_no")?,
        name: row.try_get("name")?,
        department: row.try_get("department")?,
        system_no: row.try_get("system_no")?,
        checked_in_at: join_timestamp(&in_date, &in_time)?,
        checked_out_at,
        status: status.parse::<SessionStatus>().map_err(StoreError)?,
    })
}

fn join_timestamp(date: &str, time: &str) -> Result<NaiveDateTime, StoreError> {
    let format = format!("{DATE_FORMAT} {TIME_FORMAT}");
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), &format)
        .map_err(|err| StoreError(format!("invalid stored timestamp {date} {time}: {err}")))
}
