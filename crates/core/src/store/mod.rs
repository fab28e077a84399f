//! Durable, concurrent-safe persistence over two tables: `events` and
//! `alerts`. Backed by `sqlx`'s SQLite driver; every operation is atomic
//! from the caller's point of view and the pool serializes access
//! internally, matching this codebase's pattern of a per-call connection
//! check-out rather than a thread-local handle.

mod filter;
mod stats;

pub use filter::{AlertFilter, EventFilter};
pub use stats::{HourlyCount, NamedCount, Stats};

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::info;

use crate::error::{Error, Result};
use crate::event::{Alert, AlertStatus, AlertType, Event, EventType, LogSource, Platform, Severity};

pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens (creating if absent) the SQLite database at `path` and
    /// ensures the schema exists.
    pub async fn open(path: &str) -> Result<Self> {
        let url = format!("sqlite://{path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;
        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// An in-memory store, primarily for tests.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL,
                event_time TEXT NOT NULL,
                host TEXT,
                process TEXT,
                pid INTEGER,
                event_type TEXT NOT NULL,
                severity TEXT NOT NULL,
                user TEXT,
                src_ip TEXT,
                dst_ip TEXT,
                log_source TEXT NOT NULL,
                platform TEXT NOT NULL,
                raw_message TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS alerts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL,
                alert_type TEXT NOT NULL,
                severity TEXT NOT NULL,
                description TEXT NOT NULL,
                related_event_ids TEXT NOT NULL,
                status TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_events_type_time ON events(event_type, event_time)",
            "CREATE INDEX IF NOT EXISTS idx_events_user_time ON events(user, event_time)",
            "CREATE INDEX IF NOT EXISTS idx_events_srcip_time ON events(src_ip, event_time)",
            "CREATE INDEX IF NOT EXISTS idx_events_severity ON events(severity)",
            "CREATE INDEX IF NOT EXISTS idx_events_log_source ON events(log_source)",
            "CREATE INDEX IF NOT EXISTS idx_alerts_created_at ON alerts(created_at)",
            "CREATE INDEX IF NOT EXISTS idx_alerts_severity_status ON alerts(severity, status)",
            "CREATE INDEX IF NOT EXISTS idx_alerts_type_created ON alerts(alert_type, created_at)",
        ];
        for stmt in indexes {
            sqlx::query(stmt).execute(&self.pool).await?;
        }

        info!("store schema ready");
        Ok(())
    }

    pub async fn insert_event(&self, event: &Event) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO events
                (created_at, event_time, host, process, pid, event_type, severity,
                 user, src_ip, dst_ip, log_source, platform, raw_message)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(event.created_at.to_rfc3339())
        .bind(event.event_time.to_rfc3339())
        .bind(&event.host)
        .bind(&event.process)
        .bind(event.pid)
        .bind(event.event_type.as_str().to_string())
        .bind(event.severity.to_string())
        .bind(&event.user)
        .bind(&event.src_ip)
        .bind(&event.dst_ip)
        .bind(event.log_source.to_string())
        .bind(event.platform.to_string())
        .bind(&event.raw_message)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get::<i64, _>("id")?)
    }

    pub async fn insert_alert(&self, alert: &Alert) -> Result<i64> {
        let related = serde_json::to_string(&alert.related_event_ids)
            .map_err(|e| Error::database(format!("failed to encode related_event_ids: {e}")))?;
        let row = sqlx::query(
            r#"
            INSERT INTO alerts
                (created_at, alert_type, severity, description, related_event_ids, status)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(alert.created_at.to_rfc3339())
        .bind(alert.alert_type.as_str())
        .bind(alert.severity.to_string())
        .bind(&alert.description)
        .bind(related)
        .bind(alert.status.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get::<i64, _>("id")?)
    }

    pub async fn query_events(
        &self,
        filter: &EventFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Event>, i64)> {
        let mut count_qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) as c FROM events");
        Self::push_event_where(&mut count_qb, filter);
        let total: i64 = count_qb.build().fetch_one(&self.pool).await?.try_get("c")?;

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM events");
        Self::push_event_where(&mut qb, filter);
        qb.push(" ORDER BY event_time DESC, id DESC LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let events = rows.iter().map(event_from_row).collect::<Result<Vec<_>>>()?;
        Ok((events, total))
    }

    fn push_event_where(qb: &mut QueryBuilder<Sqlite>, filter: &EventFilter) {
        let mut first = true;
        macro_rules! clause {
            () => {{
                qb.push(if first { " WHERE " } else { " AND " });
                first = false;
            }};
        }

        if let Some(v) = &filter.event_type {
            clause!();
            qb.push("event_type = ").push_bind(v.as_str().to_string());
        }
        if let Some(v) = filter.platform {
            clause!();
            qb.push("platform = ").push_bind(v.to_string());
        }
        if let Some(v) = &filter.user {
            clause!();
            qb.push("user LIKE ").push_bind(format!("%{v}%"));
        }
        if let Some(v) = &filter.src_ip {
            clause!();
            qb.push("src_ip LIKE ").push_bind(format!("%{v}%"));
        }
        if let Some(v) = filter.severity {
            clause!();
            qb.push("severity = ").push_bind(v.to_string());
        }
        if let Some(v) = filter.log_source {
            clause!();
            qb.push("log_source = ").push_bind(v.to_string());
        }
        if let Some(v) = &filter.search {
            clause!();
            let needle = format!("%{v}%");
            qb.push("(raw_message LIKE ")
                .push_bind(needle.clone())
                .push(" OR user LIKE ")
                .push_bind(needle.clone())
                .push(" OR src_ip LIKE ")
                .push_bind(needle.clone())
                .push(" OR process LIKE ")
                .push_bind(needle)
                .push(")");
        }
        if let Some(minutes) = filter.since_minutes {
            clause!();
            let cutoff = (Utc::now() - chrono::Duration::minutes(minutes)).to_rfc3339();
            qb.push("event_time >= ").push_bind(cutoff);
        }
        if let Some(from) = filter.from {
            clause!();
            qb.push("event_time >= ").push_bind(from.to_rfc3339());
        }
        if let Some(to) = filter.to {
            clause!();
            qb.push("event_time <= ").push_bind(to.to_rfc3339());
        }
    }

    pub async fn query_alerts(
        &self,
        filter: &AlertFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Alert>, i64)> {
        let mut count_qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) as c FROM alerts");
        Self::push_alert_where(&mut count_qb, filter);
        let total: i64 = count_qb.build().fetch_one(&self.pool).await?.try_get("c")?;

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM alerts");
        Self::push_alert_where(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let alerts = rows.iter().map(alert_from_row).collect::<Result<Vec<_>>>()?;
        Ok((alerts, total))
    }

    fn push_alert_where(qb: &mut QueryBuilder<Sqlite>, filter: &AlertFilter) {
        let mut first = true;
        macro_rules! clause {
            () => {{
                qb.push(if first { " WHERE " } else { " AND " });
                first = false;
            }};
        }

        if let Some(v) = filter.alert_type {
            clause!();
            qb.push("alert_type = ").push_bind(v.as_str());
        }
        if let Some(v) = filter.severity {
            clause!();
            qb.push("severity = ").push_bind(v.to_string());
        }
        if let Some(v) = filter.status {
            clause!();
            qb.push("status = ").push_bind(v.to_string());
        }
        if let Some(minutes) = filter.since_minutes {
            clause!();
            let cutoff = (Utc::now() - chrono::Duration::minutes(minutes)).to_rfc3339();
            qb.push("created_at >= ").push_bind(cutoff);
        }
        if let Some(from) = filter.from {
            clause!();
            qb.push("created_at >= ").push_bind(from.to_rfc3339());
        }
        if let Some(to) = filter.to {
            clause!();
            qb.push("created_at <= ").push_bind(to.to_rfc3339());
        }
    }

    /// Succeeds only if `status` is one of the four valid alert statuses.
    pub async fn update_alert_status(&self, id: i64, status: AlertStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE alerts SET status = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Convenience composition over `query_events`, matching the rule
    /// engine's bespoke 15-minute/1000-row pull so that contract lives in
    /// one named place instead of a magic call site.
    pub async fn recent_events_for_analysis(&self, minutes: i64, limit: i64) -> Result<Vec<Event>> {
        let filter = EventFilter::new().since_minutes(minutes);
        let (events, _) = self.query_events(&filter, limit, 0).await?;
        Ok(events)
    }

    pub async fn stats(&self) -> Result<Stats> {
        let mut stats = Stats::default();

        stats.total_events = sqlx::query("SELECT COUNT(*) as c FROM events")
            .fetch_one(&self.pool)
            .await?
            .try_get("c")?;
        stats.total_alerts = sqlx::query("SELECT COUNT(*) as c FROM alerts")
            .fetch_one(&self.pool)
            .await?
            .try_get("c")?;

        stats.events_by_type = Self::group_counts(&self.pool, "events", "event_type").await?;
        stats.events_by_os = Self::group_counts(&self.pool, "events", "platform").await?;
        stats.events_by_severity = Self::group_counts(&self.pool, "events", "severity").await?;
        stats.alerts_by_severity = Self::group_counts(&self.pool, "alerts", "severity").await?;
        stats.alerts_by_status = Self::group_counts(&self.pool, "alerts", "status").await?;

        stats.top_source_ips = Self::top_named_counts(&self.pool, "src_ip").await?;
        stats.top_users = Self::top_named_counts(&self.pool, "user").await?;

        let hourly_rows = sqlx::query(
            r#"
            SELECT strftime('%Y-%m-%dT%H:00:00', event_time) as hour, COUNT(*) as c
            FROM events
            WHERE event_time >= ?
            GROUP BY hour
            ORDER BY hour ASC
            "#,
        )
        .bind((Utc::now() - chrono::Duration::hours(24)).to_rfc3339())
        .fetch_all(&self.pool)
        .await?;
        stats.hourly_events = hourly_rows
            .iter()
            .map(|r| -> Result<HourlyCount> {
                Ok(HourlyCount {
                    hour: r.try_get("hour")?,
                    count: r.try_get("c")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        stats.failed_logins = sqlx::query(
            "SELECT COUNT(*) as c FROM events WHERE event_type IN (?, ?)",
        )
        .bind(EventType::AuthFailure.as_str().to_string())
        .bind(EventType::AuditAuthFailure.as_str().to_string())
        .fetch_one(&self.pool)
        .await?
        .try_get("c")?;

        stats.successful_logins = sqlx::query(
            "SELECT COUNT(*) as c FROM events WHERE event_type IN (?, ?)",
        )
        .bind(EventType::AuthSuccess.as_str().to_string())
        .bind(EventType::AuditAuthSuccess.as_str().to_string())
        .fetch_one(&self.pool)
        .await?
        .try_get("c")?;

        stats.unique_ips = sqlx::query(
            "SELECT COUNT(DISTINCT src_ip) as c FROM events WHERE src_ip IS NOT NULL",
        )
        .fetch_one(&self.pool)
        .await?
        .try_get("c")?;

        Ok(stats)
    }

    async fn group_counts(pool: &SqlitePool, table: &str, column: &str) -> Result<HashMap<String, i64>> {
        let sql = format!("SELECT {column} as k, COUNT(*) as c FROM {table} GROUP BY {column}");
        let rows = sqlx::query(&sql).fetch_all(pool).await?;
        let mut map = HashMap::new();
        for row in rows {
            let key: Option<String> = row.try_get("k")?;
            let count: i64 = row.try_get("c")?;
            map.insert(key.unwrap_or_default(), count);
        }
        Ok(map)
    }

    async fn top_named_counts(pool: &SqlitePool, column: &str) -> Result<Vec<NamedCount>> {
        let sql = format!(
            "SELECT {column} as k, COUNT(*) as c FROM events WHERE {column} IS NOT NULL GROUP BY {column} ORDER BY c DESC LIMIT 10"
        );
        let rows = sqlx::query(&sql).fetch_all(pool).await?;
        rows.iter()
            .map(|r| -> Result<NamedCount> {
                Ok(NamedCount {
                    name: r.try_get("k")?,
                    count: r.try_get("c")?,
                })
            })
            .collect()
    }
}

fn event_from_row(row: &SqliteRow) -> Result<Event> {
    let event_type_str: String = row.try_get("event_type")?;
    let severity_str: String = row.try_get("severity")?;
    let log_source_str: String = row.try_get("log_source")?;
    let platform_str: String = row.try_get("platform")?;
    let created_at_str: String = row.try_get("created_at")?;
    let event_time_str: String = row.try_get("event_time")?;

    Ok(Event {
        id: row.try_get("id")?,
        created_at: parse_timestamp(&created_at_str)?,
        event_time: parse_timestamp(&event_time_str)?,
        host: row.try_get("host")?,
        process: row.try_get("process")?,
        pid: row.try_get("pid")?,
        event_type: EventType::parse_str(&event_type_str)
            .ok_or_else(|| Error::database(format!("unknown event_type in store: {event_type_str}")))?,
        severity: Severity::from_str(&severity_str)
            .map_err(|_| Error::database(format!("unknown severity in store: {severity_str}")))?,
        user: row.try_get("user")?,
        src_ip: row.try_get("src_ip")?,
        dst_ip: row.try_get("dst_ip")?,
        log_source: LogSource::from_str(&log_source_str)
            .map_err(|_| Error::database(format!("unknown log_source in store: {log_source_str}")))?,
        platform: Platform::from_str(&platform_str)
            .map_err(|_| Error::database(format!("unknown platform in store: {platform_str}")))?,
        raw_message: row.try_get("raw_message")?,
    })
}

fn alert_from_row(row: &SqliteRow) -> Result<Alert> {
    let alert_type_str: String = row.try_get("alert_type")?;
    let severity_str: String = row.try_get("severity")?;
    let status_str: String = row.try_get("status")?;
    let created_at_str: String = row.try_get("created_at")?;
    let related_str: String = row.try_get("related_event_ids")?;

    Ok(Alert {
        id: row.try_get("id")?,
        created_at: parse_timestamp(&created_at_str)?,
        alert_type: AlertType::from_str(&alert_type_str)
            .map_err(|_| Error::database(format!("unknown alert_type in store: {alert_type_str}")))?,
        severity: Severity::from_str(&severity_str)
            .map_err(|_| Error::database(format!("unknown severity in store: {severity_str}")))?,
        description: row.try_get("description")?,
        related_event_ids: serde_json::from_str(&related_str)
            .map_err(|e| Error::database(format!("corrupt related_event_ids: {e}")))?,
        status: AlertStatus::from_str(&status_str)
            .map_err(|_| Error::database(format!("unknown status in store: {status_str}")))?,
    })
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::database(format!("corrupt timestamp in store: {e}")))
}
