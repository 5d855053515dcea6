//! SQLite Fragment store
//!
//! Coordinates are kept in columns for lookup; the full Fragment (model,
//! instance, trace) is stored as a JSON body. `data_id` and `is_reference`
//! are always read back from their columns.

#![allow(clippy::result_large_err)]

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use modicio_core::errors::ModicioError;
use modicio_core::rules::validate_reference_candidate;
use modicio_core::{log_op_end, log_op_error, log_op_start, Fragment};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};

use super::fragment_store::{
    instance_heads, latest_per, variant_heads, FragmentQuery, FragmentStore, InstanceQuery,
};
use crate::db;
use crate::errors::{from_rusqlite, lock_poisoned, serialization_error, Result};
use crate::migrations::apply_migrations;

const SELECT_FRAGMENT: &str = "SELECT data_id, is_reference, body FROM fragments";
const ORDER_RECENT: &str = "ORDER BY running_time DESC, data_id DESC";

/// Fragment store backed by one SQLite connection
pub struct SqliteFragmentStore {
    conn: Mutex<Connection>,
}

impl SqliteFragmentStore {
    /// Open (or create) the database at `path` and bring its schema up to date
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = db::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self, op: &str) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| lock_poisoned(op))
    }
}

/// Raw columns of a `SELECT_FRAGMENT` row
fn fragment_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, bool, String)> {
    Ok((row.get(0)?, row.get::<_, i64>(1)? != 0, row.get(2)?))
}

fn decode((data_id, is_reference, body): (i64, bool, String)) -> Result<Fragment> {
    let mut fragment: Fragment =
        serde_json::from_str(&body).map_err(|e| serialization_error("decode_fragment", e))?;
    fragment.data_id = Some(data_id);
    fragment.is_reference = is_reference;
    Ok(fragment)
}

fn query_fragments(conn: &Connection, sql: &str, params: Vec<Value>) -> Result<Vec<Fragment>> {
    let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
    let rows = stmt
        .query_map(params_from_iter(params), fragment_from_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    rows.into_iter().map(decode).collect()
}

/// WHERE clause and parameters for a coordinate query
fn where_clause(query: &FragmentQuery) -> (String, Vec<Value>) {
    let mut conditions = vec!["1 = 1".to_string()];
    let mut params = Vec::new();
    if let Some(id) = &query.variant_id {
        conditions.push("variant_id = ?".to_string());
        params.push(Value::Text(id.clone()));
    }
    if let Some(id) = &query.running_id {
        conditions.push("running_id = ?".to_string());
        params.push(Value::Text(id.clone()));
    }
    if let Some(name) = &query.variant_name {
        conditions.push("variant_name = ?".to_string());
        params.push(Value::Text(name.clone()));
    }
    if let Some(time) = &query.variant_time {
        conditions.push("variant_time = ?".to_string());
        params.push(Value::Integer(time.timestamp_millis()));
    }
    if query.closed_only {
        conditions.push("open = 0".to_string());
    }
    if query.model_only {
        conditions.push("instance_of IS NULL".to_string());
    }
    (conditions.join(" AND "), params)
}

fn fetch_latest(conn: &Connection, query: &FragmentQuery) -> Result<Option<Fragment>> {
    let (clause, params) = where_clause(query);
    let sql = format!("{} WHERE {} {} LIMIT 1", SELECT_FRAGMENT, clause, ORDER_RECENT);
    Ok(query_fragments(conn, &sql, params)?.into_iter().next())
}

impl FragmentStore for SqliteFragmentStore {
    fn fetch_fragment(&self, query: &FragmentQuery) -> Result<Option<Fragment>> {
        let conn = self.lock("fetch_fragment")?;
        fetch_latest(&conn, query)
    }

    fn fetch_by_data_id(&self, data_id: i64) -> Result<Option<Fragment>> {
        let conn = self.lock("fetch_by_data_id")?;
        conn.query_row(
            &format!("{} WHERE data_id = ?", SELECT_FRAGMENT),
            [data_id],
            fragment_from_row,
        )
        .optional()
        .map_err(from_rusqlite)?
        .map(decode)
        .transpose()
    }

    fn fetch_reference_fragment(&self) -> Result<Option<Fragment>> {
        let conn = self.lock("fetch_reference_fragment")?;
        conn.query_row(
            &format!("{} WHERE is_reference = 1", SELECT_FRAGMENT),
            [],
            fragment_from_row,
        )
        .optional()
        .map_err(from_rusqlite)?
        .map(decode)
        .transpose()
    }

    fn persist(&self, mut fragment: Fragment) -> Result<Fragment> {
        log_op_start!("persist", global_id = %fragment.global_id);
        let start = std::time::Instant::now();

        fragment.data_id = None;
        fragment.is_reference = false;
        let result = self.lock("persist").and_then(|conn| {
            let body = serde_json::to_string(&fragment)
                .map_err(|e| serialization_error("encode_fragment", e))?;
            let instance = fragment.instance.as_ref();
            conn.execute(
                "INSERT INTO fragments (global_id, predecessor_id, variant_id, variant_name,
                    variant_time, running_id, running_time, open, is_reference,
                    instance_of, instance_uri, body, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10, ?11, ?12)",
                rusqlite::params![
                    fragment.global_id,
                    fragment.predecessor_id,
                    fragment.variant_id,
                    fragment.variant_name,
                    fragment.variant_time.timestamp_millis(),
                    fragment.running_id,
                    fragment.running_time.timestamp_millis(),
                    if fragment.open { 1 } else { 0 },
                    instance.map(|i| i.model_root.as_str()),
                    instance.map(|i| i.uri.as_str()),
                    body,
                    chrono::Utc::now().timestamp(),
                ],
            )
            .map_err(from_rusqlite)?;
            Ok(conn.last_insert_rowid())
        });

        match result {
            Ok(data_id) => {
                fragment.data_id = Some(data_id);
                log_op_end!(
                    "persist",
                    duration_ms = start.elapsed().as_millis() as u64,
                    data_id = data_id
                );
                Ok(fragment)
            }
            Err(e) => {
                log_op_error!(
                    "persist",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(e)
            }
        }
    }

    fn set_reference(&self, variant_id: &str, running_id: &str) -> Result<Fragment> {
        log_op_start!("set_reference", variant_id = variant_id, running_id = running_id);
        let start = std::time::Instant::now();

        let result = self.lock("set_reference").and_then(|mut conn| {
            let tx = conn.transaction().map_err(from_rusqlite)?;
            let query = FragmentQuery::version(variant_id, running_id).model_only();
            let mut candidate = fetch_latest(&tx, &query)?.ok_or_else(|| {
                ModicioError::FragmentNotFound {
                    query: query.to_string(),
                }
            })?;
            validate_reference_candidate(&candidate)?;

            tx.execute("UPDATE fragments SET is_reference = 0 WHERE is_reference = 1", [])
                .map_err(from_rusqlite)?;
            tx.execute(
                "UPDATE fragments SET is_reference = 1 WHERE data_id = ?",
                [candidate.data_id],
            )
            .map_err(from_rusqlite)?;
            tx.commit().map_err(from_rusqlite)?;

            candidate.is_reference = true;
            Ok(candidate)
        });

        match &result {
            Ok(reference) => log_op_end!(
                "set_reference",
                duration_ms = start.elapsed().as_millis() as u64,
                data_id = reference.data_id.unwrap_or_default()
            ),
            Err(e) => log_op_error!(
                "set_reference",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            ),
        }
        result
    }

    fn list_variants(&self, limit: usize, closed_only: bool) -> Result<Vec<Fragment>> {
        let conn = self.lock("list_variants")?;
        let query = FragmentQuery {
            closed_only,
            ..FragmentQuery::default()
        }
        .model_only();
        let (clause, params) = where_clause(&query);
        let sql = format!("{} WHERE {} {}", SELECT_FRAGMENT, clause, ORDER_RECENT);
        Ok(variant_heads(query_fragments(&conn, &sql, params)?, limit))
    }

    fn list_running_versions(
        &self,
        variant_id: &str,
        limit: usize,
        closed_only: bool,
    ) -> Result<Vec<Fragment>> {
        let conn = self.lock("list_running_versions")?;
        let query = FragmentQuery {
            closed_only,
            ..FragmentQuery::variant(variant_id)
        }
        .model_only();
        let (clause, params) = where_clause(&query);
        let sql = format!("{} WHERE {} {}", SELECT_FRAGMENT, clause, ORDER_RECENT);
        Ok(latest_per(
            query_fragments(&conn, &sql, params)?,
            limit,
            |f| f.running_id.clone(),
        ))
    }

    fn find_instances(&self, query: &InstanceQuery) -> Result<Vec<Fragment>> {
        let conn = self.lock("find_instances")?;
        let mut conditions = vec!["instance_of IS NOT NULL".to_string()];
        let mut params = Vec::new();
        if let Some(pattern) = &query.type_pattern {
            conditions.push("instr(lower(instance_of), lower(?)) > 0".to_string());
            params.push(Value::Text(pattern.clone()));
        }
        if let Some(id) = &query.variant_id {
            conditions.push("variant_id = ?".to_string());
            params.push(Value::Text(id.clone()));
        }
        if let Some(id) = &query.running_id {
            conditions.push("running_id = ?".to_string());
            params.push(Value::Text(id.clone()));
        }
        let sql = format!(
            "{} WHERE {} {}",
            SELECT_FRAGMENT,
            conditions.join(" AND "),
            ORDER_RECENT
        );
        Ok(instance_heads(query_fragments(&conn, &sql, params)?, query.limit))
    }

    fn delete_fragment(&self, data_id: i64) -> Result<bool> {
        let conn = self.lock("delete_fragment")?;
        let removed = conn
            .execute("DELETE FROM fragments WHERE data_id = ?", [data_id])
            .map_err(from_rusqlite)?;
        Ok(removed > 0)
    }
}
