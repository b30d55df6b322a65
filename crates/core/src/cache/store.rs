//! Named cache generations and their entries.
//!
//! A generation is opened by name (created on first open), read and written
//! by request identity, and dropped as a whole. Entry writes are single-row
//! UPSERTs, so two concurrent writers for one key resolve last-write-wins.

use std::collections::BTreeSet;

use super::connection::CacheDb;
use super::hash::RequestKey;
use crate::{Error, Request, StoredResponse};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

/// Handle to one named cache generation.
#[derive(Clone, Debug)]
pub struct CacheStore {
    db: CacheDb,
    name: String,
}

/// Name and size of a generation, for listings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
pub struct StoreSummary {
    pub name: String,
    pub entries: u64,
    pub created_at: String,
}

impl CacheDb {
    /// Open the generation `name`, creating it if absent.
    pub async fn open_store(&self, name: &str) -> Result<CacheStore, Error> {
        let owned = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO generations (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![owned, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(CacheStore { db: self.clone(), name: name.to_string() })
    }

    /// Whether a generation named `name` exists.
    pub async fn has_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists =
                    conn.query_row("SELECT EXISTS(SELECT 1 FROM generations WHERE name = ?1)", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a generation and every entry in it.
    ///
    /// Returns false if no generation had that name.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM generations WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of every existing generation.
    pub async fn store_names(&self) -> Result<BTreeSet<String>, Error> {
        self.conn
            .call(|conn| -> Result<BTreeSet<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<BTreeSet<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Every generation with its entry count, oldest first.
    pub async fn store_summaries(&self) -> Result<Vec<StoreSummary>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<StoreSummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT g.name, g.created_at, COUNT(e.key)
                     FROM generations g LEFT JOIN entries e ON e.generation = g.name
                     GROUP BY g.name ORDER BY g.created_at ASC, g.name ASC",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(StoreSummary {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                            entries: row.get::<_, i64>(2)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }
}

impl CacheStore {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the stored response for `request`.
    ///
    /// Only GET requests can ever match.
    pub async fn match_request(&self, request: &Request) -> Result<Option<StoredResponse>, Error> {
        if !request.is_get() {
            return Ok(None);
        }
        self.get(&request.key()).await
    }

    /// Look up an entry by request identity.
    pub async fn get(&self, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        let generation = self.name.clone();
        let key = key.as_str().to_string();
        self.db
            .conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let row = conn
                    .query_row(
                        "SELECT key, method, url, status, headers_json, body, stored_at
                         FROM entries WHERE generation = ?1 AND key = ?2",
                        params![generation, key],
                        read_row,
                    )
                    .optional()?;

                row.map(decode_row).transpose()
            })
            .await
            .map_err(Error::from)
    }

    /// Store `response` for `request`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for non-GET requests.
    pub async fn put(&self, request: &Request, response: &StoredResponse) -> Result<(), Error> {
        if !request.is_get() {
            return Err(Error::InvalidInput(format!("cannot cache {} {}", request.method, request.url)));
        }
        let entry = StoredResponse { key: request.key(), ..response.clone() };
        self.put_all(vec![entry]).await
    }

    /// Store several entries in one transaction; either all land or none do.
    pub async fn put_all(&self, responses: Vec<StoredResponse>) -> Result<(), Error> {
        let generation = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO entries (generation, key, method, url, status, headers_json, body, stored_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                         ON CONFLICT(generation, key) DO UPDATE SET
                            method = excluded.method,
                            url = excluded.url,
                            status = excluded.status,
                            headers_json = excluded.headers_json,
                            body = excluded.body,
                            stored_at = excluded.stored_at",
                    )?;
                    for r in &responses {
                        let headers_json = serde_json::to_string(&r.headers)
                            .map_err(|e| Error::CorruptEntry(format!("headers for {}: {e}", r.url)))?;
                        stmt.execute(params![
                            &generation,
                            r.key.as_str(),
                            &r.method,
                            &r.url,
                            r.status as i64,
                            headers_json,
                            &r.body[..],
                            &r.stored_at,
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// URLs of every entry, sorted.
    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        let generation = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM entries WHERE generation = ?1 ORDER BY url ASC")?;
                let urls = stmt
                    .query_map(params![generation], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn len(&self) -> Result<u64, Error> {
        let generation = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE generation = ?1", params![generation], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }
}

type RawRow = (String, String, String, i64, String, Vec<u8>, String);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?, row.get(6)?))
}

fn decode_row((key, method, url, status, headers_json, body, stored_at): RawRow) -> Result<StoredResponse, Error> {
    let headers = serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(format!("headers for {url}: {e}")))?;
    let status = u16::try_from(status).map_err(|_| Error::CorruptEntry(format!("status {status} for {url}")))?;
    Ok(StoredResponse { key: RequestKey::from_hex(key), method, url, status, headers, body: body.into(), stored_at })
}
