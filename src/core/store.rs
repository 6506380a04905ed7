use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tokio::sync::{mpsc, oneshot};

use crate::core::models::Ayah;

/// Schema DDL run on open.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// Cache key for one chapter's verse list.
pub fn ayahs_key(surah_number: u16) -> String {
    format!("ayahs_{surah_number}")
}

// ---------------------------------------------------------------------------
// Commands sent from async world → background thread
// ---------------------------------------------------------------------------

enum CacheCmd {
    Get {
        key: String,
        reply: oneshot::Sender<Result<Option<String>, String>>,
    },
    Set {
        key: String,
        value: String,
        reply: oneshot::Sender<Result<(), String>>,
    },
}

// ---------------------------------------------------------------------------
// CacheHandle — Clone + Send + Sync async facade
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct CacheHandle {
    tx: mpsc::UnboundedSender<CacheCmd>,
}

impl CacheHandle {
    /// Open (or create) the cache database in the default data directory
    /// and spawn the background thread.
    pub fn open() -> Result<Self, String> {
        let dir = Self::resolve_path()?;
        Self::open_in(&dir)
    }

    /// Open the cache database under an explicit directory.
    pub fn open_in(dir: &Path) -> Result<Self, String> {
        std::fs::create_dir_all(dir).map_err(|e| format!("Failed to create cache dir: {e}"))?;

        let db_file = dir.join("cache.db");
        let conn =
            Connection::open(&db_file).map_err(|e| format!("Failed to open cache db: {e}"))?;

        Self::spawn(conn)
    }

    /// Ephemeral cache, handy for tests.
    pub fn open_in_memory() -> Result<Self, String> {
        let conn =
            Connection::open_in_memory().map_err(|e| format!("Failed to open cache db: {e}"))?;
        Self::spawn(conn)
    }

    fn spawn(conn: Connection) -> Result<Self, String> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| format!("Failed to init cache schema: {e}"))?;

        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("mushaf-cache".into())
            .spawn(move || Self::run_loop(conn, rx))
            .map_err(|e| format!("Failed to spawn cache thread: {e}"))?;

        Ok(CacheHandle { tx })
    }

    /// A handle whose background thread is gone — every operation fails.
    #[cfg(test)]
    pub(crate) fn closed() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        CacheHandle { tx }
    }

    fn resolve_path() -> Result<PathBuf, String> {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Ok(base.join("mushaf"))
    }

    // -- async methods -------------------------------------------------------

    pub async fn get(&self, key: String) -> Result<Option<String>, String> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CacheCmd::Get { key, reply })
            .map_err(|_| "Cache unavailable".to_string())?;
        rx.await.map_err(|_| "Cache unavailable".to_string())?
    }

    pub async fn set(&self, key: String, value: String) -> Result<(), String> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CacheCmd::Set { key, value, reply })
            .map_err(|_| "Cache unavailable".to_string())?;
        rx.await.map_err(|_| "Cache unavailable".to_string())?
    }

    /// Load one chapter's verse list. `None` means no entry — a cache
    /// miss, not an error.
    pub async fn load_ayahs(&self, surah_number: u16) -> Result<Option<Vec<Ayah>>, String> {
        match self.get(ayahs_key(surah_number)).await? {
            Some(raw) => {
                let ayahs: Vec<Ayah> = serde_json::from_str(&raw)
                    .map_err(|e| format!("Cache decode error for surah {surah_number}: {e}"))?;
                Ok(Some(ayahs))
            }
            None => Ok(None),
        }
    }

    /// Persist one chapter's complete verse list, replacing any previous
    /// entry. The write is a single statement inside the serialized cache
    /// thread, so a reader never observes a partial list.
    pub async fn save_ayahs(&self, surah_number: u16, ayahs: &[Ayah]) -> Result<(), String> {
        let raw = serde_json::to_string(ayahs)
            .map_err(|e| format!("Cache encode error for surah {surah_number}: {e}"))?;
        self.set(ayahs_key(surah_number), raw).await
    }

    // -- background thread ---------------------------------------------------

    fn run_loop(conn: Connection, mut rx: mpsc::UnboundedReceiver<CacheCmd>) {
        while let Some(cmd) = rx.blocking_recv() {
            match cmd {
                CacheCmd::Get { key, reply } => {
                    let _ = reply.send(Self::do_get(&conn, &key));
                }
                CacheCmd::Set { key, value, reply } => {
                    let _ = reply.send(Self::do_set(&conn, &key, &value));
                }
            }
        }
        log::debug!("Cache thread exiting");
    }

    // -- synchronous DB operations -------------------------------------------

    fn do_get(conn: &Connection, key: &str) -> Result<Option<String>, String> {
        let result = conn.query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
            row.get::<_, String>(0)
        });

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(format!("Cache read error: {e}")),
        }
    }

    fn do_set(conn: &Connection, key: &str, value: &str) -> Result<(), String> {
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| format!("Cache tx error: {e}"))?;

        tx.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, value],
        )
        .map_err(|e| format!("Cache write error: {e}"))?;

        tx.commit().map_err(|e| format!("Cache commit error: {e}"))?;
        Ok(())
    }
}
