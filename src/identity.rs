//! Stable opaque client identifier, persisted across runs.

use rand::distributions::Alphanumeric;
use rand::Rng;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

const CLIENT_ID_KEY: &str = "chatbot_user_id";
const ID_SUFFIX_LEN: usize = 12;

/// Generate a fresh collision-resistant id: `user-` plus 12 random
/// alphanumeric characters.
pub fn generate_client_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("user-{}", suffix)
}

/// Client-local key-value storage backed by SQLite.
#[derive(Clone)]
pub struct ClientStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for ClientStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientStore")
            .field("conn", &"Arc<Mutex<Connection>>")
            .finish()
    }
}

impl ClientStore {
    /// Open the default store under `./db/`.
    pub fn open_default() -> rusqlite::Result<Self> {
        let db_dir = std::path::PathBuf::from("./db");
        if !db_dir.exists() {
            std::fs::create_dir_all(&db_dir).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create db directory: {}", e)),
                )
            })?;
        }
        Self::open(&db_dir.join("youth-chat.db"))
    }

    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS client_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// The persisted client id; generated and stored on first call and
    /// returned unchanged afterwards. A storage failure degrades to a
    /// fresh ephemeral id for this call only (session continuity is lost,
    /// correctness is not).
    pub fn client_id(&self) -> String {
        match self.get_or_create_id() {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("client id storage unavailable, using ephemeral id: {e}");
                generate_client_id()
            }
        }
    }

    fn get_or_create_id(&self) -> rusqlite::Result<String> {
        if let Some(id) = self.get(CLIENT_ID_KEY)? {
            return Ok(id);
        }
        let id = generate_client_id();
        self.put(CLIENT_ID_KEY, &id)?;
        Ok(id)
    }

    fn get(&self, key: &str) -> rusqlite::Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT value FROM client_state WHERE key = ?1")?;
        let mut rows = stmt.query_map(rusqlite::params![key], |row| row.get::<_, String>(0))?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO client_state (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_expected_shape() {
        let id = generate_client_id();
        let suffix = id.strip_prefix("user-").expect("user- prefix");
        assert_eq!(suffix.len(), ID_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, generate_client_id());
    }

    #[test]
    fn client_id_is_stable_across_calls_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.db");

        let store = ClientStore::open(&path).unwrap();
        let first = store.client_id();
        assert_eq!(store.client_id(), first);

        // a reopened store sees the same persisted value
        let reopened = ClientStore::open(&path).unwrap();
        assert_eq!(reopened.client_id(), first);
    }
}
