use std::collections::HashMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{SupportTicket, TicketFields};

/// 工單集合所使用的固定儲存鍵。 / Fixed storage key holding the whole ticket collection.
pub const TICKETS_KEY: &str = "support_tickets";

/// 以整個值為單位讀寫的本機鍵值儲存。 / Local key-value storage read and written one whole value at a time.
///
/// There is no cross-process locking: two writers doing read-modify-write on
/// the same key can lose each other's update.
pub trait KeyValueStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// 以目錄中的 `<key>.json` 檔案保存每個鍵。 / Stores each key as `<key>.json` under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        write_atomic(&self.path_for(key), value.as_bytes())
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// In-process storage, handy for embedding and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// 模擬儲存空間已滿或不可用。 / Simulates storage that is full or unavailable.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(ErrorKind::Other, "storage quota exceeded"));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum TicketStoreError {
    #[error("ticket could not be saved")]
    SaveFailed {
        #[source]
        source: io::Error,
    },
}

/// 支援工單的持久化集合，最新的在前。 / Durable collection of support tickets, newest first.
#[derive(Debug)]
pub struct TicketStore<S> {
    storage: S,
}

impl<S: KeyValueStorage> TicketStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// 讀取整個集合；缺少或損毀時回傳空集合。 / Loads the whole collection; missing or corrupt data yields an empty one.
    pub fn load(&self) -> Vec<SupportTicket> {
        let raw = match self.storage.read(TICKETS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(%err, "ticket collection unreadable, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(tickets) => tickets,
            Err(err) => {
                warn!(%err, "ticket collection malformed, treating as empty");
                Vec::new()
            }
        }
    }

    pub fn find(&self, id: &str) -> Option<SupportTicket> {
        self.load().into_iter().find(|ticket| ticket.id == id)
    }

    pub fn create(&mut self, fields: TicketFields) -> Result<SupportTicket, TicketStoreError> {
        self.create_at(fields, Utc::now())
    }

    /// 建立工單，置於集合最前並一次寫回。 / Creates a ticket, prepends it and writes the collection back in one write.
    pub fn create_at(
        &mut self,
        fields: TicketFields,
        created_at: DateTime<Utc>,
    ) -> Result<SupportTicket, TicketStoreError> {
        let ticket = SupportTicket::issue(fields, created_at);
        let mut tickets = self.load();
        tickets.insert(0, ticket.clone());

        let payload = serde_json::to_string(&tickets).map_err(|err| TicketStoreError::SaveFailed {
            source: io::Error::new(ErrorKind::InvalidData, err),
        })?;
        self.storage
            .write(TICKETS_KEY, &payload)
            .map_err(|source| TicketStoreError::SaveFailed { source })?;

        debug!(total = tickets.len(), "ticket collection persisted");
        info!(id = %ticket.id, attachments = ticket.attachments.len(), "support ticket created");
        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fields(subject: &str) -> TicketFields {
        TicketFields {
            subject: subject.into(),
            contact_email: "user@example.cv".into(),
            message: "hello".into(),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn missing_or_corrupt_collection_loads_empty() {
        assert!(TicketStore::new(MemoryStorage::new()).load().is_empty());
        for raw in ["", "not json", "{}", "null", "[{\"id\": 3}]"] {
            let store = TicketStore::new(MemoryStorage::new().with_entry(TICKETS_KEY, raw));
            assert!(store.load().is_empty(), "expected empty for {raw:?}");
        }
    }

    #[test]
    fn newest_ticket_comes_first() {
        let mut store = TicketStore::new(MemoryStorage::new());
        store.create(fields("A")).unwrap();
        store.create(fields("B")).unwrap();
        let subjects: Vec<_> = store.load().into_iter().map(|t| t.subject).collect();
        assert_eq!(subjects, vec!["B", "A"]);
    }

    #[test]
    fn write_failure_is_reported_and_nothing_persists() {
        let mut storage = MemoryStorage::new();
        storage.set_fail_writes(true);
        let mut store = TicketStore::new(storage);
        let err = store.create(fields("A")).unwrap_err();
        assert_eq!(err.to_string(), "ticket could not be saved");
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupt_collection_is_replaced_on_next_create() {
        let mut store =
            TicketStore::new(MemoryStorage::new().with_entry(TICKETS_KEY, "[broken"));
        let ticket = store.create(fields("A")).unwrap();
        assert_eq!(store.load(), vec![ticket]);
    }

    #[test]
    fn file_storage_round_trips_collection() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("data"));
        let path = storage.path_for(TICKETS_KEY);

        let created = {
            let mut store = TicketStore::new(storage.clone());
            store.create(fields("A")).unwrap()
        };
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let store = TicketStore::new(storage);
        assert_eq!(store.find(&created.id), Some(created));
        assert!(store.find("TKT-0-missing").is_none());
    }
}
