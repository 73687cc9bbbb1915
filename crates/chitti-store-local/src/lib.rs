use std::path::{Path, PathBuf};

use chitti_storage::{
    DrawFilter, DrawId, Group, GroupId, LotteryDraw, Payment, PaymentFilter, PaymentId, Store,
    StoreError, Write, WriteBatch,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

/// Everything the local store holds, persisted as one JSON document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerDocument {
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub draws: Vec<LotteryDraw>,
}

impl LedgerDocument {
    fn apply(&mut self, write: &Write) -> Result<(), StoreError> {
        match write {
            Write::InsertGroup(group) => {
                if self.groups.iter().any(|g| g.id == group.id) {
                    return Err(StoreError::AlreadyExists);
                }
                self.groups.push(group.clone());
            }
            Write::UpdateGroup {
                group,
                expected_version,
            } => {
                let stored = self
                    .groups
                    .iter_mut()
                    .find(|g| g.id == group.id)
                    .ok_or(StoreError::NotFound)?;
                if stored.version != *expected_version {
                    return Err(StoreError::Conflict);
                }
                *stored = group.clone();
                stored.version = expected_version + 1;
            }
            Write::DeleteGroup(group_id) => {
                let idx = position(&self.groups, |g| &g.id == group_id)?;
                self.groups.remove(idx);
            }
            Write::InsertPayment(payment) => {
                if self.payments.iter().any(|p| p.id == payment.id) {
                    return Err(StoreError::AlreadyExists);
                }
                self.payments.push(payment.clone());
            }
            Write::DeletePayment(payment_id) => {
                let idx = position(&self.payments, |p| &p.id == payment_id)?;
                self.payments.remove(idx);
            }
            Write::InsertDraw(draw) => {
                if self.draws.iter().any(|d| d.id == draw.id) {
                    return Err(StoreError::AlreadyExists);
                }
                self.draws.push(draw.clone());
            }
            Write::DeleteDraw(draw_id) => {
                let idx = position(&self.draws, |d| &d.id == draw_id)?;
                self.draws.remove(idx);
            }
        }
        Ok(())
    }
}

fn position<T>(items: &[T], pred: impl Fn(&T) -> bool) -> Result<usize, StoreError> {
    items.iter().position(pred).ok_or(StoreError::NotFound)
}

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Local key/value fallback store.
///
/// Holds the whole ledger in memory behind one lock, so each commit is a
/// single atomic step. When opened on a file, every commit rewrites the
/// document (temp file + rename) before it becomes visible to readers.
pub struct LocalStore {
    doc: RwLock<LedgerDocument>,
    path: Option<PathBuf>,
}

impl LocalStore {
    /// `~/.chitti/ledger.json`
    pub async fn open_default() -> Result<Self, StoreError> {
        let path = Self::default_path().ok_or_else(|| backend("no home dir"))?;
        Self::open(path).await
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".chitti").join("ledger.json"))
    }

    pub fn in_memory() -> Self {
        Self {
            doc: RwLock::new(LedgerDocument::default()),
            path: None,
        }
    }

    /// Open (or start) a ledger document at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let doc = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => LedgerDocument::default(),
            Ok(contents) => serde_json::from_str(&contents).map_err(backend)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LedgerDocument::default(),
            Err(e) => return Err(backend(e)),
        };
        debug!(
            path = %path.display(),
            groups = doc.groups.len(),
            payments = doc.payments.len(),
            draws = doc.draws.len(),
            "opened local ledger"
        );
        Ok(Self {
            doc: RwLock::new(doc),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Copy of the current document.
    pub async fn document(&self) -> LedgerDocument {
        self.doc.read().await.clone()
    }

    async fn persist(&self, doc: &LedgerDocument) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(backend)?;
            }
        }
        let json = serde_json::to_string_pretty(doc).map_err(backend)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(backend)?;
        tokio::fs::rename(&tmp, path).await.map_err(backend)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for LocalStore {
    // ───────────────────────────── Groups ─────────────────────────────

    async fn get_group(&self, group_id: &GroupId) -> Result<Group, StoreError> {
        let doc = self.doc.read().await;
        doc.groups
            .iter()
            .find(|g| &g.id == group_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        Ok(self.doc.read().await.groups.clone())
    }

    // ───────────────────────────── Payments ─────────────────────────────

    async fn get_payment(&self, payment_id: &PaymentId) -> Result<Payment, StoreError> {
        let doc = self.doc.read().await;
        doc.payments
            .iter()
            .find(|p| &p.id == payment_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_payments(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, StoreError> {
        let doc = self.doc.read().await;
        Ok(doc
            .payments
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    // ───────────────────────────── Draws ─────────────────────────────

    async fn get_draw(&self, draw_id: &DrawId) -> Result<LotteryDraw, StoreError> {
        let doc = self.doc.read().await;
        doc.draws
            .iter()
            .find(|d| &d.id == draw_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_draws(&self, filter: &DrawFilter) -> Result<Vec<LotteryDraw>, StoreError> {
        let doc = self.doc.read().await;
        Ok(doc
            .draws
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect())
    }

    // ───────────────────────────── Writes ─────────────────────────────

    async fn commit(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        let mut doc = self.doc.write().await;
        let mut next = doc.clone();
        for write in &batch.writes {
            next.apply(write)?;
        }
        self.persist(&next).await?;
        *doc = next;
        debug!(writes = batch.len(), "committed batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chitti_storage::{GroupStatus, Member};
    use chrono::Utc;

    fn group() -> Group {
        Group {
            id: GroupId::new(),
            name: "Friends Fund".to_string(),
            monthly_amount: 5000,
            commission_percent: 0,
            members: vec![Member::new("A")],
            status: GroupStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            version: 0,
        }
    }

    #[tokio::test]
    async fn update_bumps_version() {
        let store = LocalStore::in_memory();
        let g = group();
        store
            .commit(&WriteBatch::new().push(Write::InsertGroup(g.clone())))
            .await
            .unwrap();

        let mut renamed = g.clone();
        renamed.name = "Renamed".to_string();
        store
            .commit(&WriteBatch::new().update_group(renamed, 0))
            .await
            .unwrap();

        let stored = store.get_group(&g.id).await.unwrap();
        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn stale_version_conflicts() {
        let store = LocalStore::in_memory();
        let g = group();
        store
            .commit(&WriteBatch::new().push(Write::InsertGroup(g.clone())))
            .await
            .unwrap();
        store
            .commit(&WriteBatch::new().update_group(g.clone(), 0))
            .await
            .unwrap();

        let err = store
            .commit(&WriteBatch::new().update_group(g.clone(), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[tokio::test]
    async fn failed_batch_applies_nothing() {
        let store = LocalStore::in_memory();
        let g = group();
        let batch = WriteBatch::new()
            .push(Write::InsertGroup(g.clone()))
            .push(Write::DeletePayment(PaymentId::new()));

        let err = store.commit(&batch).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        assert!(matches!(
            store.get_group(&g.id).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = LocalStore::in_memory();
        let g = group();
        store
            .commit(&WriteBatch::new().push(Write::InsertGroup(g.clone())))
            .await
            .unwrap();
        let err = store
            .commit(&WriteBatch::new().push(Write::InsertGroup(g)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists));
    }

    #[tokio::test]
    async fn in_memory_has_no_path() {
        let store = LocalStore::in_memory();
        assert!(store.path().is_none());
        assert!(store.list_groups().await.unwrap().is_empty());
    }
}
