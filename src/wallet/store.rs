//! Wallet Record Store
//!
//! Session-local, ordered collection of derived wallets. Append-only until
//! deleted; never persisted. A single mutex serializes add/delete so index
//! arithmetic cannot race.

use std::sync::Mutex;

use crate::error::{SolsticeError, SolsticeResult};
use crate::types::WalletRecord;

#[derive(Debug, Default)]
pub struct WalletStore {
    records: Mutex<Vec<WalletRecord>>,
}

impl WalletStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Append a record; order is generation order
    pub fn add(&self, record: WalletRecord) -> SolsticeResult<usize> {
        let mut records = self.lock()?;
        records.push(record);
        Ok(records.len() - 1)
    }

    /// Remove exactly the entry at `index`; all other entries keep their
    /// relative order. Returns the removed record.
    pub fn delete_at(&self, index: usize) -> SolsticeResult<WalletRecord> {
        let mut records = self.lock()?;
        if index >= records.len() {
            return Err(SolsticeError::invalid_input(format!(
                "No wallet at index {} (store holds {})",
                index,
                records.len()
            )));
        }
        Ok(records.remove(index))
    }

    pub fn get(&self, index: usize) -> SolsticeResult<Option<WalletRecord>> {
        Ok(self.lock()?.get(index).cloned())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all records in generation order
    pub fn records(&self) -> SolsticeResult<Vec<WalletRecord>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> SolsticeResult<std::sync::MutexGuard<'_, Vec<WalletRecord>>> {
        self.records
            .lock()
            .map_err(|_| SolsticeError::internal("Wallet store lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chain, DerivationScheme};

    fn record(address: &str) -> WalletRecord {
        WalletRecord {
            chain: Chain::Solana,
            address: address.to_string(),
            private_key: format!("key-{}", address),
            derivation: DerivationScheme::TruncatedSeed,
        }
    }

    #[test]
    fn test_add_preserves_generation_order() {
        let store = WalletStore::new();
        store.add(record("A")).unwrap();
        store.add(record("B")).unwrap();
        store.add(record("C")).unwrap();

        let addresses: Vec<_> = store
            .records()
            .unwrap()
            .into_iter()
            .map(|r| r.address)
            .collect();
        assert_eq!(addresses, ["A", "B", "C"]);
    }

    #[test]
    fn test_delete_middle_entry() {
        let store = WalletStore::new();
        store.add(record("A")).unwrap();
        store.add(record("B")).unwrap();
        store.add(record("C")).unwrap();

        let removed = store.delete_at(1).unwrap();
        assert_eq!(removed.address, "B");

        let addresses: Vec<_> = store
            .records()
            .unwrap()
            .into_iter()
            .map(|r| r.address)
            .collect();
        assert_eq!(addresses, ["A", "C"]);
    }

    #[test]
    fn test_delete_out_of_bounds() {
        let store = WalletStore::new();
        store.add(record("A")).unwrap();
        assert!(store.delete_at(1).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_after_delete_appends_at_end() {
        let store = WalletStore::new();
        store.add(record("A")).unwrap();
        store.add(record("B")).unwrap();
        store.delete_at(0).unwrap();
        let index = store.add(record("C")).unwrap();

        assert_eq!(index, 1);
        let addresses: Vec<_> = store
            .records()
            .unwrap()
            .into_iter()
            .map(|r| r.address)
            .collect();
        assert_eq!(addresses, ["B", "C"]);
    }
}
