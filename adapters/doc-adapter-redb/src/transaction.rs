use crate::error::from_redb_error;
use crate::storage;
use async_trait::async_trait;
use menucard::doc_adapter::Transaction;
use menucard::prelude::*;
use redb::ReadableTable;
use serde_json::Value;
use std::collections::HashMap;

/// Transaction implementation for the redb adapter
///
/// redb allows a single write transaction per database file, so holding one of these
/// serializes every other writer until it is committed or dropped.
pub struct RedbTransaction {
	tx: Option<redb::WriteTransaction>,

	/// Uncommitted writes for transaction-local reads, keyed by document path.
	/// - Some(data) = document exists with this data
	/// - None = document was deleted
	write_cache: HashMap<String, Option<Value>>,
}

impl RedbTransaction {
	pub fn new(tx: redb::WriteTransaction) -> Self {
		Self { tx: Some(tx), write_cache: HashMap::new() }
	}

	fn tx(&self) -> ClResult<&redb::WriteTransaction> {
		self.tx.as_ref().ok_or_else(|| Error::Internal("transaction already finished".into()))
	}

	fn write(&mut self, path: &str, mut data: Value) -> ClResult<()> {
		let (_, doc_id) = storage::parse_path(path)?;
		let doc_id = doc_id.to_string();

		storage::strip_doc_id(&mut data);
		let json = serde_json::to_string(&data)?;

		{
			let mut table =
				self.tx()?.open_table(storage::TABLE_DOCUMENTS).map_err(from_redb_error)?;
			table.insert(path, json.as_str()).map_err(from_redb_error)?;
		}

		storage::inject_doc_id(&mut data, &doc_id);
		self.write_cache.insert(path.to_string(), Some(data));
		Ok(())
	}
}

#[async_trait]
impl Transaction for RedbTransaction {
	async fn get(&self, path: &str) -> ClResult<Option<Value>> {
		let (_, doc_id) = storage::parse_path(path)?;

		// Read-your-own-writes
		if let Some(cached) = self.write_cache.get(path) {
			return Ok(cached.clone());
		}

		let table = self.tx()?.open_table(storage::TABLE_DOCUMENTS).map_err(from_redb_error)?;
		let json_str: Option<String> = match table.get(path) {
			Ok(Some(v)) => Some(v.value().to_string()),
			Ok(None) => None,
			Err(e) => return Err(from_redb_error(e).into()),
		};
		drop(table);

		json_str.map(|json| storage::load_doc(&json, doc_id)).transpose()
	}

	async fn create(&mut self, collection: &str, data: Value) -> ClResult<Box<str>> {
		storage::check_collection(collection)?;

		let doc_id = storage::generate_doc_id()?;
		self.write(&format!("{}/{}", collection, doc_id), data)?;

		Ok(doc_id.into())
	}

	async fn update(&mut self, path: &str, data: Value) -> ClResult<()> {
		self.write(path, data)
	}

	async fn delete(&mut self, path: &str) -> ClResult<()> {
		storage::parse_path(path)?;

		{
			let mut table =
				self.tx()?.open_table(storage::TABLE_DOCUMENTS).map_err(from_redb_error)?;
			table.remove(path).map_err(from_redb_error)?;
		}

		self.write_cache.insert(path.to_string(), None);
		Ok(())
	}

	async fn commit(&mut self) -> ClResult<()> {
		if let Some(tx) = self.tx.take() {
			tx.commit().map_err(from_redb_error)?;
		}
		self.write_cache.clear();
		Ok(())
	}

	async fn rollback(&mut self) -> ClResult<()> {
		// redb rolls back a write transaction when it is dropped
		self.tx = None;
		self.write_cache.clear();
		Ok(())
	}
}

// vim: ts=4
