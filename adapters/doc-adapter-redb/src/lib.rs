#![forbid(unsafe_code)]

mod error;
mod query;
pub mod storage;
mod transaction;

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

pub use error::Error;
pub use transaction::RedbTransaction;

use menucard::doc_adapter::*;
use menucard::prelude::*;

/// redb-based implementation of DocAdapter.
///
/// All documents live in a single table of one database file, keyed by their full path.
#[derive(Debug)]
pub struct DocAdapterRedb {
	db_path: PathBuf,
	db: Arc<redb::Database>,
}

/// Adapter configuration options
#[derive(Debug, Clone)]
pub struct AdapterConfig {
	/// Database file name inside the storage directory
	pub file_name: Box<str>,

	/// Page cache size in bytes (redb default when None)
	pub cache_size: Option<usize>,
}

impl Default for AdapterConfig {
	fn default() -> Self {
		Self { file_name: "documents.redb".into(), cache_size: None }
	}
}

impl DocAdapterRedb {
	/// Open (or create) the document database under `storage_dir`.
	pub async fn new(storage_dir: PathBuf, config: AdapterConfig) -> ClResult<Self> {
		tokio::fs::create_dir_all(&storage_dir).await?;

		let db_path = storage_dir.join(&*config.file_name);
		let open_path = db_path.clone();

		let db = tokio::task::spawn_blocking(move || -> ClResult<redb::Database> {
			let mut builder = redb::Builder::new();
			if let Some(cache_size) = config.cache_size {
				builder.set_cache_size(cache_size);
			}
			let db = builder.create(&open_path).map_err(error::from_redb_error)?;

			// Initialize tables
			let tx = db.begin_write().map_err(error::from_redb_error)?;
			let _ = tx.open_table(storage::TABLE_DOCUMENTS).map_err(error::from_redb_error)?;
			tx.commit().map_err(error::from_redb_error)?;

			Ok(db)
		})
		.await??;

		info!("Opened document database: {}", db_path.display());
		Ok(Self { db_path, db: Arc::new(db) })
	}

	pub fn db_path(&self) -> &std::path::Path {
		&self.db_path
	}

	/// Run a single-document write in its own transaction
	async fn write_one(&self, op: WriteOp) -> ClResult<()> {
		let db = Arc::clone(&self.db);

		tokio::task::spawn_blocking(move || -> ClResult<()> {
			let tx = db.begin_write().map_err(error::from_redb_error)?;
			{
				let mut table =
					tx.open_table(storage::TABLE_DOCUMENTS).map_err(error::from_redb_error)?;
				match op {
					WriteOp::Put { key, json } => {
						table.insert(key.as_str(), json.as_str()).map_err(error::from_redb_error)?;
					}
					WriteOp::Remove { key } => {
						table.remove(key.as_str()).map_err(error::from_redb_error)?;
					}
				}
			}
			tx.commit().map_err(error::from_redb_error)?;
			Ok(())
		})
		.await?
	}
}

enum WriteOp {
	Put { key: String, json: String },
	Remove { key: String },
}

#[async_trait]
impl DocAdapter for DocAdapterRedb {
	async fn transaction(&self) -> ClResult<Box<dyn Transaction>> {
		let db = Arc::clone(&self.db);
		let tx = tokio::task::spawn_blocking(move || db.begin_write().map_err(error::from_redb_error))
			.await??;

		Ok(Box::new(RedbTransaction::new(tx)))
	}

	async fn create(&self, collection: &str, mut data: Value) -> ClResult<Box<str>> {
		storage::check_collection(collection)?;

		let doc_id = storage::generate_doc_id()?;
		let key = format!("{}/{}", collection, doc_id);
		storage::strip_doc_id(&mut data);
		let json = serde_json::to_string(&data)?;

		self.write_one(WriteOp::Put { key, json }).await?;

		debug!("Created document {}/{}", collection, doc_id);
		Ok(doc_id.into())
	}

	async fn update(&self, path: &str, mut data: Value) -> ClResult<()> {
		storage::parse_path(path)?;

		let key = path.to_string();
		storage::strip_doc_id(&mut data);
		let json = serde_json::to_string(&data)?;

		self.write_one(WriteOp::Put { key, json }).await?;

		debug!("Updated document {}", path);
		Ok(())
	}

	async fn delete(&self, path: &str) -> ClResult<()> {
		storage::parse_path(path)?;

		let key = path.to_string();
		self.write_one(WriteOp::Remove { key }).await?;

		debug!("Deleted document {}", path);
		Ok(())
	}

	async fn get(&self, path: &str) -> ClResult<Option<Value>> {
		let (_, doc_id) = storage::parse_path(path)?;

		let db = Arc::clone(&self.db);
		let key = path.to_string();
		let doc_id = doc_id.to_string();

		tokio::task::spawn_blocking(move || -> ClResult<Option<Value>> {
			use redb::ReadableDatabase;

			let tx = db.begin_read().map_err(error::from_redb_error)?;
			let table = tx.open_table(storage::TABLE_DOCUMENTS).map_err(error::from_redb_error)?;

			match table.get(key.as_str()).map_err(error::from_redb_error)? {
				Some(v) => Ok(Some(storage::load_doc(v.value(), &doc_id)?)),
				None => Ok(None),
			}
		})
		.await?
	}

	async fn query(&self, collection: &str, opts: QueryOptions) -> ClResult<Vec<Value>> {
		storage::check_collection(collection)?;

		let db = Arc::clone(&self.db);
		let collection = collection.to_string();

		tokio::task::spawn_blocking(move || query::execute_query(&db, &collection, &opts)).await?
	}
}

// vim: ts=4
