//! Shared test setup: a redb-backed store wrapped with write recording and
//! fault injection.

#![allow(dead_code)]

use async_trait::async_trait;
use menucard_doc_adapter_redb::{AdapterConfig, DocAdapterRedb};
use menucard_links::profile::{create_profile, ProfileDoc};
use menucard_types::doc_adapter::{DocAdapter, QueryOptions, Transaction};
use menucard_types::error::{ClResult, Error};
use menucard_types::types::ProfileRef;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.try_init();
}

/// A single write seen by [`TestAdapter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
	Create(String),
	Update(String),
	Delete(String),
}

impl Write {
	pub fn path(&self) -> &str {
		match self {
			Write::Create(path) | Write::Update(path) | Write::Delete(path) => path,
		}
	}
}

#[derive(Debug)]
pub struct TestAdapter {
	inner: DocAdapterRedb,
	writes: Mutex<Vec<Write>>,
	/// Writes whose path or record contains this text fail with `DbError`
	fail_on: Mutex<Option<String>>,
	query_delay: Mutex<Option<Duration>>,
}

impl TestAdapter {
	pub fn writes(&self) -> Vec<Write> {
		self.writes.lock().expect("lock").clone()
	}

	pub fn clear_writes(&self) {
		self.writes.lock().expect("lock").clear();
	}

	pub fn fail_on(&self, needle: Option<&str>) {
		*self.fail_on.lock().expect("lock") = needle.map(str::to_string);
	}

	pub fn delay_queries(&self, delay: Option<Duration>) {
		*self.query_delay.lock().expect("lock") = delay;
	}

	fn check(&self, path: &str, data: Option<&Value>) -> ClResult<()> {
		let fail_on = self.fail_on.lock().expect("lock");
		if let Some(needle) = fail_on.as_deref() {
			let hit = path.contains(needle) || data.is_some_and(|d| d.to_string().contains(needle));
			if hit {
				return Err(Error::DbError);
			}
		}
		Ok(())
	}

	fn record(&self, write: Write) {
		self.writes.lock().expect("lock").push(write);
	}
}

#[async_trait]
impl DocAdapter for TestAdapter {
	async fn transaction(&self) -> ClResult<Box<dyn Transaction>> {
		self.inner.transaction().await
	}

	async fn create(&self, collection: &str, data: Value) -> ClResult<Box<str>> {
		self.check(collection, Some(&data))?;
		let id = self.inner.create(collection, data).await?;
		self.record(Write::Create(format!("{}/{}", collection, id)));
		Ok(id)
	}

	async fn update(&self, path: &str, data: Value) -> ClResult<()> {
		self.check(path, Some(&data))?;
		self.inner.update(path, data).await?;
		self.record(Write::Update(path.to_string()));
		Ok(())
	}

	async fn delete(&self, path: &str) -> ClResult<()> {
		self.check(path, None)?;
		self.inner.delete(path).await?;
		self.record(Write::Delete(path.to_string()));
		Ok(())
	}

	async fn get(&self, path: &str) -> ClResult<Option<Value>> {
		self.inner.get(path).await
	}

	async fn query(&self, collection: &str, opts: QueryOptions) -> ClResult<Vec<Value>> {
		let delay = *self.query_delay.lock().expect("lock");
		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}
		self.inner.query(collection, opts).await
	}
}

/// Create a temporary store with one profile in it
pub async fn create_test_store() -> (Arc<TestAdapter>, ProfileRef, TempDir) {
	setup_test_logging();

	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let inner = DocAdapterRedb::new(temp_dir.path().to_path_buf(), AdapterConfig::default())
		.await
		.expect("Failed to create adapter");

	let adapter = Arc::new(TestAdapter {
		inner,
		writes: Mutex::new(Vec::new()),
		fail_on: Mutex::new(None),
		query_delay: Mutex::new(None),
	});

	let profile = create_profile(adapter.as_ref(), "owner1", &ProfileDoc::new("Bistro Aurora"))
		.await
		.expect("Failed to create profile");
	adapter.clear_writes();

	(adapter, profile, temp_dir)
}

/// Stored link documents of a profile
pub async fn stored_links(adapter: &TestAdapter, profile: &ProfileRef) -> Vec<Value> {
	adapter
		.query(&profile.links_path(), QueryOptions::default())
		.await
		.expect("Failed to list links")
}

// vim: ts=4
