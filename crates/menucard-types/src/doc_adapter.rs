//! Document Store Adapter
//!
//! Trait and types for pluggable document store backends that hold JSON documents
//! under hierarchical paths (e.g., `users/u1/profiles/p1/links/abc123`).
//!
//! Single-document writes (create, update, delete) are available directly on the
//! adapter; each one is applied on its own, so a batch of them is not atomic.
//! Read-modify-write sequences go through a [`Transaction`].
//!
//! Documents are stored without their `id`; the last path segment is the source of
//! truth and adapters inject it as an `id` field on every read.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::prelude::*;

/// Query filter for selecting documents.
///
/// A document matches if ALL specified conditions are satisfied (AND logic).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryFilter {
	/// Field equality constraints: field_name -> expected_value
	#[serde(default, skip_serializing_if = "HashMap::is_empty")]
	pub equals: HashMap<String, Value>,

	/// Field not-equal constraints: field_name -> expected_value
	#[serde(default, skip_serializing_if = "HashMap::is_empty", rename = "notEquals")]
	pub not_equals: HashMap<String, Value>,
}

impl QueryFilter {
	/// Create a new empty filter (matches all documents).
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a filter with a single equality constraint.
	pub fn equals_one(field: impl Into<String>, value: Value) -> Self {
		let mut equals = HashMap::new();
		equals.insert(field.into(), value);
		Self { equals, ..Default::default() }
	}

	pub fn with_equals(mut self, field: impl Into<String>, value: Value) -> Self {
		self.equals.insert(field.into(), value);
		self
	}

	pub fn with_not_equals(mut self, field: impl Into<String>, value: Value) -> Self {
		self.not_equals.insert(field.into(), value);
		self
	}

	/// Check if this filter is empty (matches all documents).
	pub fn is_empty(&self) -> bool {
		self.equals.is_empty() && self.not_equals.is_empty()
	}

	/// Check whether a document satisfies the filter.
	///
	/// Missing fields never satisfy an equality and always satisfy a not-equal.
	pub fn matches(&self, doc: &Value) -> bool {
		for (field, expected) in &self.equals {
			match doc.get(field) {
				Some(actual) if actual == expected => {}
				_ => return false,
			}
		}

		for (field, expected) in &self.not_equals {
			if doc.get(field).is_some_and(|actual| actual == expected) {
				return false;
			}
		}

		true
	}
}

/// Sort order for a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortField {
	pub field: String,

	/// Sort direction: true for ascending, false for descending
	pub ascending: bool,
}

impl SortField {
	pub fn asc(field: impl Into<String>) -> Self {
		Self { field: field.into(), ascending: true }
	}

	pub fn desc(field: impl Into<String>) -> Self {
		Self { field: field.into(), ascending: false }
	}
}

/// Options for listing documents (filter, sort, limit, offset).
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
	pub filter: Option<QueryFilter>,

	/// Optional sort order (multiple fields supported)
	pub sort: Option<Vec<SortField>>,

	pub limit: Option<u32>,

	pub offset: Option<u32>,
}

impl QueryOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_filter(mut self, filter: QueryFilter) -> Self {
		self.filter = Some(filter);
		self
	}

	pub fn with_sort(mut self, sort: Vec<SortField>) -> Self {
		self.sort = Some(sort);
		self
	}

	pub fn with_limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit);
		self
	}

	pub fn with_offset(mut self, offset: u32) -> Self {
		self.offset = Some(offset);
		self
	}
}

/// Transaction for atomic read-modify-write sequences.
#[async_trait]
pub trait Transaction: Send + Sync {
	/// Read a document from the transaction's view, including its own uncommitted writes.
	///
	/// - `Ok(Some(value))` if the document exists (committed or written by this transaction)
	/// - `Ok(None)` if it doesn't exist or was deleted by this transaction
	async fn get(&self, path: &str) -> ClResult<Option<Value>>;

	/// Create a new document with a generated ID under a collection. Returns the ID.
	async fn create(&mut self, collection: &str, data: Value) -> ClResult<Box<str>>;

	/// Replace the document at a path with the provided data.
	async fn update(&mut self, path: &str, data: Value) -> ClResult<()>;

	async fn delete(&mut self, path: &str) -> ClResult<()>;

	/// Commit the transaction, applying all changes atomically.
	async fn commit(&mut self) -> ClResult<()>;

	/// Discard all changes. Dropping an uncommitted transaction has the same effect.
	async fn rollback(&mut self) -> ClResult<()>;
}

/// Document store adapter trait.
///
/// Each adapter implementation provides its own constructor handling
/// backend-specific initialization (file location, connection settings, etc.).
#[async_trait]
pub trait DocAdapter: Debug + Send + Sync {
	/// Begin a new transaction.
	async fn transaction(&self) -> ClResult<Box<dyn Transaction>>;

	/// Create a document with a store-assigned ID under `collection`. Returns the ID.
	async fn create(&self, collection: &str, data: Value) -> ClResult<Box<str>>;

	/// Replace the document at `path`.
	///
	/// This is a full replacement: fields absent from `data` are gone afterwards.
	/// A document that does not exist yet is created under the given path.
	async fn update(&self, path: &str, data: Value) -> ClResult<()>;

	/// Delete the document at `path`. Deleting a missing document succeeds.
	async fn delete(&self, path: &str) -> ClResult<()>;

	/// Get a document at a specific path. Returns None if not found.
	async fn get(&self, path: &str) -> ClResult<Option<Value>>;

	/// List the direct child documents of a collection.
	async fn query(&self, collection: &str, opts: QueryOptions) -> ClResult<Vec<Value>>;
}


// vim: ts=4
