use crate::storage;
use menucard::doc_adapter::{QueryOptions, SortField};
use menucard::error::ClResult;
use redb::ReadableDatabase;
use serde_json::Value;
use std::cmp::Ordering;

/// List the direct children of a collection
pub fn execute_query(
	db: &redb::Database,
	collection: &str,
	opts: &QueryOptions,
) -> ClResult<Vec<Value>> {
	use crate::error::from_redb_error;

	let tx = db.begin_read().map_err(from_redb_error)?;
	let doc_table = tx.open_table(storage::TABLE_DOCUMENTS).map_err(from_redb_error)?;

	let prefix = storage::collection_prefix(collection);

	let mut results = Vec::new();
	let range = doc_table.range(prefix.as_str()..).map_err(from_redb_error)?;

	for item in range {
		let (key, value) = item.map_err(from_redb_error)?;
		let key_str = key.value();

		if !key_str.starts_with(&prefix) {
			break;
		}

		// Nested documents (sub-collections) are not part of this collection
		let Some(doc_id) = storage::direct_child(key_str, &prefix) else {
			continue;
		};

		let doc = storage::load_doc(value.value(), doc_id)?;

		if let Some(ref filter) = opts.filter {
			if !filter.matches(&doc) {
				continue;
			}
		}

		results.push(doc);
	}

	Ok(apply_sort_limit(results, opts))
}

/// Apply sorting and pagination to results
fn apply_sort_limit(mut docs: Vec<Value>, opts: &QueryOptions) -> Vec<Value> {
	if let Some(ref sort_fields) = opts.sort {
		docs.sort_by(|a, b| compare_documents(a, b, sort_fields));
	}

	let start = opts.offset.unwrap_or(0) as usize;
	if start >= docs.len() {
		return Vec::new();
	}

	let end = opts.limit.map_or(docs.len(), |l| (start + l as usize).min(docs.len()));

	docs.drain(start..end).collect()
}

/// Compare two documents for sorting
fn compare_documents(a: &Value, b: &Value, sort_fields: &[SortField]) -> Ordering {
	for field in sort_fields {
		let ord = storage::compare_values(a.get(&field.field), b.get(&field.field));
		let ord = if field.ascending { ord } else { ord.reverse() };

		if ord != Ordering::Equal {
			return ord;
		}
	}

	Ordering::Equal
}

// vim: ts=4
