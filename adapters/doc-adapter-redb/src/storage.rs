use menucard::error::ClResult;
use serde_json::Value;
use std::cmp::Ordering;

/// Document storage table: document path -> JSON body
pub const TABLE_DOCUMENTS: redb::TableDefinition<&str, &str> = redb::TableDefinition::new("docs");

/// Validate a collection path: non-empty segments, no leading or trailing slash.
pub fn check_collection(collection: &str) -> ClResult<()> {
	if collection.is_empty() || collection.split('/').any(str::is_empty) {
		return Err(crate::Error::InvalidPath(format!("Invalid collection: {}", collection)).into());
	}
	Ok(())
}

/// Parse a document path into collection and doc_id
pub fn parse_path(path: &str) -> ClResult<(&str, &str)> {
	match path.rsplit_once('/') {
		Some((collection, doc_id)) if !doc_id.is_empty() => {
			check_collection(collection)?;
			Ok((collection, doc_id))
		}
		_ => Err(crate::Error::InvalidPath(format!("Invalid path: {}", path)).into()),
	}
}

/// Key prefix of the direct children of a collection
pub fn collection_prefix(collection: &str) -> String {
	format!("{}/", collection)
}

/// The part of a key after the collection prefix, if it names a direct child
pub fn direct_child<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
	let remainder = key.strip_prefix(prefix)?;
	if remainder.is_empty() || remainder.contains('/') { None } else { Some(remainder) }
}

/// Compare two JSON values for sorting
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
	match (a, b) {
		(None, None) => Ordering::Equal,
		(None, Some(_)) => Ordering::Less,
		(Some(_), None) => Ordering::Greater,
		(Some(Value::Number(a)), Some(Value::Number(b))) => {
			a.as_f64().partial_cmp(&b.as_f64()).unwrap_or(Ordering::Equal)
		}
		(Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
		(Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
		(Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
	}
}

/// Drop the `id` field before writing; the key is the source of truth.
pub fn strip_doc_id(doc: &mut Value) {
	if let Value::Object(obj) = doc {
		obj.remove("id");
	}
}

/// Inject the `id` field into a document read from storage.
pub fn inject_doc_id(doc: &mut Value, doc_id: &str) {
	if let Value::Object(obj) = doc {
		obj.insert("id".to_string(), Value::String(doc_id.to_string()));
	}
}

/// Parse a stored JSON body and inject its id
pub fn load_doc(json: &str, doc_id: &str) -> ClResult<Value> {
	let mut doc: Value = serde_json::from_str(json).map_err(crate::Error::from)?;
	inject_doc_id(&mut doc, doc_id);
	Ok(doc)
}

/// Generate a random document ID
pub fn generate_doc_id() -> ClResult<String> {
	menucard::utils::random_id()
}

// vim: ts=4
