//! Click tracking for public links

use serde_json::Value;

use crate::prelude::*;
use menucard_types::doc_adapter::DocAdapter;

/// Count a visit of a link.
///
/// Returns the new counter value, or None if the link is inactive (inactive links
/// are not tracked). The increment is a read-modify-write inside one transaction.
pub async fn record_click(
	adapter: &dyn DocAdapter,
	profile: &ProfileRef,
	link_id: &str,
) -> ClResult<Option<u64>> {
	let path = profile.link_path(link_id);
	let mut tx = adapter.transaction().await?;

	let Some(mut doc) = tx.get(&path).await? else {
		tx.rollback().await?;
		return Err(Error::NotFound);
	};

	if doc.get("active").and_then(Value::as_bool) != Some(true) {
		tx.rollback().await?;
		return Ok(None);
	}

	let clicked = doc.get("clicked").and_then(Value::as_u64).unwrap_or(0).saturating_add(1);
	if let Value::Object(ref mut obj) = doc {
		obj.insert("clicked".into(), Value::from(clicked));
	}

	tx.update(&path, doc).await?;
	tx.commit().await?;

	debug!("Link {} of {} clicked {} times", link_id, profile, clicked);
	Ok(Some(clicked))
}

// vim: ts=4
