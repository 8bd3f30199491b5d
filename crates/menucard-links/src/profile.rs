//! Profile documents
//!
//! The profile is the aggregate root links hang off. Link operations never modify
//! it; they only require it to exist.

use serde::{Deserialize, Serialize};

use crate::prelude::*;
use menucard_types::doc_adapter::DocAdapter;
use menucard_types::types::now;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDoc {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub about: Option<String>,
	#[serde(default)]
	pub created_at: Timestamp,
}

impl ProfileDoc {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into(), about: None, created_at: now() }
	}
}

/// Store a new profile for `user_id` and return its identity
pub async fn create_profile(
	adapter: &dyn DocAdapter,
	user_id: &str,
	doc: &ProfileDoc,
) -> ClResult<ProfileRef> {
	let record = serde_json::to_value(doc)?;
	let profile_id = adapter.create(&ProfileRef::collection_path(user_id), record).await?;

	let profile = ProfileRef::new(user_id, profile_id);
	info!("Created profile {}", profile);
	Ok(profile)
}

pub async fn get_profile(
	adapter: &dyn DocAdapter,
	profile: &ProfileRef,
) -> ClResult<Option<ProfileDoc>> {
	match adapter.get(&profile.path()).await? {
		Some(value) => Ok(Some(serde_json::from_value(value)?)),
		None => Ok(None),
	}
}

/// Fail with `NotFound` unless the profile document exists
pub async fn require_profile(adapter: &dyn DocAdapter, profile: &ProfileRef) -> ClResult<()> {
	if adapter.get(&profile.path()).await?.is_some() {
		Ok(())
	} else {
		debug!("Profile {} not found", profile);
		Err(Error::NotFound)
	}
}

// vim: ts=4
