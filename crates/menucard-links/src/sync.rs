//! Link list synchronization
//!
//! [`plan`] is a pure diff between the stored link documents of a profile and the
//! desired state submitted by the editor:
//!
//! - desired link without `id` -> create (the store assigns the id)
//! - desired link with `id` -> update, but only if the full record differs from the
//!   stored one; the update is a full replacement of the document
//! - stored link whose `id` is not desired anymore -> delete
//!
//! Positions are recomputed from the order of each list before comparing, so the
//! stored positions are always `0..n` per list. The click counter belongs to click
//! tracking and is carried over from the stored document unchanged.
//!
//! [`LinkSynchronizer`] does the I/O around it: it fetches the current state under a
//! timeout, issues every planned write at once and waits for all of them. Writes are
//! not atomic as a batch; on failure the ones that succeeded stay applied and are
//! reported in [`Error::SyncIncomplete`]. Once the created ids are assigned to the
//! desired links, a retry only redoes what is still missing.

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::prelude::*;
use crate::profile;
use menucard_types::doc_adapter::{DocAdapter, QueryOptions};
use menucard_types::link::{DesiredLinks, Link, LinkDoc, LinkList};

pub use menucard_types::link::{CreatedLink, SyncReport};

/// Default limit for reading the current state before any write is issued
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SyncConfig {
	/// Limit for the fetch phase (profile check and link listing)
	pub fetch_timeout: Duration,
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self { fetch_timeout: DEFAULT_FETCH_TIMEOUT }
	}
}

impl SyncConfig {
	pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
		self.fetch_timeout = fetch_timeout;
		self
	}
}

/// A single write against the link collection
#[derive(Debug, Clone, PartialEq)]
pub enum LinkOp {
	/// `index` is the link's place in its desired list
	Create {
		list: LinkList,
		index: usize,
		record: Value,
	},
	Update {
		id: Box<str>,
		list: LinkList,
		record: Value,
	},
	/// `list` is None for stored documents that are neither social nor custom
	Delete {
		id: Box<str>,
		list: Option<LinkList>,
	},
}

impl LinkOp {
	pub fn list(&self) -> Option<LinkList> {
		match self {
			LinkOp::Create { list, .. } | LinkOp::Update { list, .. } => Some(*list),
			LinkOp::Delete { list, .. } => *list,
		}
	}

	pub fn id(&self) -> Option<&str> {
		match self {
			LinkOp::Create { .. } => None,
			LinkOp::Update { id, .. } | LinkOp::Delete { id, .. } => Some(id),
		}
	}

	pub fn record(&self) -> Option<&Value> {
		match self {
			LinkOp::Create { record, .. } | LinkOp::Update { record, .. } => Some(record),
			LinkOp::Delete { .. } => None,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPlan {
	pub ops: Vec<LinkOp>,
}

impl SyncPlan {
	pub fn len(&self) -> usize {
		self.ops.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ops.is_empty()
	}

	pub fn creates(&self) -> usize {
		self.ops.iter().filter(|op| matches!(op, LinkOp::Create { .. })).count()
	}

	pub fn updates(&self) -> usize {
		self.ops.iter().filter(|op| matches!(op, LinkOp::Update { .. })).count()
	}

	pub fn deletes(&self) -> usize {
		self.ops.iter().filter(|op| matches!(op, LinkOp::Delete { .. })).count()
	}

	/// Whether any operation writes to a document of the given list
	pub fn touches(&self, list: LinkList) -> bool {
		self.ops.iter().any(|op| op.list() == Some(list))
	}
}

/// Flatten both lists into one sequence of (index in list, link), positions
/// renumbered within each list.
fn flatten(desired: &DesiredLinks) -> ClResult<Vec<(usize, Link)>> {
	let social = desired.social.iter().cloned().map(Link::Social);
	let custom = desired.custom.iter().cloned().map(Link::Custom);

	let mut links = Vec::with_capacity(desired.len());
	for list in [social.collect::<Vec<_>>(), custom.collect::<Vec<_>>()] {
		for (index, mut link) in list.into_iter().enumerate() {
			let position = u32::try_from(index)
				.map_err(|_| Error::ValidationError("too many links".into()))?;
			link.set_position(position);
			links.push((index, link));
		}
	}

	Ok(links)
}

fn stored_id(doc: &Value) -> Option<&str> {
	doc.get("id").and_then(Value::as_str)
}

/// Stored document without its injected `id`, for comparison with a record to write
fn stored_record(doc: &Value) -> Value {
	let mut record = doc.clone();
	if let Value::Object(ref mut obj) = record {
		obj.remove("id");
	}
	record
}

/// Compute the writes that turn `current` (stored link documents) into `desired`.
pub fn plan(current: &[Value], desired: &DesiredLinks) -> ClResult<SyncPlan> {
	let stored: HashMap<&str, &Value> =
		current.iter().filter_map(|doc| stored_id(doc).map(|id| (id, doc))).collect();

	let mut kept: HashSet<Box<str>> = HashSet::new();
	let mut ops = Vec::new();

	for (index, link) in flatten(desired)? {
		let list = link.list();
		let mut doc = LinkDoc::from(link);

		let Some(id) = doc.id.take() else {
			doc.clicked = None;
			ops.push(LinkOp::Create { list, index, record: doc.to_record()? });
			continue;
		};

		if !kept.insert(id.clone()) {
			return Err(Error::ValidationError(format!("duplicate link id: {}", id)));
		}

		match stored.get(&*id) {
			Some(stored_doc) => {
				doc.clicked = stored_doc.get("clicked").and_then(Value::as_u64);
				let record = doc.to_record()?;
				if record != stored_record(stored_doc) {
					ops.push(LinkOp::Update { id, list, record });
				}
			}
			None => {
				// Gone from the store (e.g. deleted elsewhere): write it back under the same id
				doc.clicked = None;
				ops.push(LinkOp::Update { id, list, record: doc.to_record()? });
			}
		}
	}

	for doc in current {
		let Some(id) = stored_id(doc) else {
			continue;
		};
		if !kept.contains(id) {
			let list = LinkDoc::from_value(doc.clone()).ok().and_then(|doc| doc.list());
			ops.push(LinkOp::Delete { id: id.into(), list });
		}
	}

	Ok(SyncPlan { ops })
}

/// Result shape reported back to the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
	pub success: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl<T> From<&ClResult<T>> for SyncOutcome {
	fn from(res: &ClResult<T>) -> Self {
		match res {
			Ok(_) => SyncOutcome { success: true, error: None },
			Err(err) => SyncOutcome { success: false, error: Some(err.to_string()) },
		}
	}
}

/// Reconciles stored profile links with the state submitted by the editor
#[derive(Debug, Clone)]
pub struct LinkSynchronizer {
	adapter: Arc<dyn DocAdapter>,
	config: SyncConfig,
}

impl LinkSynchronizer {
	pub fn new(adapter: Arc<dyn DocAdapter>) -> Self {
		Self::with_config(adapter, SyncConfig::default())
	}

	pub fn with_config(adapter: Arc<dyn DocAdapter>, config: SyncConfig) -> Self {
		Self { adapter, config }
	}

	/// Make the stored links of `profile` equal to `desired`.
	///
	/// The profile must exist. Fails without writing anything if the current state
	/// cannot be read within the fetch timeout; fails with
	/// [`Error::SyncIncomplete`] if any write fails. That error carries the writes
	/// that did go through, including the ids of created links, so the caller can
	/// [`DesiredLinks::assign_ids`] before retrying.
	pub async fn synchronize(
		&self,
		profile: &ProfileRef,
		desired: &DesiredLinks,
	) -> ClResult<SyncReport> {
		let current = self.fetch(profile).await?;
		let plan = plan(&current, desired)?;

		debug!(
			"Link sync plan for {}: {} create, {} update, {} delete",
			profile,
			plan.creates(),
			plan.updates(),
			plan.deletes()
		);

		self.apply(profile, &plan).await
	}

	/// Same as [`Self::synchronize`], reported as a success flag and message.
	pub async fn submit(&self, profile: &ProfileRef, desired: &DesiredLinks) -> SyncOutcome {
		let res = self.synchronize(profile, desired).await;
		if let Err(ref err) = res {
			warn!("Failed to save links of {}: {}", profile, err);
		}
		SyncOutcome::from(&res)
	}

	/// Read the stored link documents of a profile
	pub async fn fetch(&self, profile: &ProfileRef) -> ClResult<Vec<Value>> {
		let fetch = async {
			profile::require_profile(self.adapter.as_ref(), profile).await?;
			self.adapter.query(&profile.links_path(), QueryOptions::default()).await
		};

		match tokio::time::timeout(self.config.fetch_timeout, fetch).await {
			Ok(res) => res,
			Err(_) => {
				warn!("Fetching links of {} timed out", profile);
				Err(Error::Timeout)
			}
		}
	}

	/// Issue every write of `plan` at once and wait for all of them to settle.
	pub async fn apply(&self, profile: &ProfileRef, plan: &SyncPlan) -> ClResult<SyncReport> {
		let mut report = SyncReport::default();
		if plan.is_empty() {
			return Ok(report);
		}

		let links_path = profile.links_path();
		let writes = plan.ops.iter().map(|op| self.execute(profile, &links_path, op));
		let results = join_all(writes).await;

		let mut failed = 0;
		for (op, res) in plan.ops.iter().zip(results) {
			match (op, res) {
				(LinkOp::Create { list, index, .. }, Ok(Some(id))) => {
					report.created.push(CreatedLink { list: *list, index: *index, id });
				}
				(LinkOp::Update { id, .. }, Ok(_)) => report.updated.push(id.clone()),
				(LinkOp::Delete { id, .. }, Ok(_)) => report.deleted.push(id.clone()),
				(LinkOp::Create { .. }, Ok(None)) => {}
				(op, Err(err)) => {
					failed += 1;
					warn!(
						"Link write failed for {} ({}): {}",
						profile,
						op.id().unwrap_or("<new>"),
						err
					);
				}
			}
		}

		if failed > 0 {
			return Err(Error::SyncIncomplete {
				failed,
				total: plan.len(),
				report: Box::new(report),
			});
		}

		info!(
			"Synchronized links of {}: {} created, {} updated, {} deleted",
			profile,
			report.created.len(),
			report.updated.len(),
			report.deleted.len()
		);
		Ok(report)
	}

	async fn execute(
		&self,
		profile: &ProfileRef,
		links_path: &str,
		op: &LinkOp,
	) -> ClResult<Option<Box<str>>> {
		match op {
			LinkOp::Create { record, .. } => {
				self.adapter.create(links_path, record.clone()).await.map(Some)
			}
			LinkOp::Update { id, record, .. } => {
				self.adapter.update(&profile.link_path(id), record.clone()).await.map(|()| None)
			}
			LinkOp::Delete { id, .. } => {
				self.adapter.delete(&profile.link_path(id)).await.map(|()| None)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use menucard_types::link::{CustomLink, SocialLink};
	use serde_json::json;

	fn facebook() -> Value {
		json!({
			"id": "1",
			"isSocial": true,
			"isCustom": false,
			"platform": "facebook",
			"url": "https://fb.com/a",
			"active": true,
			"position": 0,
		})
	}

	fn custom(id: &str, title: &str, position: u32) -> Value {
		json!({
			"id": id,
			"isSocial": false,
			"isCustom": true,
			"platform": "custom",
			"title": title,
			"url": format!("https://x.com/{}", title.to_lowercase()),
			"active": true,
			"position": position,
		})
	}

	fn desired_custom(id: Option<&str>, title: &str) -> CustomLink {
		let link = CustomLink::new(title, format!("https://x.com/{}", title.to_lowercase()));
		match id {
			Some(id) => link.with_id(id),
			None => link,
		}
	}

	#[test]
	fn test_new_custom_link_is_created() {
		let current = vec![facebook()];
		let desired = DesiredLinks {
			social: vec![SocialLink::new("facebook", "https://fb.com/a").with_id("1")],
			custom: vec![desired_custom(None, "Menu")],
		};

		let plan = plan(&current, &desired).unwrap();
		assert_eq!((plan.creates(), plan.updates(), plan.deletes()), (1, 0, 0));

		assert!(matches!(plan.ops[0], LinkOp::Create { list: LinkList::Custom, index: 0, .. }));
		let record = plan.ops[0].record().unwrap();
		assert_eq!(record["position"], 0);
		assert_eq!(record["isCustom"], true);
		assert!(record.get("id").is_none());
	}

	#[test]
	fn test_unchanged_state_plans_nothing() {
		let current = vec![facebook(), custom("a", "Menu", 0), custom("b", "Wine", 1)];
		let desired = DesiredLinks {
			social: vec![SocialLink::new("facebook", "https://fb.com/a").with_id("1")],
			custom: vec![desired_custom(Some("a"), "Menu"), desired_custom(Some("b"), "Wine")],
		};

		assert!(plan(&current, &desired).unwrap().is_empty());
	}

	#[test]
	fn test_changed_url_is_single_update() {
		let current = vec![facebook()];
		let desired = DesiredLinks {
			social: vec![SocialLink::new("facebook", "https://fb.com/b").with_id("1")],
			custom: vec![],
		};

		let plan = plan(&current, &desired).unwrap();
		assert_eq!(plan.len(), 1);
		assert!(matches!(
			&plan.ops[0],
			LinkOp::Update { id, list: LinkList::Social, record }
				if &**id == "1" && record["url"] == "https://fb.com/b"
		));
	}

	#[test]
	fn test_minimal_diff() {
		let current = vec![custom("a", "A", 0), custom("b", "B", 1), custom("c", "C", 2)];
		let desired = DesiredLinks {
			social: vec![],
			custom: vec![
				desired_custom(Some("a"), "A"),
				desired_custom(Some("b"), "B"),
				desired_custom(None, "D"),
			],
		};

		let plan = plan(&current, &desired).unwrap();
		assert_eq!((plan.creates(), plan.updates(), plan.deletes()), (1, 0, 1));
		assert!(plan.ops.contains(&LinkOp::Delete { id: "c".into(), list: Some(LinkList::Custom) }));
	}

	#[test]
	fn test_positions_follow_desired_order() {
		let current = vec![custom("a", "A", 0), custom("b", "B", 1)];
		let mut stale = desired_custom(Some("a"), "A");
		stale.position = 7;
		let desired =
			DesiredLinks { social: vec![], custom: vec![desired_custom(Some("b"), "B"), stale] };

		let plan = plan(&current, &desired).unwrap();
		assert_eq!(plan.updates(), 2);
		for op in &plan.ops {
			let expected = if op.id() == Some("b") { 0 } else { 1 };
			assert_eq!(op.record().unwrap()["position"], expected);
		}
	}

	#[test]
	fn test_custom_edit_does_not_touch_social() {
		let current = vec![facebook(), custom("a", "A", 0)];
		let desired = DesiredLinks {
			social: vec![SocialLink::new("facebook", "https://fb.com/a").with_id("1")],
			custom: vec![desired_custom(None, "B"), desired_custom(Some("a"), "A")],
		};

		let plan = plan(&current, &desired).unwrap();
		assert!(!plan.is_empty());
		assert!(!plan.touches(LinkList::Social));
	}

	#[test]
	fn test_clicked_is_carried_over() {
		let mut stored = facebook();
		stored["clicked"] = json!(42);
		let mut link = SocialLink::new("facebook", "https://fb.com/a").with_id("1");
		link.clicked = Some(3);

		let desired = DesiredLinks { social: vec![link.clone()], custom: vec![] };
		assert!(plan(&[stored.clone()], &desired).unwrap().is_empty());

		link.active = false;
		let desired = DesiredLinks { social: vec![link], custom: vec![] };
		let plan = plan(&[stored], &desired).unwrap();
		assert_eq!(plan.ops[0].record().unwrap()["clicked"], 42);
		assert_eq!(plan.ops[0].record().unwrap()["active"], false);
	}

	#[test]
	fn test_unknown_stored_fields_are_replaced() {
		let mut stored = facebook();
		stored["legacy"] = json!("x");
		let desired = DesiredLinks {
			social: vec![SocialLink::new("facebook", "https://fb.com/a").with_id("1")],
			custom: vec![],
		};

		let plan = plan(&[stored], &desired).unwrap();
		assert_eq!(plan.updates(), 1);
		assert!(plan.ops[0].record().unwrap().get("legacy").is_none());
	}

	#[test]
	fn test_missing_stored_id_is_written_back() {
		let desired =
			DesiredLinks { social: vec![], custom: vec![desired_custom(Some("gone"), "A")] };

		let plan = plan(&[], &desired).unwrap();
		assert_eq!(plan.ops.len(), 1);
		assert!(matches!(&plan.ops[0], LinkOp::Update { id, .. } if &**id == "gone"));
	}

	#[test]
	fn test_duplicate_desired_id_is_rejected() {
		let desired = DesiredLinks {
			social: vec![SocialLink::new("facebook", "https://fb.com/a").with_id("1")],
			custom: vec![desired_custom(Some("1"), "A")],
		};

		assert!(matches!(plan(&[facebook()], &desired), Err(Error::ValidationError(_))));
	}

	#[test]
	fn test_empty_desired_deletes_everything() {
		let mut broken = custom("z", "Z", 0);
		broken["isCustom"] = json!(false);
		let current = vec![facebook(), custom("a", "A", 0), broken];

		let plan = plan(&current, &DesiredLinks::new()).unwrap();
		assert_eq!(plan.deletes(), 3);
		assert!(plan.ops.contains(&LinkOp::Delete { id: "z".into(), list: None }));
	}

	#[test]
	fn test_outcome() {
		let ok: ClResult<()> = Ok(());
		assert_eq!(SyncOutcome::from(&ok), SyncOutcome { success: true, error: None });

		let err: ClResult<()> =
			Err(Error::SyncIncomplete { failed: 1, total: 2, report: Box::default() });
		let outcome = SyncOutcome::from(&err);
		assert!(!outcome.success);
		assert_eq!(
			serde_json::to_value(&outcome).unwrap(),
			json!({
				"success": false,
				"error": "link synchronization incomplete: 1 of 2 operations failed",
			})
		);
	}
}

// vim: ts=4
