//! Link model
//!
//! A profile carries two ordered link lists: social network profiles and free-form
//! custom links. Both live in one document collection under the profile and are told
//! apart by the `isSocial` / `isCustom` flags of the stored document ([`LinkDoc`]).
//! In code they are the two variants of [`Link`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::prelude::*;
use crate::utils::has_scheme;

/// Platform name stored on custom links
pub const CUSTOM_PLATFORM: &str = "custom";

fn default_active() -> bool {
	true
}

/// The list a link belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkList {
	Social,
	Custom,
}

impl std::fmt::Display for LinkList {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			LinkList::Social => write!(f, "social"),
			LinkList::Custom => write!(f, "custom"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<Box<str>>,
	pub platform: String,
	pub url: String,
	#[serde(default = "default_active")]
	pub active: bool,
	#[serde(default)]
	pub position: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub clicked: Option<u64>,
}

impl SocialLink {
	pub fn new(platform: impl Into<String>, url: impl Into<String>) -> Self {
		Self {
			id: None,
			platform: platform.into(),
			url: url.into(),
			active: true,
			position: 0,
			clicked: None,
		}
	}

	pub fn with_id(mut self, id: impl Into<Box<str>>) -> Self {
		self.id = Some(id.into());
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomLink {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<Box<str>>,
	pub title: String,
	pub url: String,
	#[serde(default = "default_active")]
	pub active: bool,
	#[serde(default)]
	pub position: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub clicked: Option<u64>,
}

impl CustomLink {
	pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
		Self {
			id: None,
			title: title.into(),
			url: url.into(),
			active: true,
			position: 0,
			clicked: None,
		}
	}

	pub fn with_id(mut self, id: impl Into<Box<str>>) -> Self {
		self.id = Some(id.into());
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
	Social(SocialLink),
	Custom(CustomLink),
}

impl Link {
	pub fn list(&self) -> LinkList {
		match self {
			Link::Social(_) => LinkList::Social,
			Link::Custom(_) => LinkList::Custom,
		}
	}

	pub fn id(&self) -> Option<&str> {
		match self {
			Link::Social(link) => link.id.as_deref(),
			Link::Custom(link) => link.id.as_deref(),
		}
	}

	pub fn set_position(&mut self, position: u32) {
		match self {
			Link::Social(link) => link.position = position,
			Link::Custom(link) => link.position = position,
		}
	}

	pub fn clicked(&self) -> Option<u64> {
		match self {
			Link::Social(link) => link.clicked,
			Link::Custom(link) => link.clicked,
		}
	}

	pub fn to_doc(&self) -> LinkDoc {
		LinkDoc::from(self.clone())
	}
}

/// Stored shape of a link document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDoc {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<Box<str>>,
	#[serde(default)]
	pub is_social: bool,
	#[serde(default)]
	pub is_custom: bool,
	#[serde(default)]
	pub platform: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(default)]
	pub url: String,
	#[serde(default)]
	pub active: bool,
	#[serde(default)]
	pub position: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub clicked: Option<u64>,
}

impl LinkDoc {
	/// Parse a document read from the store.
	pub fn from_value(value: Value) -> ClResult<Self> {
		Ok(serde_json::from_value(value)?)
	}

	/// Document body to write: everything except the `id`, which lives in the path.
	pub fn to_record(&self) -> ClResult<Value> {
		let mut value = serde_json::to_value(self)?;
		if let Value::Object(ref mut obj) = value {
			obj.remove("id");
		}
		Ok(value)
	}

	pub fn list(&self) -> Option<LinkList> {
		match (self.is_social, self.is_custom) {
			(true, false) => Some(LinkList::Social),
			(false, true) => Some(LinkList::Custom),
			_ => None,
		}
	}
}

impl From<Link> for LinkDoc {
	fn from(link: Link) -> Self {
		match link {
			Link::Social(link) => LinkDoc {
				id: link.id,
				is_social: true,
				is_custom: false,
				platform: link.platform,
				title: None,
				url: link.url,
				active: link.active,
				position: link.position,
				clicked: link.clicked,
			},
			Link::Custom(link) => LinkDoc {
				id: link.id,
				is_social: false,
				is_custom: true,
				platform: CUSTOM_PLATFORM.to_string(),
				title: Some(link.title),
				url: link.url,
				active: link.active,
				position: link.position,
				clicked: link.clicked,
			},
		}
	}
}

impl TryFrom<LinkDoc> for Link {
	type Error = Error;

	fn try_from(doc: LinkDoc) -> ClResult<Self> {
		match doc.list() {
			Some(LinkList::Social) => Ok(Link::Social(SocialLink {
				id: doc.id,
				platform: doc.platform,
				url: doc.url,
				active: doc.active,
				position: doc.position,
				clicked: doc.clicked,
			})),
			Some(LinkList::Custom) => Ok(Link::Custom(CustomLink {
				id: doc.id,
				title: doc.title.unwrap_or_default(),
				url: doc.url,
				active: doc.active,
				position: doc.position,
				clicked: doc.clicked,
			})),
			None => Err(Error::ValidationError(format!(
				"link {} must be either social or custom",
				doc.id.as_deref().unwrap_or("<new>")
			))),
		}
	}
}

/// The complete link state submitted by the editor, one ordered list per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredLinks {
	#[serde(default)]
	pub social: Vec<SocialLink>,
	#[serde(default)]
	pub custom: Vec<CustomLink>,
}

impl DesiredLinks {
	pub fn new() -> Self {
		Self::default()
	}

	/// Split a mixed sequence into the two lists, keeping the relative order of each.
	pub fn from_links(links: impl IntoIterator<Item = Link>) -> Self {
		let mut desired = Self::default();
		for link in links {
			match link {
				Link::Social(link) => desired.social.push(link),
				Link::Custom(link) => desired.custom.push(link),
			}
		}
		desired
	}

	pub fn len(&self) -> usize {
		self.social.len() + self.custom.len()
	}

	pub fn is_empty(&self) -> bool {
		self.social.is_empty() && self.custom.is_empty()
	}

	/// Give store-assigned ids to the links they were created for.
	///
	/// Links that already carry an id are left alone. Returns the number of links changed.
	pub fn assign_ids(&mut self, created: &[CreatedLink]) -> usize {
		let mut assigned = 0;
		for entry in created {
			let slot = match entry.list {
				LinkList::Social => self.social.get_mut(entry.index).map(|link| &mut link.id),
				LinkList::Custom => self.custom.get_mut(entry.index).map(|link| &mut link.id),
			};
			if let Some(id) = slot
				&& id.is_none()
			{
				*id = Some(entry.id.clone());
				assigned += 1;
			}
		}
		assigned
	}

	/// Form-level checks the synchronizer itself relies on but does not perform.
	pub fn validate(&self) -> ClResult<()> {
		let mut platforms = HashSet::new();
		let mut ids = HashSet::new();

		for link in &self.social {
			if link.platform.trim().is_empty() {
				return Err(Error::ValidationError("social link without platform".into()));
			}
			if !platforms.insert(link.platform.to_lowercase()) {
				return Err(Error::ValidationError(format!(
					"more than one {} link",
					link.platform
				)));
			}
			check_url(&link.url)?;
			check_id(&mut ids, link.id.as_deref())?;
		}

		for link in &self.custom {
			if link.title.trim().is_empty() {
				return Err(Error::ValidationError("custom link without title".into()));
			}
			check_url(&link.url)?;
			check_id(&mut ids, link.id.as_deref())?;
		}

		Ok(())
	}
}

/// A link created by a synchronization, addressed by its place in the desired lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedLink {
	pub list: LinkList,
	pub index: usize,
	pub id: Box<str>,
}

/// Writes done by a synchronization.
///
/// Also carried by [`Error::SyncIncomplete`], where it lists the writes that did go
/// through before the batch settled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
	pub created: Vec<CreatedLink>,
	pub updated: Vec<Box<str>>,
	pub deleted: Vec<Box<str>>,
}

impl SyncReport {
	/// Total number of writes applied
	pub fn writes(&self) -> usize {
		self.created.len() + self.updated.len() + self.deleted.len()
	}
}

fn check_url(url: &str) -> ClResult<()> {
	if has_scheme(url) {
		Ok(())
	} else {
		Err(Error::ValidationError(format!("invalid link url: '{}'", url)))
	}
}

fn check_id<'a>(ids: &mut HashSet<&'a str>, id: Option<&'a str>) -> ClResult<()> {
	match id {
		Some(id) if !ids.insert(id) => {
			Err(Error::ValidationError(format!("duplicate link id: {}", id)))
		}
		_ => Ok(()),
	}
}


// vim: ts=4
