//! Reading links back: the editor's starting state and the public profile view

use serde::Serialize;
use serde_json::Value;

use crate::prelude::*;
use menucard_types::doc_adapter::{DocAdapter, QueryFilter, QueryOptions, SortField};
use menucard_types::link::{CustomLink, DesiredLinks, Link, LinkDoc, SocialLink};

/// Active links of a profile, in display order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublicLinks {
	pub social: Vec<SocialLink>,
	pub custom: Vec<CustomLink>,
}

fn split_docs(docs: Vec<Value>) -> DesiredLinks {
	let links = docs.into_iter().filter_map(|value| {
		match LinkDoc::from_value(value).and_then(Link::try_from) {
			Ok(link) => Some(link),
			Err(err) => {
				warn!("Skipping malformed link document: {}", err);
				None
			}
		}
	});

	DesiredLinks::from_links(links)
}

/// All links of a profile ordered by position, as the editor starts from them.
pub async fn load_links(
	adapter: &dyn DocAdapter,
	profile: &ProfileRef,
) -> ClResult<DesiredLinks> {
	let opts = QueryOptions::new().with_sort(vec![SortField::asc("position")]);
	let docs = adapter.query(&profile.links_path(), opts).await?;

	Ok(split_docs(docs))
}

/// Links shown on the public profile page: active ones only, ordered by position.
pub async fn public_links(
	adapter: &dyn DocAdapter,
	profile: &ProfileRef,
) -> ClResult<PublicLinks> {
	let opts = QueryOptions::new()
		.with_filter(QueryFilter::equals_one("active", Value::Bool(true)))
		.with_sort(vec![SortField::asc("position")]);
	let docs = adapter.query(&profile.links_path(), opts).await?;

	let DesiredLinks { social, custom } = split_docs(docs);
	Ok(PublicLinks { social, custom })
}

// vim: ts=4
