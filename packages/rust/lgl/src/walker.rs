//! Cursor pagination over the constituent listing and per-record detail fetch.

use tracing::{debug, info, instrument};
use url::Url;

use contactaudit_shared::{ConstituentDetail, ConstituentPage, ConstituentSummary, Result};

use crate::client::LglApi;

/// Listing endpoint, relative to the API root.
const CONSTITUENTS_PATH: &str = "constituents";

/// Walk every page of the constituent listing.
///
/// Items are accumulated in server order. The walk ends at the first page
/// whose `next_link` is absent, null, or empty. A page with no items but a
/// cursor is followed like any other.
#[instrument(skip_all)]
pub async fn list_all_constituents<A>(api: &A) -> Result<Vec<ConstituentSummary>>
where
    A: LglApi + Sync,
{
    let mut page: ConstituentPage = api.get_json(CONSTITUENTS_PATH).await?;
    let mut constituents = Vec::new();
    let mut pages = 0usize;

    loop {
        pages += 1;
        let page_len = page.items.len();
        constituents.extend(page.items);

        debug!(
            page = pages,
            items = page_len,
            total = constituents.len(),
            "fetched constituent page"
        );

        let Some(next) = page.next_link.as_deref().and_then(cursor_path) else {
            break;
        };
        page = api.get_json(&next).await?;
    }

    info!(pages, constituents = constituents.len(), "constituent listing complete");
    Ok(constituents)
}

/// Fetch the full record behind a listing entry.
pub async fn resolve<A>(api: &A, summary: &ConstituentSummary) -> Result<ConstituentDetail>
where
    A: LglApi + Sync,
{
    api.get_json(&format!("{CONSTITUENTS_PATH}/{}", summary.id))
        .await
}

/// Reduce a `next_link` cursor to the part the client should request.
///
/// Absolute cursors lose their scheme and host (the client re-prefixes its
/// own base), keeping path and query. Relative cursors pass through. An
/// empty cursor means there is no next page.
pub fn cursor_path(next_link: &str) -> Option<String> {
    let link = next_link.trim();
    if link.is_empty() {
        return None;
    }

    match Url::parse(link) {
        Ok(url) => {
            let mut path = url.path().to_string();
            if let Some(query) = url.query() {
                path.push('?');
                path.push_str(query);
            }
            Some(path)
        }
        Err(_) => Some(link.to_string()),
    }
}
