//! The crawl driver.
//!
//! Fans page fetches out over a [`JoinSet`] and handles completions one at
//! a time, so the two append-only record collections are only ever touched
//! from this loop. Discovering a group reference while parsing an idol page
//! immediately schedules that group's fetch; a `seen` set collapses the
//! fan-in when many idols reference the same group. Thumbnail side-loads
//! run as separate tracked tasks and are all joined before the resolution
//! pass reads their results.
//!
//! Any fatal error aborts the whole run: outstanding tasks are dropped and
//! no output is produced.

use std::{collections::HashSet, sync::Arc};

use tokio::task::JoinSet;

use kpopnet_core::{
  Group, Idol, Profiles, RecordKind, overrides::Overrides, schema, validate,
};
use kpopnet_extract::{extract_group, extract_idol, extract_listing};

use crate::{
  Result,
  fetch::Fetch,
  resolve::{self, PendingIdol},
  thumb::ThumbStore,
};

#[derive(Debug, Clone, Copy)]
enum PageKind {
  Listing,
  Idol,
  Group,
}

/// Which record a finished thumbnail side-load belongs to.
#[derive(Debug, Clone, Copy)]
enum Slot {
  Idol(usize),
  Group(usize),
}

pub struct Crawler<F: Fetch> {
  fetcher:   Arc<F>,
  overrides: Overrides,
  thumbs:    Arc<ThumbStore>,
}

type PageTask = Result<(PageKind, String, String)>;
type ThumbTask = Result<(Slot, String)>;

impl<F: Fetch> Crawler<F> {
  pub fn new(fetcher: F, overrides: Overrides, thumbs: ThumbStore) -> Self {
    Self {
      fetcher: Arc::new(fetcher),
      overrides,
      thumbs: Arc::new(thumbs),
    }
  }

  /// Run the full pipeline: crawl from `start_url`, resolve, validate.
  pub async fn run(&self, start_url: &str) -> Result<Profiles> {
    let mut pages: JoinSet<PageTask> = JoinSet::new();
    let mut thumbs: JoinSet<ThumbTask> = JoinSet::new();
    let mut seen: HashSet<String> = HashSet::new();

    let mut idols: Vec<PendingIdol> = Vec::new();
    let mut groups: Vec<Group> = Vec::new();

    seen.insert(start_url.to_string());
    self.schedule(&mut pages, PageKind::Listing, start_url.to_string());

    while let Some(joined) = pages.join_next().await {
      let (kind, url, body) = joined??;
      match kind {
        PageKind::Listing => {
          for idol_url in extract_listing(&body) {
            if seen.insert(idol_url.clone()) {
              self.schedule(&mut pages, PageKind::Idol, idol_url);
            }
          }
        }

        PageKind::Idol => {
          let page = extract_idol(&body, &url)?;
          let mut fields = page.fields;
          schema::normalize(
            RecordKind::Idol,
            &mut fields,
            &self.overrides.idols,
          )?;
          let idol: Idol = schema::finish(fields)?;
          tracing::debug!(name = %idol.name, %url, "idol parsed");

          for membership in &page.memberships {
            if seen.insert(membership.group_url.clone()) {
              self.schedule(
                &mut pages,
                PageKind::Group,
                membership.group_url.clone(),
              );
            }
          }
          if let Some(src) = page.thumb_url {
            self.sideload(&mut thumbs, Slot::Idol(idols.len()), src);
          }
          idols.push(PendingIdol { idol, memberships: page.memberships });
        }

        PageKind::Group => {
          let page = extract_group(&body, &url)?;
          let mut fields = page.fields;
          schema::normalize(
            RecordKind::Group,
            &mut fields,
            &self.overrides.groups,
          )?;
          let group: Group = schema::finish(fields)?;
          tracing::debug!(name = %group.name, %url, "group parsed");

          if let Some(parent_url) = &page.parent_url
            && seen.insert(parent_url.clone())
          {
            self.schedule(&mut pages, PageKind::Group, parent_url.clone());
          }
          if let Some(src) = page.thumb_url {
            self.sideload(&mut thumbs, Slot::Group(groups.len()), src);
          }
          groups.push(group);
        }
      }
    }

    // Every outstanding side-load must settle before resolution reads
    // thumb_url.
    while let Some(joined) = thumbs.join_next().await {
      let (slot, thumb_url) = joined??;
      match slot {
        Slot::Idol(i) => idols[i].idol.thumb_url = Some(thumb_url),
        Slot::Group(i) => groups[i].thumb_url = Some(thumb_url),
      }
    }

    tracing::info!(
      idols = idols.len(),
      groups = groups.len(),
      "crawl finished, resolving"
    );
    let (idols, groups) = resolve::resolve(idols, groups)?;
    validate::validate_all(RecordKind::Idol, &idols)?;
    validate::validate_all(RecordKind::Group, &groups)?;

    Ok(Profiles { groups, idols })
  }

  fn schedule(
    &self,
    pages: &mut JoinSet<PageTask>,
    kind: PageKind,
    url: String,
  ) {
    let fetcher = Arc::clone(&self.fetcher);
    pages.spawn(async move {
      let body = fetcher.get_text(&url).await?;
      Ok((kind, url, body))
    });
  }

  fn sideload(&self, thumbs: &mut JoinSet<ThumbTask>, slot: Slot, src: String) {
    let fetcher = Arc::clone(&self.fetcher);
    let store = Arc::clone(&self.thumbs);
    thumbs.spawn(async move {
      let bytes = fetcher.get_bytes(&src).await?;
      Ok((slot, store.store(&bytes)?))
    });
  }
}

// ─── In-memory fetcher for tests ─────────────────────────────────────────────
