//! The narrow persistence seam around the reporting core.
//! The basic idea is:
//!  - The roster is one JSON file naming the team.
//!  - Daily entries are stored per rep as JSON-lines files, one line per
//!    calendar date, upserted whole.
//!  - Reports pull a date window across many reps as a stream.

pub mod entities;
pub mod entry_store;
pub mod roster;

use std::{future, sync::Arc};

use anyhow::Result;
use chrono::NaiveDate;
use futures::{stream, Stream, StreamExt};
use tracing::error;
use uuid::Uuid;

use self::{entities::DailyEntryEntity, entry_store::EntryStore};

/// Streams every entry the given reps logged inside `[start, end]`. Rep
/// files load a few at a time instead of all at once.
pub fn entries_between<S>(
    store: S,
    rep_ids: Vec<Uuid>,
    start: NaiveDate,
    end: NaiveDate,
) -> impl Stream<Item = Result<DailyEntryEntity>>
where
    S: EntryStore + Send + Sync,
{
    let store = Arc::new(store);

    let files = rep_ids
        .into_iter()
        .map(move |rep_id| {
            let store = store.clone();
            async move { (rep_id, store.entries_for_rep(rep_id).await) }
        })
        .collect::<Vec<_>>();

    let result = stream::iter(files)
        .buffered(4)
        .flat_map(|(rep_id, data)| match data {
            Ok(data) => stream::iter(data).map(Ok).boxed(),
            Err(e) => {
                error!("Failed to load entries for {rep_id} {e}");
                stream::once(future::ready(Err(e))).boxed()
            }
        })
        .filter_map(move |v| {
            future::ready(
                v.map(|entry| (entry.date >= start && entry.date <= end).then_some(entry))
                    .transpose(),
            )
        });

    result
}
