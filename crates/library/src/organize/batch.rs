use crate::Context;
use crate::error::Result as LibraryResult;
use crate::organize::file::{Action, organize_file};
use crate::scan::{ArchiveItem, scan};
use std::vec;
use undump_storage::LocalBackend;

/// Progress events emitted by [`organize`] as it works through an archive.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete): exactly once, with the
///    number of files that will be processed.
/// 3. [`Organized`](Self::Organized): zero or more times, one per file, in
///    ascending path order. A file that fails is an `Err` item in its place.
/// 4. [`Complete`](Self::Complete): exactly once.
///
/// A failure to list the archive terminates the sequence early, in which case
/// [`Complete`](Self::Complete) is never emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizeEvent {
    /// Organizing has begun; emitted exactly once before any other event.
    Started,
    /// The archive has been listed; the number of files to process is now known.
    DiscoveryComplete(u64),
    /// A file has been handled.
    Organized(Action),
    /// Every discovered file has been handled; the sequence is finished.
    Complete,
}

/// Lazily organizes every file of `archive` into `output` according to `ctx`,
/// one file at a time.
///
/// Nothing happens until the iterator is advanced. Individual file failures
/// are surfaced as `Err` items without ending the sequence; only a listing
/// failure is fatal.
pub fn organize<'a>(
    archive: &'a LocalBackend,
    output: &'a LocalBackend,
    ctx: &'a Context,
) -> impl Iterator<Item = LibraryResult<OrganizeEvent>> + 'a {
    Organizer { archive, output, ctx, state: State::Idle }
}

enum State {
    Idle,
    Discovering,
    Organizing(vec::IntoIter<ArchiveItem>),
    Done,
}

struct Organizer<'a> {
    archive: &'a LocalBackend,
    output: &'a LocalBackend,
    ctx: &'a Context,
    state: State,
}
impl Iterator for Organizer<'_> {
    type Item = LibraryResult<OrganizeEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.state, State::Done) {
            State::Idle => {
                self.state = State::Discovering;
                Some(Ok(OrganizeEvent::Started))
            },
            State::Discovering => {
                let items = match scan(self.archive, self.ctx.limit) {
                    Ok(items) => items,
                    Err(e) => return Some(Err(e)),
                };
                if let Some(limit) = self.ctx.limit {
                    tracing::info!(limit, "Limiting to the first files in path order");
                }
                tracing::info!("Processing {} file(s)", items.len());
                // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
                let total = u64::try_from(items.len()).unwrap_or(u64::MAX);
                self.state = State::Organizing(items.into_iter());
                Some(Ok(OrganizeEvent::DiscoveryComplete(total)))
            },
            State::Organizing(mut items) => match items.next() {
                Some(item) => {
                    let result = organize_file(self.output, self.ctx, &item).map(OrganizeEvent::Organized);
                    self.state = State::Organizing(items);
                    Some(result)
                },
                None => Some(Ok(OrganizeEvent::Complete)),
            },
            State::Done => None,
        }
    }
}
