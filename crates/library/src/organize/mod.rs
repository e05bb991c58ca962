//! Copying archive files into the organized output tree.
//!
//! Each [`ArchiveItem`](crate::scan::ArchiveItem) is resolved to a metadata
//! record through the [`Context`](crate::Context)'s resolver, rendered into a
//! destination by its [`PathTemplate`](crate::PathTemplate), and copied there.
//! Sources are never modified and existing output is never overwritten: when
//! the rendered destination is occupied, the copy goes to
//! `<stem>_<identifier>_<n>.<ext>` for the first free `n` instead.
//!
//! The primary entry point is [`organize`], which lists the archive and lazily
//! yields an [`OrganizeEvent`] per step, passing each file to
//! [`organize_file`].

mod batch;
mod conflict;
pub mod error;
mod file;

pub use self::batch::{OrganizeEvent, organize};
pub use self::file::{Action, SkipReason, organize_file};
