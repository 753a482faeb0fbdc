//! # projcache-watch
//!
//! Filesystem watch collaborator for the projcache configuration cache.
//! [`NotifyWatcher`] registers individual paths with `notify` and pushes
//! [`ChangeEvent`]s onto a channel; [`InvalidationListener`] drains that
//! channel on its own thread and hands each path to a [`ChangeSink`].
//!
//! [`ChangeSink`]: projcache_core::ChangeSink

pub mod event;
pub mod listener;
pub mod noop;
pub mod notify_watcher;

pub use event::{ChangeEvent, ChangeKind};
pub use listener::InvalidationListener;
pub use noop::NoopWatcher;
pub use notify_watcher::NotifyWatcher;
