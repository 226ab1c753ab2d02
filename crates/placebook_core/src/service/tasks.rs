//! Background execution for storage and image work.
//!
//! # Responsibility
//! - Run blocking bookmark operations on the tokio blocking pool.
//! - Hand back a `TaskHandle` that resolves when the work finishes.
//!
//! # Invariants
//! - Callers may drop a handle; the work still runs to completion.
//! - A handle resolves to `TaskError::Dropped` if the worker panicked or the
//!   runtime shut down before the work ran.

use crate::model::bookmark::{Bookmark, BookmarkId, LatLng};
use crate::model::place::PlaceDetails;
use crate::repo::bookmark_repo::{BookmarkRepository, RepoResult};
use crate::service::bookmark_service::BookmarkService;
use crate::view::projection::BookmarkDetailsView;
use image::DynamicImage;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

/// Completion error for background tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    Dropped { task: &'static str },
}

impl Display for TaskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dropped { task } => write!(f, "background task `{task}` ended without a result"),
        }
    }
}

impl Error for TaskError {}

/// Completion signal for one background operation.
///
/// Await it from async code, or call `wait` from a plain thread.
#[derive(Debug)]
pub struct TaskHandle<T> {
    task: &'static str,
    rx: oneshot::Receiver<T>,
}

impl<T> TaskHandle<T> {
    pub fn task(&self) -> &'static str {
        self.task
    }

    /// Blocks the current thread until the task finishes.
    ///
    /// Must not be called from inside an async context.
    pub fn wait(self) -> Result<T, TaskError> {
        let task = self.task;
        self.rx.blocking_recv().map_err(|_| TaskError::Dropped { task })
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, TaskError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let task = self.task;
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.map_err(|_| TaskError::Dropped { task }))
    }
}

/// Off-thread front for `BookmarkService`.
pub struct BookmarkTasks<R: BookmarkRepository> {
    service: Arc<BookmarkService<R>>,
    runtime: Handle,
}

impl<R: BookmarkRepository> Clone for BookmarkTasks<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            runtime: self.runtime.clone(),
        }
    }
}

impl<R> BookmarkTasks<R>
where
    R: BookmarkRepository + Send + Sync + 'static,
{
    pub fn new(service: Arc<BookmarkService<R>>, runtime: Handle) -> Self {
        Self { service, runtime }
    }

    pub fn service(&self) -> &Arc<BookmarkService<R>> {
        &self.service
    }

    fn spawn<T, F>(&self, task: &'static str, work: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&BookmarkService<R>) -> T + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let service = Arc::clone(&self.service);
        self.runtime.spawn_blocking(move || {
            let output = work(&service);
            if tx.send(output).is_err() {
                debug!("event=task_result module=service status=discarded task={task}");
            }
        });
        TaskHandle { task, rx }
    }

    /// Inserts `bookmark`; resolves to the stored bookmark with its new id,
    /// or `None` when the insert was ignored.
    pub fn add(&self, mut bookmark: Bookmark) -> TaskHandle<RepoResult<Option<Bookmark>>> {
        self.spawn("bookmark_add", move |service| {
            Ok(service.add(&mut bookmark)?.map(|_| bookmark))
        })
    }

    pub fn add_from_place(&self, place: PlaceDetails) -> TaskHandle<RepoResult<Option<BookmarkId>>> {
        self.spawn("bookmark_add_from_place", move |service| {
            service.add_from_place(&place)
        })
    }

    pub fn add_from_location(&self, location: LatLng) -> TaskHandle<RepoResult<Option<BookmarkId>>> {
        self.spawn("bookmark_add_from_location", move |service| {
            service.add_from_location(location)
        })
    }

    pub fn update(&self, bookmark: Bookmark) -> TaskHandle<RepoResult<bool>> {
        self.spawn("bookmark_update", move |service| service.update(&bookmark))
    }

    pub fn save_details(
        &self,
        view: BookmarkDetailsView,
    ) -> TaskHandle<RepoResult<Option<Bookmark>>> {
        self.spawn("bookmark_save_details", move |service| {
            service.save_details(&view)
        })
    }

    pub fn delete(&self, bookmark: Bookmark) -> TaskHandle<RepoResult<()>> {
        self.spawn("bookmark_delete", move |service| service.delete(&bookmark))
    }

    pub fn delete_by_id(&self, id: BookmarkId) -> TaskHandle<RepoResult<bool>> {
        self.spawn("bookmark_delete_by_id", move |service| {
            service.delete_by_id(id)
        })
    }

    pub fn set_image(&self, id: BookmarkId, image: DynamicImage) -> TaskHandle<bool> {
        self.spawn("image_save", move |service| service.set_image(id, &image))
    }

    pub fn set_image_bytes(&self, id: BookmarkId, bytes: Vec<u8>) -> TaskHandle<bool> {
        self.spawn("image_save_bytes", move |service| {
            service.set_image_bytes(id, &bytes)
        })
    }

    pub fn load_image(&self, id: BookmarkId) -> TaskHandle<Option<DynamicImage>> {
        self.spawn("image_load", move |service| service.load_image(id))
    }
}
