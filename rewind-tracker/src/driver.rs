//! Session driver
//!
//! Owns one [`WatchSession`] on a background task fed by an event queue.
//! Player callbacks only enqueue events, so playback never waits on tracking
//! or on the network; saves happen on the driver task according to the
//! [`SaveScheduler`], and failures are logged and absorbed — the next save
//! carries the full snapshot again anyway.

use std::sync::Arc;

use anyhow::Result;
use rewind_model::{UpdateProgressRequest, VideoID, ViewerID};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use crate::scheduler::{SavePolicy, SaveScheduler};
use crate::session::{PlayerEvent, WatchSession};
use crate::transport::ProgressTransport;

/// Cheap cloneable sender for feeding player events into a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<PlayerEvent>,
}

impl SessionHandle {
    fn send(&self, event: PlayerEvent) {
        // A closed channel just means the session was torn down.
        let _ = self.tx.send(event);
    }

    pub fn play(&self, position: u64) {
        self.send(PlayerEvent::Play { position });
    }

    pub fn tick(&self, position: u64) {
        self.send(PlayerEvent::Tick { position });
    }

    pub fn seek(&self, position: u64) {
        self.send(PlayerEvent::Seek { position });
    }

    pub fn pause(&self) {
        self.send(PlayerEvent::Pause);
    }

    pub fn ended(&self) {
        self.send(PlayerEvent::Ended);
    }
}

/// A running tracking session for one (viewer, video) playback view.
#[derive(Debug)]
pub struct SessionDriver {
    handle: SessionHandle,
    task: JoinHandle<()>,
    resume_position: u64,
}

impl SessionDriver {
    /// Fetch the video's runtime and any prior progress, then start the
    /// session task seeded with that history.
    pub async fn start(
        transport: Arc<dyn ProgressTransport>,
        viewer_id: ViewerID,
        video_id: VideoID,
    ) -> Result<Self> {
        Self::start_with_policy(transport, viewer_id, video_id, SavePolicy::default()).await
    }

    pub async fn start_with_policy(
        transport: Arc<dyn ProgressTransport>,
        viewer_id: ViewerID,
        video_id: VideoID,
        policy: SavePolicy,
    ) -> Result<Self> {
        let video = transport.fetch_video(video_id).await?;
        let record = transport.fetch_progress(viewer_id, video_id).await?;
        let session = WatchSession::with_history(video.duration_seconds, &record.intervals)?;
        debug!(
            %viewer_id,
            %video_id,
            resume = record.last_position,
            percentage = session.percentage(),
            "starting tracking session"
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_session(
            session, rx, transport, viewer_id, video_id, policy,
        ));

        Ok(Self {
            handle: SessionHandle { tx },
            task,
            resume_position: record.last_position,
        })
    }

    /// Where playback should resume, from the persisted record.
    pub fn resume_position(&self) -> u64 {
        self.resume_position
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// Tear the session down, flushing any unsaved coverage first.
    ///
    /// Waits for the session task, so any cloned handles must be dropped for
    /// this to complete.
    pub async fn shutdown(self) {
        let SessionDriver { handle, task, .. } = self;
        drop(handle);
        if let Err(err) = task.await {
            warn!("session task did not shut down cleanly: {err}");
        }
    }
}

async fn run_session(
    mut session: WatchSession,
    mut rx: mpsc::UnboundedReceiver<PlayerEvent>,
    transport: Arc<dyn ProgressTransport>,
    viewer_id: ViewerID,
    video_id: VideoID,
    policy: SavePolicy,
) {
    let mut scheduler = SaveScheduler::new(policy);

    loop {
        let deadline = scheduler.deadline();
        tokio::select! {
            maybe_event = rx.recv() => match maybe_event {
                Some(event) => {
                    let request = session.apply(event);
                    scheduler.request(request);
                }
                // All handles dropped: the view was torn down.
                None => break,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                save_snapshot(&session, transport.as_ref(), viewer_id, video_id).await;
                scheduler.mark_fired();
            }
        }
    }

    if scheduler.needs_flush() {
        save_snapshot(&session, transport.as_ref(), viewer_id, video_id).await;
    }
}

async fn save_snapshot(
    session: &WatchSession,
    transport: &dyn ProgressTransport,
    viewer_id: ViewerID,
    video_id: VideoID,
) {
    let snapshot = session.snapshot();
    let update = UpdateProgressRequest {
        intervals: snapshot.intervals,
        current_time: Some(snapshot.position),
    };
    match transport.save_progress(viewer_id, video_id, update).await {
        Ok(record) => debug!(
            %viewer_id,
            %video_id,
            percentage = record.progress_percentage,
            "saved progress"
        ),
        // Swallowed on purpose: the next save re-sends the full snapshot.
        Err(err) => warn!(%viewer_id, %video_id, "failed to save progress: {err}"),
    }
}
