//! Timed, cancellable volume fades
//!
//! A fade runs on its own thread. On every tick it interpolates between the
//! start and end volume by wall-clock progress and applies the result through
//! a [`VolumeControl`], until the end volume has been applied or the fade's
//! [`CancellationToken`] is cancelled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::client::volume_to_raw;
use crate::speaker::SpeakerId;
use crate::{ApiError, Result};

/// Anything that can set a speaker's volume
pub trait VolumeControl: Send + Sync {
    fn set_speaker_volume(&self, id: &SpeakerId, volume_pct: f64) -> Result<()>;
}

/// Shared flag used to stop a running fade
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// How a fade ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeOutcome {
    /// The end volume was applied
    Completed { volume_pct: f64 },
    /// Stopped early; carries the last volume applied, if any
    Cancelled { volume_pct: Option<f64> },
}

/// A planned volume change from `start_pct` to `end_pct` over `duration`
#[derive(Debug, Clone, PartialEq)]
pub struct Fade {
    speaker_id: SpeakerId,
    start_pct: f64,
    end_pct: f64,
    duration: Duration,
    tick: Duration,
}

impl Fade {
    /// Interval between volume updates unless overridden
    pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

    pub fn new(
        speaker_id: impl Into<SpeakerId>,
        start_pct: f64,
        end_pct: f64,
        duration: Duration,
    ) -> Result<Self> {
        volume_to_raw(start_pct)?;
        volume_to_raw(end_pct)?;

        Ok(Self {
            speaker_id: speaker_id.into(),
            start_pct,
            end_pct,
            duration,
            tick: Self::DEFAULT_TICK,
        })
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn speaker_id(&self) -> &SpeakerId {
        &self.speaker_id
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Volume the fade should be at `elapsed` after starting
    pub fn volume_at(&self, elapsed: Duration) -> f64 {
        if elapsed >= self.duration {
            return self.end_pct;
        }
        let progress = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.start_pct + (self.end_pct - self.start_pct) * progress
    }

    /// Run the fade on the calling thread
    ///
    /// Returns the first error from `control`, leaving the volume wherever
    /// the last successful tick put it.
    pub fn run<C: VolumeControl + ?Sized>(
        &self,
        control: &C,
        token: &CancellationToken,
    ) -> Result<FadeOutcome> {
        let started = Instant::now();
        let mut last_applied = None;

        loop {
            if token.is_cancelled() {
                tracing::info!("Fade of {} cancelled", self.speaker_id);
                return Ok(FadeOutcome::Cancelled {
                    volume_pct: last_applied,
                });
            }

            let elapsed = started.elapsed();
            let volume = self.volume_at(elapsed);
            tracing::debug!(
                "Setting volume of {} to {:.2} as part of {:?} fade",
                self.speaker_id,
                volume,
                self.duration
            );
            control.set_speaker_volume(&self.speaker_id, volume)?;
            last_applied = Some(volume);

            if elapsed >= self.duration {
                return Ok(FadeOutcome::Completed { volume_pct: volume });
            }
            thread::sleep(self.tick);
        }
    }

    /// Run the fade on a background thread
    pub fn spawn<C: VolumeControl + 'static>(
        self,
        control: Arc<C>,
        token: CancellationToken,
    ) -> FadeHandle {
        let task_token = token.clone();
        let handle = thread::spawn(move || self.run(control.as_ref(), &task_token));

        FadeHandle { token, handle }
    }
}

/// Start a fade in the background
///
/// Shorthand for [`Fade::new`] followed by [`Fade::spawn`].
pub fn apply_fade<C: VolumeControl + 'static>(
    control: Arc<C>,
    speaker_id: impl Into<SpeakerId>,
    start_pct: f64,
    end_pct: f64,
    duration: Duration,
    token: CancellationToken,
) -> Result<FadeHandle> {
    Ok(Fade::new(speaker_id, start_pct, end_pct, duration)?.spawn(control, token))
}

/// Handle to a running fade
#[derive(Debug)]
pub struct FadeHandle {
    token: CancellationToken,
    handle: JoinHandle<Result<FadeOutcome>>,
}

impl FadeHandle {
    /// Ask the fade to stop before its next tick
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the fade to end
    pub fn join(self) -> Result<FadeOutcome> {
        self.handle
            .join()
            .map_err(|_| ApiError::FadeAborted("fade thread panicked".to_string()))?
    }
}
