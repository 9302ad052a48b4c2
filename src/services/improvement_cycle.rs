//! The refinement loop: clean the routed path, pull the waypoints onto what
//! survived, re-route, repeat until nothing more is trimmed.
//!
//! Sessions are exposed as a [`futures::Stream`] of [`RefinementEvent`]s so
//! callers can forward progress as it happens. Nothing is spawned; dropping
//! the stream cancels the session and no further directions requests are made.

use crate::config::RefinementConfig;
use crate::error::{AppError, Result};
use crate::models::{DirectionsRequest, GeoPoint, Path, RefinementEvent, RoundCounts};
use crate::services::directions::{self, DirectionsClient};
use crate::services::tail_cleaner::TailCleaner;
use crate::services::waypoint_reconciler;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use uuid::Uuid;

pub type RefinementStream = BoxStream<'static, Result<RefinementEvent>>;

#[derive(Clone)]
pub struct ImprovementCycle {
    directions: Arc<dyn DirectionsClient>,
    cleaner: TailCleaner,
    max_rounds: u32,
}

impl ImprovementCycle {
    pub fn new(directions: Arc<dyn DirectionsClient>, config: &RefinementConfig) -> Self {
        ImprovementCycle {
            directions,
            cleaner: TailCleaner::new(config.tail_fraction_threshold),
            max_rounds: config.max_rounds,
        }
    }

    /// Route `request` and refine the result.
    ///
    /// The first directions call happens when the stream is first polled; if
    /// it fails, the error is the only item.
    pub fn session(&self, request: DirectionsRequest) -> RefinementStream {
        let waypoints = request.waypoints.clone();
        self.stream(Phase::Initial, Path::default(), waypoints, request)
    }

    /// Refine an already routed path.
    ///
    /// Yields the Start event (iteration 0) for `initial_path`, then one event
    /// per round. The stream ends after the first event with
    /// `keep_going == false`, or after the first error.
    pub fn run(
        &self,
        initial_path: Path,
        initial_waypoints: Vec<GeoPoint>,
        request: DirectionsRequest,
    ) -> RefinementStream {
        self.stream(Phase::Start, initial_path, initial_waypoints, request)
    }

    fn stream(
        &self,
        phase: Phase,
        path: Path,
        waypoints: Vec<GeoPoint>,
        request: DirectionsRequest,
    ) -> RefinementStream {
        let session = Session {
            id: Uuid::new_v4(),
            phase,
            directions: self.directions.clone(),
            cleaner: self.cleaner,
            max_rounds: self.max_rounds,
            request,
            path,
            waypoints,
            last_counts: None,
            rounds: 0,
        };

        tracing::debug!(
            session = %session.id,
            waypoints = session.waypoints.len(),
            mode = %session.request.mode,
            "Refinement session created with {} waypoints",
            session.waypoints.len()
        );

        stream::unfold(session, |mut session| async move {
            let item = session.advance().await?;
            Some((item, session))
        })
        .boxed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No path yet; the first step routes the request
    Initial,
    /// Path available, Start event not yet emitted
    Start,
    /// Emitting one event per cleaning round
    Cleaning,
    Finished,
}

struct Session {
    id: Uuid,
    phase: Phase,
    directions: Arc<dyn DirectionsClient>,
    cleaner: TailCleaner,
    max_rounds: u32,
    request: DirectionsRequest,
    path: Path,
    waypoints: Vec<GeoPoint>,
    /// `None` until the first re-route; never equal to real counts
    last_counts: Option<RoundCounts>,
    rounds: u32,
}

impl Session {
    async fn advance(&mut self) -> Option<Result<RefinementEvent>> {
        match self.phase {
            Phase::Finished => None,
            Phase::Initial => {
                match directions::request_with_recovery(self.directions.as_ref(), &self.request)
                    .await
                {
                    Ok(routed) => {
                        self.path = routed.path;
                        self.waypoints = routed.waypoints;
                        Some(Ok(self.start_event()))
                    }
                    Err(e) => Some(Err(self.fail(e))),
                }
            }
            Phase::Start => Some(Ok(self.start_event())),
            Phase::Cleaning => match self.round().await {
                Ok(event) => {
                    if !event.keep_going {
                        self.phase = Phase::Finished;
                    }
                    Some(Ok(event))
                }
                Err(e) => Some(Err(self.fail(e))),
            },
        }
    }

    fn start_event(&mut self) -> RefinementEvent {
        self.phase = Phase::Cleaning;
        tracing::info!(
            session = %self.id,
            points = self.path.len(),
            distance_km = %format!("{:.2}", self.path.distance_km()),
            "Refinement started: {} points, {:.2}km",
            self.path.len(),
            self.path.distance_km()
        );

        RefinementEvent {
            iteration: 0,
            distance_km: self.path.distance_km(),
            cleaned_count: 0,
            total_points: self.path.len(),
            waypoints: self.waypoints.clone(),
            path: self.path.clone(),
            keep_going: true,
        }
    }

    fn fail(&mut self, error: AppError) -> AppError {
        self.phase = Phase::Finished;
        tracing::warn!(
            session = %self.id,
            rounds = self.rounds,
            "Refinement failed after {} rounds: {}",
            self.rounds,
            error
        );
        error
    }

    /// One Cleaning step, plus the Requerying step when something was trimmed.
    async fn round(&mut self) -> Result<RefinementEvent> {
        if self.rounds >= self.max_rounds {
            return Err(AppError::ConvergenceTimeout {
                rounds: self.max_rounds,
            });
        }
        self.rounds += 1;

        let cleaned = self.cleaner.clean(&self.path.locations());

        if cleaned.removed_count == 0 {
            tracing::info!(
                session = %self.id,
                rounds = self.rounds,
                distance_km = %format!("{:.2}", cleaned.total_distance_km),
                "Refinement converged after {} rounds, {:.2}km",
                self.rounds,
                cleaned.total_distance_km
            );
            return Ok(RefinementEvent {
                iteration: self.rounds,
                distance_km: cleaned.total_distance_km,
                cleaned_count: 0,
                total_points: self.path.len(),
                waypoints: self.waypoints.clone(),
                path: self.path.clone(),
                keep_going: false,
            });
        }

        let reconciled = waypoint_reconciler::reconcile(&self.waypoints, &cleaned.path)?;
        let routed = directions::request_with_recovery(
            self.directions.as_ref(),
            &self.request.with_waypoints(reconciled),
        )
        .await?;

        let counts = RoundCounts {
            cleaned_count: cleaned.removed_count,
            total_points: routed.path.len(),
        };
        let stalled = self.last_counts == Some(counts);
        self.last_counts = Some(counts);
        self.path = routed.path;
        self.waypoints = routed.waypoints;

        if stalled {
            tracing::info!(
                session = %self.id,
                rounds = self.rounds,
                cleaned = counts.cleaned_count,
                total_points = counts.total_points,
                "Refinement stalled after {} rounds: same counts as the previous round",
                self.rounds
            );
        } else {
            tracing::debug!(
                session = %self.id,
                round = self.rounds,
                cleaned = counts.cleaned_count,
                total_points = counts.total_points,
                "Round {}: trimmed {} points, re-routed to {} points",
                self.rounds,
                counts.cleaned_count,
                counts.total_points
            );
        }

        Ok(RefinementEvent {
            iteration: self.rounds,
            distance_km: cleaned.total_distance_km,
            cleaned_count: counts.cleaned_count,
            total_points: counts.total_points,
            waypoints: self.waypoints.clone(),
            path: self.path.clone(),
            keep_going: !stalled,
        })
    }
}
