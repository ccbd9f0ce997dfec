//! The single-writer estimation pipeline.
//!
//! All sensor sources, the periodic prediction timer, and the pause/resume
//! control funnel into one mpsc channel consumed by one task that owns the
//! estimator. At most one mutation of the navigation state is ever in
//! flight; events apply in arrival order (FIFO). The
//! predict/correct/metrics/audit/publish chain inside the consumer is
//! synchronous and non-blocking.

use std::sync::Arc;

use nalgebra::Vector3;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, warn};

use relnav_core::{
    AmbientReadings, CoherenceAuditor, DerivedMetricsEngine, EventLogEntry, FixStatus, NavError,
    SensorIngest, SensorSample, SensorSource, SessionExport, StateEstimator, TelemetryPublisher,
    TelemetrySnapshot,
};

/// Acceleration magnitude (m/s²) above which an event-log entry is recorded.
const EVENT_LOG_THRESHOLD_M_S2: f64 = 0.5;

/// Messages accepted by the pipeline consumer.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// A raw sensor sample from any source
    Sensor(SensorSample),

    /// The positional receiver reported a failed fix attempt
    FixFailed,

    /// Suspend estimation; subsequent sensor events are discarded
    Pause,

    /// Resume estimation; integration baselines reset so the idle gap is
    /// not replayed as motion
    Resume,

    /// End the session
    Shutdown,
}

/// The single consumer that owns the estimator.
pub struct Pipeline {
    ingest: SensorIngest,
    estimator: StateEstimator,
    metrics: DerivedMetricsEngine,
    auditor: CoherenceAuditor,
    publisher: TelemetryPublisher,
    export: SessionExport,

    telemetry_tx: watch::Sender<Option<Arc<TelemetrySnapshot>>>,

    /// Session epoch: corrected wall-clock ms at tick zero
    session_start_ms: f64,

    /// Most recent gyroscope rates, paired with the next accelerometer sample
    last_gyro: Vector3<f64>,

    ambient: AmbientReadings,
    fix_status: FixStatus,
    paused: bool,

    /// Domain faults surfaced so far (superluminal estimates)
    domain_faults: u64,
}

impl Pipeline {
    /// Creates a pipeline around an estimator and returns the telemetry
    /// receiver for external consumers.
    pub fn new(
        estimator: StateEstimator,
        session_start_ms: f64,
    ) -> (Self, watch::Receiver<Option<Arc<TelemetrySnapshot>>>) {
        let (telemetry_tx, telemetry_rx) = watch::channel(None);
        let pipeline = Self {
            ingest: SensorIngest::new(),
            estimator,
            metrics: DerivedMetricsEngine::new(),
            auditor: CoherenceAuditor::new(),
            publisher: TelemetryPublisher::new(),
            export: SessionExport::new(),
            telemetry_tx,
            session_start_ms,
            last_gyro: Vector3::zeros(),
            ambient: AmbientReadings::default(),
            fix_status: FixStatus::Unavailable,
            paused: false,
            domain_faults: 0,
        };
        (pipeline, telemetry_rx)
    }

    /// Replaces the nominal sound speed with an ephemeris-corrected value.
    pub fn set_sound_speed_m_s(&mut self, sound_speed_m_s: f64) {
        self.metrics.set_sound_speed_m_s(sound_speed_m_s);
    }

    /// Consumes events until shutdown, then returns the session export.
    pub async fn run(mut self, mut rx: mpsc::Receiver<PipelineEvent>) -> SessionExport {
        while let Some(event) = rx.recv().await {
            if !self.apply(event) {
                break;
            }
        }
        self.finish()
    }

    /// Applies one event. Returns false when the session should end.
    ///
    /// Every sensor-facing failure is recovered here: the sample is dropped
    /// and the previous state retained. Only domain faults are surfaced as
    /// errors, and even those never stop the loop.
    pub fn apply(&mut self, event: PipelineEvent) -> bool {
        match event {
            PipelineEvent::Sensor(sample) => {
                if self.paused {
                    return true;
                }
                if let Err(e) = self.apply_sample(sample) {
                    match e {
                        NavError::SuperluminalSpeed { speed_m_s } => {
                            self.domain_faults += 1;
                            error!(speed_m_s, "domain fault: estimate reached light speed");
                        }
                        other => warn!(error = %other, "sample dropped"),
                    }
                }
                true
            }
            PipelineEvent::FixFailed => {
                self.fix_status = FixStatus::Error;
                true
            }
            PipelineEvent::Pause => {
                self.paused = true;
                debug!("pipeline paused");
                true
            }
            PipelineEvent::Resume => {
                self.paused = false;
                self.ingest.reset_baselines();
                self.estimator.reset_baseline();
                debug!("pipeline resumed, baselines reset");
                true
            }
            PipelineEvent::Shutdown => false,
        }
    }

    /// Number of domain faults surfaced so far.
    pub fn domain_faults(&self) -> u64 {
        self.domain_faults
    }

    fn apply_sample(&mut self, sample: SensorSample) -> Result<(), NavError> {
        let ingested = match self.ingest.normalize(sample) {
            Ok(ingested) => ingested,
            Err(e) => {
                // A rejected fix still counts as a failed acquisition attempt.
                if sample.source() == SensorSource::Gps {
                    self.fix_status = FixStatus::Error;
                }
                return Err(e);
            }
        };
        if let Some(recovered) = &ingested.recovered {
            warn!(
                source = ingested.sample.source().tag(),
                error = %recovered,
                "timestep recovered"
            );
        }

        match ingested.sample {
            SensorSample::Accelerometer { x, y, z, t_ms } => {
                self.estimator
                    .predict(Vector3::new(x, y, z), self.last_gyro, ingested.dt_s)?;
                self.complete_cycle(ingested.dt_s, t_ms)
            }
            SensorSample::Gyroscope { x, y, z, .. } => {
                // Held until the next accelerometer sample; orientation is
                // integrated inside predict.
                self.last_gyro = Vector3::new(x, y, z);
                Ok(())
            }
            SensorSample::GpsFix { lat, lon, alt, t_ms } => {
                match self.estimator.correct_with_fix(lat, lon, alt) {
                    Ok(()) => self.fix_status = FixStatus::Acquired,
                    Err(e) => {
                        self.fix_status = FixStatus::Error;
                        return Err(e);
                    }
                }
                // Correction cycle: no wallclock elapses beyond the predict
                // ticks already counted.
                self.complete_cycle(0.0, t_ms)
            }
            SensorSample::Barometer { h_pa, t_ms } => {
                self.estimator.correct_with_pressure(h_pa, t_ms)?;
                self.complete_cycle(0.0, t_ms)
            }
            SensorSample::Ambient { lux, db, .. } => {
                self.ambient = AmbientReadings {
                    illuminance_lux: Some(lux),
                    sound_level_db: Some(db),
                };
                Ok(())
            }
        }
    }

    /// Metrics, audit, and exactly one snapshot for the completed cycle.
    fn complete_cycle(&mut self, dt_s: f64, t_ms: f64) -> Result<(), NavError> {
        let accel_mag = self.estimator.last_accel().norm();
        let metrics = self
            .metrics
            .update(self.estimator.state(), accel_mag, dt_s)?;
        let verdict = self
            .auditor
            .evaluate(metrics.proper_time_s, self.estimator.covariance());

        let wallclock_ms = self.session_start_ms + t_ms;
        if accel_mag >= EVENT_LOG_THRESHOLD_M_S2 {
            self.export.push_event(EventLogEntry {
                timestamp_ms: wallclock_ms,
                magnitude: accel_mag,
                jerk_g_s: metrics.jerk_g_s,
                speed_m_s: metrics.speed_m_s,
            });
        }

        let snapshot = self.publisher.publish(
            self.estimator.state(),
            metrics,
            verdict,
            self.fix_status,
            self.ambient,
            wallclock_ms,
        );
        // Receivers may have gone away; publishing is best-effort.
        let _ = self.telemetry_tx.send(Some(snapshot));
        Ok(())
    }

    /// Finalizes and returns the session export artifact.
    pub fn finish(mut self) -> SessionExport {
        self.export.finalize(
            self.estimator.state(),
            self.metrics.peak_g_force(),
            self.metrics.distance_m(),
            self.metrics.proper_time_s(),
            self.metrics.elapsed_s(),
        );
        self.export
    }
}
