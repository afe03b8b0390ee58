//! Trajectory recording
//!
//! One sample per render frame plus a run summary, exportable to JSON and CSV.

use anyhow::{Context, Result};
use roomba_core::MotionState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Controller state as stored in a recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleState {
    Moving,
    Turning,
}

impl From<MotionState> for SampleState {
    fn from(state: MotionState) -> Self {
        match state {
            MotionState::Moving => SampleState::Moving,
            MotionState::Turning(_) => SampleState::Turning,
        }
    }
}

impl fmt::Display for SampleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleState::Moving => write!(f, "moving"),
            SampleState::Turning => write!(f, "turning"),
        }
    }
}

/// Agent state at one render frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectorySample {
    /// Render frame number (0-indexed)
    pub frame: u64,

    /// Simulation time in seconds
    pub time: f64,

    /// Position [x, y] in meters
    pub position: [f32; 2],

    /// Heading in degrees
    pub heading: f32,

    pub state: SampleState,

    /// Linear velocity [x, y] in m/s
    pub velocity: [f32; 2],

    /// Turn completion in [0, 1] while turning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_progress: Option<f32>,
}

/// Totals for a whole run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub frames: u64,
    pub ticks: u64,
    pub sim_time: f64,
    /// Contact starts reported by the physics world
    pub collisions_seen: u32,
    /// Contact starts that made the controller turn
    pub collisions_accepted: u32,
    pub turns_completed: u32,
    pub distance_travelled: f32,
    /// Seconds discarded by the clock's catch-up limit
    pub dropped_time: f64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulated time:      {:.2} s", self.sim_time)?;
        writeln!(f, "Frames / ticks:      {} / {}", self.frames, self.ticks)?;
        writeln!(
            f,
            "Collisions:          {} seen, {} accepted",
            self.collisions_seen, self.collisions_accepted
        )?;
        writeln!(f, "Turns completed:     {}", self.turns_completed)?;
        write!(f, "Distance travelled:  {:.2} m", self.distance_travelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub name: String,
    pub policy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub physics_hz: f32,
    pub render_hz: f32,
    /// Recording start time (RFC 3339)
    pub recorded_at: String,
}

impl RecordingMetadata {
    pub fn new(
        name: impl Into<String>,
        policy: impl Into<String>,
        seed: Option<u64>,
        physics_hz: f32,
        render_hz: f32,
    ) -> Self {
        Self {
            name: name.into(),
            policy: policy.into(),
            seed,
            physics_hz,
            render_hz,
            recorded_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Complete recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub metadata: RecordingMetadata,
    pub samples: Vec<TrajectorySample>,
    pub summary: RunSummary,
}

impl Recording {
    /// Save recording to a JSON file
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize recording to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write recording to {:?}", path))?;
        Ok(())
    }

    /// Load recording from a JSON file
    pub fn load_json(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recording from {:?}", path))?;
        serde_json::from_str(&json).context("Failed to deserialize recording from JSON")
    }

    /// Export trajectory samples to CSV
    pub fn export_csv(&self, path: &Path) -> Result<()> {
        use std::io::Write;

        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create CSV file at {:?}", path))?;

        writeln!(file, "frame,time,x,y,heading,state,vx,vy,turn_progress")?;
        for sample in &self.samples {
            writeln!(
                file,
                "{},{:.4},{:.4},{:.4},{:.3},{},{:.4},{:.4},{}",
                sample.frame,
                sample.time,
                sample.position[0],
                sample.position[1],
                sample.heading,
                sample.state,
                sample.velocity[0],
                sample.velocity[1],
                sample
                    .turn_progress
                    .map(|p| format!("{:.3}", p))
                    .unwrap_or_default(),
            )?;
        }

        Ok(())
    }
}

/// Collects samples while the simulation runs.
///
/// A disabled recorder still keeps the summary; only samples are skipped.
pub struct Recorder {
    recording: Recording,
    enabled: bool,
}

impl Recorder {
    pub fn new(metadata: RecordingMetadata) -> Self {
        Self {
            recording: Recording {
                metadata,
                samples: Vec::new(),
                summary: RunSummary::default(),
            },
            enabled: true,
        }
    }

    pub fn disabled(metadata: RecordingMetadata) -> Self {
        Self {
            enabled: false,
            ..Self::new(metadata)
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record(&mut self, sample: TrajectorySample) {
        self.recording.summary.frames = sample.frame + 1;
        if self.enabled {
            self.recording.samples.push(sample);
        }
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.recording.samples
    }

    pub fn summary(&self) -> &RunSummary {
        &self.recording.summary
    }

    pub fn summary_mut(&mut self) -> &mut RunSummary {
        &mut self.recording.summary
    }

    pub fn finish(self) -> Recording {
        self.recording
    }
}
