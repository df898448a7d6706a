//! Lifecycle status and workload parameter tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a tag name does not match any variant.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown {expected} name: {found:?}")]
pub struct UnknownName {
    /// The kind of tag being parsed.
    pub expected: &'static str,
    /// The input that failed to parse.
    pub found: String,
}

impl UnknownName {
    fn new(expected: &'static str, found: &str) -> Self {
        Self {
            expected,
            found: found.to_string(),
        }
    }
}

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Constructed but not yet dispatched
    Pending,
    /// Dispatched and in flight on the engine
    Running,
    /// Simulated work finished normally
    Completed,
    /// Interrupted or terminated by the engine
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::Running => write!(f, "running"),
            Status::Completed => write!(f, "completed"),
            Status::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for Status {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "running" => Ok(Status::Running),
            "completed" => Ok(Status::Completed),
            "failed" => Ok(Status::Failed),
            _ => Err(UnknownName::new("status", s)),
        }
    }
}

/// Arithmetic quantization of a tensor workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantization {
    /// Full-precision floating point
    Float32,
    /// 8-bit integer
    Int8,
    /// Brain floating point
    Bfloat16,
}

impl fmt::Display for Quantization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantization::Float32 => write!(f, "float32"),
            Quantization::Int8 => write!(f, "int8"),
            Quantization::Bfloat16 => write!(f, "bfloat16"),
        }
    }
}

impl FromStr for Quantization {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "float32" => Ok(Quantization::Float32),
            "int8" => Ok(Quantization::Int8),
            "bfloat16" => Ok(Quantization::Bfloat16),
            _ => Err(UnknownName::new("quantization", s)),
        }
    }
}

/// Element-wise operation of a vector workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VectorOp {
    /// Element-wise addition
    Add,
    /// Element-wise multiplication
    Mul,
    /// Reduction to a scalar
    Reduce,
}

impl fmt::Display for VectorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorOp::Add => write!(f, "add"),
            VectorOp::Mul => write!(f, "mul"),
            VectorOp::Reduce => write!(f, "reduce"),
        }
    }
}

impl FromStr for VectorOp {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" => Ok(VectorOp::Add),
            "mul" => Ok(VectorOp::Mul),
            "reduce" => Ok(VectorOp::Reduce),
            _ => Err(UnknownName::new("vector operation", s)),
        }
    }
}

/// Target tier of the memory hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryTier {
    /// On-chip cache
    Cache,
    /// Host memory
    Ram,
    /// Device memory
    Vram,
    /// Backing storage
    Disk,
}

impl MemoryTier {
    /// All tiers, fastest first.
    pub const ALL: [MemoryTier; 4] = [
        MemoryTier::Cache,
        MemoryTier::Ram,
        MemoryTier::Vram,
        MemoryTier::Disk,
    ];
}

impl fmt::Display for MemoryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryTier::Cache => write!(f, "cache"),
            MemoryTier::Ram => write!(f, "ram"),
            MemoryTier::Vram => write!(f, "vram"),
            MemoryTier::Disk => write!(f, "disk"),
        }
    }
}

impl FromStr for MemoryTier {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cache" => Ok(MemoryTier::Cache),
            "ram" => Ok(MemoryTier::Ram),
            "vram" => Ok(MemoryTier::Vram),
            "disk" => Ok(MemoryTier::Disk),
            _ => Err(UnknownName::new("memory tier", s)),
        }
    }
}

/// Synchronization discipline of a sync-bound workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncMode {
    /// All lanes rendezvous at a barrier
    Barrier,
    /// Staged hand-off between lanes
    Pipeline,
    /// Diagonal wavefront propagation
    Wavefront,
    /// Free-running, no rendezvous
    Async,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Barrier => write!(f, "barrier"),
            SyncMode::Pipeline => write!(f, "pipeline"),
            SyncMode::Wavefront => write!(f, "wavefront"),
            SyncMode::Async => write!(f, "async"),
        }
    }
}

impl FromStr for SyncMode {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "barrier" => Ok(SyncMode::Barrier),
            "pipeline" => Ok(SyncMode::Pipeline),
            "wavefront" => Ok(SyncMode::Wavefront),
            "async" => Ok(SyncMode::Async),
            _ => Err(UnknownName::new("sync mode", s)),
        }
    }
}
