//! npusim CLI - demonstration driver for the NPU workload simulator.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use npusim_core::{
    ComputeTask, ComputeWorkload, MemoryTask, MemoryTier, NpuTask, Quantization, Status, SyncMode,
    SyncTask, TaskId, TensorTask, VectorOp, VectorTask, Workload,
};
use npusim_execution::{ExecutionEngine, TaskHandle};

#[derive(Parser)]
#[command(name = "npusim")]
#[command(about = "NPU workload simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demonstration workloads on the execution engine
    Run {
        /// Restrict the run to a single workload
        #[arg(long, value_enum)]
        only: Option<WorkloadKind>,
        /// Emit the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print derived timings for a task without running it
    Estimate {
        #[command(subcommand)]
        task: EstimateTask,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WorkloadKind {
    /// Tensor task standing in for ML training
    Ml,
    /// Memory transfers across every tier
    Transfer,
    /// Compute-heavy mixed workload
    Mixed,
}

#[derive(Subcommand)]
enum EstimateTask {
    /// Base task with no specialization
    Base {
        #[arg(long, default_value_t = 120)]
        priority: i32,
        #[arg(long, default_value_t = 2048)]
        memory: i64,
    },
    /// Compute task
    Compute {
        #[arg(long, default_value_t = 125)]
        priority: i32,
        #[arg(long, default_value_t = 2048)]
        memory: i64,
        #[arg(long, default_value_t = 8)]
        units: i32,
        #[arg(long, default_value_t = 32)]
        batch: i32,
    },
    /// Tensor task
    Tensor {
        #[arg(long, default_value_t = 120)]
        priority: i32,
        #[arg(long, default_value_t = 4096)]
        memory: i64,
        #[arg(long, default_value_t = 8)]
        units: i32,
        #[arg(long, default_value_t = 32)]
        batch: i32,
        /// Tensor shape, comma separated
        #[arg(long, value_delimiter = ',', default_value = "256,256,3")]
        dims: Vec<u32>,
        /// float32, int8, or bfloat16
        #[arg(long)]
        quantization: Option<Quantization>,
    },
    /// Vector task
    Vector {
        #[arg(long, default_value_t = 120)]
        priority: i32,
        #[arg(long, default_value_t = 2048)]
        memory: i64,
        #[arg(long, default_value_t = 8)]
        units: i32,
        #[arg(long, default_value_t = 32)]
        batch: i32,
        #[arg(long, default_value_t = 1024)]
        size: i32,
        /// add, mul, or reduce
        #[arg(long)]
        operation: Option<VectorOp>,
    },
    /// Memory-bound transfer task
    Memory {
        #[arg(long, default_value_t = 115)]
        priority: i32,
        #[arg(long, default_value_t = 8192)]
        memory: i64,
        #[arg(long, default_value_t = 1000)]
        bandwidth: i32,
        /// cache, ram, vram, or disk
        #[arg(long)]
        tier: Option<MemoryTier>,
    },
    /// Synchronization-bound task
    Sync {
        #[arg(long, default_value_t = 120)]
        priority: i32,
        #[arg(long, default_value_t = 2048)]
        memory: i64,
        #[arg(long, default_value_t = 1000.0)]
        frequency: f64,
        #[arg(long, default_value_t = 64)]
        buffer: i32,
        /// barrier, pipeline, wavefront, or async
        #[arg(long)]
        mode: Option<SyncMode>,
    },
}

/// One line of the run report.
#[derive(Serialize)]
struct TaskReport {
    id: u64,
    workload: String,
    status: Status,
    execution_time_ms: u64,
    power_draw: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { only, json } => run_workloads(only, json).await,
        Commands::Estimate { task } => {
            estimate(task);
            Ok(())
        }
    }
}

async fn run_workloads(only: Option<WorkloadKind>, json: bool) -> Result<()> {
    let engine = ExecutionEngine::new();
    let mut next_id = 1u64;
    let mut reports = Vec::new();

    let selected = |kind: WorkloadKind| only.is_none() || only == Some(kind);

    println!("=== NPU workload simulation ===");

    if selected(WorkloadKind::Ml) {
        reports.push(run_training(&engine, &mut next_id).await);
    }
    if selected(WorkloadKind::Transfer) {
        reports.extend(run_transfers(&engine, &mut next_id).await);
    }
    if selected(WorkloadKind::Mixed) {
        reports.push(run_mixed(&engine, &mut next_id).await);
    }

    engine.shutdown().await;
    info!("engine stopped");
    println!("=== simulation complete ===");

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}

/// Tensor task standing in for one ML training step.
async fn run_training(engine: &ExecutionEngine, next_id: &mut u64) -> TaskReport {
    let id = take_id(next_id);
    let task = TensorTask::new(
        TaskId::new(id),
        120,
        4096,
        8,
        32,
        &[256, 256, 3],
        Some(Quantization::Float32),
    );

    println!("--- ML training workload ---");
    println!(
        "task {id}: dims {:?}, quantization float32, sparsity {:.2}, estimated {} ms",
        task.dimensions(),
        task.sparsity(),
        task.execution_time()
    );

    let handle = engine.submit(task);
    // full-precision tensors draw more power
    await_task(engine, &handle, "tensor", 1.5).await
}

/// One transfer per memory tier, slowest last.
async fn run_transfers(engine: &ExecutionEngine, next_id: &mut u64) -> Vec<TaskReport> {
    println!("--- data transfer workload ---");
    let mut reports = Vec::new();

    for tier in MemoryTier::ALL {
        let id = take_id(next_id);
        let task = MemoryTask::new(TaskId::new(id), 115, 8192, 1000, Some(tier));
        println!(
            "task {id}: tier {tier}, bandwidth {}, estimated {} ms",
            task.bandwidth(),
            task.execution_time()
        );

        let handle = engine.submit(task);
        let power_scale = match tier {
            MemoryTier::Cache => 0.5,
            MemoryTier::Ram => 1.0,
            MemoryTier::Vram => 1.5,
            MemoryTier::Disk => 2.0,
        };
        reports.push(await_task(engine, &handle, "memory", power_scale).await);
    }
    reports
}

/// Plain compute task rounding out the mix.
async fn run_mixed(engine: &ExecutionEngine, next_id: &mut u64) -> TaskReport {
    let id = take_id(next_id);
    let task = ComputeTask::new(TaskId::new(id), 125, 2048, 8, 32);

    println!("--- mixed workload ---");
    println!(
        "task {id}: {} compute units, efficiency {:.2}, estimated {} ms",
        task.compute_units(),
        task.efficiency(),
        task.execution_time()
    );

    let handle = engine.submit(task);
    await_task(engine, &handle, "compute", 1.0).await
}

/// Poll the engine until the task leaves the tracking table, then apply
/// the reported-power adjustment and print the outcome.
async fn await_task<W: Workload + Send + 'static>(
    engine: &ExecutionEngine,
    handle: &TaskHandle<W>,
    workload: &str,
    power_scale: f64,
) -> TaskReport {
    while engine.is_running(handle.id()) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let adjusted = handle.power_draw() * power_scale;
    handle.with(|task| task.set_power_draw(adjusted));

    println!(
        "task {} finished: status {}, power {:.2} units",
        handle.id(),
        handle.status(),
        handle.power_draw()
    );

    TaskReport {
        id: handle.id().value(),
        workload: workload.to_string(),
        status: handle.status(),
        execution_time_ms: handle.execution_time(),
        power_draw: handle.power_draw(),
    }
}

fn take_id(next_id: &mut u64) -> u64 {
    let id = *next_id;
    *next_id += 1;
    id
}

fn estimate(task: EstimateTask) {
    match task {
        EstimateTask::Base { priority, memory } => {
            let task = NpuTask::new(TaskId::new(0), priority, memory);
            print_estimate("base", &task, None);
        }
        EstimateTask::Compute {
            priority,
            memory,
            units,
            batch,
        } => {
            let task = ComputeTask::new(TaskId::new(0), priority, memory, units, batch);
            print_estimate("compute", &task, Some(task.efficiency()));
        }
        EstimateTask::Tensor {
            priority,
            memory,
            units,
            batch,
            dims,
            quantization,
        } => {
            let task = TensorTask::new(TaskId::new(0), priority, memory, units, batch, &dims, quantization);
            print_estimate("tensor", &task, Some(task.efficiency()));
            println!("  sparsity: {:.2}", task.sparsity());
        }
        EstimateTask::Vector {
            priority,
            memory,
            units,
            batch,
            size,
            operation,
        } => {
            let task = VectorTask::new(TaskId::new(0), priority, memory, units, batch, size, operation);
            print_estimate("vector", &task, Some(task.efficiency()));
        }
        EstimateTask::Memory {
            priority,
            memory,
            bandwidth,
            tier,
        } => {
            let task = MemoryTask::new(TaskId::new(0), priority, memory, bandwidth, tier);
            print_estimate("memory", &task, None);
        }
        EstimateTask::Sync {
            priority,
            memory,
            frequency,
            buffer,
            mode,
        } => {
            let task = SyncTask::new(TaskId::new(0), priority, memory, frequency, buffer, mode);
            print_estimate("sync", &task, None);
        }
    }
}

fn print_estimate<W: Workload>(kind: &str, task: &W, efficiency: Option<f64>) {
    println!(
        "{kind} task: priority {}, memory {}, estimated execution time {} ms",
        task.priority(),
        task.memory_size(),
        task.execution_time()
    );
    if let Some(efficiency) = efficiency {
        println!("  efficiency: {efficiency:.2}");
    }
}
