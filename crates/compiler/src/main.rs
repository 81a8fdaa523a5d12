//! glift Driver CLI
//!
//! Command-line interface for lifting kernels into guarded dataflow
//! graphs and differentially checking the lifts against direct
//! execution: random heap/environment trials, witness and mismatch
//! files, and a deref-chain microbenchmark with hoisting.

use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{Shell, generate};
use gliftc::config::DriverConfig;
use gliftc::hoist::HoistCache;
use gliftc::lift::lift;
use glift_runtime::witness::{EnvRecord, EvalRecord, HeapRecord, Witness};
use glift_runtime::{Env, Eval, Graph, Heap, Kernel, Value, graph_eval, heapgen, programs};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tracing::{info, warn};

#[derive(ClapParser)]
#[command(name = "gliftc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lift checked-pointer kernels to guarded dataflow graphs and cross-check them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lift kernels and write their graphs as JSON
    Lift {
        /// Output directory for graph files
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Kernels to lift (defaults to all)
        kernels: Vec<String>,
    },

    /// Run differential trials of each kernel against its lifted graph
    Check {
        /// Number of random trials per kernel
        #[arg(long)]
        trials: Option<u32>,

        /// RNG seed (reset per kernel)
        #[arg(long)]
        seed: Option<u64>,

        /// Directory to load graphs from (defaults to the output directory)
        #[arg(long)]
        graph_dir: Option<PathBuf>,

        /// Directory for witness and mismatch files
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Run a single trial and dump both results, env, and heap
        #[arg(long)]
        debug_one: bool,

        /// Kernels to check (defaults to all)
        kernels: Vec<String>,
    },

    /// Time repeated evaluation of a deref-chain kernel
    Bench {
        /// Timed iterations
        #[arg(long, default_value_t = 10_000_000)]
        iters: u64,

        /// Chain length (at least 5)
        #[arg(long, default_value_t = 6)]
        len: usize,

        /// Kernel to time
        #[arg(long, default_value = "graph_walk")]
        kernel: String,

        /// Directory the hoist pass reads graphs from
        #[arg(long)]
        graph_dir: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DriverConfig::from_environment();

    match cli.command {
        Commands::Lift { out_dir, kernels } => {
            let out_dir = out_dir.unwrap_or_else(|| config.out_dir.clone());
            run_lift(&out_dir, &select_kernels(&kernels));
        }
        Commands::Check {
            trials,
            seed,
            graph_dir,
            out_dir,
            debug_one,
            kernels,
        } => {
            let out_dir = out_dir.unwrap_or_else(|| config.out_dir.clone());
            let graph_dir = graph_dir.unwrap_or_else(|| out_dir.clone());
            let trials = if debug_one { 1 } else { trials.unwrap_or(config.trials) };
            let seed = seed.unwrap_or(config.seed);
            run_check(
                &select_kernels(&kernels),
                trials,
                seed,
                config.heap_objs,
                &graph_dir,
                &out_dir,
                debug_one,
            );
        }
        Commands::Bench { iters, len, kernel, graph_dir } => {
            let graph_dir = graph_dir.unwrap_or_else(|| config.out_dir.clone());
            run_bench(iters, len, &kernel, &graph_dir);
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "gliftc", &mut io::stdout());
        }
    }
}

/// Resolve kernel names to programs; an empty list means all of them.
fn select_kernels(names: &[String]) -> Vec<Kernel> {
    if names.is_empty() {
        return programs::all();
    }
    names
        .iter()
        .map(|name| {
            programs::find(name).unwrap_or_else(|| {
                eprintln!("Unknown kernel: {}", name);
                process::exit(1);
            })
        })
        .collect()
}

fn ensure_dir(dir: &Path) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("Failed to create {}: {}", dir.display(), e);
        process::exit(1);
    }
}

fn run_lift(out_dir: &Path, kernels: &[Kernel]) {
    ensure_dir(out_dir);
    for kernel in kernels {
        let file = lift(kernel);
        let path = out_dir.join(format!("{}.json", kernel.name));
        let text = match serde_json::to_string_pretty(&file) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Failed to serialize {}: {}", kernel.name, e);
                process::exit(1);
            }
        };
        if let Err(e) = std::fs::write(&path, text) {
            eprintln!("Failed to write {}: {}", path.display(), e);
            process::exit(1);
        }
        info!("lifted {} -> {}", kernel.name, path.display());
    }
}

/// Human form of a tagged result for the per-kernel witness line.
fn format_value(v: Value) -> String {
    if v.is_null() {
        "null".to_string()
    } else if v.is_int() {
        v.int_value().to_string()
    } else {
        format!("Ptr({})", v.ptr_addr())
    }
}

#[allow(clippy::too_many_arguments)]
fn run_check(
    kernels: &[Kernel],
    trials: u32,
    seed: u64,
    heap_objs: usize,
    graph_dir: &Path,
    out_dir: &Path,
    debug_one: bool,
) {
    ensure_dir(out_dir);

    for kernel in kernels {
        let graph_path = graph_dir.join(format!("{}.json", kernel.name));
        let graph = match Graph::load(&graph_path) {
            Ok(graph) => graph,
            Err(e) => {
                eprintln!("{}: missing graph {} ({})", kernel.name, graph_path.display(), e);
                continue;
            }
        };

        let mut rng = StdRng::seed_from_u64(seed);
        let mut ok_count = 0u32;
        let mut fail_count = 0u32;
        let mut mismatch_count = 0u32;
        let mut witness_written = false;

        for t in 0..trials {
            let mut heap = Heap::create(heap_objs);
            heapgen::heap_randomize(&mut heap, &kernel.fields, &mut rng);
            let env = heapgen::env_randomize(heap_objs, kernel.use_p, kernel.use_q, &mut rng);

            let kernel_res = kernel.run(&heap, &env);
            let graph_res = graph_eval(&graph, &heap, &env);

            if debug_one {
                let kr = EvalRecord::from(kernel_res);
                let gr = EvalRecord::from(graph_res);
                println!("{}: graph={}", kernel.name, graph_path.display());
                println!("  kernel: ok={} err={} value={}", kr.ok, kr.err, kr.value);
                println!("  graph:  ok={} err={} value={}", gr.ok, gr.err, gr.value);
                println!(
                    "  env={}",
                    serde_json::to_string(&EnvRecord::from(&env)).unwrap_or_default()
                );
                println!(
                    "  heap={}",
                    serde_json::to_string(&HeapRecord::from(&heap)).unwrap_or_default()
                );
            }

            // Agreement means the full Eval matches: both ok with the
            // same word, or both the same error.
            let same = kernel_res == graph_res;
            match (same, kernel_res.is_ok()) {
                (true, true) => ok_count += 1,
                (true, false) => fail_count += 1,
                (false, _) => mismatch_count += 1,
            }

            if same && !witness_written {
                let path = out_dir.join(format!("{}_witness.json", kernel.name));
                write_witness(&path, &env, &heap, kernel_res, graph_res);
                witness_written = true;
            }

            if !same {
                let path = out_dir.join(format!("{}_mismatch_{}.json", kernel.name, t));
                write_witness(&path, &env, &heap, kernel_res, graph_res);
                let graph_copy = out_dir.join(format!("{}_mismatch_{}.graph.json", kernel.name, t));
                if let Err(e) = std::fs::copy(&graph_path, &graph_copy) {
                    warn!("could not copy {}: {}", graph_path.display(), e);
                }
            }
        }

        // One fixed post-run evaluation on a small heap, printed as a
        // human-readable reference point for the kernel.
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(999));
        let mut heap = Heap::create(3);
        heapgen::heap_randomize(&mut heap, &kernel.fields, &mut rng);
        let env = heapgen::env_randomize(3, kernel.use_p, kernel.use_q, &mut rng);
        match kernel.run(&heap, &env) {
            Ok(v) => println!("{}: witness {}", kernel.name, format_value(v)),
            Err(e) => println!("{}: witness error {}", kernel.name, e.code()),
        }

        println!(
            "  trials={} ok={} fail={} mismatch={}",
            trials, ok_count, fail_count, mismatch_count
        );
        if mismatch_count > 0 {
            println!("  WARNING: mismatches detected");
        }
    }
}

fn write_witness(path: &Path, env: &Env, heap: &Heap, kernel_res: Eval, graph_res: Eval) {
    let witness = Witness::new(env, heap, kernel_res, graph_res);
    if let Err(e) = witness.write(path) {
        warn!("could not write {}: {}", path.display(), e);
    }
}

/// A deref chain `1 -> 2 -> ... -> len` with the tail pointing at
/// itself, so walks of any depth stay in range.
fn build_chain_heap(len: usize) -> Heap {
    let mut heap = Heap::create(len);
    for addr in 1..len as i64 {
        if let Some(obj) = heap.get_obj_mut(addr) {
            obj.set_field(glift_core::FIELD_DEREF, Value::ptr(addr + 1));
        }
    }
    if let Some(last) = heap.get_obj_mut(len as i64) {
        last.set_field(glift_core::FIELD_DEREF, Value::ptr(len as i64));
    }
    heap
}

fn sink_value(e: Eval) -> u64 {
    e.map(|v| v.raw()).unwrap_or(0) as u64
}

fn run_bench(iters: u64, len: usize, kernel_name: &str, graph_dir: &Path) {
    if len < 5 {
        eprintln!("len must be >= 5");
        process::exit(1);
    }
    let Some(kernel) = programs::find(kernel_name) else {
        eprintln!("Unknown kernel: {}", kernel_name);
        process::exit(1);
    };

    let heap = build_chain_heap(len);
    let env = Env::new(Value::ptr(1), Value::null());

    // The hoist pass's verdict: a linear guarded chain called with
    // loop-invariant arguments evaluates once in the preheader.
    let mut cache = HoistCache::new(graph_dir);
    let hoist = cache.qualifies(kernel.name);
    info!("{}: hoist={}", kernel.name, hoist);

    let mut sink: u64 = 0;
    for _ in 0..1000 {
        sink = sink.wrapping_add(sink_value(kernel.run(&heap, &env)));
    }

    let start = Instant::now();
    if hoist {
        let hoisted = kernel.run(&heap, &env);
        for _ in 0..iters {
            sink = sink.wrapping_add(sink_value(std::hint::black_box(hoisted)));
        }
    } else {
        for _ in 0..iters {
            sink = sink.wrapping_add(sink_value(std::hint::black_box(kernel.run(&heap, &env))));
        }
    }
    let elapsed = start.elapsed();

    println!("iters={} time_ns={} sink={}", iters, elapsed.as_nanos(), sink);
}
