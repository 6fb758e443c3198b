use monkey::{Runtime, VERSION};
use monkey::runtime::{RuntimeConfig, RuntimeResult};
use monkey::utils::{generate_demo_bytecode, write_bytecode};
use monkey::Value;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Monkey Bytecode Runtime v{}", VERSION);

    let result = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => run_file(&path),
        None => run_demo(),
    };

    match result {
        Ok(value) => println!("{}", value),
        Err(e) => {
            error!("Execution failed: {}", e);
            eprintln!("Execution failed: {}", e);
            process::exit(1);
        }
    }
}

fn run_file(path: &Path) -> RuntimeResult<Value> {
    let runtime = Runtime::new()?;
    runtime.execute_file(path)
}

fn run_demo() -> RuntimeResult<Value> {
    let demo_path = Path::new("demo.mnk");
    let demo = generate_demo_bytecode()?;
    write_bytecode(&demo, demo_path)?;
    info!("Created demo bytecode file: {}", demo_path.display());

    let runtime = Runtime::with_config(
        RuntimeConfig::default()
            .with_debug_mode(true)
            .with_stack_trace(true),
    )?;
    runtime.execute_file(demo_path)
}
