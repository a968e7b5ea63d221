//! Command-line entry point: run a compiled Owl module.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use owl_vm::consts::DEFAULT_HEAP_SIZE;
use owl_vm::interpreter::Interpreter;

#[derive(Parser)]
#[command(name = "owl", about = "Owl bytecode virtual machine", version)]
struct Args {
    /// Compiled module to execute; its `<stem>.main` is the entry point.
    module: PathBuf,

    /// Arena size in bytes, covering both GC semispaces.
    #[arg(long, default_value_t = DEFAULT_HEAP_SIZE)]
    heap_size: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut vm = Interpreter::with_heap_size(args.heap_size);

    match vm.run_module_file(&args.module) {
        Ok(code) => process::exit(i32::from(code)),
        Err(err) => {
            error!(%err, "fatal");
            eprintln!("owl: {err}");
            process::exit(1);
        }
    }
}
