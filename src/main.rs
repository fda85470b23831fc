use clap::Parser;
use stream_bench::cli::{Cli, Command};
use stream_bench::metrics::Registry;
use stream_bench::{sink, stream};
use tokio::runtime;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    match Cli::parse().command {
        Command::Stream(args) => {
            // One blocking exchange; a single-threaded runtime is enough.
            let rt = runtime::Builder::new_current_thread().enable_all().build()?;
            rt.block_on(run_stream(args))
        }
        Command::Sink(args) => {
            let rt = runtime::Builder::new_multi_thread()
                .enable_all()
                .worker_threads(4)
                .build()?;
            rt.block_on(async { Ok(sink::serve(&args.listen).await?) })
        }
    }
}

async fn run_stream(args: stream_bench::cli::StreamArgs) -> anyhow::Result<()> {
    let registry = Registry::new();
    let cfg = args.into_config();
    stream::run(&cfg, &registry).await?;

    for name in registry.names() {
        let timer = registry.timer(&name);
        println!(
            "{name}: count={} mean={:.2}ms max={:.2}ms",
            timer.count(),
            timer.mean_ms(),
            timer.max_ms()
        );
    }
    Ok(())
}
