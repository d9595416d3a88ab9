#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() {
    let args = <indexer::arguments::Arguments as clap::Parser>::parse();
    indexer::init_tracing(args.log_level);
    let code = indexer::start(args).await;
    std::process::exit(code);
}
