use std::sync::Arc;

use clap::Parser;
use warp::Filter;

mod args;
mod auth;
mod backend;
mod flash;
#[cfg(test)]
mod mock;
mod pages;
mod password;
mod preprocess;
mod routes;
mod spamcheck;
mod user;

use args::Args;
use backend::Backend;
use spamcheck::SpamCheck;

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let args = Args::parse();
    let addr = args.addr().expect("invalid listen address");

    let backend = Backend::new(args.data_dir()).await;
    let check = Arc::new(SpamCheck::new(backend));

    let routes = routes::routes(check, args.secure()).with(warp::log("spamcheck"));

    warp::serve(routes).run(addr).await;
}
