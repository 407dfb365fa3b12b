mod cli;
mod client;
mod models;
mod repl;
mod render;

use client::RpcClient;
use repl::REPL;

fn main() {
    let config = cli::parse_config();
    let client = match RpcClient::new(&config.base_url) {
        Ok(client) => client,
        Err(err) => {
            render::error(&err);
            std::process::exit(1);
        }
    };
    let mut repl = REPL::new(config, client);
    repl.run();
}
