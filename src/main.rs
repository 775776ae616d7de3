use edgehog::config::Config;
use edgehog::server::listener::Server;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let mut server = Server::bind(&cfg)?;
    server.run()
}
