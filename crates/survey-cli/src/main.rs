mod command;
mod config;
mod logging;
mod report;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
