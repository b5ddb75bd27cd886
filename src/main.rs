use color_eyre::Result;

mod cli;
mod commands;
mod config;
mod error;
mod identity;
mod multipart;
mod payload;
mod render;
mod stoat;

fn main() -> Result<()> {
    color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .install()?;
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("STOAT_WH_LOG", "warn"))
        .init();
    let code = commands::run(std::env::args_os())?;
    std::process::exit(code)
}
