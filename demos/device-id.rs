use clap::Parser;
use common::CommonOpts;
use ipmi_dispatch::{picmg::PicmgProperties, LogOutput, Logger};

mod common;

#[derive(Parser)]
pub struct Command {
    #[clap(flatten)]
    common: CommonOpts,

    /// Also query PICMG properties
    #[clap(long)]
    picmg: bool,
}

fn main() -> std::io::Result<()> {
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or("info".to_string()))
        .init();

    let command = Command::parse();
    let ipmi = command.common.get_connection()?;
    let log_output = &LogOutput::LogTarget(log::Level::Info, "device_id".into());

    let device_id = ipmi
        .invoke("get_device_id", &[])
        .map_err(|e| common::error(e.to_string()))?;
    Logger::log(log_output, &*device_id);

    if command.picmg {
        let properties = ipmi
            .invoke("get_picmg_properties", &[])
            .map_err(|e| common::error(e.to_string()))?;

        if let Some(properties) = properties.downcast_ref::<PicmgProperties>() {
            log::debug!("PICMG extension version {}", properties.major_version);
        }

        Logger::log(log_output, &*properties);
    }

    Ok(())
}
