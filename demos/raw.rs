use clap::Parser;
use common::CommonOpts;
use ipmi_dispatch::connection::{LogicalUnit, Request};

mod common;

#[derive(Parser)]
pub struct Command {
    #[clap(flatten)]
    common: CommonOpts,

    /// The logical unit to address
    #[clap(default_value = "0", long)]
    lun: u8,

    /// NetFn, command and data bytes, in hex
    #[clap(required = true)]
    message: Vec<String>,
}

fn try_parse_request(input: &[u8], lun: LogicalUnit) -> std::io::Result<Request> {
    let [netfn, cmd, data @ ..] = input else {
        let err = std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Need at least 2 bytes of input".to_string(),
        );
        return Err(err);
    };

    Request::new_raw(*netfn, lun, *cmd, data)
        .ok_or_else(|| common::error(format!("NetFn 0x{netfn:02X} does not fit in 6 bits")))
}

fn main() -> std::io::Result<()> {
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or("info".to_string()))
        .init();

    let command = Command::parse();

    let mut data = Vec::new();
    for arg in command.message {
        let arg = arg.trim_start_matches("0x");
        let u8_value = u8::from_str_radix(arg, 16).map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Could not parse '{arg}' as hex integer"),
            )
        })?;
        data.push(u8_value);
    }

    let lun = LogicalUnit::try_from(command.lun)
        .map_err(|_| common::error(format!("Invalid LUN {}", command.lun)))?;

    let request = try_parse_request(&data, lun)?;

    let ipmi = command.common.get_connection()?;

    let response = ipmi.send(request).map_err(|e| {
        log::error!("Raw request failed: {e}");
        common::error(e)
    })?;

    println!("Response:");
    println!("Completion code: 0x{:02X}", response.cc());
    match response.data() {
        Some(data) => println!("Data: {}", hex::encode(data)),
        None => println!("Data: <none>"),
    }

    Ok(())
}
