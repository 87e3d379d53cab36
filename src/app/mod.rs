//! Commands of the App network function.

mod get_device_id;
pub use get_device_id::{DeviceId, GetDeviceId};

use crate::dispatch::{expect_args, CommandGroup, Operation, OperationResult, Sender};

/// The App command group.
#[derive(Debug, Clone, Copy, Default)]
pub struct App;

impl App {
    const OPERATIONS: &'static [Operation] = &[Operation::new("get_device_id", get_device_id)];
}

impl CommandGroup for App {
    fn name(&self) -> &'static str {
        "app"
    }

    fn operations(&self) -> &[Operation] {
        Self::OPERATIONS
    }
}

fn get_device_id(sender: &mut Sender<'_>, args: &[u8]) -> OperationResult {
    let [] = expect_args::<0>("get_device_id", args)?;
    sender.run(GetDeviceId)
}
