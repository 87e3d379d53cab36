//! PICMG (AdvancedTCA / MicroTCA) group extension commands.
//!
//! All commands use the group extension netfn and carry the PICMG
//! identifier as the first request and response data byte.

mod get_properties;
pub use get_properties::{GetPicmgProperties, PicmgProperties};

mod fru;
pub use fru::{FruAck, FruControl, FruControlOption, SetFruActivation};

use crate::{
    connection::{LogicalUnit, NetFn, Request},
    dispatch::{expect_args, CommandGroup, Operation, OperationResult, Sender},
    error::IpmiError,
};

/// Identifies PICMG in the first data byte of group extension messages.
pub const PICMG_IDENTIFIER: u8 = 0x00;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PicmgError {
    #[error("not enough data in response")]
    NotEnoughData,
    #[error("response carries group identifier 0x{0:02X} instead of PICMG")]
    InvalidIdentifier(u8),
}

fn request(cmd: u8, data: &[u8]) -> Request {
    let mut bytes = Vec::with_capacity(data.len() + 1);
    bytes.push(PICMG_IDENTIFIER);
    bytes.extend_from_slice(data);
    Request::new(NetFn::Group, LogicalUnit::Zero, cmd, bytes)
}

/// Check the PICMG identifier and strip it from `data`.
fn strip_identifier(data: &[u8]) -> Result<&[u8], PicmgError> {
    match data.split_first() {
        Some((&PICMG_IDENTIFIER, rest)) => Ok(rest),
        Some((&other, _)) => Err(PicmgError::InvalidIdentifier(other)),
        None => Err(PicmgError::NotEnoughData),
    }
}

/// The PICMG command group.
#[derive(Debug, Clone, Copy, Default)]
pub struct Picmg;

impl Picmg {
    const OPERATIONS: &'static [Operation] = &[
        Operation::new("get_picmg_properties", get_picmg_properties),
        Operation::new("set_fru_activation", set_fru_activation),
        Operation::new("fru_control", fru_control),
    ];
}

impl CommandGroup for Picmg {
    fn name(&self) -> &'static str {
        "picmg"
    }

    fn operations(&self) -> &[Operation] {
        Self::OPERATIONS
    }
}

fn get_picmg_properties(sender: &mut Sender<'_>, args: &[u8]) -> OperationResult {
    let [] = expect_args::<0>("get_picmg_properties", args)?;
    sender.run(GetPicmgProperties)
}

fn set_fru_activation(sender: &mut Sender<'_>, args: &[u8]) -> OperationResult {
    let [fru_id, activate] = expect_args::<2>("set_fru_activation", args)?;

    sender
        .send_recv(SetFruActivation::new(fru_id, activate != 0))
        .map_err(IpmiError::boxed)?;

    let command = if activate != 0 {
        "FRU activated"
    } else {
        "FRU deactivated"
    };

    Ok(Box::new(FruAck { command, fru_id }))
}

fn fru_control(sender: &mut Sender<'_>, args: &[u8]) -> OperationResult {
    let [fru_id, option] = expect_args::<2>("fru_control", args)?;

    let option =
        FruControlOption::try_from(option).map_err(|_| IpmiError::InvalidArguments {
            operation: "fru_control",
            reason: format!("unknown FRU control option {option}"),
        })?;

    sender
        .send_recv(FruControl::new(fru_id, option))
        .map_err(IpmiError::boxed)?;

    Ok(Box::new(FruAck {
        command: "FRU control issued",
        fru_id,
    }))
}

#[test]
fn identifier() {
    assert_eq!(strip_identifier(&[0x00, 0x12]), Ok(&[0x12][..]));
    assert_eq!(
        strip_identifier(&[0x03, 0x12]),
        Err(PicmgError::InvalidIdentifier(0x03))
    );
    assert_eq!(strip_identifier(&[]), Err(PicmgError::NotEnoughData));
}
