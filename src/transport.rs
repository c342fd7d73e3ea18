//! Seams towards the USB device core.
//!
//! The composite HID function never touches hardware. It consumes:
//! - `UsbCore` to claim its interface number and interrupt-IN endpoint,
//! - `ControlPipe` to move data stages on endpoint 0,
//! - `InterruptIn` to push reports,
//!
//! and exposes itself to the core through `UsbFunction`.

use crate::error::Error;
use crate::request::SetupPacket;

/// Endpoint kinds a function asks the core for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EndpointType {
    InterruptIn,
    InterruptOut,
    BulkIn,
    BulkOut,
}

/// What the core assigned to a function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EndpointAllocation {
    /// First interface number owned by the function.
    pub interface: u8,
    /// First endpoint number (without direction bit).
    pub endpoint: u8,
}

/// Endpoint and interface bookkeeping of the USB device core.
pub trait UsbCore {
    /// Reserve `interfaces` consecutive interface numbers and one endpoint
    /// per entry of `endpoints`.
    fn add_function(
        &mut self,
        endpoints: &[EndpointType],
        interfaces: u8,
    ) -> Result<EndpointAllocation, Error>;
}

/// Data stage of the control endpoint.
///
/// Implementations clamp IN data to the host's `wLength`.
pub trait ControlPipe {
    /// Queue `data` for the IN data stage. Returns the bytes accepted.
    fn send(&mut self, data: &[u8]) -> Result<usize, Error>;

    /// Read up to `buf.len()` bytes of the OUT data stage.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, Error>;
}

/// Interrupt-IN endpoint.
pub trait InterruptIn {
    /// Write `data`. With `release` set the transfer is complete and the
    /// endpoint bank is handed to the host.
    fn write(&mut self, data: &[u8], release: bool) -> Result<usize, Error>;
}

/// The capability set a function registers with the USB core.
pub trait UsbFunction {
    /// Endpoints the function needs.
    fn endpoint_types(&self) -> &'static [EndpointType];

    /// Interfaces the function claims.
    fn num_interfaces(&self) -> u8 {
        1
    }

    /// Handle a SETUP packet addressed to `interface`. Returns `false` when
    /// the request is not ours or not supported, so the core can STALL.
    fn setup(&mut self, setup: &SetupPacket, interface: u8, pipe: &mut dyn ControlPipe) -> bool;

    /// Send this function's part of the configuration descriptor and
    /// advance `interface_count` by the interfaces it uses.
    fn describe_interface(
        &mut self,
        interface_count: &mut u8,
        pipe: &mut dyn ControlPipe,
    ) -> Result<usize, Error>;

    /// Send a class descriptor of `descriptor_type`. Returns 0 when the type
    /// is not provided by this function.
    fn describe_report(
        &self,
        descriptor_type: u8,
        pipe: &mut dyn ControlPipe,
    ) -> Result<usize, Error>;
}

/// A `ControlPipe` over memory: the OUT data stage has already been
/// received into `out_data`, IN data is collected into `in_buf`.
///
/// Stacks that hand the whole data stage to a callback (embassy-usb) use
/// this to drive the dispatcher.
pub struct BufferedControl<'a> {
    out_data: &'a [u8],
    out_pos: usize,
    in_buf: &'a mut [u8],
    in_len: usize,
}

impl<'a> BufferedControl<'a> {
    pub fn new(out_data: &'a [u8], in_buf: &'a mut [u8]) -> Self {
        Self {
            out_data,
            out_pos: 0,
            in_buf,
            in_len: 0,
        }
    }

    /// Pipe for a host-to-device request.
    pub fn out_stage(out_data: &'a [u8]) -> Self {
        Self::new(out_data, &mut [])
    }

    /// Pipe for a device-to-host request.
    pub fn in_stage(in_buf: &'a mut [u8]) -> Self {
        Self::new(&[], in_buf)
    }

    /// Bytes collected for the IN data stage.
    pub fn written(&self) -> usize {
        self.in_len
    }

    /// Bytes consumed from the OUT data stage.
    pub fn consumed(&self) -> usize {
        self.out_pos
    }

    /// Bytes of the OUT data stage nobody read.
    pub fn remaining(&self) -> usize {
        self.out_data.len() - self.out_pos
    }
}

impl ControlPipe for BufferedControl<'_> {
    fn send(&mut self, data: &[u8]) -> Result<usize, Error> {
        let room = self.in_buf.len() - self.in_len;
        let n = data.len().min(room);
        self.in_buf[self.in_len..self.in_len + n].copy_from_slice(&data[..n]);
        self.in_len += n;
        Ok(n)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.out_data[self.out_pos..self.out_pos + n]);
        self.out_pos += n;
        Ok(n)
    }
}
