//! The composite HID function.
//!
//! `CompositeHid` is the sealed registry: it owns the ordered sub-devices,
//! the interface/endpoint the USB core assigned, and the negotiated HID
//! session state. It serves the two enumeration-time descriptors:
//!
//! - the interface block (interface + HID class + interrupt-IN endpoint),
//!   whose report-descriptor length is the sum of all fragments,
//! - the report descriptor itself, streamed fragment by fragment in
//!   registration order.
//!
//! Control requests are handled in [`dispatch`].

pub mod dispatch;


use heapless::Vec;

use crate::config::{HidConfig, HID_VERSION};
use crate::descriptor::{
    interface_block, EndpointDescriptor, HidClassDescriptor, InterfaceDescriptor,
    DESCRIPTOR_TYPE_REPORT, ENDPOINT_IN, ENDPOINT_TYPE_INTERRUPT, INTERFACE_BLOCK_LEN,
    USB_CLASS_HID,
};
use crate::error::Error;
use crate::registry::HidDevice;
use crate::request::SetupPacket;
use crate::transport::{ControlPipe, EndpointAllocation, EndpointType, UsbFunction};

pub use dispatch::HidSession;

/// One HID interface shared by every registered sub-device.
pub struct CompositeHid<'d, const N: usize> {
    devices: Vec<&'d mut dyn HidDevice, N>,
    descriptor_len: u16,
    interface: u8,
    endpoint: u8,
    config: HidConfig,
    session: HidSession,
}

impl<'d, const N: usize> CompositeHid<'d, N> {
    pub(crate) fn new(
        devices: Vec<&'d mut dyn HidDevice, N>,
        descriptor_len: u16,
        allocation: EndpointAllocation,
        config: HidConfig,
    ) -> Self {
        Self {
            devices,
            descriptor_len,
            interface: allocation.interface,
            endpoint: allocation.endpoint,
            config,
            session: HidSession::default(),
        }
    }

    /// Interface number assigned by the USB core.
    pub fn interface_number(&self) -> u8 {
        self.interface
    }

    /// Address of the interrupt-IN endpoint (direction bit set).
    pub fn endpoint_address(&self) -> u8 {
        ENDPOINT_IN | self.endpoint
    }

    pub fn config(&self) -> &HidConfig {
        &self.config
    }

    /// Protocol and idle state last set by the host.
    pub fn session(&self) -> HidSession {
        self.session
    }

    /// Back to power-on protocol and idle, e.g. after a bus reset.
    pub fn reset_session(&mut self) {
        self.session = HidSession::default();
    }

    /// Number of registered sub-devices.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Length of the merged report descriptor.
    pub fn report_descriptor_len(&self) -> u16 {
        self.descriptor_len
    }

    /// Stream the merged report descriptor, one control send per fragment.
    ///
    /// Returns the bytes the pipe accepted; a value below
    /// `report_descriptor_len()` means the transfer fell short.
    pub fn send_report_descriptor(&self, pipe: &mut dyn ControlPipe) -> Result<usize, Error> {
        let mut total = 0;
        for device in self.devices.iter() {
            total += pipe.send(device.report_descriptor())?;
        }
        Ok(total)
    }

    /// Copy the merged report descriptor into `buf`, truncated to its length.
    pub fn write_report_descriptor(&self, buf: &mut [u8]) -> usize {
        let mut written = 0;
        for device in self.devices.iter() {
            let fragment = device.report_descriptor();
            let n = fragment.len().min(buf.len() - written);
            buf[written..written + n].copy_from_slice(&fragment[..n]);
            written += n;
            if written == buf.len() {
                break;
            }
        }
        written
    }

    /// The whole report descriptor in one buffer of capacity `C`.
    pub fn merged_report_descriptor<const C: usize>(&self) -> Result<Vec<u8, C>, Error> {
        let mut merged = Vec::new();
        merged
            .resize(usize::from(self.descriptor_len), 0)
            .map_err(|_| Error::DescriptorTooLarge)?;
        let written = self.write_report_descriptor(&mut merged);
        merged.truncate(written);
        Ok(merged)
    }

    /// HID class descriptor announcing the merged report descriptor.
    pub fn class_descriptor(&self) -> HidClassDescriptor {
        HidClassDescriptor {
            hid_version: HID_VERSION,
            country_code: 0,
            report_descriptor_len: self.descriptor_len,
        }
    }

    /// Interface, HID class and endpoint descriptors as one block.
    pub fn interface_descriptor(&self) -> [u8; INTERFACE_BLOCK_LEN] {
        let (subclass, protocol) = self.config.subclass_protocol();
        interface_block(
            &InterfaceDescriptor {
                interface_num: self.interface,
                alternate_setting: 0,
                num_endpoints: 1,
                interface_class: USB_CLASS_HID,
                interface_subclass: subclass,
                interface_protocol: protocol,
                interface_name_idx: 0,
            },
            &self.class_descriptor(),
            &EndpointDescriptor {
                endpoint_addr: self.endpoint_address(),
                attributes: ENDPOINT_TYPE_INTERRUPT,
                max_packet_size: self.config.endpoint_size,
                interval: self.config.poll_interval,
            },
        )
    }

    /// Send the interface block as a single control payload and count the
    /// one interface it uses.
    ///
    /// Fails with `NoEndpoints`, sending nothing, when `interface_count` has
    /// no room for another interface.
    pub fn send_interface_descriptor(
        &self,
        interface_count: &mut u8,
        pipe: &mut dyn ControlPipe,
    ) -> Result<usize, Error> {
        let next = interface_count.checked_add(1).ok_or(Error::NoEndpoints)?;
        let sent = pipe.send(&self.interface_descriptor())?;
        *interface_count = next;
        Ok(sent)
    }
}

impl<'d, const N: usize> UsbFunction for CompositeHid<'d, N> {
    fn endpoint_types(&self) -> &'static [EndpointType] {
        &[EndpointType::InterruptIn]
    }

    fn setup(&mut self, setup: &SetupPacket, interface: u8, pipe: &mut dyn ControlPipe) -> bool {
        self.handle_setup(setup, interface, pipe)
    }

    fn describe_interface(
        &mut self,
        interface_count: &mut u8,
        pipe: &mut dyn ControlPipe,
    ) -> Result<usize, Error> {
        self.send_interface_descriptor(interface_count, pipe)
    }

    fn describe_report(
        &self,
        descriptor_type: u8,
        pipe: &mut dyn ControlPipe,
    ) -> Result<usize, Error> {
        if descriptor_type == DESCRIPTOR_TYPE_REPORT {
            self.send_report_descriptor(pipe)
        } else {
            Ok(0)
        }
    }
}
