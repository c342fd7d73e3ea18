//! Sub-device registry.
//!
//! Sub-devices are collected during start-up, in order, into a
//! `HidRegistry`. Plugging the registry into the USB core consumes it and
//! yields the sealed `CompositeHid`, so nothing can register once the
//! interface has been exposed to the host.

use heapless::Vec;

use crate::composite::CompositeHid;
use crate::config::{HidConfig, MAX_SUB_DEVICES};
use crate::error::Error;
use crate::request::ReportType;
use crate::transport::{EndpointAllocation, EndpointType, UsbCore};

/// One HID sub-device sharing the composite interface.
pub trait HidDevice {
    /// Report ID prefixing this sub-device's reports. 0 = no prefix.
    fn report_id(&self) -> u8;

    /// Report descriptor fragment. Must be a self-contained set of items.
    fn report_descriptor(&self) -> &'static [u8];

    /// Report data pushed by the host with SET_REPORT, without the
    /// report ID byte.
    fn set_report_data(&mut self, data: &[u8]);

    /// Answer GET_REPORT by writing the report (without report ID) into
    /// `buf`. Returns `None` if no report can be produced.
    fn get_report_data(&mut self, report_type: ReportType, buf: &mut [u8]) -> Option<usize> {
        let _ = (report_type, buf);
        None
    }
}

/// A sub-device made of its parts: report ID, descriptor fragment and a
/// SET_REPORT sink.
pub struct SubDevice<F> {
    report_id: u8,
    descriptor: &'static [u8],
    on_report: F,
}

impl<F: FnMut(&[u8])> SubDevice<F> {
    pub const fn new(report_id: u8, descriptor: &'static [u8], on_report: F) -> Self {
        Self {
            report_id,
            descriptor,
            on_report,
        }
    }
}

impl<F: FnMut(&[u8])> HidDevice for SubDevice<F> {
    fn report_id(&self) -> u8 {
        self.report_id
    }

    fn report_descriptor(&self) -> &'static [u8] {
        self.descriptor
    }

    fn set_report_data(&mut self, data: &[u8]) {
        (self.on_report)(data)
    }
}

/// Ordered, append-only list of sub-devices under construction.
pub struct HidRegistry<'d, const N: usize = MAX_SUB_DEVICES> {
    devices: Vec<&'d mut dyn HidDevice, N>,
    descriptor_len: u16,
}

impl<'d, const N: usize> Default for HidRegistry<'d, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'d, const N: usize> HidRegistry<'d, N> {
    pub const fn new() -> Self {
        Self {
            devices: Vec::new(),
            descriptor_len: 0,
        }
    }

    /// Append `device` after every sub-device registered so far.
    pub fn append(&mut self, device: &'d mut dyn HidDevice) -> Result<(), Error> {
        let fragment = device.report_descriptor().len();
        let total = u16::try_from(fragment)
            .ok()
            .and_then(|len| self.descriptor_len.checked_add(len))
            .ok_or(Error::DescriptorTooLarge)?;

        let id = device.report_id();
        if id != 0 && self.devices.iter().any(|d| d.report_id() == id) {
            warn!("HID: report ID {} registered twice, first one wins", id);
        }

        self.devices
            .push(device)
            .map_err(|_| Error::RegistryFull)?;
        self.descriptor_len = total;

        debug!(
            "HID: sub-device {} (id {}, {} descriptor bytes)",
            self.devices.len(),
            id,
            fragment
        );
        Ok(())
    }

    /// Number of registered sub-devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Sum of all registered descriptor fragment lengths.
    pub fn descriptor_len(&self) -> u16 {
        self.descriptor_len
    }

    /// Claim one interface and one interrupt-IN endpoint from `core` and
    /// seal the registry. An invalid `config` claims nothing.
    pub fn plug<C: UsbCore>(
        self,
        core: &mut C,
        config: HidConfig,
    ) -> Result<CompositeHid<'d, N>, Error> {
        config.validate()?;
        let allocation = core.add_function(&[EndpointType::InterruptIn], 1)?;
        Ok(self.seal(allocation, config))
    }

    /// Seal the registry with an interface/endpoint the caller obtained
    /// from its USB stack.
    pub fn seal(self, allocation: EndpointAllocation, config: HidConfig) -> CompositeHid<'d, N> {
        info!(
            "HID: {} sub-devices, report descriptor {} bytes, interface {}",
            self.devices.len(),
            self.descriptor_len,
            allocation.interface
        );
        CompositeHid::new(self.devices, self.descriptor_len, allocation, config)
    }
}
