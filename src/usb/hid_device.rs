//! Composite HID interface on an embassy-usb device.
//!
//! `CompositeHidClass::new` consumes a filled `HidRegistry`, adds the
//! interface to the builder and registers the control handler. What is left
//! for the application is the `ReportSender` on the interrupt-IN endpoint.

use embassy_usb::driver::{Driver, Endpoint, EndpointIn};
use embassy_usb::Builder;

use crate::config::{
    HidConfig, HID_VERSION, MAX_REPORT_FRAME, MAX_SUB_DEVICES, REPORT_DESCRIPTOR_CAPACITY,
};
use crate::descriptor::{HidClassDescriptor, DESCRIPTOR_TYPE_HID, USB_CLASS_HID};
use crate::error::Error;
use crate::registry::HidRegistry;
use crate::report::frame_report;
use crate::transport::EndpointAllocation;

use super::control::Control;

/// Storage for the control handler; must outlive the USB device.
pub struct State<'d, const N: usize = MAX_SUB_DEVICES> {
    control: Option<Control<'d, N>>,
}

impl<'d, const N: usize> Default for State<'d, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'d, const N: usize> State<'d, N> {
    pub const fn new() -> Self {
        Self { control: None }
    }
}

/// Composite HID class for embassy-usb.
pub struct CompositeHidClass;

impl CompositeHidClass {
    /// Add the composite HID interface to `builder`.
    ///
    /// Must be called before `builder.build()`; the registry is sealed here
    /// so no sub-device can be added afterwards. Nothing is added to the
    /// builder when `config` is invalid or the merged report descriptor
    /// exceeds `REPORT_DESCRIPTOR_CAPACITY`.
    pub fn new<'d, D: Driver<'d>, const N: usize>(
        builder: &mut Builder<'d, D>,
        state: &'d mut State<'d, N>,
        registry: HidRegistry<'d, N>,
        config: HidConfig,
    ) -> Result<ReportSender<'d, D>, Error> {
        config.validate()?;
        if usize::from(registry.descriptor_len()) > REPORT_DESCRIPTOR_CAPACITY {
            warn!(
                "HID: report descriptor of {} bytes exceeds {}",
                registry.descriptor_len(),
                REPORT_DESCRIPTOR_CAPACITY
            );
            return Err(Error::DescriptorTooLarge);
        }

        let (subclass, protocol) = config.subclass_protocol();
        let hid_descriptor = HidClassDescriptor {
            hid_version: HID_VERSION,
            country_code: 0,
            report_descriptor_len: registry.descriptor_len(),
        }
        .to_arr();

        let mut func = builder.function(USB_CLASS_HID, subclass, protocol);
        let mut iface = func.interface();
        let interface = iface.interface_number();
        let mut alt = iface.alt_setting(USB_CLASS_HID, subclass, protocol, None);

        // bLength and bDescriptorType are written by the builder.
        alt.descriptor(DESCRIPTOR_TYPE_HID, &hid_descriptor[2..]);
        let ep_in = alt.endpoint_interrupt_in(config.endpoint_size, config.poll_interval);
        drop(func);

        let allocation = EndpointAllocation {
            interface: interface.0,
            endpoint: ep_in.info().addr.index() as u8,
        };
        let hid = registry.seal(allocation, config);
        let control = state.control.insert(Control::new(hid)?);
        builder.handler(control);

        Ok(ReportSender::new(ep_in))
    }
}

/// Sends input reports on the composite interrupt-IN endpoint.
pub struct ReportSender<'d, D: Driver<'d>> {
    ep_in: D::EndpointIn,
    frame: [u8; MAX_REPORT_FRAME],
}

impl<'d, D: Driver<'d>> ReportSender<'d, D> {
    fn new(ep_in: D::EndpointIn) -> Self {
        Self {
            ep_in,
            frame: [0; MAX_REPORT_FRAME],
        }
    }

    /// Wait until the host has configured the device.
    pub async fn ready(&mut self) {
        self.ep_in.wait_enabled().await;
    }

    /// Send `data` as report `report_id` (0 = no ID prefix).
    ///
    /// The frame is split into max-packet chunks; a frame that is an exact
    /// multiple of the packet size is terminated with a zero-length packet.
    pub async fn send_report(&mut self, report_id: u8, data: &[u8]) -> Result<usize, Error> {
        let len = frame_report(report_id, data, &mut self.frame)?;
        // Zero only if the driver ignored the validated endpoint size.
        let max_packet = usize::from(self.ep_in.info().max_packet_size).max(1);

        for chunk in self.frame[..len].chunks(max_packet) {
            self.ep_in.write(chunk).await?;
        }
        if len % max_packet == 0 {
            self.ep_in.write(&[]).await?;
        }
        Ok(len)
    }
}
