//! HID class request dispatch.
//!
//! Called once per SETUP packet. Requests for another interface are left
//! alone; HID class requests are executed against the session state or
//! routed to the sub-device owning the report ID. Everything the function
//! does not implement returns `false` so the USB core STALLs it.

use crate::config::{ReportIdSource, CONTROL_BUFFER_SIZE, DEFAULT_IDLE, DEFAULT_PROTOCOL};
use crate::descriptor::{DESCRIPTOR_TYPE_HID, DESCRIPTOR_TYPE_REPORT};
use crate::registry::HidDevice;
use crate::request::{
    HidRequest, ReportType, RequestType, RequestTypeDirection, SetupPacket, StandardDeviceRequest,
};
use crate::transport::ControlPipe;

use super::CompositeHid;

/// Protocol selection values.
pub const PROTOCOL_BOOT: u8 = 0;
pub const PROTOCOL_REPORT: u8 = 1;

/// State negotiated with the host through SET_PROTOCOL / SET_IDLE.
///
/// Only stored; idle-rate report generation is up to the sub-devices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HidSession {
    pub protocol: u8,
    pub idle: u8,
}

impl Default for HidSession {
    fn default() -> Self {
        Self {
            protocol: DEFAULT_PROTOCOL,
            idle: DEFAULT_IDLE,
        }
    }
}

impl HidSession {
    pub fn is_boot_protocol(&self) -> bool {
        self.protocol == PROTOCOL_BOOT
    }
}

impl<'d, const N: usize> CompositeHid<'d, N> {
    /// Execute `setup` if it targets this interface.
    ///
    /// `interface` is the interface number the request is addressed to.
    /// Returns `false` for requests that are not ours or not supported.
    pub fn handle_setup(
        &mut self,
        setup: &SetupPacket,
        interface: u8,
        pipe: &mut dyn ControlPipe,
    ) -> bool {
        if interface != self.interface {
            return false;
        }

        if setup.request_type == RequestType::DEVICE_TO_HOST_STANDARD_INTERFACE
            && setup.request == StandardDeviceRequest::GetDescriptor as u8
        {
            return self.get_descriptor(setup, pipe);
        }

        let Ok(request) = HidRequest::try_from(setup.request) else {
            return false;
        };

        if setup.is_class_interface(RequestTypeDirection::DeviceToHost) {
            match request {
                HidRequest::GetReport => self.get_report(setup, pipe),
                HidRequest::GetProtocol => send_byte(pipe, self.session.protocol),
                HidRequest::GetIdle => send_byte(pipe, self.session.idle),
                _ => false,
            }
        } else if setup.is_class_interface(RequestTypeDirection::HostToDevice) {
            match request {
                HidRequest::SetProtocol => {
                    self.session.protocol = setup.value_low();
                    debug!("HID: SET_PROTOCOL {}", self.session.protocol);
                    true
                }
                HidRequest::SetIdle => {
                    self.session.idle = setup.value_low();
                    debug!("HID: SET_IDLE {}", self.session.idle);
                    true
                }
                HidRequest::SetReport => self.set_report(setup, pipe),
                _ => false,
            }
        } else {
            false
        }
    }

    /// First sub-device in registration order using `report_id`.
    fn find_device(&mut self, report_id: u8) -> Option<&mut (dyn HidDevice + 'd)> {
        self.devices
            .iter_mut()
            .find(|d| d.report_id() == report_id)
            .map(|d| &mut **d)
    }

    fn set_report(&mut self, setup: &SetupPacket, pipe: &mut dyn ControlPipe) -> bool {
        let report_id = match self.config.report_id_source {
            ReportIdSource::Index => (setup.index & 0xFF) as u8,
            ReportIdSource::ValueLow => setup.value_low(),
        };
        let length = usize::from(setup.length);

        if length > CONTROL_BUFFER_SIZE {
            warn!("HID: SET_REPORT of {} bytes exceeds control buffer", length);
            drain(pipe, length);
            return false;
        }

        let Some(device) = self.find_device(report_id) else {
            warn!("HID: SET_REPORT for unknown report ID {}", report_id);
            drain(pipe, length);
            return false;
        };

        let mut buf = [0u8; CONTROL_BUFFER_SIZE];
        let received = match pipe.recv(&mut buf[..length]) {
            Ok(n) => n,
            Err(_) => return false,
        };

        // The data stage echoes the report ID first when one is in use.
        if report_id != 0 {
            device.set_report_data(buf.get(1..received).unwrap_or(&[]));
        } else {
            device.set_report_data(&buf[..received]);
        }
        true
    }

    fn get_report(&mut self, setup: &SetupPacket, pipe: &mut dyn ControlPipe) -> bool {
        let report_id = setup.value_low();
        let report_type = ReportType::from(setup.value_high());

        let Some(device) = self.find_device(report_id) else {
            return false;
        };

        let mut buf = [0u8; CONTROL_BUFFER_SIZE];
        let offset = usize::from(report_id != 0);
        let Some(n) = device.get_report_data(report_type, &mut buf[offset..]) else {
            debug!("HID: GET_REPORT {} not provided", report_id);
            return false;
        };
        if report_id != 0 {
            buf[0] = report_id;
        }

        let len = (offset + n).min(buf.len());
        pipe.send(&buf[..len]).is_ok()
    }

    fn get_descriptor(&self, setup: &SetupPacket, pipe: &mut dyn ControlPipe) -> bool {
        match setup.value_high() {
            DESCRIPTOR_TYPE_REPORT => {
                // The host must get every byte it asked for, up to the whole descriptor.
                let expected = usize::from(setup.length).min(usize::from(self.descriptor_len));
                matches!(self.send_report_descriptor(pipe), Ok(sent) if sent >= expected)
            }
            DESCRIPTOR_TYPE_HID => pipe.send(&self.class_descriptor().to_arr()).is_ok(),
            _ => false,
        }
    }
}

fn send_byte(pipe: &mut dyn ControlPipe, value: u8) -> bool {
    pipe.send(&[value]).is_ok()
}

/// Consume `length` bytes of an OUT data stage nobody wants.
fn drain(pipe: &mut dyn ControlPipe, mut length: usize) {
    let mut scratch = [0u8; CONTROL_BUFFER_SIZE];
    while length > 0 {
        let chunk = length.min(scratch.len());
        match pipe.recv(&mut scratch[..chunk]) {
            Ok(0) | Err(_) => break,
            Ok(n) => length -= n,
        }
    }
}
