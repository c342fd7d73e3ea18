//! Control requests from embassy-usb into the dispatcher.

use embassy_usb::control::{self, InResponse, OutResponse, Recipient, Request};
use embassy_usb::driver::Direction;
use embassy_usb::Handler;
use heapless::Vec;

use crate::composite::CompositeHid;
use crate::config::REPORT_DESCRIPTOR_CAPACITY;
use crate::descriptor::DESCRIPTOR_TYPE_REPORT;
use crate::error::Error;
use crate::request::{
    RequestType, RequestTypeDirection, RequestTypeRecipient, RequestTypeType, SetupPacket,
    StandardDeviceRequest,
};
use crate::transport::BufferedControl;

/// `Handler` registered with the embassy-usb builder.
pub struct Control<'d, const N: usize> {
    hid: CompositeHid<'d, N>,
    // Served from here: the control buffer may be shorter than the descriptor.
    report_descriptor: Vec<u8, REPORT_DESCRIPTOR_CAPACITY>,
}

impl<'d, const N: usize> Control<'d, N> {
    pub(crate) fn new(hid: CompositeHid<'d, N>) -> Result<Self, Error> {
        let report_descriptor = hid.merged_report_descriptor()?;
        Ok(Self {
            hid,
            report_descriptor,
        })
    }

    fn interface(req: &Request) -> Option<u8> {
        match req.recipient {
            Recipient::Interface => Some((req.index & 0xFF) as u8),
            _ => None,
        }
    }
}

impl<'d, const N: usize> Handler for Control<'d, N> {
    fn reset(&mut self) {
        self.hid.reset_session();
    }

    fn control_out(&mut self, req: Request, data: &[u8]) -> Option<OutResponse> {
        let interface = Self::interface(&req)?;
        let setup = setup_packet(&req);
        let mut pipe = BufferedControl::out_stage(data);

        self.hid
            .handle_setup(&setup, interface, &mut pipe)
            .then_some(OutResponse::Accepted)
    }

    fn control_in<'a>(&'a mut self, req: Request, buf: &'a mut [u8]) -> Option<InResponse<'a>> {
        let interface = Self::interface(&req)?;
        let setup = setup_packet(&req);
        if is_report_descriptor_request(&setup) {
            if interface != self.hid.interface_number() {
                return None;
            }
            let len = self.report_descriptor.len().min(usize::from(req.length));
            return Some(InResponse::Accepted(&self.report_descriptor[..len]));
        }

        let limit = usize::from(req.length).min(buf.len());

        let mut pipe = BufferedControl::in_stage(&mut buf[..limit]);
        if !self.hid.handle_setup(&setup, interface, &mut pipe) {
            return None;
        }
        let written = pipe.written();
        Some(InResponse::Accepted(&buf[..written]))
    }
}

fn is_report_descriptor_request(setup: &SetupPacket) -> bool {
    setup.request_type == RequestType::DEVICE_TO_HOST_STANDARD_INTERFACE
        && setup.request == StandardDeviceRequest::GetDescriptor as u8
        && setup.value_high() == DESCRIPTOR_TYPE_REPORT
}

/// Rebuild the SETUP packet embassy-usb already decoded.
fn setup_packet(req: &Request) -> SetupPacket {
    let direction = match req.direction {
        Direction::Out => RequestTypeDirection::HostToDevice,
        Direction::In => RequestTypeDirection::DeviceToHost,
    };
    let kind = match req.request_type {
        control::RequestType::Standard => RequestTypeType::Standard,
        control::RequestType::Class => RequestTypeType::Class,
        control::RequestType::Vendor => RequestTypeType::Vendor,
        control::RequestType::Reserved => RequestTypeType::Rsvd,
    };
    let recipient = match req.recipient {
        Recipient::Device => RequestTypeRecipient::Device,
        Recipient::Interface => RequestTypeRecipient::Interface,
        Recipient::Endpoint => RequestTypeRecipient::Endpoint,
        Recipient::Other | Recipient::Reserved => RequestTypeRecipient::Other,
    };

    SetupPacket::new(
        RequestType::new(direction, kind, recipient),
        req.request,
        req.value,
        req.index,
        req.length,
    )
}
