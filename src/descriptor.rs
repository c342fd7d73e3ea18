//! Descriptor encoders for the composite HID interface.
//!
//! The interface block returned on enumeration is three descriptors sent
//! back-to-back:
//! ```text
//! Interface  (9 bytes)  class 0x03, one endpoint
//! HID        (9 bytes)  one report descriptor, its total length
//! Endpoint   (7 bytes)  interrupt IN
//! ```

/// Standard descriptor type codes.
pub const DESCRIPTOR_TYPE_INTERFACE: u8 = 0x04;
pub const DESCRIPTOR_TYPE_ENDPOINT: u8 = 0x05;

/// HID class descriptor type codes.
pub const DESCRIPTOR_TYPE_HID: u8 = 0x21;
pub const DESCRIPTOR_TYPE_REPORT: u8 = 0x22;

/// Interface class code for HID.
pub const USB_CLASS_HID: u8 = 0x03;

/// Endpoint direction bit.
pub const ENDPOINT_IN: u8 = 0x80;

/// Endpoint transfer types (bmAttributes bits 1..0).
pub const ENDPOINT_TYPE_INTERRUPT: u8 = 0x03;

/// Total length of the interface block.
pub const INTERFACE_BLOCK_LEN: usize =
    InterfaceDescriptor::LEN + HidClassDescriptor::LEN + EndpointDescriptor::LEN;

pub struct InterfaceDescriptor {
    pub interface_num: u8,
    pub alternate_setting: u8,
    pub num_endpoints: u8,
    pub interface_class: u8,
    pub interface_subclass: u8,
    pub interface_protocol: u8,
    pub interface_name_idx: u8,
}

impl InterfaceDescriptor {
    pub const LEN: usize = 9;

    pub const fn to_arr(&self) -> [u8; Self::LEN] {
        [
            Self::LEN as u8,
            DESCRIPTOR_TYPE_INTERFACE,
            self.interface_num,
            self.alternate_setting,
            self.num_endpoints,
            self.interface_class,
            self.interface_subclass,
            self.interface_protocol,
            self.interface_name_idx,
        ]
    }
}

/// HID class descriptor announcing a single report descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HidClassDescriptor {
    pub hid_version: u16,
    pub country_code: u8,
    /// Length of the (merged) report descriptor.
    pub report_descriptor_len: u16,
}

impl HidClassDescriptor {
    pub const LEN: usize = 9;

    pub const fn to_arr(&self) -> [u8; Self::LEN] {
        let version = self.hid_version.to_le_bytes();
        let len = self.report_descriptor_len.to_le_bytes();
        [
            Self::LEN as u8,
            DESCRIPTOR_TYPE_HID,
            version[0],
            version[1],
            self.country_code,
            1, // bNumDescriptors
            DESCRIPTOR_TYPE_REPORT,
            len[0],
            len[1],
        ]
    }
}

pub struct EndpointDescriptor {
    pub endpoint_addr: u8,
    pub attributes: u8,
    pub max_packet_size: u16,
    pub interval: u8,
}

impl EndpointDescriptor {
    pub const LEN: usize = 7;

    pub const fn to_arr(&self) -> [u8; Self::LEN] {
        let mps = self.max_packet_size.to_le_bytes();
        [
            Self::LEN as u8,
            DESCRIPTOR_TYPE_ENDPOINT,
            self.endpoint_addr,
            self.attributes,
            mps[0],
            mps[1],
            self.interval,
        ]
    }
}

/// Concatenate interface, HID and endpoint descriptors into one block.
pub fn interface_block(
    interface: &InterfaceDescriptor,
    hid: &HidClassDescriptor,
    endpoint: &EndpointDescriptor,
) -> [u8; INTERFACE_BLOCK_LEN] {
    let mut data = [0u8; INTERFACE_BLOCK_LEN];
    let (head, rest) = data.split_at_mut(InterfaceDescriptor::LEN);
    let (mid, tail) = rest.split_at_mut(HidClassDescriptor::LEN);
    head.copy_from_slice(&interface.to_arr());
    mid.copy_from_slice(&hid.to_arr());
    tail.copy_from_slice(&endpoint.to_arr());
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hid_class_descriptor_carries_length() {
        let hid = HidClassDescriptor {
            hid_version: 0x0101,
            country_code: 0,
            report_descriptor_len: 0x012B,
        };
        assert_eq!(
            hid.to_arr(),
            [0x09, 0x21, 0x01, 0x01, 0x00, 0x01, 0x22, 0x2B, 0x01]
        );
    }

    #[test]
    fn interface_block_layout() {
        let block = interface_block(
            &InterfaceDescriptor {
                interface_num: 2,
                alternate_setting: 0,
                num_endpoints: 1,
                interface_class: USB_CLASS_HID,
                interface_subclass: 0,
                interface_protocol: 0,
                interface_name_idx: 0,
            },
            &HidClassDescriptor {
                hid_version: 0x0101,
                country_code: 0,
                report_descriptor_len: 43,
            },
            &EndpointDescriptor {
                endpoint_addr: ENDPOINT_IN | 3,
                attributes: ENDPOINT_TYPE_INTERRUPT,
                max_packet_size: 64,
                interval: 1,
            },
        );

        assert_eq!(block.len(), 25);
        assert_eq!(&block[..9], &[9, 0x04, 2, 0, 1, 0x03, 0, 0, 0]);
        assert_eq!(&block[9..18], &[9, 0x21, 0x01, 0x01, 0, 1, 0x22, 43, 0]);
        assert_eq!(&block[18..], &[7, 0x05, 0x83, 0x03, 64, 0, 1]);
    }
}
