//! Control transfer SETUP packets.
//!
//! Layout (8 bytes, little-endian):
//! ```text
//! Byte 0:   bmRequestType  D7 direction, D6..5 type, D4..0 recipient
//! Byte 1:   bRequest
//! Byte 2-3: wValue
//! Byte 4-5: wIndex
//! Byte 6-7: wLength
//! ```

// Not packed: the fields happen to be aligned, which the assert below checks.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SetupPacket {
    /// bit map of request type
    pub request_type: RequestType,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
}
static_assertions::const_assert_eq!(core::mem::size_of::<SetupPacket>(), 8);

impl SetupPacket {
    pub const LEN: usize = 8;

    pub const fn new(
        request_type: RequestType,
        request: u8,
        value: u16,
        index: u16,
        length: u16,
    ) -> Self {
        Self {
            request_type,
            request,
            value,
            index,
            length,
        }
    }

    /// Decode the raw bytes received in the SETUP stage.
    pub const fn parse(raw: &[u8; Self::LEN]) -> Self {
        Self {
            request_type: RequestType(raw[0]),
            request: raw[1],
            value: u16::from_le_bytes([raw[2], raw[3]]),
            index: u16::from_le_bytes([raw[4], raw[5]]),
            length: u16::from_le_bytes([raw[6], raw[7]]),
        }
    }

    pub const fn to_bytes(&self) -> [u8; Self::LEN] {
        let value = self.value.to_le_bytes();
        let index = self.index.to_le_bytes();
        let length = self.length.to_le_bytes();
        [
            self.request_type.0,
            self.request,
            value[0],
            value[1],
            index[0],
            index[1],
            length[0],
            length[1],
        ]
    }

    pub const fn value_low(&self) -> u8 {
        (self.value & 0xFF) as u8
    }

    pub const fn value_high(&self) -> u8 {
        (self.value >> 8) as u8
    }

    /// True when `bmRequestType` is exactly `dir | Class | Interface`.
    pub fn is_class_interface(&self, dir: RequestTypeDirection) -> bool {
        self.request_type
            == RequestType::new(dir, RequestTypeType::Class, RequestTypeRecipient::Interface)
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestTypeDirection {
    HostToDevice = 0,
    DeviceToHost = 1,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestTypeType {
    Standard = 0,
    Class = 1,
    Vendor = 2,
    Rsvd = 3,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestTypeRecipient {
    Device = 0,
    Interface = 1,
    Endpoint = 2,
    Other = 3,
}

/**
 * D7:7 Direction (1: Device to Host)
 * D6:5 Type
 * D4:0 Recipient
 */
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RequestType(pub u8);

impl RequestType {
    /// `bmRequestType` of HID class requests carrying data to the device (0x21).
    pub const HOST_TO_DEVICE_CLASS_INTERFACE: RequestType = RequestType::new(
        RequestTypeDirection::HostToDevice,
        RequestTypeType::Class,
        RequestTypeRecipient::Interface,
    );
    /// `bmRequestType` of HID class requests reading from the device (0xA1).
    pub const DEVICE_TO_HOST_CLASS_INTERFACE: RequestType = RequestType::new(
        RequestTypeDirection::DeviceToHost,
        RequestTypeType::Class,
        RequestTypeRecipient::Interface,
    );
    /// `bmRequestType` of GET_DESCRIPTOR addressed to an interface (0x81).
    pub const DEVICE_TO_HOST_STANDARD_INTERFACE: RequestType = RequestType::new(
        RequestTypeDirection::DeviceToHost,
        RequestTypeType::Standard,
        RequestTypeRecipient::Interface,
    );

    pub const fn new(
        dir: RequestTypeDirection,
        typetype: RequestTypeType,
        recipient: RequestTypeRecipient,
    ) -> Self {
        RequestType(((dir as u8) << 7) | ((typetype as u8) << 5) | recipient as u8)
    }

    pub fn data_direction(&self) -> RequestTypeDirection {
        if (self.0 >> 7) & 0x1 == 0 {
            RequestTypeDirection::HostToDevice
        } else {
            RequestTypeDirection::DeviceToHost
        }
    }

    pub fn request_type(&self) -> RequestTypeType {
        match (self.0 >> 5) & 0x3 {
            0 => RequestTypeType::Standard,
            1 => RequestTypeType::Class,
            2 => RequestTypeType::Vendor,
            _ => RequestTypeType::Rsvd,
        }
    }

    pub fn recipient(&self) -> RequestTypeRecipient {
        match self.0 & 0x1F {
            0 => RequestTypeRecipient::Device,
            1 => RequestTypeRecipient::Interface,
            2 => RequestTypeRecipient::Endpoint,
            _ => RequestTypeRecipient::Other,
        }
    }
}

/// HID class-specific requests (HID 1.11, 7.2).
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidRequest {
    GetReport = 0x01,
    GetIdle = 0x02,
    GetProtocol = 0x03,
    SetReport = 0x09,
    SetIdle = 0x0A,
    SetProtocol = 0x0B,
}

impl TryFrom<u8> for HidRequest {
    type Error = ();

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x01 => Ok(HidRequest::GetReport),
            0x02 => Ok(HidRequest::GetIdle),
            0x03 => Ok(HidRequest::GetProtocol),
            0x09 => Ok(HidRequest::SetReport),
            0x0A => Ok(HidRequest::SetIdle),
            0x0B => Ok(HidRequest::SetProtocol),
            _ => Err(()),
        }
    }
}

/// Report type carried in the high byte of wValue for GET/SET_REPORT.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportType {
    Input,
    Output,
    Feature,
    Reserved(u8),
}

impl From<u8> for ReportType {
    fn from(code: u8) -> Self {
        match code {
            0x01 => ReportType::Input,
            0x02 => ReportType::Output,
            0x03 => ReportType::Feature,
            other => ReportType::Reserved(other),
        }
    }
}

#[repr(u8)]
pub enum StandardDeviceRequest {
    GetStatus = 0x0,
    ClearFeature = 0x1,
    SetFeature = 0x3,
    SetAddress = 0x5,
    GetDescriptor = 0x6,
    SetDescriptor = 0x7,
    GetConfiguration = 0x8,
    SetConfiguration = 0x9,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_set_report_packet() {
        // SET_REPORT, Output report 2, interface 0, 8 bytes
        let raw = [0x21, 0x09, 0x02, 0x02, 0x00, 0x00, 0x08, 0x00];
        let setup = SetupPacket::parse(&raw);

        assert_eq!(setup.request_type, RequestType::HOST_TO_DEVICE_CLASS_INTERFACE);
        assert_eq!(setup.request, HidRequest::SetReport as u8);
        assert_eq!(setup.value, 0x0202);
        assert_eq!(setup.value_low(), 0x02);
        assert_eq!(setup.value_high(), 0x02);
        assert_eq!(setup.index, 0);
        assert_eq!(setup.length, 8);
        assert_eq!(setup.to_bytes(), raw);
    }

    #[test]
    fn request_type_bitfields() {
        let t = RequestType(0xA1);
        assert_eq!(t.data_direction(), RequestTypeDirection::DeviceToHost);
        assert_eq!(t.request_type(), RequestTypeType::Class);
        assert_eq!(t.recipient(), RequestTypeRecipient::Interface);

        let t = RequestType(0x80);
        assert_eq!(t.data_direction(), RequestTypeDirection::DeviceToHost);
        assert_eq!(t.request_type(), RequestTypeType::Standard);
        assert_eq!(t.recipient(), RequestTypeRecipient::Device);

        let t = RequestType(0x42);
        assert_eq!(t.data_direction(), RequestTypeDirection::HostToDevice);
        assert_eq!(t.request_type(), RequestTypeType::Vendor);
        assert_eq!(t.recipient(), RequestTypeRecipient::Endpoint);
    }

    #[test]
    fn well_known_request_types() {
        assert_eq!(RequestType::HOST_TO_DEVICE_CLASS_INTERFACE.0, 0x21);
        assert_eq!(RequestType::DEVICE_TO_HOST_CLASS_INTERFACE.0, 0xA1);
        assert_eq!(RequestType::DEVICE_TO_HOST_STANDARD_INTERFACE.0, 0x81);
    }

    #[test]
    fn hid_request_codes() {
        assert_eq!(HidRequest::try_from(0x01), Ok(HidRequest::GetReport));
        assert_eq!(HidRequest::try_from(0x0B), Ok(HidRequest::SetProtocol));
        assert_eq!(HidRequest::try_from(0x04), Err(()));
        assert_eq!(ReportType::from(2), ReportType::Output);
        assert_eq!(ReportType::from(9), ReportType::Reserved(9));
    }
}
