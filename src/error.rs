//! Unified error type for pluggable-hid.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

/// Top-level error type used across the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Registry
    /// No room left for another sub-device.
    RegistryFull,

    /// The merged report descriptor would not fit the 16-bit length field.
    DescriptorTooLarge,

    // USB
    /// The USB core could not assign an interface or endpoint.
    NoEndpoints,

    /// The endpoint is disabled (bus not configured or reset).
    EndpointDisabled,

    /// `HidConfig` asks for an endpoint the bus cannot provide.
    InvalidConfig,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,
}

// Convenience conversions

#[cfg(feature = "embassy")]
impl From<embassy_usb::driver::EndpointError> for Error {
    fn from(e: embassy_usb::driver::EndpointError) -> Self {
        match e {
            embassy_usb::driver::EndpointError::BufferOverflow => Error::BufferOverflow,
            embassy_usb::driver::EndpointError::Disabled => Error::EndpointDisabled,
        }
    }
}
