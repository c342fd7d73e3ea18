//! Input report transmission on the shared interrupt-IN endpoint.
//!
//! Every sub-device reports through the same endpoint, so reports of a
//! sub-device with a non-zero report ID are prefixed with that ID. The ID
//! byte and the payload are written as two pieces of one transfer; only
//! the payload write releases the endpoint bank.

use crate::error::Error;
use crate::transport::InterruptIn;

/// Report sender bound to the composite function's interrupt-IN endpoint.
pub struct ReportWriter<I> {
    endpoint: I,
}

impl<I: InterruptIn> ReportWriter<I> {
    pub fn new(endpoint: I) -> Self {
        Self { endpoint }
    }

    /// Send `data` as report `report_id`. Report ID 0 sends `data` alone.
    ///
    /// Returns the bytes the endpoint accepted, ID byte included. Errors
    /// from the endpoint (e.g. not configured) are passed through.
    pub fn send_report(&mut self, report_id: u8, data: &[u8]) -> Result<usize, Error> {
        let mut written = 0;
        if report_id != 0 {
            written += self.endpoint.write(&[report_id], false)?;
        }
        written += self.endpoint.write(data, true)?;
        Ok(written)
    }

    pub fn endpoint(&mut self) -> &mut I {
        &mut self.endpoint
    }

    pub fn into_inner(self) -> I {
        self.endpoint
    }
}

/// Lay out report `report_id` carrying `data` as one contiguous frame.
///
/// For transports that cannot split a transfer across writes.
pub fn frame_report(report_id: u8, data: &[u8], buf: &mut [u8]) -> Result<usize, Error> {
    let offset = usize::from(report_id != 0);
    let len = data.len() + offset;
    if buf.len() < len {
        return Err(Error::BufferOverflow);
    }
    if report_id != 0 {
        buf[0] = report_id;
    }
    buf[offset..len].copy_from_slice(data);
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    /// Records every write with its release flag.
    #[derive(Default)]
    struct RecordingEndpoint {
        writes: Vec<(Vec<u8>, bool)>,
        disabled: bool,
    }

    impl InterruptIn for RecordingEndpoint {
        fn write(&mut self, data: &[u8], release: bool) -> Result<usize, Error> {
            if self.disabled {
                return Err(Error::EndpointDisabled);
            }
            self.writes.push((data.to_vec(), release));
            Ok(data.len())
        }
    }

    #[test]
    fn send_report_prefixes_id() {
        let mut writer = ReportWriter::new(RecordingEndpoint::default());
        assert_eq!(writer.send_report(2, &[0xAA; 64]), Ok(65));

        let ep = writer.into_inner();
        assert_eq!(ep.writes.len(), 2);
        assert_eq!(ep.writes[0], (vec![2], false));
        assert_eq!(ep.writes[1].0.len(), 64);
        assert!(ep.writes[1].1);
    }

    #[test]
    fn report_id_zero_has_no_prefix() {
        let mut writer = ReportWriter::new(RecordingEndpoint::default());
        assert_eq!(writer.send_report(0, &[1, 2, 3]), Ok(3));
        assert_eq!(writer.endpoint().writes, vec![(vec![1, 2, 3], true)]);

        let mut buf = [0u8; 3];
        assert_eq!(frame_report(0, &[1, 2, 3], &mut buf), Ok(3));
        assert_eq!(buf, [1, 2, 3]);
    }

    #[test]
    fn send_empty_report() {
        let mut writer = ReportWriter::new(RecordingEndpoint::default());
        assert_eq!(writer.send_report(1, &[]), Ok(1));
        assert_eq!(writer.endpoint().writes[1], (vec![], true));
    }

    #[test]
    fn send_report_on_disabled_endpoint() {
        let mut writer = ReportWriter::new(RecordingEndpoint {
            disabled: true,
            ..Default::default()
        });
        assert_eq!(writer.send_report(1, &[1, 2]), Err(Error::EndpointDisabled));
    }

    #[test]
    fn frame_report_layout() {
        let mut buf = [0u8; 8];
        assert_eq!(frame_report(3, &[1, 2, 3], &mut buf), Ok(4));
        assert_eq!(&buf[..4], &[3, 1, 2, 3]);

        let mut small = [0u8; 3];
        assert_eq!(frame_report(3, &[1, 2, 3], &mut small), Err(Error::BufferOverflow));
    }
}
