//! Read Device Identification (function 0x2B, MEI type 0x0E)
//!
//! Response body after the function code:
//!
//! ```text
//! MEI type | read code | conformity | more follows | next id | count | objects...
//!   0x0E   |   0x01    |    u8      |     u8       |   u8    |  u8   | id, len, bytes
//! ```

use serde::Serialize;

use crate::error::{ClientError, Result};

/// Function code of the encapsulated interface transport
pub const FUNCTION_CODE: u8 = 0x2B;
/// MEI type for device identification
pub const MEI_READ_DEVICE_ID: u8 = 0x0E;
/// Basic category: vendor, product code, revision
pub const READ_BASIC: u8 = 0x01;

/// Request body for the basic category starting at object 0
pub const BASIC_REQUEST: [u8; 3] = [MEI_READ_DEVICE_ID, READ_BASIC, 0x00];

const VENDOR_NAME: u8 = 0x00;
const PRODUCT_CODE: u8 = 0x01;
const REVISION: u8 = 0x02;

const OPERATION: &str = "read device identification";

/// Basic device identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    pub vendor: String,
    pub product: String,
    pub revision: String,
}

/// Parse the response body of a basic Read Device Identification request
///
/// All three basic objects must be present. Unknown object ids are skipped.
pub fn parse_device_identity(body: &[u8]) -> Result<DeviceIdentity> {
    let malformed = |msg: &str| ClientError::protocol(OPERATION, msg.to_string());

    let [mei_type, _read_code, _conformity, _more_follows, _next_id, count, rest @ ..] = body
    else {
        return Err(malformed("response header truncated"));
    };
    if *mei_type != MEI_READ_DEVICE_ID {
        return Err(malformed(&format!("unexpected MEI type 0x{:02X}", mei_type)));
    }

    let (mut vendor, mut product, mut revision) = (None, None, None);
    let mut cursor = rest;
    for _ in 0..*count {
        let [id, len, tail @ ..] = cursor else {
            return Err(malformed("object header truncated"));
        };
        let len = usize::from(*len);
        if tail.len() < len {
            return Err(malformed(&format!("object 0x{:02X} truncated", id)));
        }
        let (value, next) = tail.split_at(len);
        let text = String::from_utf8_lossy(value).into_owned();
        match *id {
            VENDOR_NAME => vendor = Some(text),
            PRODUCT_CODE => product = Some(text),
            REVISION => revision = Some(text),
            _ => {}
        }
        cursor = next;
    }

    match (vendor, product, revision) {
        (Some(vendor), Some(product), Some(revision)) => Ok(DeviceIdentity {
            vendor,
            product,
            revision,
        }),
        _ => Err(malformed("basic identification objects missing")),
    }
}

/// Encode a response body; the in-memory device answers with this
pub fn encode_basic_response(identity: &DeviceIdentity) -> Vec<u8> {
    let mut body = vec![MEI_READ_DEVICE_ID, READ_BASIC, 0x01, 0x00, 0x00, 0x03];
    for (id, value) in [
        (VENDOR_NAME, &identity.vendor),
        (PRODUCT_CODE, &identity.product),
        (REVISION, &identity.revision),
    ] {
        let bytes = value.as_bytes();
        let len = bytes.len().min(usize::from(u8::MAX));
        body.push(id);
        body.push(len as u8);
        body.extend_from_slice(&bytes[..len]);
    }
    body
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_response() {
        let body = [
            0x0E, 0x01, 0x01, 0x00, 0x00, 0x03, // header
            0x00, 0x04, b'A', b'c', b'm', b'e', // vendor
            0x01, 0x03, b'P', b'L', b'C', // product
            0x02, 0x03, b'1', b'.', b'0', // revision
        ];
        let identity = parse_device_identity(&body).unwrap();
        assert_eq!(identity.vendor, "Acme");
        assert_eq!(identity.product, "PLC");
        assert_eq!(identity.revision, "1.0");
    }

    #[test]
    fn test_objects_in_any_order() {
        let body = [
            0x0E, 0x01, 0x01, 0x00, 0x00, 0x04, //
            0x02, 0x01, b'2', //
            0x05, 0x01, b'x', // unknown id, skipped
            0x00, 0x01, b'V', //
            0x01, 0x01, b'P',
        ];
        let identity = parse_device_identity(&body).unwrap();
        assert_eq!(identity.revision, "2");
        assert_eq!(identity.vendor, "V");
    }

    #[test]
    fn test_truncated_response() {
        assert!(parse_device_identity(&[0x0E, 0x01]).is_err());
        let body = [0x0E, 0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x09, b'A'];
        assert!(parse_device_identity(&body).is_err());
    }

    #[test]
    fn test_missing_object() {
        let body = [0x0E, 0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, b'A'];
        let err = parse_device_identity(&body).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_wrong_mei_type() {
        let body = [0x0D, 0x01, 0x01, 0x00, 0x00, 0x00];
        assert!(parse_device_identity(&body).is_err());
    }

    #[test]
    fn test_encode_parses_back() {
        let identity = DeviceIdentity {
            vendor: "Pymodbus".to_string(),
            product: "PM".to_string(),
            revision: "3.6".to_string(),
        };
        assert_eq!(
            parse_device_identity(&encode_basic_response(&identity)).unwrap(),
            identity
        );
    }
}
