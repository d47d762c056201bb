//! Frame codec (encode/decode)
//!
//! One-shot encoding and decoding of complete frames held in memory. The
//! streaming, resynchronising counterpart lives in [`super::FrameDecoder`].

use bytes::Bytes;

use super::{
    CHECKSUM_SIZE, Command, Error, Frame, HEADER_SIZE, MAX_PAYLOAD_SIZE, PREAMBLE, Result, crc16,
};

/// Encode a command and payload into a frame
///
/// # Format
///
/// ```text
/// [0x55][0xAA][CMD][LEN_HI][LEN_LO][PAYLOAD (LEN bytes)][CRC_HI][CRC_LO]
/// ```
///
/// # Errors
///
/// Returns [`Error::PayloadTooLarge`] if the payload does not fit the 16-bit
/// length field.
pub fn encode(command: Command, payload: &[u8]) -> Result<Vec<u8>> {
    let len = u16::try_from(payload.len()).map_err(|_| Error::PayloadTooLarge {
        size: payload.len(),
        max: MAX_PAYLOAD_SIZE,
    })?;

    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len() + CHECKSUM_SIZE);

    // Header
    bytes.extend_from_slice(&PREAMBLE);
    bytes.push(command.as_u8());
    bytes.extend_from_slice(&len.to_be_bytes());

    bytes.extend_from_slice(payload);

    // Checksum covers the payload only
    bytes.extend_from_slice(&crc16(payload).to_be_bytes());

    Ok(bytes)
}

/// Decode a frame from the front of `bytes`
///
/// Reads the 5-byte header, then exactly `length` payload bytes, then the
/// 2 checksum bytes. Returns the frame and the number of bytes consumed.
///
/// # Errors
///
/// Returns an error if:
/// - Buffer is too small
/// - Preamble is not 0x55 0xAA
/// - Checksum doesn't match
/// - Command byte is unknown (checked after the checksum)
pub fn decode(bytes: &[u8]) -> Result<(Frame, usize)> {
    let total_available = bytes.len();

    if total_available < HEADER_SIZE {
        return Err(Error::BufferTooSmall {
            needed: HEADER_SIZE + CHECKSUM_SIZE,
            got: total_available,
        });
    }

    if bytes[0..2] != PREAMBLE {
        return Err(Error::InvalidPreamble {
            found: [bytes[0], bytes[1]],
        });
    }

    let command_byte = bytes[2];
    let payload_len = usize::from(u16::from_be_bytes([bytes[3], bytes[4]]));
    let total_size = HEADER_SIZE + payload_len + CHECKSUM_SIZE;

    if total_available < total_size {
        return Err(Error::BufferTooSmall {
            needed: total_size,
            got: total_available,
        });
    }

    let payload = &bytes[HEADER_SIZE..HEADER_SIZE + payload_len];

    let checksum_offset = HEADER_SIZE + payload_len;
    let stored_checksum = u16::from_be_bytes([bytes[checksum_offset], bytes[checksum_offset + 1]]);
    let calculated_checksum = crc16(payload);

    if stored_checksum != calculated_checksum {
        return Err(Error::ChecksumMismatch {
            expected: calculated_checksum,
            found: stored_checksum,
        });
    }

    let command = Command::from_u8(command_byte).ok_or(Error::UnknownCommand {
        byte: command_byte,
    })?;

    Ok((
        Frame::new(command, Bytes::copy_from_slice(payload)),
        total_size,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_start_frame_layout() {
        let encoded = encode(Command::Start, &1300u32.to_le_bytes()).unwrap();

        assert_eq!(
            encoded,
            [0x55, 0xAA, 0x01, 0x00, 0x04, 0x14, 0x05, 0x00, 0x00, 0xBE, 0x66]
        );
    }

    #[test]
    fn test_encode_empty_end_frame() {
        let encoded = encode(Command::End, &[]).unwrap();

        // Empty payload leaves the CRC register at its initial value
        assert_eq!(encoded, [0x55, 0xAA, 0x03, 0x00, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn test_encode_length_is_big_endian() {
        let encoded = encode(Command::Data, &[0u8; 0x0123]).unwrap();

        assert_eq!(encoded[3], 0x01);
        assert_eq!(encoded[4], 0x23);
        assert_eq!(encoded.len(), HEADER_SIZE + 0x0123 + CHECKSUM_SIZE);
    }

    #[test]
    fn test_encode_rejects_oversized_payload() {
        let payload = vec![0u8; MAX_PAYLOAD_SIZE + 1];
        let result = encode(Command::Data, &payload);

        assert_eq!(
            result,
            Err(Error::PayloadTooLarge {
                size: MAX_PAYLOAD_SIZE + 1,
                max: MAX_PAYLOAD_SIZE,
            })
        );
    }

    #[test]
    fn test_decode_invalid_preamble() {
        let mut encoded = encode(Command::End, &[]).unwrap();
        encoded[1] = 0x55;

        let result = decode(&encoded);
        assert!(matches!(result, Err(Error::InvalidPreamble { found: [0x55, 0x55] })));
    }

    #[test]
    fn test_decode_checksum_mismatch() {
        let mut encoded = encode(Command::Data, b"test").unwrap();

        // Corrupt the checksum
        let len = encoded.len();
        encoded[len - 1] ^= 0xFF;

        let result = decode(&encoded);
        assert!(matches!(result, Err(Error::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_decode_unknown_command_after_valid_checksum() {
        let mut encoded = encode(Command::Data, b"abc").unwrap();
        encoded[2] = 0x7F;

        let result = decode(&encoded);
        assert_eq!(result, Err(Error::UnknownCommand { byte: 0x7F }));
    }

    #[test]
    fn test_decode_buffer_too_small() {
        let result = decode(&[0x55, 0xAA, 0x02]);
        assert!(matches!(result, Err(Error::BufferTooSmall { .. })));

        let encoded = encode(Command::Data, b"truncated").unwrap();
        let result = decode(&encoded[..encoded.len() - 1]);
        assert_eq!(
            result,
            Err(Error::BufferTooSmall {
                needed: encoded.len(),
                got: encoded.len() - 1,
            })
        );
    }

    #[test]
    fn test_decode_reports_consumed_bytes_with_trailing_data() {
        let mut stream = encode(Command::Data, b"first").unwrap();
        let first_len = stream.len();
        stream.extend(encode(Command::End, &[]).unwrap());

        let (frame, consumed) = decode(&stream).unwrap();
        assert_eq!(frame.command(), Command::Data);
        assert_eq!(consumed, first_len);

        let (frame, _) = decode(&stream[consumed..]).unwrap();
        assert_eq!(frame.command(), Command::End);
    }

    // Property-based tests
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn command_strategy() -> impl Strategy<Value = Command> {
            prop_oneof![
                Just(Command::Start),
                Just(Command::Data),
                Just(Command::End),
                Just(Command::Abort),
            ]
        }

        fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
            prop_oneof![
                prop::collection::vec(any::<u8>(), 0..=1024),
                prop::collection::vec(any::<u8>(), 60_000..=MAX_PAYLOAD_SIZE),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            /// Property: any command and payload up to 65535 bytes roundtrips
            #[test]
            fn prop_roundtrip_preserves_frame(
                command in command_strategy(),
                payload in payload_strategy(),
            ) {
                let encoded = encode(command, &payload).unwrap();
                let (frame, consumed) = decode(&encoded).unwrap();

                prop_assert_eq!(frame.command(), command);
                prop_assert_eq!(frame.payload().as_ref(), payload.as_slice());
                prop_assert_eq!(consumed, encoded.len());
            }

            /// Property: flipping one payload bit is detected by the checksum
            #[test]
            fn prop_payload_bit_flip_detected(
                command in command_strategy(),
                payload in prop::collection::vec(any::<u8>(), 1..=1024),
                position in any::<prop::sample::Index>(),
                bit in 0u8..8,
            ) {
                let mut encoded = encode(command, &payload).unwrap();
                let offset = HEADER_SIZE + position.index(payload.len());
                encoded[offset] ^= 1 << bit;

                let result = decode(&encoded);
                let is_checksum_mismatch = matches!(result, Err(Error::ChecksumMismatch { .. }));
                prop_assert!(is_checksum_mismatch, "corrupted payload should fail checksum");
            }

            /// Property: the length field always equals the payload length
            #[test]
            fn prop_length_field_matches_payload(
                command in command_strategy(),
                payload in prop::collection::vec(any::<u8>(), 0..=4096),
            ) {
                let encoded = encode(command, &payload).unwrap();
                let len = usize::from(u16::from_be_bytes([encoded[3], encoded[4]]));

                prop_assert_eq!(len, payload.len());
                prop_assert_eq!(encoded.len(), HEADER_SIZE + len + CHECKSUM_SIZE);
            }
        }
    }
}
