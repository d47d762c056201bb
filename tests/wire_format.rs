use serial_ota::device::{MemorySink, Receiver};
use serial_ota::protocol::{
    Command, DecodeEvent, Frame, FrameDecoder, MIN_FRAME_SIZE, Reply, crc16, encode,
};

#[test]
fn start_frame_for_1300_byte_image() {
    let frame = Frame::start(1300).encode().unwrap();

    assert_eq!(
        frame,
        [0x55, 0xAA, 0x01, 0x00, 0x04, 0x14, 0x05, 0x00, 0x00, 0xBE, 0x66]
    );
}

#[test]
fn end_and_abort_frames_carry_initial_crc() {
    assert_eq!(
        encode(Command::End, &[]).unwrap(),
        [0x55, 0xAA, 0x03, 0x00, 0x00, 0xFF, 0xFF]
    );
    assert_eq!(
        encode(Command::Abort, &[]).unwrap(),
        [0x55, 0xAA, 0x04, 0x00, 0x00, 0xFF, 0xFF]
    );
    assert_eq!(Frame::end().encode().unwrap().len(), MIN_FRAME_SIZE);
}

#[test]
fn crc_known_values() {
    assert_eq!(crc16(&[]), 0xFFFF);
    assert_eq!(crc16(b"123456789"), 0x29B1);
    assert_eq!(crc16(b"hello"), 0xD26E);
    assert_eq!(crc16(&[0u8; 9]), 0x1872);
}

#[test]
fn data_frame_checksum_is_over_payload_only() {
    let frame = encode(Command::Data, b"hello").unwrap();
    let tail = &frame[frame.len() - 2..];

    assert_eq!(&frame[..5], [0x55, 0xAA, 0x02, 0x00, 0x05]);
    assert_eq!(&frame[5..10], b"hello");
    assert_eq!(u16::from_be_bytes([tail[0], tail[1]]), crc16(b"hello"));
}

#[test]
fn decoder_recovers_from_line_noise() {
    let mut stream = vec![0x00, 0x55, 0x13, 0xAA, 0x55, 0x55];
    stream.extend(&encode(Command::Data, b"payload").unwrap()[1..]);
    stream.extend(encode(Command::End, &[]).unwrap());

    let events = FrameDecoder::new().feed(&stream);

    assert_eq!(
        events,
        [
            DecodeEvent::Frame(Frame::data(&b"payload"[..])),
            DecodeEvent::Frame(Frame::end()),
        ]
    );
}

#[test]
fn receiver_session_fed_one_byte_at_a_time() {
    let firmware: Vec<u8> = (0..=255u8).cycle().take(2000).collect();
    let mut wire = Frame::start(2000).encode().unwrap();
    for chunk in firmware.chunks(512) {
        wire.extend(encode(Command::Data, chunk).unwrap());
    }
    wire.extend(encode(Command::End, &[]).unwrap());

    let mut receiver = Receiver::new(MemorySink::new(4096));
    let replies: Vec<Reply> = wire.iter().flat_map(|byte| receiver.feed(&[*byte])).collect();

    assert_eq!(replies, vec![Reply::Ack; 6]);
    assert!(receiver.is_complete());
    assert_eq!(receiver.sink().image(), firmware.as_slice());
}

#[test]
fn receiver_naks_corruption_then_accepts_resend() {
    let mut receiver = Receiver::new(MemorySink::default());
    receiver.feed(&Frame::start(4).encode().unwrap());

    let good = encode(Command::Data, b"abcd").unwrap();
    let mut corrupted = good.clone();
    corrupted[6] ^= 0x01;

    assert_eq!(receiver.feed(&corrupted), [Reply::Nak]);
    assert_eq!(receiver.written(), 0);
    assert_eq!(receiver.feed(&good), [Reply::Ack]);
    assert_eq!(receiver.feed(&Frame::end().encode().unwrap()), [Reply::Ack]);
    assert_eq!(receiver.sink().image(), b"abcd");
}
