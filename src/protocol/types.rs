//! Command and reply vocabulary

use std::fmt;

/// Frame commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Begin a session; payload is the image size as little-endian `u32`
    Start = 0x01,
    /// Image chunk
    Data = 0x02,
    /// All chunks sent; payload is empty
    End = 0x03,
    /// Cancel the session; the device expects no further frames
    Abort = 0x04,
}

impl Command {
    /// Convert from byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Start),
            0x02 => Some(Self::Data),
            0x03 => Some(Self::End),
            0x04 => Some(Self::Abort),
            _ => None,
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "START",
            Self::Data => "DATA",
            Self::End => "END",
            Self::Abort => "ABORT",
        };
        write!(f, "{name}")
    }
}

/// Single-byte replies sent by the device, without a frame wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Reply {
    /// Frame accepted
    Ack = 0x06,
    /// Frame rejected
    Nak = 0x15,
}

impl Reply {
    /// Convert from byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x06 => Some(Self::Ack),
            0x15 => Some(Self::Nak),
            _ => None,
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ack => write!(f, "ACK"),
            Self::Nak => write!(f, "NAK"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_bytes() {
        assert_eq!(Command::Start.as_u8(), 0x01);
        assert_eq!(Command::Data.as_u8(), 0x02);
        assert_eq!(Command::End.as_u8(), 0x03);
        assert_eq!(Command::Abort.as_u8(), 0x04);

        for command in [Command::Start, Command::Data, Command::End, Command::Abort] {
            assert_eq!(Command::from_u8(command.as_u8()), Some(command));
        }
        assert_eq!(Command::from_u8(0x00), None);
        assert_eq!(Command::from_u8(0x05), None);
    }

    #[test]
    fn test_reply_bytes() {
        assert_eq!(Reply::from_u8(0x06), Some(Reply::Ack));
        assert_eq!(Reply::from_u8(0x15), Some(Reply::Nak));
        assert_eq!(Reply::from_u8(0x00), None);
        assert_eq!(Reply::Nak.to_string(), "NAK");
    }
}
