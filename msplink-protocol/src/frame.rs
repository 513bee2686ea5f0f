//! Frame encoding and decoding for MSP v1.
//!
//! Frame format:
//! - SYNC (1 byte): '$' synchronization byte
//! - PROTO (1 byte): 'M' protocol identification byte
//! - DIRECTION (1 byte): '<' request, '>' response, '!' error
//! - LENGTH (1 byte): payload length (0-255)
//! - COMMAND (1 byte): command identifier
//! - PAYLOAD (0-255 bytes): command-specific data
//! - CHECKSUM (1 byte): XOR of LENGTH, COMMAND, and all PAYLOAD bytes

use heapless::Vec;

/// Frame synchronization byte
pub const FRAME_SYNC: u8 = b'$';

/// Protocol identification byte
pub const FRAME_PROTO: u8 = b'M';

/// Maximum payload size in bytes (LENGTH is a single byte)
pub const MAX_PAYLOAD_SIZE: usize = 255;

/// Maximum complete frame size (SYNC + PROTO + DIRECTION + LENGTH + COMMAND
/// + MAX_PAYLOAD + CHECKSUM)
pub const MAX_FRAME_SIZE: usize = 5 + MAX_PAYLOAD_SIZE + 1;

/// Frame direction markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Host to flight controller ('<')
    Request,
    /// Flight controller to host ('>')
    Response,
    /// Flight controller could not handle the command ('!')
    Error,
}

impl Direction {
    /// Parse a direction from its wire marker byte
    pub fn from_marker(byte: u8) -> Option<Self> {
        match byte {
            b'<' => Some(Direction::Request),
            b'>' => Some(Direction::Response),
            b'!' => Some(Direction::Error),
            _ => None,
        }
    }

    /// Convert to the wire marker byte
    pub fn marker(self) -> u8 {
        match self {
            Direction::Request => b'<',
            Direction::Response => b'>',
            Direction::Error => b'!',
        }
    }
}

/// Which inbound directions a parser delivers.
///
/// Anything rejected by the filter is treated like a header mismatch: the
/// scanner discards it and hunts for the next frame start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DirectionFilter {
    /// Deliver response frames only
    Response,
    /// Deliver response and error frames
    ResponseOrError,
    /// Deliver every well-formed frame (wire taps, loopback tests)
    Any,
}

impl DirectionFilter {
    /// Check whether a direction passes this filter
    pub fn accepts(self, direction: Direction) -> bool {
        match self {
            DirectionFilter::Response => direction == Direction::Response,
            DirectionFilter::ResponseOrError => {
                matches!(direction, Direction::Response | Direction::Error)
            }
            DirectionFilter::Any => true,
        }
    }
}

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds the single length byte of the wire format
    PayloadTooLarge,
    /// Checksum mismatch
    InvalidChecksum,
    /// Header byte mismatch or direction rejected by the filter
    InvalidHeader,
    /// Buffer too small for encoding
    BufferTooSmall,
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::PayloadTooLarge => write!(f, "payload exceeds 255 bytes"),
            FrameError::InvalidChecksum => write!(f, "checksum mismatch"),
            FrameError::InvalidHeader => write!(f, "header mismatch"),
            FrameError::BufferTooSmall => write!(f, "encode buffer too small"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Direction marker
    pub direction: Direction,
    /// Command identifier
    pub command: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame with the given direction, command and payload
    pub fn new(direction: Direction, command: u8, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }

        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            direction,
            command,
            payload: payload_vec,
        })
    }

    /// Create a request frame with no payload
    pub fn request(command: u8) -> Self {
        Self {
            direction: Direction::Request,
            command,
            payload: Vec::new(),
        }
    }

    /// Calculate checksum for frame data
    fn calculate_checksum(length: u8, command: u8, payload: &[u8]) -> u8 {
        let mut checksum = length ^ command;
        for &byte in payload {
            checksum ^= byte;
        }
        checksum
    }

    /// Checksum of this frame's length, command and payload
    pub fn checksum(&self) -> u8 {
        Self::calculate_checksum(self.payload.len() as u8, self.command, &self.payload)
    }

    /// Size of this frame on the wire (payload plus 6 bytes of framing)
    pub fn wire_len(&self) -> usize {
        self.payload.len() + 6
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.wire_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let length = self.payload.len() as u8;

        buffer[0] = FRAME_SYNC;
        buffer[1] = FRAME_PROTO;
        buffer[2] = self.direction.marker();
        buffer[3] = length;
        buffer[4] = self.command;
        buffer[5..5 + self.payload.len()].copy_from_slice(&self.payload);
        buffer[5 + self.payload.len()] = self.checksum();

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// State machine for parsing incoming frames
///
/// The parser consumes one byte at a time and resynchronizes on its own: any
/// bytes outside a plausible frame are discarded, a header or checksum
/// mismatch discards the frame in progress and resumes the hunt for the next
/// sync byte. Malformed input therefore never terminates parsing, it only
/// costs the bytes involved.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    filter: DirectionFilter,
    direction: Direction,
    command: u8,
    expected_length: u8,
    buffer: Vec<u8, MAX_PAYLOAD_SIZE>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for SYNC byte
    WaitingForSync,
    /// Got SYNC, waiting for PROTO
    WaitingForProto,
    /// Got PROTO, waiting for a direction marker
    WaitingForDirection,
    /// Waiting for LENGTH
    WaitingForLength,
    /// Waiting for COMMAND
    WaitingForCommand,
    /// Reading payload bytes
    ReadingPayload,
    /// Waiting for CHECKSUM
    WaitingForChecksum,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a parser delivering response and error frames
    pub fn new() -> Self {
        Self::with_filter(DirectionFilter::ResponseOrError)
    }

    /// Create a parser with an explicit direction filter
    pub fn with_filter(filter: DirectionFilter) -> Self {
        Self {
            state: ParseState::WaitingForSync,
            filter,
            direction: Direction::Response,
            command: 0,
            expected_length: 0,
            buffer: Vec::new(),
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForSync;
        self.buffer.clear();
        self.command = 0;
        self.expected_length = 0;
    }

    /// Resume scanning after a rejected header byte.
    ///
    /// The byte that broke the header may itself be the sync byte of a real
    /// frame (e.g. `$$M>`), so it is re-examined instead of being dropped
    /// with the rest of the rejected header.
    fn resync(&mut self, byte: u8) {
        self.state = if byte == FRAME_SYNC {
            ParseState::WaitingForProto
        } else {
            ParseState::WaitingForSync
        };
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on a header or
    /// checksum mismatch. Errors are recoverable: the parser has already
    /// repositioned itself and the next byte may be fed as usual.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            ParseState::WaitingForSync => {
                if byte == FRAME_SYNC {
                    self.state = ParseState::WaitingForProto;
                }
                // Silently ignore non-SYNC bytes while scanning
                Ok(None)
            }
            ParseState::WaitingForProto => {
                if byte == FRAME_PROTO {
                    self.state = ParseState::WaitingForDirection;
                    Ok(None)
                } else {
                    self.resync(byte);
                    Err(FrameError::InvalidHeader)
                }
            }
            ParseState::WaitingForDirection => match Direction::from_marker(byte) {
                Some(direction) if self.filter.accepts(direction) => {
                    self.direction = direction;
                    self.state = ParseState::WaitingForLength;
                    Ok(None)
                }
                _ => {
                    self.resync(byte);
                    Err(FrameError::InvalidHeader)
                }
            },
            ParseState::WaitingForLength => {
                self.expected_length = byte;
                self.state = ParseState::WaitingForCommand;
                Ok(None)
            }
            ParseState::WaitingForCommand => {
                self.command = byte;
                self.buffer.clear();
                if self.expected_length == 0 {
                    self.state = ParseState::WaitingForChecksum;
                } else {
                    self.state = ParseState::ReadingPayload;
                }
                Ok(None)
            }
            ParseState::ReadingPayload => {
                // Cannot overflow: expected_length <= MAX_PAYLOAD_SIZE
                let _ = self.buffer.push(byte);
                if self.buffer.len() == self.expected_length as usize {
                    self.state = ParseState::WaitingForChecksum;
                }
                Ok(None)
            }
            ParseState::WaitingForChecksum => {
                let expected =
                    Frame::calculate_checksum(self.expected_length, self.command, &self.buffer);

                if byte != expected {
                    self.reset();
                    return Err(FrameError::InvalidChecksum);
                }

                let frame = Frame {
                    direction: self.direction,
                    command: self.command,
                    payload: self.buffer.clone(),
                };

                self.reset();
                Ok(Some(frame))
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any. Remaining bytes after
    /// a complete frame are not consumed; a recoverable parse error stops
    /// the scan early.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
