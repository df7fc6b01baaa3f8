pub mod coil {
    /// u16 representation of COIL == ON when performing write single coil
    pub const ON: u16 = 0xFF00;
    /// u16 representation of COIL == OFF when performing write single coil
    pub const OFF: u16 = 0x0000;
}

pub mod function {
    pub const READ_COILS: u8 = 0x01;
    pub const READ_DISCRETE_INPUTS: u8 = 0x02;
    pub const READ_HOLDING_REGISTERS: u8 = 0x03;
    pub const READ_INPUT_REGISTERS: u8 = 0x04;
    pub const WRITE_SINGLE_COIL: u8 = 0x05;
    pub const WRITE_SINGLE_REGISTER: u8 = 0x06;
    pub const WRITE_MULTIPLE_COILS: u8 = 0x0F;
    pub const WRITE_MULTIPLE_REGISTERS: u8 = 0x10;
}

pub mod limits {
    /// Maximum count allowed in a read request
    pub const MAX_READ_COUNT: u16 = 2000;
    /// A request frame carries at least the MBAP header, function code
    /// and a four byte body (start address plus quantity or value)
    pub const MIN_FRAME_LENGTH: usize = 12;
    /// Minimum frame length for the write-multiple function codes, which
    /// carry a byte count and a data region after the quantity field
    pub const MIN_WRITE_MULTIPLE_FRAME_LENGTH: usize = 14;
    /// Size of the per-iteration socket read buffer
    pub const READ_BUFFER_SIZE: usize = 1024;
}

pub mod mbap {
    /// Length of the MBAP header that precedes every PDU
    pub const HEADER_LENGTH: usize = 7;
    /// The only protocol id assigned by the Modbus specification
    pub const MODBUS_PROTOCOL_ID: u16 = 0;
}

pub mod exceptions {
    pub const ILLEGAL_FUNCTION: u8 = 0x01;
    pub const ILLEGAL_DATA_ADDRESS: u8 = 0x02;
    pub const ILLEGAL_DATA_VALUE: u8 = 0x03;
    pub const SERVER_DEVICE_FAILURE: u8 = 0x04;
    pub const ACKNOWLEDGE: u8 = 0x05;
    pub const SERVER_DEVICE_BUSY: u8 = 0x06;
    pub const MEMORY_PARITY_ERROR: u8 = 0x08;
    pub const GATEWAY_PATH_UNAVAILABLE: u8 = 0x0A;
    pub const GATEWAY_TARGET_DEVICE_FAILED_TO_RESPOND: u8 = 0x0B;
}
