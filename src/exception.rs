/// Modbus exception codes with their stable on-wire byte values.
///
/// Handlers in this crate only ever raise `IllegalDataAddress` and
/// `IllegalDataValue`; the rest of the standard set is carried so that
/// custom function code handlers can speak the full protocol vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Ord, Eq)]
pub enum ExceptionCode {
    /// The function code is not supported or not allowed on this server (0x01)
    IllegalFunction,
    /// The request addresses a range outside the configured address space (0x02)
    IllegalDataAddress,
    /// A request field holds a value the function does not permit (0x03)
    IllegalDataValue,
    /// The server failed irrecoverably while executing the request (0x04)
    ServerDeviceFailure,
    /// A long-running programming command was accepted and is still in
    /// progress (0x05)
    Acknowledge,
    /// The server is occupied with a long-running command and the client
    /// should retry later (0x06)
    ServerDeviceBusy,
    /// A parity error was detected while reading record-file storage (0x08)
    MemoryParityError,
    /// A gateway could not allocate an internal path to the target (0x0A)
    GatewayPathUnavailable,
    /// A gateway forwarded the request but the target never answered (0x0B)
    GatewayTargetDeviceFailedToRespond,
    /// Any byte value the standard does not assign
    Unknown(u8),
}

impl From<u8> for ExceptionCode {
    fn from(value: u8) -> Self {
        match value {
            crate::constants::exceptions::ILLEGAL_FUNCTION => ExceptionCode::IllegalFunction,
            crate::constants::exceptions::ILLEGAL_DATA_ADDRESS => ExceptionCode::IllegalDataAddress,
            crate::constants::exceptions::ILLEGAL_DATA_VALUE => ExceptionCode::IllegalDataValue,
            crate::constants::exceptions::SERVER_DEVICE_FAILURE => {
                ExceptionCode::ServerDeviceFailure
            }
            crate::constants::exceptions::ACKNOWLEDGE => ExceptionCode::Acknowledge,
            crate::constants::exceptions::SERVER_DEVICE_BUSY => ExceptionCode::ServerDeviceBusy,
            crate::constants::exceptions::MEMORY_PARITY_ERROR => ExceptionCode::MemoryParityError,
            crate::constants::exceptions::GATEWAY_PATH_UNAVAILABLE => {
                ExceptionCode::GatewayPathUnavailable
            }
            crate::constants::exceptions::GATEWAY_TARGET_DEVICE_FAILED_TO_RESPOND => {
                ExceptionCode::GatewayTargetDeviceFailedToRespond
            }
            _ => ExceptionCode::Unknown(value),
        }
    }
}

impl From<ExceptionCode> for u8 {
    fn from(ex: ExceptionCode) -> Self {
        match ex {
            ExceptionCode::IllegalFunction => crate::constants::exceptions::ILLEGAL_FUNCTION,
            ExceptionCode::IllegalDataAddress => crate::constants::exceptions::ILLEGAL_DATA_ADDRESS,
            ExceptionCode::IllegalDataValue => crate::constants::exceptions::ILLEGAL_DATA_VALUE,
            ExceptionCode::ServerDeviceFailure => {
                crate::constants::exceptions::SERVER_DEVICE_FAILURE
            }
            ExceptionCode::Acknowledge => crate::constants::exceptions::ACKNOWLEDGE,
            ExceptionCode::ServerDeviceBusy => crate::constants::exceptions::SERVER_DEVICE_BUSY,
            ExceptionCode::MemoryParityError => crate::constants::exceptions::MEMORY_PARITY_ERROR,
            ExceptionCode::GatewayPathUnavailable => {
                crate::constants::exceptions::GATEWAY_PATH_UNAVAILABLE
            }
            ExceptionCode::GatewayTargetDeviceFailedToRespond => {
                crate::constants::exceptions::GATEWAY_TARGET_DEVICE_FAILED_TO_RESPOND
            }
            ExceptionCode::Unknown(value) => value,
        }
    }
}

impl std::error::Error for ExceptionCode {}

impl std::fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            ExceptionCode::IllegalFunction => {
                f.write_str("function code is not supported by this server")
            }
            ExceptionCode::IllegalDataAddress => {
                f.write_str("request addresses a range outside the configured address space")
            }
            ExceptionCode::IllegalDataValue => {
                f.write_str("request field holds a value the function does not permit")
            }
            ExceptionCode::ServerDeviceFailure => {
                f.write_str("server failed while executing the request")
            }
            ExceptionCode::Acknowledge => {
                f.write_str("request accepted, processing still in progress")
            }
            ExceptionCode::ServerDeviceBusy => {
                f.write_str("server is busy with a long-running command, retry later")
            }
            ExceptionCode::MemoryParityError => {
                f.write_str("parity error detected in record-file storage")
            }
            ExceptionCode::GatewayPathUnavailable => {
                f.write_str("gateway could not allocate a path to the target device")
            }
            ExceptionCode::GatewayTargetDeviceFailedToRespond => {
                f.write_str("target device behind the gateway did not respond")
            }
            ExceptionCode::Unknown(code) => {
                write!(f, "exception code {code:#04X} outside the standard set")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exception_codes_round_trip_through_u8() {
        for value in [0x01u8, 0x02, 0x03, 0x04, 0x05, 0x06, 0x08, 0x0A, 0x0B] {
            assert_eq!(u8::from(ExceptionCode::from(value)), value);
        }
    }

    #[test]
    fn unassigned_values_map_to_unknown() {
        assert_eq!(ExceptionCode::from(0x07), ExceptionCode::Unknown(0x07));
        assert_eq!(u8::from(ExceptionCode::Unknown(0x55)), 0x55);
    }
}
