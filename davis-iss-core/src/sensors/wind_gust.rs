//! Sensor nibble 0x9: wind gust, mph.
pub fn decode(data: &[u8; 8]) -> u8 {
    data[3]
}
