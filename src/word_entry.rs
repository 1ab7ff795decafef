//! The fixed 12-byte lexical record, mirroring
//! `lindera-core/src/word_entry.rs`'s little-endian (de)serialization.

use byteorder::{ByteOrder, LittleEndian};

/// Part-of-speech id reserved for synthesized unknown-word edges.
pub const UNKNOWN_POS: u8 = 255;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct WordEntry {
    pub seq: i32,
    pub cost: i16,
    pub pos_id: u8,
    pub conj_type: u8,
    pub base_seq: i32,
}

impl WordEntry {
    pub const SERIALIZED_LEN: usize = 12;

    pub fn serialize(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= Self::SERIALIZED_LEN);
        LittleEndian::write_i32(&mut buf[0..4], self.seq);
        LittleEndian::write_i16(&mut buf[4..6], self.cost);
        buf[6] = self.pos_id;
        buf[7] = self.conj_type;
        LittleEndian::write_i32(&mut buf[8..12], self.base_seq);
    }

    pub fn deserialize(data: &[u8]) -> WordEntry {
        WordEntry {
            seq: LittleEndian::read_i32(&data[0..4]),
            cost: LittleEndian::read_i16(&data[4..6]),
            pos_id: data[6],
            conj_type: data[7],
            base_seq: LittleEndian::read_i32(&data[8..12]),
        }
    }

}
