//! Round File Adapter
//!
//! Replays recorded rounds from JSON. Accepts the field spellings used by the
//! public round feeds (`Phien`/`phien`, `Ket_qua`/`ket_qua`, ...).

mod file_source;

pub use file_source::RoundFileSource;
