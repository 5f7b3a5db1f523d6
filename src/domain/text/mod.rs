pub mod chunker;
pub mod language;
pub mod normalizer;
pub mod optimizer;

pub use chunker::{chunk_text, TextChunk};
pub use language::{detect_script, Script};
pub use normalizer::{normalize, prepare, reorder_rtl_lines};
pub use optimizer::optimize;
