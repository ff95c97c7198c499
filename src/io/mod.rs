//! File-system collaborator: corpus listing plus headerless CSV reading and writing.

pub mod corpus;
pub mod reader;
pub mod writer;

pub use corpus::{list_corpus, recording_id};
pub use reader::{read_matrix, read_table};
pub use writer::{write_json, write_matrix, write_table};
