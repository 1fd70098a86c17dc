pub mod to_tsv;

pub use to_tsv::write_rows;
