pub mod alignment;
pub mod articulation;
pub mod assessment;
pub mod error;
pub mod grapheme_table;
pub mod phoneme;
pub mod phoneme_info;
pub mod score;
pub mod settings;
pub mod types;
