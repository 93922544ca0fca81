#![deny(unsafe_code)]

//! Resolution of free-text names (sectors, organisation types, ...) to
//! canonical codes.

pub mod matcher;
pub mod normalize;
pub mod phonetic;
pub mod table;

pub use matcher::{DEFAULT_MIN_PHONETIC_LEN, MatchTier, NameMatcher, Resolution, resolve};
pub use normalize::{clean_name, clean_upper, org_identity};
pub use phonetic::{PhoneticMatcher, phonetic_distance, refined_soundex};
pub use table::CodeTable;
