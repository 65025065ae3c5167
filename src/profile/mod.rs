//! Profile data structures: raw caller input and the normalized profile

mod data;

pub use data::{ByGender, Gender, ProfileCandidate, UserProfile};
