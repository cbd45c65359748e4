pub mod catalog;
pub mod categories;
pub mod discovery;
pub mod dna;
pub mod engine;
pub mod equivalence;
pub mod error;
pub mod implants;
pub mod items;
pub mod loader;
pub mod matcher;
pub mod model;
pub mod parser;
pub mod skills;

#[cfg(test)]
mod testing;

pub use catalog::*;
pub use categories::*;
pub use discovery::*;
pub use dna::*;
pub use engine::*;
pub use equivalence::*;
pub use error::*;
pub use implants::*;
pub use items::*;
pub use loader::*;
pub use matcher::*;
pub use model::*;
pub use parser::*;
pub use skills::*;
