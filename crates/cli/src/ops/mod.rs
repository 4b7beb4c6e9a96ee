//! Pipeline stages and their orchestration
//!
//! Each stage is a plain function or small struct over a `CommandRunner`,
//! so commands and tests drive the same code with real or scripted tools.

pub mod acquire;
pub mod collate;
pub mod compensation;
pub mod pipeline;
pub mod publish;
pub mod version;

#[cfg(test)]
mod tests;
