//! Small maintenance tools that sit next to the manifest commands.

pub mod downloads;
pub mod fragments;
pub mod publish;
pub mod syntax_docs;
