//! Command handlers for the MedQuery CLI.

pub mod ask;
pub mod fetch;
pub mod serve;

pub use ask::AskCommand;
pub use fetch::FetchPubMedCommand;
pub use serve::ServeCommand;
