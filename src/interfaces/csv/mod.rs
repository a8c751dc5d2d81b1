//! CSV adapters: the command feed and wallet seed readers, and the final
//! report writer.

pub mod command_reader;
pub mod report_writer;
pub mod wallet_reader;
