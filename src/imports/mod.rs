pub mod statement;

pub use statement::{parse_bank_statement, ParsedStatement, StatementEntry};
