pub mod entrypoint;
pub mod error;
pub mod extractor;
pub mod literal;
pub mod model;

#[cfg(test)]
mod tests;

pub use entrypoint::{resolve, ArgsView, EntrypointSignature, MainClassPolicy};
pub use error::SyntaxError;
pub use extractor::{extract, parse_program};
pub use literal::literal_eval;
pub use model::{ArgRecord, AttributeRecord, ClassRecord, FunctionRecord, ImportRecord, ProgramModel, VarRecord};
