// Library entry exposing assembler modules.
pub mod arg;
pub mod assembler;
pub mod conditional;
pub mod encoder;
pub mod expr;
pub mod functions;
pub mod listing;
pub mod log;
pub mod options;
pub mod source;
pub mod symbols;
pub mod tokenizer;
