// Common test utilities
mod common;

// Test modules organized by component
mod integration;
mod lexer;
mod statement_parser;
