// Shared program builders
mod common;

mod scenarios;
