//! Unit test modules.

mod builder_test;
mod power_parser_test;
mod target_test;
mod workout_parser_test;
