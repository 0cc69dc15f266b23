mod common;

mod compile_test;
mod config_test;
mod deps_test;
