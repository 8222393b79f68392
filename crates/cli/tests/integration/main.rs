mod common;

#[cfg(unix)]
mod compile_tests;
