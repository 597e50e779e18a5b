//! Integration tests for whole-file and whole-tree rewrites.

mod config_files;
mod scenarios;
mod tree_walk;
