//! Cross-module tests of the bootstrap pipeline
