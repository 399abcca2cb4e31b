//! # Prompt Template Modules
//!
//! This module organizes all prompt templates used throughout the `autolinker` library.

pub mod keywords;
