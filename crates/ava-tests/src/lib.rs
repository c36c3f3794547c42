//! Cross-crate tests for Ava.
//!
//! Property tests exercise the codec, ownership and set algebra under
//! generated inputs. End-to-end tests drive a [`helpers::MockChain`] through
//! the wallet's full build, sign and issue cycle.

pub mod helpers;
