//! Property-based tests for query ids and context durations

mod codec_roundtrip;
