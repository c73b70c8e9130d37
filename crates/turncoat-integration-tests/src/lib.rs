//! Cross-crate game flows. The tests live in `tests/`.
