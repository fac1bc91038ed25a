//! This crate provides the byte-level front half of a JPEG decoder: a
//! forward-only [byte source][ByteSource], a [marker lexer][MarkerLexer]
//! that splits the stream into marker segments and entropy-coded segments,
//! and a [bit reader][EcsBitstream] over unstuffed entropy-coded bytes.
//!
//! # Marker lexer
//!
//! [`MarkerLexer`] emits [`LexEvent`]s in stream order. It removes the
//! `0xFF 0x00` stuffing inside entropy-coded data and tolerates 0xFF fill
//! runs before marker codes, so downstream parsers only ever see clean
//! payload bytes.
//!
//! # ECS bit reader
//!
//! [`EcsBitstream`] exposes padded-bit `peek`/`consume` access for the
//! entropy decoder, with an implicit all-ones barrier past the payload and
//! explicit truncation reporting.

mod bits;
mod error;
mod lexer;
mod marker;
mod source;

pub use bits::EcsBitstream;
pub use error::{Error, Result};
pub use lexer::{LexEvent, MarkerLexer};
pub use marker::Marker;
pub use source::{ByteSource, ReaderSource, SliceSource};
