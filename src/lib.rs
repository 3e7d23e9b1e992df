//! Pitch-event exploration core: cleaning, querying and flow layout.
//!
//! The dashboard binary (`pitch-explorer`) and the offline cleaning binary
//! (`clean_pitches`) are both thin shells over this library.

pub mod color;
pub mod data;
pub mod flow;
