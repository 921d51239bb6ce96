//! gecko C generator.
//!
//! # Header pair
//!
//! [`GeneratedHeaders::generate`] turns a validated [`gecko_types::CodeList`]
//! into the two units every project build includes:
//!
//! - `__gen__/standard_defs.h`: one `void <file>(void);` per code
//! - `__gen__/standard.h`: the `CLFFmt` enum and the `printclf` dispatch
//!   routine, which prints banners and descriptions for the selected output
//!   format and calls each code's function in manifest order
//!
//! # Embedder
//!
//! [`Bin2C`] encodes an arbitrary binary payload as a fixed-width integer
//! array source unit, with an optional declaration header.

pub mod bin2c;
pub mod error;
pub mod headers;
pub mod license;

pub use bin2c::{Bin2C, Embedded, IncludeDirs, WordWidth};
pub use error::{CodegenError, CodegenResult};
pub use headers::{
    render_declarations, render_dispatch, GeneratedHeaders, DECLARATIONS_FILE, DISPATCH_FILE,
    GEN_DIR,
};
pub use license::MIT_LICENSE;
